//! Erreurs de l'analyse d'aptitude

use thiserror::Error;

/// Erreurs métier de l'analyse (les erreurs d'I/O passent par `capa::CapaError`)
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// La couche du predio ne contient aucune entité
    #[error("Parcel layer is empty: record 0 is out of range")]
    EmptyParcel,

    /// Une seule des deux couches déclare un CRS
    #[error("Layer '{layer}' has no CRS; cannot reconcile reference frames")]
    UndefinedCrs { layer: &'static str },

    /// Aucune méthode de reprojection disponible entre les deux CRS
    #[error("Reprojection {source_crs} -> {target_crs} not supported: {reason}")]
    UnsupportedReprojection {
        source_crs: String,
        target_crs: String,
        reason: String,
    },
}
