//! Types d'erreurs pour le crate capa

use thiserror::Error;

/// Erreurs pouvant survenir lors de la lecture ou de l'écriture d'une couche
#[derive(Debug, Error)]
pub enum CapaError {
    /// Erreur d'I/O (fichier absent, répertoire inexistant, permissions)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Erreur remontée par le lecteur/écrivain Shapefile
    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    /// Erreur sur la table attributaire DBF
    #[error("DBF error: {0}")]
    Dbase(String),

    /// En-tête DBF illisible
    #[error("Invalid DBF header in {file}: {reason}")]
    InvalidDbf { file: String, reason: String },

    /// GeoJSON mal formé
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Erreur de sérialisation JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Erreur lors de l'écriture d'une géométrie via geozero
    #[error("Geometry encoding error: {0}")]
    Encoding(#[from] geozero::error::GeozeroError),

    /// Extension de fichier non reconnue
    #[error("Unsupported vector format: {0}")]
    UnsupportedFormat(String),

    /// Géométrie non polygonale
    #[error("Unsupported geometry at record {index}: {kind} (expected Polygon or MultiPolygon)")]
    UnsupportedGeometry { index: usize, kind: String },
}

impl CapaError {
    /// Crée une erreur d'en-tête DBF avec contexte
    pub fn invalid_dbf(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDbf {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de géométrie non supportée
    pub fn unsupported_geometry(index: usize, kind: impl Into<String>) -> Self {
        Self::UnsupportedGeometry {
            index,
            kind: kind.into(),
        }
    }
}
