//! Reprojection intelligente : reproject_lite en priorité, fallback sur proj
//!
//! Utilise automatiquement la meilleure option disponible.

use super::ReprojectorLite;
use anyhow::{bail, Result};
use capa::Crs;
use geo::MultiPolygon;

/// Reprojection intelligente
///
/// Essaie d'abord reproject_lite (pure Rust), puis fallback sur proj si disponible.
pub enum SmartReprojector {
    /// Reprojection légère (pure Rust)
    Lite(ReprojectorLite),
    /// Reprojection via PROJ (si feature activée)
    #[cfg(feature = "reproject")]
    Proj(crate::reproject::Reprojector),
    /// Pas de reprojection (source == cible)
    Identity,
}

impl SmartReprojector {
    /// Crée un nouveau reprojector entre deux CRS
    pub fn new(source: &Crs, target: &Crs) -> Result<Self> {
        // Pas de reprojection nécessaire
        if source.same_as(target) {
            return Ok(Self::Identity);
        }

        // Essayer reproject_lite d'abord
        if let (Some(s), Some(t)) = (source.epsg(), target.epsg()) {
            if ReprojectorLite::is_supported(s, t) {
                return Ok(Self::Lite(ReprojectorLite::new(s, t)?));
            }
        }

        // Fallback sur proj si disponible
        #[cfg(feature = "reproject")]
        {
            let proj =
                crate::reproject::Reprojector::new(&source.definition(), &target.definition())?;
            return Ok(Self::Proj(proj));
        }

        // Aucune option disponible
        #[cfg(not(feature = "reproject"))]
        bail!(crate::AnalysisError::UnsupportedReprojection {
            source_crs: source.to_string(),
            target_crs: target.to_string(),
            reason: "reproject_lite supporte 4326, 4686, 3857, 3114-3118, 9377, 326xx, 327xx; \
                     pour d'autres systèmes, compilez avec: cargo build --features reproject"
                .to_string(),
        });
    }

    /// Transforme une géométrie
    pub fn transform_multipolygon(&self, geom: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        match self {
            Self::Identity => Ok(geom.clone()),
            Self::Lite(lite) => lite.transform_multipolygon(geom),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform_multipolygon(geom),
        }
    }

    /// Retourne une description du reprojector utilisé
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity (pas de reprojection)",
            Self::Lite(_) => "reproject_lite (pure Rust)",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "proj (PROJ library)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let r = SmartReprojector::new(&Crs::from_epsg(3116), &Crs::from_epsg(3116)).unwrap();
        assert!(matches!(r, SmartReprojector::Identity));
    }

    #[test]
    fn test_lite() {
        let r = SmartReprojector::new(&Crs::from_epsg(4326), &Crs::from_epsg(9377)).unwrap();
        assert!(matches!(r, SmartReprojector::Lite(_)));
        assert_eq!(r.description(), "reproject_lite (pure Rust)");
    }

    #[cfg(not(feature = "reproject"))]
    #[test]
    fn test_unsupported_without_proj() {
        let result = SmartReprojector::new(&Crs::from_epsg(2154), &Crs::from_epsg(3116));
        assert!(result.is_err());
    }
}
