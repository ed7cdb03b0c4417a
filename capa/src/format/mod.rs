//! Formats de fichiers vectoriels supportés

pub mod json;
pub mod shp;

use std::path::Path;

use crate::CapaError;

/// Format déduit de l'extension du fichier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorFormat {
    /// ESRI Shapefile (.shp + .shx + .dbf + .prj)
    Shapefile,
    /// GeoJSON (.geojson, .json)
    GeoJson,
}

impl VectorFormat {
    /// Détermine le format depuis l'extension (insensible à la casse)
    pub fn from_path(path: &Path) -> Result<Self, CapaError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| {
                CapaError::UnsupportedFormat(format!("{} has no extension", path.display()))
            })?;

        match extension.as_str() {
            "shp" => Ok(Self::Shapefile),
            "geojson" | "json" => Ok(Self::GeoJson),
            _ => Err(CapaError::UnsupportedFormat(format!(
                "{} (use .shp, .geojson or .json)",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(
            VectorFormat::from_path(Path::new("predio.shp")).unwrap(),
            VectorFormat::Shapefile
        );
        assert_eq!(
            VectorFormat::from_path(Path::new("APTITUD.SHP")).unwrap(),
            VectorFormat::Shapefile
        );
        assert_eq!(
            VectorFormat::from_path(Path::new("zonas.geojson")).unwrap(),
            VectorFormat::GeoJson
        );
        assert!(VectorFormat::from_path(Path::new("zonas.gpkg")).is_err());
        assert!(VectorFormat::from_path(Path::new("sans_extension")).is_err());
    }
}
