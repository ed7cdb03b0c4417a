//! # capa
//!
//! Lecture et écriture de couches vectorielles surfaciques avec leur système de coordonnées.
//!
//! ## Features
//!
//! - ESRI Shapefile (`.shp` + `.shx` + `.dbf` + `.prj`) via le crate `shapefile`
//! - GeoJSON (lecture `geojson`, écriture streaming `geozero`)
//! - Détection du code EPSG depuis le WKT des `.prj` (autorité ou nom ESRI)
//! - Types `geo` pour l'interopérabilité avec l'écosystème Rust géospatial
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//!
//! let zonas = capa::read(Path::new("aptitudes.shp"))?;
//! println!("CRS: {:?}", zonas.crs);
//! println!("{} zones, champs: {:?}", zonas.len(), zonas.fields);
//!
//! capa::write(&zonas, Path::new("copie.geojson"))?;
//! ```

pub mod crs;
pub mod error;
pub mod format;
pub mod types;

pub use crs::{Crs, CrsKind};
pub use error::CapaError;
pub use format::VectorFormat;
pub use types::{AttributeValue, Feature, FeatureCollection};

use std::path::Path;

/// Lit une couche vectorielle, le format étant déduit de l'extension.
///
/// # Errors
///
/// Retourne `CapaError` si le fichier est illisible, si son extension n'est pas
/// reconnue ou si une géométrie n'est pas surfacique.
pub fn read(path: &Path) -> Result<FeatureCollection, CapaError> {
    match VectorFormat::from_path(path)? {
        VectorFormat::Shapefile => format::shp::read(path),
        VectorFormat::GeoJson => format::json::read(path),
    }
}

/// Écrit une couche vectorielle, le format étant déduit de l'extension.
///
/// Le répertoire de destination doit exister.
pub fn write(collection: &FeatureCollection, path: &Path) -> Result<(), CapaError> {
    match VectorFormat::from_path(path)? {
        VectorFormat::Shapefile => format::shp::write(collection, path),
        VectorFormat::GeoJson => format::json::write(collection, path),
    }
}
