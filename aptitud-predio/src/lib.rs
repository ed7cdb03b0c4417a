//! # aptitud-predio
//!
//! Validation d'un predio (parcelle) contre les zones d'aptitude d'une
//! région et calcul des surfaces aptes par catégorie.
//!
//! ## Features
//!
//! - Mise en cohérence des CRS (reprojection pure Rust, PROJ en option)
//! - Test d'inclusion frontière comprise sur l'union des zones
//! - Overlay predio × zones avec fusion des attributs
//! - Export Shapefile ou GeoJSON via `capa`
//! - Carte PNG par catégorie (viridis) et tableau des surfaces
//!
//! ## Usage CLI
//!
//! ```bash
//! aptitud-predio --predio predio.shp --aptitudes aptitudes_tunja.shp \
//!     --output_shp interseccion.shp --output_png mapa.png
//! ```
//!
//! ## Feature flags
//!
//! - `reproject` : reprojection via PROJ pour les CRS non couverts par `reproject_lite`

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod overlay;
pub mod reconcile;
pub mod render;
pub mod report;
pub mod reproject;
pub mod reproject_lite;

pub use analysis::{run, Outcome, RunPaths};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use report::{AreaReport, AreaRow};
