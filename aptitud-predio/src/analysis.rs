//! Analyse d'aptitude d'un predio
//!
//! Enchaînement : chargement → mise en cohérence des CRS → test
//! d'inclusion → overlay → export géométrique → rendu → surfaces.
//! Les issues « hors région » et « sans intersection » ne sont pas des
//! erreurs : aucun fichier n'est écrit dans ces cas.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::overlay;
use crate::reconcile::reconcile;
use crate::render;
use crate::report::AreaReport;

/// Chemins d'entrée et de sortie d'une analyse
#[derive(Debug, Clone)]
pub struct RunPaths {
    /// Couche du predio
    pub parcel: PathBuf,
    /// Couche des zones d'aptitude
    pub suitability: PathBuf,
    /// Fichier géométrique de l'intersection
    pub output_geometry: PathBuf,
    /// Image de la carte
    pub output_image: PathBuf,
}

/// Issue d'une analyse
#[derive(Debug)]
pub enum Outcome {
    /// Le predio n'est pas inclus dans la région d'aptitude
    NotWithin,
    /// Aucun fragment de surface non nulle
    NoIntersection,
    /// Fichiers écrits, rapport des surfaces
    Completed(AreaReport),
}

/// Exécute l'analyse complète
pub fn run(paths: &RunPaths, config: &AnalysisConfig) -> Result<Outcome> {
    let zones = capa::read(&paths.suitability).context(format!(
        "Failed to load suitability zones: {}",
        paths.suitability.display()
    ))?;
    info!(
        path = %paths.suitability.display(),
        features = zones.len(),
        crs = ?zones.crs.as_ref().map(ToString::to_string),
        "Zones d'aptitude chargées"
    );

    let parcel = capa::read(&paths.parcel)
        .context(format!("Failed to load parcel: {}", paths.parcel.display()))?;
    info!(
        path = %paths.parcel.display(),
        features = parcel.len(),
        crs = ?parcel.crs.as_ref().map(ToString::to_string),
        "Predio chargé"
    );

    let parcel = reconcile(&parcel, zones.crs.as_ref())?;

    // Seul le premier enregistrement du predio est testé
    let Some(first) = parcel.features.first() else {
        return Err(AnalysisError::EmptyParcel.into());
    };
    if parcel.len() > 1 {
        debug!(
            ignored = parcel.len() - 1,
            "Enregistrements supplémentaires du predio ignorés par le test d'inclusion"
        );
    }

    let region = overlay::unify(&zones);
    if !overlay::is_within(&first.geometry, &region) {
        info!("Predio hors de la région d'aptitude");
        return Ok(Outcome::NotWithin);
    }

    let mut intersection = overlay::intersection(&parcel, &zones);
    if intersection.is_empty() {
        info!("Intersection vide");
        return Ok(Outcome::NoIntersection);
    }

    capa::write(&intersection, &paths.output_geometry).context(format!(
        "Failed to write intersection: {}",
        paths.output_geometry.display()
    ))?;
    info!(
        path = %paths.output_geometry.display(),
        features = intersection.len(),
        "Intersection exportée"
    );
    // Annoncé avant le rendu : le fichier reste sur disque si celui-ci échoue
    println!("{}", geometry_saved_line(&paths.output_geometry));

    render::render_map(
        &intersection,
        &config.category_field,
        &config.render,
        &paths.output_image,
    )
    .context(format!(
        "Failed to render map: {}",
        paths.output_image.display()
    ))?;

    overlay::annotate_area(&mut intersection, &config.area_field);
    if intersection.crs.as_ref().is_some_and(|crs| crs.is_geographic()) {
        warn!("CRS géographique : les surfaces sont exprimées en degrés carrés");
    }

    let report =
        AreaReport::from_collection(&intersection, &config.category_field, &config.area_field);
    info!(summary = %report.summary(), "Analyse terminée");

    Ok(Outcome::Completed(report))
}

/// Message console annonçant l'export géométrique
pub fn geometry_saved_line(path: &Path) -> String {
    format!("New geometry file saved to: {}", path.display())
}
