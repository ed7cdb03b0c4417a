//! Arguments et commande de la CLI

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::analysis::{self, Outcome, RunPaths};
use crate::config::AnalysisConfig;

/// Arguments de l'analyse d'un predio
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to the parcel geometry file (.shp, .geojson)
    #[arg(long = "predio")]
    pub predio: PathBuf,

    /// Path to the suitability zones geometry file (.shp, .geojson)
    #[arg(long = "aptitudes")]
    pub aptitudes: PathBuf,

    /// Output path for the intersection geometry file (format from extension)
    #[arg(long = "output_shp")]
    pub output_shp: PathBuf,

    /// Output path for the rendered map image
    #[arg(long = "output_png")]
    pub output_png: PathBuf,

    /// Config preset name (tunja) or path to a JSON config
    #[arg(long, default_value = "tunja")]
    pub config: String,
}

impl AnalyzeArgs {
    pub fn run_paths(&self) -> RunPaths {
        RunPaths {
            parcel: self.predio.clone(),
            suitability: self.aptitudes.clone(),
            output_geometry: self.output_shp.clone(),
            output_image: self.output_png.clone(),
        }
    }
}

/// Lance l'analyse et affiche le résultat sur la console
pub fn cmd_analyze(args: &AnalyzeArgs) -> Result<()> {
    let config = AnalysisConfig::resolve(&args.config)?;
    info!(
        config = %args.config,
        category_field = %config.category_field,
        "Configuration chargée"
    );

    let paths = args.run_paths();
    match analysis::run(&paths, &config)? {
        Outcome::NotWithin => {
            println!("Parcel is not within the suitability region.");
        }
        Outcome::NoIntersection => {
            println!("No intersection found between the parcel and the suitability zones.");
        }
        Outcome::Completed(report) => report.display(&paths.output_image),
    }

    Ok(())
}
