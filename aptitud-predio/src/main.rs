//! Point d'entrée CLI pour aptitud-predio

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use aptitud_predio::cli::{self, AnalyzeArgs};

/// Valider un predio contre les zones d'aptitude et calculer les surfaces par catégorie
#[derive(Parser)]
#[command(name = "aptitud-predio")]
#[command(author, version)]
#[command(about = "Validate a land parcel against the suitability zones of Tunja")]
#[command(long_about = "Checks that a parcel lies within the suitability region, intersects it with the suitability zones, writes the result as a geometry file and a PNG map, and prints the suitable area per category.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    analyze: AnalyzeArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    info!(
        predio = %cli.analyze.predio.display(),
        aptitudes = %cli.analyze.aptitudes.display(),
        reproject = aptitud_predio::reproject::is_available(),
        "Analyse d'aptitude"
    );
    cli::cmd_analyze(&cli.analyze)?;

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // stdout reste réservé au rapport
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
