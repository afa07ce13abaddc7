use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use vegwatch::collect::client::SubmissionOutcome;
use vegwatch::collect::request::IndexChoice;
use vegwatch::collect::sentinel::sentinel_collect::HttpAnalysisService;
use vegwatch::config::AnalysisConfig;
use vegwatch::controller::AnalysisController;
use vegwatch::geometric::area_of_interest::InputMode;
use vegwatch::presenter::PresentationModel;

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Polygon,
    Point,
}

#[derive(Clone, Copy, ValueEnum)]
enum IndexArg {
    Evi,
    Ndvi,
}

/// Request a vegetation analysis over an area and a date range
#[derive(Parser)]
struct Cli {
    /// Configuration file (defaults to ./vegwatch.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Analysis service base URL, overrides the configuration
    #[arg(long)]
    url: Option<String>,

    /// Area-of-interest input mode, overrides the configuration
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Vegetation index, overrides the configuration
    #[arg(long, value_enum)]
    index: Option<IndexArg>,

    /// Start date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    start: String,

    /// End date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    end: String,

    /// Polygon as a JSON array of [lon, lat] pairs
    #[arg(long, default_value = "")]
    polygon: String,

    /// Latitude of the top-left point
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    lat: String,

    /// Longitude of the top-left point
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    lng: String,

    /// Field size in meters, ignored when the configuration fixes it
    #[arg(long, default_value = "")]
    size: String,

    /// Write the returned image to this file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print the area of interest as GeoJSON before submitting
    #[arg(long)]
    show_area: bool,
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?.with_env_overrides(),
        None => AnalysisConfig::load_default()?,
    };

    if let Some(url) = &cli.url {
        config.service.base_url = url.clone();
    }
    if let Some(mode) = cli.mode {
        config.form.input_mode = match mode {
            ModeArg::Polygon => InputMode::Polygon,
            ModeArg::Point => InputMode::Point,
        };
    }
    if let Some(index) = cli.index {
        config.form.index = match index {
            IndexArg::Evi => IndexChoice::Evi,
            IndexArg::Ndvi => IndexChoice::Ndvi,
        };
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(&cli).context("Failed to load configuration")?;
    let service = HttpAnalysisService::new(&config.service)?;

    let mut controller = AnalysisController::new(service, &config)
        .with_sink(Arc::new(|model: &PresentationModel| print!("{}", model)));

    let geometry = controller.geometry_mut();
    match geometry.mode() {
        InputMode::Polygon => geometry.polygon = cli.polygon.clone(),
        InputMode::Point => {
            geometry.latitude = cli.lat.clone();
            geometry.longitude = cli.lng.clone();
            match geometry.fixed_field_size() {
                Some(size) if !cli.size.is_empty() => {
                    warn!("Field size is fixed at {} m, ignoring --size", size)
                }
                Some(_) => {}
                None => geometry.field_size = cli.size.clone(),
            }
        }
    }

    let dates = controller.dates_mut();
    dates.start = cli.start.clone();
    dates.end = cli.end.clone();

    if cli.show_area {
        if let Ok(area) = controller.geometry().validate() {
            println!("{}", serde_json::to_string_pretty(&area.to_geojson())?);
            if let Some(bbox) = area.bounding_box() {
                println!("Extent: {:.6} x {:.6} degrees", bbox.width(), bbox.height());
            }
        }
    }

    match controller.submit().await {
        Err(err) => {
            eprintln!("Invalid input: {}", err);
            Ok(ExitCode::from(2))
        }
        Ok(SubmissionOutcome::Succeeded(result)) => {
            if let Some(path) = &cli.output {
                if result.image.is_empty() {
                    warn!("The service returned no image, nothing written");
                    return Ok(ExitCode::SUCCESS);
                }
                std::fs::write(path, &result.image)
                    .with_context(|| format!("Failed to write image to {}", path.display()))?;
                println!("Image written to {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(SubmissionOutcome::Failed(failure)) => {
            error!("{}", failure);
            Ok(ExitCode::FAILURE)
        }
        Ok(SubmissionOutcome::Superseded) => Ok(ExitCode::SUCCESS),
    }
}
