use anyhow::Result;
use std::sync::Arc;
use vegwatch::collect::client::SubmissionOutcome;
use vegwatch::collect::sentinel::sentinel_collect::HttpAnalysisService;
use vegwatch::config::AnalysisConfig;
use vegwatch::controller::AnalysisController;
use vegwatch::geometric::area_of_interest::InputMode;
use vegwatch::presenter::PresentationModel;

/// Example: vegetation percentages for a square field around a point
/// Requires the analysis service on http://localhost:8500 (or VEGWATCH_SERVICE_URL)
#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Example: EVI vegetation analysis for a 15 km field ===\n");

    let mut config = AnalysisConfig::default().with_env_overrides();
    config.form.input_mode = InputMode::Point;
    config.form.fixed_field_size = Some(15000);

    let service = HttpAnalysisService::new(&config.service)?;
    println!("Service endpoint: {}\n", service.endpoint());

    let mut controller = AnalysisController::new(service, &config)
        .with_sink(Arc::new(|model: &PresentationModel| print!("{}", model)));

    // Top-left corner of the field (Slovenia)
    controller.geometry_mut().latitude = "46.757161".to_string();
    controller.geometry_mut().longitude = "15.461282".to_string();
    controller.dates_mut().start = "2020-12-01".to_string();
    controller.dates_mut().end = "2020-12-31".to_string();

    if let Some(bbox) = controller.geometry().validate()?.bounding_box() {
        println!("Bounding box:");
        println!("  - Longitude: {:.6} to {:.6}", bbox.min_x, bbox.max_x);
        println!("  - Latitude: {:.6} to {:.6}\n", bbox.min_y, bbox.max_y);
    }

    match controller.submit().await? {
        SubmissionOutcome::Succeeded(result) => {
            println!("\nReceived a {} byte composite image", result.image.len());
        }
        SubmissionOutcome::Failed(failure) => {
            println!("\nAnalysis failed: {}", failure);
        }
        SubmissionOutcome::Superseded => {}
    }

    Ok(())
}
