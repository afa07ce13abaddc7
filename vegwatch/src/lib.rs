//! Vegetation analysis client.
//!
//! Collects an area of interest and a date range, submits them to the remote
//! Sentinel-2 analysis service and renders the returned composite image with
//! its vegetation coverage breakdown.
//!
//! ```no_run
//! use std::sync::Arc;
//! use vegwatch::collect::sentinel::sentinel_collect::HttpAnalysisService;
//! use vegwatch::config::AnalysisConfig;
//! use vegwatch::controller::AnalysisController;
//! use vegwatch::presenter::PresentationModel;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = AnalysisConfig::load_default()?;
//! let service = HttpAnalysisService::new(&config.service)?;
//! let mut controller = AnalysisController::new(service, &config)
//!     .with_sink(Arc::new(|model: &PresentationModel| print!("{}", model)));
//!
//! controller.geometry_mut().polygon = "[[10.0,45.0],[10.1,45.0],[10.1,45.1]]".to_string();
//! controller.dates_mut().start = "2024-06-01".to_string();
//! controller.dates_mut().end = "2024-06-30".to_string();
//! controller.submit().await?;
//! # Ok(())
//! # }
//! ```

pub mod collect;
pub mod commons;
pub mod config;
pub mod controller;
pub mod error;
pub mod geo_core;
pub mod geometric;
pub mod presenter;
