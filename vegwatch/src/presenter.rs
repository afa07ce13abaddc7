//! Rendering of the request lifecycle.
//!
//! [`ResultPresenter::present`] is a pure function of the lifecycle state; the
//! loading indicator always takes precedence over any earlier result.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

use crate::collect::client::RequestLifecycleState;
use crate::collect::global_variables::DEFAULT_IMAGE_MEDIA_TYPE;
use crate::collect::response::{AnalysisResult, VegetationPercentages};

/// Token shown for a percentage the service did not provide
pub const MISSING_VALUE: &str = "N/A";

/// Notice shown when a submission failed
pub const FAILURE_NOTICE: &str = "The analysis could not be completed. Please try again.";

/// Format a share with exactly three decimals, or `N/A` when absent.
pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => MISSING_VALUE.to_string(),
    }
}

/// Raster prepared for display
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    /// `data:` URI embedding the raster with its media type
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PercentageRow {
    pub label: &'static str,
    pub value: String,
}

/// "Vegetation Percentages" panel
#[derive(Debug, Clone, PartialEq)]
pub struct PercentagePanel {
    pub rows: Vec<PercentageRow>,
}

impl PercentagePanel {
    pub fn from_percentages(percentages: &VegetationPercentages) -> Self {
        let rows = [
            ("No Vegetation", percentages.no_vegetation),
            ("Moderate Vegetation", percentages.moderate_vegetation),
            ("Dense Vegetation", percentages.dense_vegetation),
        ]
        .into_iter()
        .map(|(label, value)| PercentageRow {
            label,
            value: format_percentage(value),
        })
        .collect();

        PercentagePanel { rows }
    }
}

/// What the result area displays
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationModel {
    /// Never submitted
    Nothing,
    Loading,
    Results {
        /// `None` when the service sent an empty image
        image: Option<ImageAsset>,
        /// `None` when the service returned the image only
        percentages: Option<PercentagePanel>,
    },
    Failed {
        notice: &'static str,
    },
}

impl PresentationModel {
    pub fn shows_results(&self) -> bool {
        matches!(self, PresentationModel::Results { .. })
    }
}

impl fmt::Display for PresentationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentationModel::Nothing => Ok(()),
            PresentationModel::Loading => writeln!(f, "Loading..."),
            PresentationModel::Results { image, percentages } => {
                if let Some(image) = image {
                    writeln!(
                        f,
                        "Vegetation Analysis ({}, {} bytes)",
                        image.media_type,
                        image.bytes.len()
                    )?;
                }
                if let Some(panel) = percentages {
                    writeln!(f, "Vegetation Percentages")?;
                    for row in &panel.rows {
                        writeln!(f, "{}: {}", row.label, row.value)?;
                    }
                }
                Ok(())
            }
            PresentationModel::Failed { notice } => writeln!(f, "{}", notice),
        }
    }
}

/// Maps lifecycle states to presentation models
#[derive(Debug, Clone)]
pub struct ResultPresenter {
    media_type: String,
}

impl Default for ResultPresenter {
    fn default() -> Self {
        ResultPresenter::new(DEFAULT_IMAGE_MEDIA_TYPE)
    }
}

impl ResultPresenter {
    /// `media_type` is the declared encoding of the service raster
    pub fn new(media_type: impl Into<String>) -> Self {
        ResultPresenter {
            media_type: media_type.into(),
        }
    }

    pub fn present(&self, state: &RequestLifecycleState) -> PresentationModel {
        match state {
            RequestLifecycleState::Idle => PresentationModel::Nothing,
            RequestLifecycleState::Submitting => PresentationModel::Loading,
            RequestLifecycleState::Succeeded(result) => self.present_result(result),
            RequestLifecycleState::Failed(_) => PresentationModel::Failed {
                notice: FAILURE_NOTICE,
            },
        }
    }

    fn present_result(&self, result: &AnalysisResult) -> PresentationModel {
        let image = (!result.image.is_empty()).then(|| ImageAsset {
            media_type: self.media_type.clone(),
            bytes: result.image.clone(),
        });

        PresentationModel::Results {
            image,
            percentages: result
                .percentages
                .as_ref()
                .map(PercentagePanel::from_percentages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestFailure;
    use std::sync::Arc;

    fn succeeded(percentages: Option<VegetationPercentages>) -> RequestLifecycleState {
        RequestLifecycleState::Succeeded(Arc::new(AnalysisResult {
            image: vec![0x89, b'P', b'N', b'G'],
            percentages,
        }))
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(Some(0.2)), "0.200");
        assert_eq!(format_percentage(Some(12.34567)), "12.346");
        assert_eq!(format_percentage(Some(0.0)), "0.000");
        assert_eq!(format_percentage(None), "N/A");
        assert_ne!(format_percentage(Some(0.0)), format_percentage(None));
    }

    #[test]
    fn test_idle_shows_nothing() {
        let model = ResultPresenter::default().present(&RequestLifecycleState::Idle);
        assert_eq!(model, PresentationModel::Nothing);
        assert_eq!(model.to_string(), "");
    }

    #[test]
    fn test_loading_hides_results() {
        let model = ResultPresenter::default().present(&RequestLifecycleState::Submitting);
        assert_eq!(model, PresentationModel::Loading);
        assert!(!model.shows_results());
    }

    #[test]
    fn test_results_panel() {
        let model = ResultPresenter::default().present(&succeeded(Some(VegetationPercentages {
            no_vegetation: Some(0.2),
            moderate_vegetation: Some(0.5),
            dense_vegetation: Some(0.3),
        })));

        let text = model.to_string();
        assert!(text.contains("No Vegetation: 0.200"));
        assert!(text.contains("Moderate Vegetation: 0.500"));
        assert!(text.contains("Dense Vegetation: 0.300"));
    }

    #[test]
    fn test_missing_value_is_not_zero() {
        let model = ResultPresenter::default().present(&succeeded(Some(VegetationPercentages {
            no_vegetation: Some(0.0),
            moderate_vegetation: None,
            dense_vegetation: Some(1.0),
        })));

        match model {
            PresentationModel::Results {
                percentages: Some(panel),
                ..
            } => {
                assert_eq!(panel.rows[0].value, "0.000");
                assert_eq!(panel.rows[1].value, "N/A");
                assert_eq!(panel.rows[2].value, "1.000");
            }
            other => panic!("expected results, got {:?}", other),
        }
    }

    #[test]
    fn test_image_only_result() {
        let model = ResultPresenter::default().present(&succeeded(None));
        match &model {
            PresentationModel::Results {
                image: Some(image),
                percentages,
            } => {
                assert!(percentages.is_none());
                assert_eq!(image.data_uri(), "data:image/png;base64,iVBORw==");
            }
            other => panic!("expected results, got {:?}", other),
        }
        assert!(!model.to_string().contains("Vegetation Percentages"));
    }

    #[test]
    fn test_declared_media_type() {
        let model = ResultPresenter::new("image/jpeg").present(&succeeded(None));
        match model {
            PresentationModel::Results {
                image: Some(image), ..
            } => assert!(image.data_uri().starts_with("data:image/jpeg;base64,")),
            other => panic!("expected results, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_shows_notice_only() {
        let state = RequestLifecycleState::Failed(RequestFailure::Transport("refused".to_string()));
        let model = ResultPresenter::default().present(&state);
        assert_eq!(model, PresentationModel::Failed { notice: FAILURE_NOTICE });
        assert!(!model.shows_results());
        assert!(!model.to_string().contains("refused"));
    }

    #[test]
    fn test_empty_image_is_omitted() {
        let state = RequestLifecycleState::Succeeded(Arc::new(AnalysisResult {
            image: Vec::new(),
            percentages: Some(VegetationPercentages {
                no_vegetation: Some(0.2),
                moderate_vegetation: Some(0.5),
                dense_vegetation: Some(0.3),
            }),
        }));
        let model = ResultPresenter::default().present(&state);

        match &model {
            PresentationModel::Results { image, percentages } => {
                assert!(image.is_none());
                assert!(percentages.is_some());
            }
            other => panic!("expected results, got {:?}", other),
        }
        let text = model.to_string();
        assert!(!text.contains("Vegetation Analysis"), "{}", text);
        assert!(text.contains("No Vegetation: 0.200"), "{}", text);
    }
}
