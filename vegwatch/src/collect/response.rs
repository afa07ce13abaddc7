use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::RequestFailure;

/// Share of the analysed area per vegetation class.
///
/// A value is `None` when the service did not provide it, which is not
/// the same as a zero share.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VegetationPercentages {
    #[serde(default)]
    pub no_vegetation: Option<f64>,
    #[serde(default)]
    pub moderate_vegetation: Option<f64>,
    #[serde(default)]
    pub dense_vegetation: Option<f64>,
}

/// Successful analysis returned by the service
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Decoded composite raster
    pub image: Vec<u8>,
    /// Absent when the service answered with the image only
    pub percentages: Option<VegetationPercentages>,
}

/// Raw JSON shape of the service answer
#[derive(Debug, Deserialize)]
struct ResponseBody {
    image: String,
    #[serde(default)]
    percentage_of_evi: Option<VegetationPercentages>,
    #[serde(default)]
    percentage_of_ndvi: Option<VegetationPercentages>,
}

/// Error payload emitted by the service on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Parse a success body.
///
/// Percentages are read from `percentage_of_evi`, falling back to
/// `percentage_of_ndvi` when the first key is absent.
pub fn parse_success_body(body: &[u8]) -> Result<AnalysisResult, RequestFailure> {
    let parsed: ResponseBody = serde_json::from_slice(body)
        .map_err(|e| RequestFailure::MalformedBody(e.to_string()))?;

    let image = STANDARD
        .decode(parsed.image.trim())
        .map_err(|e| RequestFailure::InvalidImage(e.to_string()))?;

    Ok(AnalysisResult {
        image,
        percentages: parsed.percentage_of_evi.or(parsed.percentage_of_ndvi),
    })
}

/// Build the failure for a non-success status, keeping whatever
/// diagnostic the body carries.
pub fn status_failure(status: u16, body: &[u8]) -> RequestFailure {
    let message = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody {
            error,
            message: Some(message),
        }) => match error {
            Some(error) => format!("{}: {}", error, message),
            None => message,
        },
        Ok(ErrorBody {
            error: Some(error),
            message: None,
        }) => match error {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        },
        _ => String::from_utf8_lossy(body).trim().to_string(),
    };

    RequestFailure::Status { status, message }
}
