use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::commons::date_range::DateRange;
use crate::geometric::area_of_interest::AreaOfInterest;

/// Vegetation index the service computes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexChoice {
    /// Enhanced Vegetation Index
    #[default]
    Evi,
    /// Normalized Difference Vegetation Index
    Ndvi,
}

impl IndexChoice {
    /// Query flag selecting this index on the service
    pub fn query_param(&self) -> (&'static str, &'static str) {
        match self {
            IndexChoice::Evi => ("evi", "true"),
            IndexChoice::Ndvi => ("ndvi", "true"),
        }
    }
}

/// Validated analysis request, created fresh on each submission
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub date_range: DateRange,
    pub area_of_interest: AreaOfInterest,
    pub index_choice: IndexChoice,
}

impl AnalysisRequest {
    /// JSON body sent to the service
    pub fn body(&self) -> RequestBody {
        let area = match &self.area_of_interest {
            AreaOfInterest::Polygon { points } => AreaBody::Polygon {
                polygon: points.iter().map(|c| [c.x, c.y]).collect(),
            },
            AreaOfInterest::PointAndSize {
                top_left,
                size_meters,
            } => AreaBody::Point {
                top_left_point: [top_left.x, top_left.y],
                field_size: *size_meters,
            },
        };

        RequestBody {
            start_date: self.date_range.start,
            end_date: self.date_range.end,
            area,
        }
    }
}

/// Wire shape of the request body.
///
/// Exactly one of `polygon` or `top_left_point` + `field_size` is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(flatten)]
    pub area: AreaBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AreaBody {
    Polygon {
        polygon: Vec<[f64; 2]>,
    },
    Point {
        top_left_point: [f64; 2],
        field_size: u32,
    },
}

/// Assembles an [`AnalysisRequest`] from already validated inputs
pub struct RequestBuilder;

impl RequestBuilder {
    pub fn build(
        area_of_interest: AreaOfInterest,
        date_range: DateRange,
        index_choice: IndexChoice,
    ) -> AnalysisRequest {
        AnalysisRequest {
            date_range,
            area_of_interest,
            index_choice,
        }
    }
}
