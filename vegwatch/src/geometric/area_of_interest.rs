use geo::{Coord, LineString, Polygon};
use geojson::{Feature, Geometry, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::geo_core::{lon_lat, BoundingBox};

/// Geographic region submitted for analysis
#[derive(Debug, Clone, PartialEq)]
pub enum AreaOfInterest {
    /// Explicit polygon, points in `(longitude, latitude)` order
    Polygon { points: Vec<Coord<f64>> },
    /// Square of `size_meters` whose north-west corner is `top_left`
    PointAndSize {
        top_left: Coord<f64>,
        size_meters: u32,
    },
}

impl AreaOfInterest {
    /// WGS84 box covered by the area
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            AreaOfInterest::Polygon { points } => BoundingBox::from_coords(points),
            AreaOfInterest::PointAndSize {
                top_left,
                size_meters,
            } => Some(BoundingBox::square_from_top_left(*top_left, *size_meters)),
        }
    }

    /// Export the area as a GeoJSON feature.
    ///
    /// Point+size areas are exported as the square the service will cover,
    /// with the input point and size kept in the properties.
    pub fn to_geojson(&self) -> Feature {
        let mut properties = JsonObject::new();
        let polygon = match self {
            AreaOfInterest::Polygon { points } => {
                properties.insert("mode".to_string(), JsonValue::from("polygon"));
                Polygon::new(LineString::from(points.clone()), vec![])
            }
            AreaOfInterest::PointAndSize {
                top_left,
                size_meters,
            } => {
                properties.insert("mode".to_string(), JsonValue::from("point"));
                properties.insert(
                    "top_left_point".to_string(),
                    JsonValue::from(vec![top_left.x, top_left.y]),
                );
                properties.insert("field_size".to_string(), JsonValue::from(*size_meters));
                BoundingBox::square_from_top_left(*top_left, *size_meters)
                    .to_rect()
                    .to_polygon()
            }
        };

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::from(&polygon))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Which area-of-interest representation the hosting form offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Free polygon typed as JSON text
    #[default]
    Polygon,
    /// Reference point plus square field size
    Point,
}

/// Area-of-interest form fields
///
/// Holds the raw text of the fields; [`GeometryInput::validate`] turns it
/// into an [`AreaOfInterest`] without any side effect.
#[derive(Debug, Clone, Default)]
pub struct GeometryInput {
    mode: InputMode,
    /// When set, the size field is hidden and this value is always used
    fixed_field_size: Option<u32>,
    pub polygon: String,
    pub latitude: String,
    pub longitude: String,
    pub field_size: String,
}

impl GeometryInput {
    pub fn new(mode: InputMode, fixed_field_size: Option<u32>) -> Self {
        GeometryInput {
            mode,
            fixed_field_size,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn fixed_field_size(&self) -> Option<u32> {
        self.fixed_field_size
    }

    /// Validate the fields of the active mode
    pub fn validate(&self) -> Result<AreaOfInterest, ValidationError> {
        match self.mode {
            InputMode::Polygon => parse_polygon(&self.polygon),
            InputMode::Point => {
                let latitude = parse_coordinate("latitude", &self.latitude)?;
                let longitude = parse_coordinate("longitude", &self.longitude)?;
                let size_meters = match self.fixed_field_size {
                    Some(size) => size,
                    None => parse_size(&self.field_size)?,
                };

                Ok(AreaOfInterest::PointAndSize {
                    top_left: lon_lat(longitude, latitude),
                    size_meters,
                })
            }
        }
    }
}

/// Parse polygon text of the form `[[lon, lat], [lon, lat], ...]`.
///
/// Either every element is a pair of numbers or the whole text is rejected.
pub fn parse_polygon(text: &str) -> Result<AreaOfInterest, ValidationError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ValidationError::MalformedGeometry(format!("not valid JSON: {}", e)))?;

    let elements = value
        .as_array()
        .ok_or_else(|| ValidationError::MalformedGeometry("expected a JSON array".to_string()))?;

    if elements.is_empty() {
        return Err(ValidationError::MalformedGeometry(
            "polygon has no points".to_string(),
        ));
    }

    let points = elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            parse_pair(element).ok_or_else(|| {
                ValidationError::MalformedGeometry(format!(
                    "point {} is not a [longitude, latitude] pair: {}",
                    index, element
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AreaOfInterest::Polygon { points })
}

fn parse_pair(element: &Value) -> Option<Coord<f64>> {
    match element.as_array()?.as_slice() {
        [lon, lat] => Some(lon_lat(lon.as_f64()?, lat.as_f64()?)),
        _ => None,
    }
}

fn parse_coordinate(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::InvalidCoordinate {
            field,
            value: raw.to_string(),
        })
}

fn parse_size(raw: &str) -> Result<u32, ValidationError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|size| *size > 0)
        .ok_or_else(|| ValidationError::InvalidSize {
            value: raw.to_string(),
        })
}
