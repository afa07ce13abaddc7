use geo::{Coord, Rect};

/// Approximate length of one degree of latitude, in meters.
/// The analysis service uses the same constant to derive its square area.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Build a WGS84 coordinate, x = longitude and y = latitude.
pub fn lon_lat(lon: f64, lat: f64) -> Coord<f64> {
    Coord { x: lon, y: lat }
}

/// Bounding box structure (WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64, // min longitude
    pub min_y: f64, // min latitude
    pub max_x: f64, // max longitude
    pub max_y: f64, // max latitude
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Envelope of a set of coordinates, `None` when the set is empty.
    pub fn from_coords(coords: &[Coord<f64>]) -> Option<Self> {
        let first = coords.first()?;
        let init = BoundingBox::new(first.x, first.y, first.x, first.y);
        Some(coords.iter().skip(1).fold(init, |bbox, c| {
            BoundingBox::new(
                bbox.min_x.min(c.x),
                bbox.min_y.min(c.y),
                bbox.max_x.max(c.x),
                bbox.max_y.max(c.y),
            )
        }))
    }

    /// Square of `size_meters` hanging east and south of `top_left`.
    ///
    /// Longitude span is widened by `1 / cos(lat)` so that the east-west
    /// side measures the same number of meters as the north-south side.
    pub fn square_from_top_left(top_left: Coord<f64>, size_meters: u32) -> Self {
        let span_deg = f64::from(size_meters) / METERS_PER_DEGREE;
        let east = top_left.x + span_deg / top_left.y.to_radians().cos();
        let south = top_left.y - span_deg;

        BoundingBox::new(top_left.x, south, east, top_left.y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Convert to a `geo::Rect`
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            lon_lat(self.min_x, self.min_y),
            lon_lat(self.max_x, self.max_y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let bbox: BoundingBox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(bbox.min_x, 0.0);
        assert_eq!(bbox.max_x, 1.0);
        assert_eq!(bbox.width(), 1.0);
    }

    #[test]
    fn test_from_coords() {
        let coords = vec![
            lon_lat(10.0, 45.0),
            lon_lat(10.1, 45.0),
            lon_lat(10.1, 45.1),
            lon_lat(10.0, 45.1),
        ];
        let bbox = BoundingBox::from_coords(&coords).unwrap();
        assert_eq!(bbox, BoundingBox::new(10.0, 45.0, 10.1, 45.1));
        assert!(BoundingBox::from_coords(&[]).is_none());
    }

    #[test]
    fn test_square_at_equator() {
        let bbox = BoundingBox::square_from_top_left(lon_lat(0.0, 0.0), 111_320);
        assert!((bbox.width() - 1.0).abs() < 1e-9);
        assert!((bbox.height() - 1.0).abs() < 1e-9);
        assert_eq!(bbox.max_y, 0.0);
        assert_eq!(bbox.min_x, 0.0);
    }

    #[test]
    fn test_square_widens_with_latitude() {
        let bbox = BoundingBox::square_from_top_left(lon_lat(10.0, 60.0), 15_000);
        // cos(60°) = 0.5, so the longitude span doubles
        assert!((bbox.width() - 2.0 * bbox.height()).abs() < 1e-9);
    }

    #[test]
    fn test_to_rect() {
        let rect = BoundingBox::new(1.0, 2.0, 3.0, 4.0).to_rect();
        assert_eq!(rect.min(), lon_lat(1.0, 2.0));
        assert_eq!(rect.max(), lon_lat(3.0, 4.0));
    }
}
