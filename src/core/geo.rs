use geo::HaversineDistance;
use serde::{Deserialize, Serialize};

/// A geographical coordinate in degrees.
///
/// `(0, 0)` is the upstream "no geocode" sentinel: a point there is never
/// rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True for the exact `(0, 0)` sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Finite and not the sentinel; the only coordinates allowed on screen.
    pub fn is_renderable(&self) -> bool {
        self.is_finite() && !self.is_sentinel()
    }

    /// Great-circle distance in meters (haversine).
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        self.to_point().haversine_distance(&other.to_point())
    }

    fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.lng, self.lat)
    }
}

/// Geographic bounding box of the live viewport.
///
/// A box with `west > east` crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl Bounds {
    pub fn new(south: f64, north: f64, west: f64, east: f64) -> Self {
        Self {
            south,
            north,
            west,
            east,
        }
    }

    /// Bounds spanning `lat_span` x `lng_span` degrees around `center`.
    pub fn around(center: Coordinate, lat_span: f64, lng_span: f64) -> Self {
        Self::new(
            center.lat - lat_span / 2.0,
            center.lat + lat_span / 2.0,
            center.lng - lng_span / 2.0,
            center.lng + lng_span / 2.0,
        )
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// Inclusive containment; NaN coordinates are never contained.
    pub fn contains(&self, point: &Coordinate) -> bool {
        if !(point.lat >= self.south && point.lat <= self.north) {
            return false;
        }
        if self.crosses_antimeridian() {
            point.lng >= self.west || point.lng <= self.east
        } else {
            point.lng >= self.west && point.lng <= self.east
        }
    }

    pub fn center(&self) -> Coordinate {
        let lat = (self.south + self.north) / 2.0;
        if self.crosses_antimeridian() {
            let lng = (self.west + self.east + 360.0) / 2.0;
            let lng = if lng > 180.0 { lng - 360.0 } else { lng };
            Coordinate::new(lat, lng)
        } else {
            Coordinate::new(lat, (self.west + self.east) / 2.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_detection() {
        assert!(Coordinate::new(0.0, 0.0).is_sentinel());
        assert!(!Coordinate::new(0.0, 127.0).is_sentinel());
        assert!(!Coordinate::new(0.0, 0.0).is_renderable());
        assert!(!Coordinate::new(f64::NAN, 127.0).is_renderable());
        assert!(Coordinate::new(37.5665, 126.978).is_renderable());
    }

    #[test]
    fn test_distance() {
        let city_hall = Coordinate::new(37.5665, 126.9780);
        let gangnam = Coordinate::new(37.4979, 127.0276);
        let distance = city_hall.distance_to(&gangnam);

        // Roughly 8.8 km apart
        assert!((distance - 8_800.0).abs() < 300.0);
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = Bounds::new(37.0, 38.0, 126.0, 127.5);
        assert!(bounds.contains(&Coordinate::new(37.5, 127.0)));
        assert!(bounds.contains(&Coordinate::new(37.0, 126.0)));
        assert!(!bounds.contains(&Coordinate::new(36.9, 127.0)));
        assert!(!bounds.contains(&Coordinate::new(37.5, 128.0)));
        assert!(!bounds.contains(&Coordinate::new(f64::NAN, 127.0)));
    }

    #[test]
    fn test_bounds_across_antimeridian() {
        let bounds = Bounds::new(-20.0, 20.0, 170.0, -170.0);
        assert!(bounds.crosses_antimeridian());
        assert!(bounds.contains(&Coordinate::new(0.0, 175.0)));
        assert!(bounds.contains(&Coordinate::new(0.0, -175.0)));
        assert!(!bounds.contains(&Coordinate::new(0.0, 0.0)));
        assert_eq!(bounds.center().lng, 180.0);
    }

    #[test]
    fn test_bounds_around() {
        let center = Coordinate::new(37.5, 127.0);
        let bounds = Bounds::around(center, 0.2, 0.4);
        assert!((bounds.south - 37.4).abs() < 1e-9);
        assert!((bounds.east - 127.2).abs() < 1e-9);
        let back = bounds.center();
        assert!((back.lat - center.lat).abs() < 1e-9);
        assert!((back.lng - center.lng).abs() < 1e-9);
    }
}
