use crate::core::geo::{Bounds, Coordinate};
use serde::{Deserialize, Serialize};

/// Currently visible map region.
///
/// Written only by the rendering surface; the clustering pipeline reads it at
/// well-defined checkpoints (gesture end, programmatic recentre, POI change
/// while idle).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub center: Coordinate,
    /// Provider map level; larger is further zoomed out.
    pub zoom_level: i32,
    pub bounds: Bounds,
}

impl Viewport {
    pub fn new(center: Coordinate, zoom_level: i32, bounds: Bounds) -> Self {
        Self {
            center,
            zoom_level,
            bounds,
        }
    }

    /// Viewport centred on `center` whose bounds span the given degrees.
    pub fn around(center: Coordinate, zoom_level: i32, lat_span: f64, lng_span: f64) -> Self {
        Self::new(center, zoom_level, Bounds::around(center, lat_span, lng_span))
    }

    pub fn with_zoom_level(mut self, zoom_level: i32) -> Self {
        self.zoom_level = zoom_level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_around() {
        let center = Coordinate::new(37.5665, 126.978);
        let viewport = Viewport::around(center, 4, 0.1, 0.1);
        assert_eq!(viewport.zoom_level, 4);
        assert!(viewport.bounds.contains(&center));
        assert_eq!(viewport.with_zoom_level(7).zoom_level, 7);
    }

    #[test]
    fn test_viewport_json_shape() {
        let viewport = Viewport::around(Coordinate::new(37.5, 127.0), 3, 1.0, 1.0);
        let json = serde_json::to_value(viewport).unwrap();
        assert_eq!(json["zoomLevel"], 3);
        assert_eq!(json["bounds"]["south"], 37.0);
    }
}
