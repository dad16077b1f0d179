use crate::core::geo::Coordinate;
use serde::{Deserialize, Serialize};

/// A partner venue with display metadata. Owned by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    pub id: String,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub image_ref: Option<String>,
    pub label: String,
    #[serde(default)]
    pub is_selected: bool,
}

impl Poi {
    pub fn new(id: impl Into<String>, coordinate: Coordinate, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            coordinate,
            image_ref: None,
            label: label.into(),
            is_selected: false,
        }
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    pub fn selected(mut self, is_selected: bool) -> Self {
        self.is_selected = is_selected;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poi_from_store_json() {
        let json = r#"{
            "id": "store-17",
            "coordinate": { "lat": 37.55, "lng": 126.92 },
            "imageRef": "https://cdn.example.com/17.png",
            "label": "Hongdae Coffee"
        }"#;
        let poi: Poi = serde_json::from_str(json).unwrap();
        assert_eq!(poi.id, "store-17");
        assert_eq!(poi.image_ref.as_deref(), Some("https://cdn.example.com/17.png"));
        assert!(!poi.is_selected);
    }

    #[test]
    fn test_poi_builders() {
        let poi = Poi::new("a", Coordinate::new(1.0, 2.0), "Alpha")
            .with_image("img")
            .selected(true);
        assert!(poi.is_selected);
        assert_eq!(poi.image_ref.as_deref(), Some("img"));
    }
}
