use crate::core::{
    constants::{
        DEFAULT_BORDER_WIDTH, DEFAULT_Z_INDEX, MARKER_IMAGE_SIZE, MARKER_POINTER_HEIGHT,
        SELECTED_BORDER_WIDTH, SELECTED_Z_INDEX,
    },
    geo::Coordinate,
    poi::Poi,
    viewport::Viewport,
};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// What fills the image region of a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayImage {
    /// The venue's own image
    Image { url: String },
    /// Single letter drawn when the venue has no image
    Placeholder { letter: char },
    /// Count badge of a cluster
    Badge { count: usize },
}

/// Border of the image box; selected markers get a thicker, raised border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderStyle {
    pub width: u32,
    pub elevated: bool,
}

/// Everything a rendering surface needs to draw one marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayVisual {
    pub image: OverlayImage,
    pub selected: bool,
    pub z_index: i32,
    pub border: BorderStyle,
    /// Full size of the visual in pixels, pointer included
    pub size: (u32, u32),
    /// Pixel inside the visual that sits on the coordinate
    pub anchor: (u32, u32),
    /// Attention animation on the selected roadview marker
    pub pulse: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayKind {
    Individual,
    Cluster,
}

/// Where an overlay was placed when it was last (re)built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RenderedAt {
    Map(Viewport),
    Panorama(Coordinate),
}

/// One marker placed on a surface. Owned by the engine or the roadview
/// bridge that created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// `None` for clusters
    pub poi_id: Option<String>,
    pub kind: OverlayKind,
    pub position: Coordinate,
    /// Ids of the clustered POIs, empty for individual overlays
    pub members: Vec<String>,
    pub visual: OverlayVisual,
    pub rendered_at: RenderedAt,
}

impl Overlay {
    pub fn individual(poi: &Poi, visual: OverlayVisual, rendered_at: RenderedAt) -> Self {
        Self {
            poi_id: Some(poi.id.clone()),
            kind: OverlayKind::Individual,
            position: poi.coordinate,
            members: Vec::new(),
            visual,
            rendered_at,
        }
    }

    pub fn cluster(
        position: Coordinate,
        members: Vec<String>,
        visual: OverlayVisual,
        rendered_at: RenderedAt,
    ) -> Self {
        Self {
            poi_id: None,
            kind: OverlayKind::Cluster,
            position,
            members,
            visual,
            rendered_at,
        }
    }

    pub fn is_cluster(&self) -> bool {
        self.kind == OverlayKind::Cluster
    }

    /// Same content on screen, ignoring when it was placed.
    pub fn same_content(&self, other: &Overlay) -> bool {
        self.poi_id == other.poi_id
            && self.kind == other.kind
            && self.position == other.position
            && self.members == other.members
            && self.visual == other.visual
    }
}

/// Pixel geometry of a venue marker: image box plus a pointer beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerGeometry {
    pub image_size: (u32, u32),
    pub pointer_height: u32,
}

impl Default for MarkerGeometry {
    fn default() -> Self {
        Self {
            image_size: MARKER_IMAGE_SIZE,
            pointer_height: MARKER_POINTER_HEIGHT,
        }
    }
}

impl MarkerGeometry {
    pub fn size(&self) -> (u32, u32) {
        (self.image_size.0, self.image_size.1 + self.pointer_height)
    }

    /// Bottom-center: the pointer tip, not the image center, marks the spot.
    pub fn anchor(&self) -> (u32, u32) {
        let (width, height) = self.size();
        (width / 2, height)
    }
}

/// Builds marker visuals. Pure and deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayFactory {
    geometry: MarkerGeometry,
}

impl OverlayFactory {
    pub fn new(geometry: MarkerGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> MarkerGeometry {
        self.geometry
    }

    /// Visual for `poi`, honouring its own `is_selected` flag.
    pub fn build(&self, poi: &Poi) -> Result<OverlayVisual> {
        self.build_with_selection(poi, poi.is_selected)
    }

    /// Visual for `poi` with an explicit selection state. Rejects sentinel
    /// and non-finite coordinates.
    pub fn build_with_selection(&self, poi: &Poi, selected: bool) -> Result<OverlayVisual> {
        if !poi.coordinate.is_finite() {
            return Err(MapError::MalformedPoi {
                id: poi.id.clone(),
                reason: "non-finite coordinate".to_string(),
            });
        }
        if poi.coordinate.is_sentinel() {
            return Err(MapError::MalformedPoi {
                id: poi.id.clone(),
                reason: "missing geocode (0, 0)".to_string(),
            });
        }

        let image = match &poi.image_ref {
            Some(url) if !url.trim().is_empty() => OverlayImage::Image { url: url.clone() },
            _ => OverlayImage::Placeholder {
                letter: placeholder_letter(&poi.label),
            },
        };

        let mut visual = OverlayVisual {
            image,
            selected: false,
            z_index: DEFAULT_Z_INDEX,
            border: BorderStyle {
                width: DEFAULT_BORDER_WIDTH,
                elevated: false,
            },
            size: self.geometry.size(),
            anchor: self.geometry.anchor(),
            pulse: false,
        };
        self.restyle(&mut visual, selected);
        Ok(visual)
    }

    /// Rewrites only the selection-dependent fields, in place.
    pub fn restyle(&self, visual: &mut OverlayVisual, selected: bool) {
        visual.selected = selected;
        if selected {
            visual.z_index = SELECTED_Z_INDEX;
            visual.border = BorderStyle {
                width: SELECTED_BORDER_WIDTH,
                elevated: true,
            };
        } else {
            visual.z_index = DEFAULT_Z_INDEX;
            visual.border = BorderStyle {
                width: DEFAULT_BORDER_WIDTH,
                elevated: false,
            };
            visual.pulse = false;
        }
    }

    /// Round count badge, centred on the cluster position.
    pub fn build_cluster(&self, count: usize, size_px: u32) -> OverlayVisual {
        OverlayVisual {
            image: OverlayImage::Badge { count },
            selected: false,
            z_index: DEFAULT_Z_INDEX,
            border: BorderStyle {
                width: DEFAULT_BORDER_WIDTH,
                elevated: false,
            },
            size: (size_px, size_px),
            anchor: (size_px / 2, size_px / 2),
            pulse: false,
        }
    }
}

fn placeholder_letter(label: &str) -> char {
    label
        .trim()
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('?')
}
