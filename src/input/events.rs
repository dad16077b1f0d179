use crate::core::viewport::Viewport;
use crate::rendering::surface::OverlayHandle;
use serde::{Deserialize, Serialize};

/// Events the rendering surface reports to the engine.
///
/// The surface's event bridge is the only writer of gesture state; it feeds
/// everything through [`MapEngine::handle_event`](crate::MapEngine::handle_event).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// The rendering backend finished initializing
    Ready,
    /// The viewport changed (emitted during and after gestures, and on
    /// programmatic recentre)
    ViewportChanged(Viewport),
    DragStart,
    DragEnd,
    ZoomStart,
    ZoomEnd,
    /// An individual marker or fallback cluster badge was clicked
    OverlayClick(OverlayHandle),
    /// A badge of the built-in clusterer was clicked
    ClusterClick { poi_ids: Vec<String> },
    /// A single item rendered by the built-in clusterer was clicked
    ClusterItemClick { poi_id: String },
}

impl SurfaceEvent {
    /// Gesture boundary events, as opposed to data and click events.
    pub fn is_gesture(&self) -> bool {
        matches!(
            self,
            SurfaceEvent::DragStart
                | SurfaceEvent::DragEnd
                | SurfaceEvent::ZoomStart
                | SurfaceEvent::ZoomEnd
        )
    }
}
