use crate::core::geo::Coordinate;
use crate::layers::overlay::Overlay;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Opaque id of an overlay attached to a surface, issued by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayHandle(pub u64);

/// One POI handed to a surface's built-in clusterer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterItem {
    pub poi_id: String,
    pub position: Coordinate,
    pub label: String,
}

/// Rendering backend the engine draws on: a map SDK, a panorama viewer, or
/// [`HeadlessSurface`](crate::rendering::headless::HeadlessSurface).
///
/// Implementations only draw what they are told; the engine owns the
/// decision of what is on screen.
pub trait OverlaySurface {
    /// Places a new overlay and returns its handle.
    fn attach(&mut self, overlay: &Overlay) -> Result<OverlayHandle>;

    /// Mutates an attached overlay in place (style, z-order, position).
    fn update(&mut self, handle: OverlayHandle, overlay: &Overlay) -> Result<()>;

    /// Removes an attached overlay. Unknown handles are ignored.
    fn detach(&mut self, handle: OverlayHandle);

    /// Whether [`register_cluster_items`](Self::register_cluster_items) is
    /// backed by a built-in clusterer.
    fn has_clusterer(&self) -> bool {
        false
    }

    /// Hands the whole visible set to the built-in clusterer, which does its
    /// own grouping and badge sizing.
    fn register_cluster_items(&mut self, _items: &[ClusterItem]) -> Result<()> {
        Err(MapError::ClustererUnavailable)
    }

    /// Drops everything registered with the built-in clusterer.
    fn clear_cluster_items(&mut self) {}
}

impl<S: OverlaySurface + ?Sized> OverlaySurface for Box<S> {
    fn attach(&mut self, overlay: &Overlay) -> Result<OverlayHandle> {
        (**self).attach(overlay)
    }

    fn update(&mut self, handle: OverlayHandle, overlay: &Overlay) -> Result<()> {
        (**self).update(handle, overlay)
    }

    fn detach(&mut self, handle: OverlayHandle) {
        (**self).detach(handle)
    }

    fn has_clusterer(&self) -> bool {
        (**self).has_clusterer()
    }

    fn register_cluster_items(&mut self, items: &[ClusterItem]) -> Result<()> {
        (**self).register_cluster_items(items)
    }

    fn clear_cluster_items(&mut self) {
        (**self).clear_cluster_items()
    }
}
