use crate::layers::overlay::Overlay;
use crate::prelude::{HashMap, HashSet};
use crate::rendering::surface::{ClusterItem, OverlayHandle, OverlaySurface};
use crate::{MapError, Result};

/// In-memory surface that records every call it receives.
///
/// Used by the simulator, by tests, and by hosts that want to run the engine
/// without a map SDK.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    clusterer: bool,
    next_handle: u64,
    attached: HashMap<OverlayHandle, Overlay>,
    rejected: HashSet<String>,
    pub attach_calls: usize,
    pub update_calls: usize,
    pub detach_calls: usize,
    pub cluster_clears: usize,
    /// Every batch handed to the built-in clusterer, oldest first
    pub registrations: Vec<Vec<ClusterItem>>,
    registered: Vec<ClusterItem>,
}

impl HeadlessSurface {
    /// Surface without a built-in clusterer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface with a built-in clusterer.
    pub fn with_clusterer() -> Self {
        Self {
            clusterer: true,
            ..Self::default()
        }
    }

    /// Makes `attach` fail for overlays of this POI.
    pub fn reject_poi(&mut self, poi_id: impl Into<String>) {
        self.rejected.insert(poi_id.into());
    }

    pub fn attached(&self) -> impl Iterator<Item = (&OverlayHandle, &Overlay)> {
        self.attached.iter()
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    pub fn overlay(&self, handle: OverlayHandle) -> Option<&Overlay> {
        self.attached.get(&handle)
    }

    /// Attached overlay of a POI, if any.
    pub fn overlay_for(&self, poi_id: &str) -> Option<(OverlayHandle, &Overlay)> {
        self.attached
            .iter()
            .find(|(_, overlay)| overlay.poi_id.as_deref() == Some(poi_id))
            .map(|(handle, overlay)| (*handle, overlay))
    }

    /// Items currently held by the built-in clusterer.
    pub fn registered(&self) -> &[ClusterItem] {
        &self.registered
    }
}

impl OverlaySurface for HeadlessSurface {
    fn attach(&mut self, overlay: &Overlay) -> Result<OverlayHandle> {
        self.attach_calls += 1;
        if let Some(id) = &overlay.poi_id {
            if self.rejected.contains(id) {
                return Err(MapError::Surface(format!("cannot attach overlay for {}", id)));
            }
        }
        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.attached.insert(handle, overlay.clone());
        Ok(handle)
    }

    fn update(&mut self, handle: OverlayHandle, overlay: &Overlay) -> Result<()> {
        self.update_calls += 1;
        match self.attached.get_mut(&handle) {
            Some(slot) => {
                *slot = overlay.clone();
                Ok(())
            }
            None => Err(MapError::Surface(format!("unknown overlay {:?}", handle))),
        }
    }

    fn detach(&mut self, handle: OverlayHandle) {
        self.detach_calls += 1;
        self.attached.remove(&handle);
    }

    fn has_clusterer(&self) -> bool {
        self.clusterer
    }

    fn register_cluster_items(&mut self, items: &[ClusterItem]) -> Result<()> {
        if !self.clusterer {
            return Err(MapError::ClustererUnavailable);
        }
        self.registrations.push(items.to_vec());
        self.registered.extend_from_slice(items);
        Ok(())
    }

    fn clear_cluster_items(&mut self) {
        self.cluster_clears += 1;
        self.registered.clear();
    }
}
