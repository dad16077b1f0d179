use crate::layers::overlay::Overlay;
use crate::prelude::HashMap;
use crate::rendering::surface::OverlayHandle;

/// Identity of a live overlay across recomputes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OverlayKey {
    /// Individual marker of one POI
    Poi(String),
    /// Fallback cluster badge of one grid cell
    Cell(i64, i64),
}

impl OverlayKey {
    pub fn poi(id: &str) -> Self {
        OverlayKey::Poi(id.to_string())
    }
}

/// An overlay together with the surface handle it was attached under.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveOverlay {
    pub overlay: Overlay,
    pub handle: OverlayHandle,
}

/// Keyed store of the overlays currently attached to a surface.
///
/// Lookups by key and by surface handle are O(1), so a single marker can be
/// restyled without walking the set.
#[derive(Debug, Default)]
pub struct OverlaySet {
    entries: HashMap<OverlayKey, LiveOverlay>,
    by_handle: HashMap<OverlayHandle, OverlayKey>,
}

impl OverlaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an attached overlay, returning the entry it replaced.
    pub fn insert(
        &mut self,
        key: OverlayKey,
        overlay: Overlay,
        handle: OverlayHandle,
    ) -> Option<LiveOverlay> {
        let previous = self.entries.insert(key.clone(), LiveOverlay { overlay, handle });
        if let Some(prev) = &previous {
            self.by_handle.remove(&prev.handle);
        }
        self.by_handle.insert(handle, key);
        previous
    }

    pub fn remove(&mut self, key: &OverlayKey) -> Option<LiveOverlay> {
        let removed = self.entries.remove(key)?;
        self.by_handle.remove(&removed.handle);
        Some(removed)
    }

    pub fn get(&self, key: &OverlayKey) -> Option<&LiveOverlay> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &OverlayKey) -> Option<&mut LiveOverlay> {
        self.entries.get_mut(key)
    }

    /// Resolves a surface handle back to its entry.
    pub fn by_handle(&self, handle: OverlayHandle) -> Option<(&OverlayKey, &LiveOverlay)> {
        let key = self.by_handle.get(&handle)?;
        self.entries.get(key).map(|live| (key, live))
    }

    pub fn keys(&self) -> Vec<OverlayKey> {
        self.entries.keys().cloned().collect()
    }

    /// Overlays sorted bottom-to-top: by z-index, then by key.
    pub fn render_order(&self) -> Vec<&Overlay> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|(ka, a), (kb, b)| {
            a.overlay
                .visual
                .z_index
                .cmp(&b.overlay.visual.z_index)
                .then_with(|| ka.cmp(kb))
        });
        entries.into_iter().map(|(_, live)| &live.overlay).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
