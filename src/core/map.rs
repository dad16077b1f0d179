use crate::{
    core::{config::EngineConfig, poi::Poi, viewport::Viewport},
    input::{
        events::SurfaceEvent,
        gestures::{GestureState, GestureTracker, Settle},
    },
    layers::{
        manager::{OverlayKey, OverlaySet},
        overlay::{Overlay, OverlayFactory, OverlayKind, RenderedAt},
    },
    prelude::{Arc, HashMap, HashSet},
    rendering::surface::{ClusterItem, OverlayHandle, OverlaySurface},
    spatial::{
        clustering::GridClusterer,
        policy::{ClusterPolicy, Partition},
    },
    MapError, Result,
};

/// Initialization state of the rendering backend, as seen by the engine.
///
/// Moves forward only; tearing the surface down is the host's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineLifecycle {
    Uninitialized,
    Initializing,
    Ready,
}

/// Counters describing the work the engine has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineMetrics {
    /// Full pipeline runs
    pub recomputes: u64,
    /// Recompute requests skipped because a gesture was in flight
    pub deferred: u64,
    pub overlays_created: u64,
    pub overlays_destroyed: u64,
    /// In-place updates (selection restyle or changed POI content)
    pub overlays_restyled: u64,
    pub cluster_registrations: u64,
    pub malformed_skipped: u64,
}

type PoiCallback = Box<dyn FnMut(&Poi)>;
type ViewportCallback = Box<dyn FnMut(&Viewport)>;

/// Stateful orchestrator of the overlays on one map surface.
///
/// Every input (`set_pois`, `set_viewport`, gesture end, backend ready)
/// funnels into the same recompute pipeline, which is skipped while a
/// gesture is in flight or the backend is not ready. Skipped runs are not
/// queued: the next opportunity runs once with the latest inputs.
pub struct MapEngine<S: OverlaySurface> {
    surface: S,
    policy: ClusterPolicy,
    factory: OverlayFactory,
    grid: GridClusterer,
    lifecycle: EngineLifecycle,
    gesture: GestureTracker,
    pois: Arc<[Poi]>,
    poi_index: HashMap<String, usize>,
    viewport: Option<Viewport>,
    selected: Option<String>,
    overlays: OverlaySet,
    /// Items last handed to the built-in clusterer
    registered: Option<Vec<ClusterItem>>,
    clusterer_unavailable: bool,
    /// Inputs changed since the last completed recompute
    dirty: bool,
    on_poi_click: Option<PoiCallback>,
    on_cluster_click: Option<PoiCallback>,
    on_viewport_settled: Option<ViewportCallback>,
    metrics: EngineMetrics,
}

impl<S: OverlaySurface> MapEngine<S> {
    /// An invalid `config` is replaced by the defaults, with a warning.
    pub fn new(config: &EngineConfig, surface: S) -> Self {
        let fallback;
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                log::warn!("{}; using the default engine config", err);
                fallback = EngineConfig::default();
                &fallback
            }
        };
        Self {
            surface,
            policy: ClusterPolicy::new(config.cluster_zoom_level),
            factory: OverlayFactory::default(),
            grid: GridClusterer::new(config.grid_cell_px, config.badge_size_tiers.clone()),
            lifecycle: EngineLifecycle::Uninitialized,
            gesture: GestureTracker::new(),
            pois: Arc::from(Vec::new()),
            poi_index: HashMap::default(),
            viewport: None,
            selected: None,
            overlays: OverlaySet::new(),
            registered: None,
            clusterer_unavailable: false,
            dirty: false,
            on_poi_click: None,
            on_cluster_click: None,
            on_viewport_settled: None,
            metrics: EngineMetrics::default(),
        }
    }

    pub fn with_factory(mut self, factory: OverlayFactory) -> Self {
        self.factory = factory;
        self
    }

    // --- host callbacks ----------------------------------------------------------------------

    pub fn on_poi_click(&mut self, callback: impl FnMut(&Poi) + 'static) {
        self.on_poi_click = Some(Box::new(callback));
    }

    /// Receives the representative (first) member of a clicked cluster.
    pub fn on_cluster_click(&mut self, callback: impl FnMut(&Poi) + 'static) {
        self.on_cluster_click = Some(Box::new(callback));
    }

    /// Fired only when a genuine user drag settles, never for zoom or
    /// programmatic recentre.
    pub fn on_viewport_settled(&mut self, callback: impl FnMut(&Viewport) + 'static) {
        self.on_viewport_settled = Some(Box::new(callback));
    }

    // --- lifecycle ---------------------------------------------------------------------------

    pub fn lifecycle(&self) -> EngineLifecycle {
        self.lifecycle
    }

    pub fn begin_initialization(&mut self) {
        if self.lifecycle == EngineLifecycle::Uninitialized {
            log::debug!("rendering surface initializing");
            self.lifecycle = EngineLifecycle::Initializing;
        }
    }

    /// Marks the backend ready and replays the inputs buffered so far.
    pub fn surface_ready(&mut self) {
        if self.lifecycle == EngineLifecycle::Ready {
            return;
        }
        log::info!("rendering surface ready");
        self.lifecycle = EngineLifecycle::Ready;
        if self.dirty {
            self.run_pipeline();
        }
    }

    // --- host inputs -------------------------------------------------------------------------

    /// Replaces the POI list. Only a new list (by identity) counts as a
    /// change; passing the same `Arc` again does nothing.
    pub fn set_pois(&mut self, pois: impl Into<Arc<[Poi]>>) {
        let pois = pois.into();
        if Arc::ptr_eq(&self.pois, &pois) {
            return;
        }

        self.poi_index = HashMap::default();
        for (idx, poi) in pois.iter().enumerate() {
            let slot = *self.poi_index.entry(poi.id.clone()).or_insert(idx);
            if slot != idx {
                log::warn!("duplicate POI id {} at index {}, keeping index {}", poi.id, idx, slot);
            }
        }
        if self.selected.is_none() {
            self.selected = pois.iter().find(|poi| poi.is_selected).map(|poi| poi.id.clone());
        }
        self.pois = pois;
        self.dirty = true;
        self.run_pipeline();
    }

    /// Moves the highlight to `poi_id`, restyling at most two overlays in
    /// place.
    pub fn set_selected(&mut self, poi_id: Option<&str>) {
        if self.selected.as_deref() == poi_id {
            return;
        }
        let previous = std::mem::replace(&mut self.selected, poi_id.map(str::to_string));
        if let Some(prev) = previous {
            self.restyle_selection(&prev, false);
        }
        if let Some(next) = poi_id {
            self.restyle_selection(next, true);
        }
    }

    /// Confirmed viewport from the surface bridge.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.dirty = true;
        self.run_pipeline();
    }

    /// Programmatic recentre. Never reported back through
    /// `on_viewport_settled`.
    pub fn recenter(&mut self, viewport: Viewport) {
        self.set_viewport(viewport);
    }

    // --- gestures ----------------------------------------------------------------------------

    pub fn start_drag(&mut self) {
        self.gesture.start_drag();
    }

    pub fn end_drag(&mut self) {
        let settle = self.gesture.end_drag();
        self.settled(settle);
    }

    pub fn start_zoom(&mut self) {
        self.gesture.start_zoom();
    }

    pub fn end_zoom(&mut self) {
        let settle = self.gesture.end_zoom();
        self.settled(settle);
    }

    fn settled(&mut self, settle: Option<Settle>) {
        let Some(cause) = settle else {
            return;
        };
        self.run_pipeline();

        if cause == Settle::UserDrag {
            if let (Some(callback), Some(viewport)) =
                (self.on_viewport_settled.as_mut(), self.viewport.as_ref())
            {
                callback(viewport);
            }
        }
    }

    /// Single entry point for the rendering surface's event bridge.
    pub fn handle_event(&mut self, event: SurfaceEvent) {
        if event.is_gesture() {
            log::trace!("{:?} while {:?}", event, self.gesture.state());
        }
        match event {
            SurfaceEvent::Ready => self.surface_ready(),
            SurfaceEvent::ViewportChanged(viewport) => self.set_viewport(viewport),
            SurfaceEvent::DragStart => self.start_drag(),
            SurfaceEvent::DragEnd => self.end_drag(),
            SurfaceEvent::ZoomStart => self.start_zoom(),
            SurfaceEvent::ZoomEnd => self.end_zoom(),
            SurfaceEvent::OverlayClick(handle) => self.overlay_clicked(handle),
            SurfaceEvent::ClusterClick { poi_ids } => {
                let representative = poi_ids.iter().find_map(|id| self.find_poi(id)).cloned();
                match (representative, self.on_cluster_click.as_mut()) {
                    (Some(poi), Some(callback)) => callback(&poi),
                    (None, _) => log::debug!("cluster click without known members"),
                    _ => {}
                }
            }
            SurfaceEvent::ClusterItemClick { poi_id } => self.poi_clicked(&poi_id),
        }
    }

    fn overlay_clicked(&mut self, handle: OverlayHandle) {
        let Some((_, live)) = self.overlays.by_handle(handle) else {
            log::debug!("click on unknown overlay {:?}", handle);
            return;
        };

        match live.overlay.kind {
            OverlayKind::Individual => {
                if let Some(id) = live.overlay.poi_id.clone() {
                    self.poi_clicked(&id);
                }
            }
            OverlayKind::Cluster => {
                let representative = live
                    .overlay
                    .members
                    .iter()
                    .find_map(|id| self.find_poi(id))
                    .cloned();
                if let (Some(poi), Some(callback)) = (representative, self.on_cluster_click.as_mut())
                {
                    callback(&poi);
                }
            }
        }
    }

    fn poi_clicked(&mut self, poi_id: &str) {
        let poi = self.find_poi(poi_id).cloned();
        match (poi, self.on_poi_click.as_mut()) {
            (Some(poi), Some(callback)) => callback(&poi),
            (None, _) => log::debug!("click on unknown POI {}", poi_id),
            _ => {}
        }
    }

    // --- read-only views ---------------------------------------------------------------------

    pub fn pois(&self) -> &Arc<[Poi]> {
        &self.pois
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gesture.state()
    }

    pub fn metrics(&self) -> EngineMetrics {
        self.metrics
    }

    /// Live overlays, bottom-to-top.
    pub fn overlays(&self) -> Vec<&Overlay> {
        self.overlays.render_order()
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn overlay_for(&self, poi_id: &str) -> Option<&Overlay> {
        self.overlays
            .get(&OverlayKey::poi(poi_id))
            .map(|live| &live.overlay)
    }

    pub fn handle_for(&self, poi_id: &str) -> Option<OverlayHandle> {
        self.overlays.get(&OverlayKey::poi(poi_id)).map(|live| live.handle)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn find_poi(&self, poi_id: &str) -> Option<&Poi> {
        self.poi_index.get(poi_id).map(|&idx| &self.pois[idx])
    }

    // --- pipeline ----------------------------------------------------------------------------

    fn run_pipeline(&mut self) {
        match self.recompute() {
            Ok(()) => {}
            Err(MapError::BackendNotReady) => {
                log::debug!("recompute buffered: surface is {:?}", self.lifecycle);
            }
            Err(err) => log::warn!("recompute failed: {}", err),
        }
    }

    fn recompute(&mut self) -> Result<()> {
        if self.lifecycle != EngineLifecycle::Ready {
            self.dirty = true;
            return Err(MapError::BackendNotReady);
        }
        if !self.gesture.is_settled() {
            self.dirty = true;
            self.metrics.deferred += 1;
            log::debug!("recompute deferred while {:?}", self.gesture.state());
            return Ok(());
        }
        let Some(viewport) = self.viewport else {
            log::debug!("recompute skipped: no viewport yet");
            return Ok(());
        };

        self.dirty = false;
        self.metrics.recomputes += 1;

        let mut partition = self.policy.partition(&self.pois, &viewport);
        self.drop_duplicate_ids(&mut partition.visible);
        if !partition.cluster_threshold {
            self.release_clusterer();
            let desired = self.individual_overlays(&partition.visible, &viewport);
            self.reconcile(desired);
            return Ok(());
        }

        if self.surface.has_clusterer() && !self.clusterer_unavailable {
            match self.delegate_clusters(&partition) {
                Err(MapError::ClustererUnavailable) => {
                    log::info!("surface clusterer unavailable, falling back to grid clustering");
                    self.clusterer_unavailable = true;
                }
                other => return other,
            }
        }

        self.release_clusterer();
        let desired = self.grid_overlays(&partition.visible, &viewport);
        self.reconcile(desired);
        Ok(())
    }

    /// Keeps only the first POI of every id in the list, the same one
    /// `find_poi` resolves to, even when that one is out of view.
    fn drop_duplicate_ids(&self, visible: &mut Vec<Poi>) {
        if self.poi_index.len() == self.pois.len() {
            return;
        }
        let mut seen = HashSet::default();
        visible.retain(|poi| {
            self.find_poi(&poi.id) == Some(poi) && seen.insert(poi.id.clone())
        });
    }

    fn individual_overlays(&mut self, visible: &[Poi], viewport: &Viewport) -> Vec<(OverlayKey, Overlay)> {
        visible
            .iter()
            .filter_map(|poi| {
                self.build_individual(poi, viewport)
                    .map(|overlay| (OverlayKey::poi(&poi.id), overlay))
            })
            .collect()
    }

    fn grid_overlays(&mut self, visible: &[Poi], viewport: &Viewport) -> Vec<(OverlayKey, Overlay)> {
        let cells = self.grid.cluster(visible, viewport.zoom_level);
        let mut desired = Vec::with_capacity(cells.len());

        for cell in cells {
            if cell.is_single() {
                let poi = cell.representative();
                if let Some(overlay) = self.build_individual(poi, viewport) {
                    desired.push((OverlayKey::poi(&poi.id), overlay));
                }
                continue;
            }
            let visual = self.factory.build_cluster(cell.count(), cell.size_px);
            let members = cell.members.iter().map(|poi| poi.id.clone()).collect();
            desired.push((
                OverlayKey::Cell(cell.cell.0, cell.cell.1),
                Overlay::cluster(cell.center, members, visual, RenderedAt::Map(*viewport)),
            ));
        }
        desired
    }

    /// `None` for a POI the factory rejects; such POIs are skipped, never
    /// fatal.
    fn build_individual(&mut self, poi: &Poi, viewport: &Viewport) -> Option<Overlay> {
        let selected = self.selected.as_deref() == Some(poi.id.as_str());
        match self.factory.build_with_selection(poi, selected) {
            Ok(visual) => Some(Overlay::individual(poi, visual, RenderedAt::Map(*viewport))),
            Err(err) => {
                self.metrics.malformed_skipped += 1;
                log::warn!("skipping overlay: {}", err);
                None
            }
        }
    }

    /// Diffs `desired` against the live set by key: detach what left,
    /// attach what arrived, update in place what changed.
    fn reconcile(&mut self, desired: Vec<(OverlayKey, Overlay)>) {
        let wanted: HashSet<&OverlayKey> = desired.iter().map(|(key, _)| key).collect();
        let stale: Vec<OverlayKey> = self
            .overlays
            .keys()
            .into_iter()
            .filter(|key| !wanted.contains(key))
            .collect();

        let (mut created, mut destroyed, mut updated) = (0u64, 0u64, 0u64);

        for key in stale {
            if let Some(live) = self.overlays.remove(&key) {
                self.surface.detach(live.handle);
                destroyed += 1;
            }
        }

        for (key, overlay) in desired {
            match self.overlays.get_mut(&key) {
                Some(live) => {
                    if live.overlay.same_content(&overlay) {
                        continue;
                    }
                    match self.surface.update(live.handle, &overlay) {
                        Ok(()) => {
                            live.overlay = overlay;
                            updated += 1;
                        }
                        Err(err) => log::warn!("failed to update overlay {:?}: {}", key, err),
                    }
                }
                None => match self.surface.attach(&overlay) {
                    Ok(handle) => {
                        self.overlays.insert(key, overlay, handle);
                        created += 1;
                    }
                    Err(err) => log::warn!("failed to attach overlay {:?}: {}", key, err),
                },
            }
        }

        self.metrics.overlays_created += created;
        self.metrics.overlays_destroyed += destroyed;
        self.metrics.overlays_restyled += updated;
        if created + destroyed + updated > 0 {
            log::debug!(
                "reconciled overlays: +{} -{} ~{} ({} live)",
                created,
                destroyed,
                updated,
                self.overlays.len()
            );
        }
    }

    /// Clears individual overlays and hands the visible set to the
    /// surface's clusterer, unless the very same items are registered
    /// already.
    fn delegate_clusters(&mut self, partition: &Partition) -> Result<()> {
        self.reconcile(Vec::new());

        if partition.is_empty_cluster() {
            self.release_clusterer();
            return Ok(());
        }

        let items: Vec<ClusterItem> = partition
            .visible
            .iter()
            .map(|poi| ClusterItem {
                poi_id: poi.id.clone(),
                position: poi.coordinate,
                label: poi.label.clone(),
            })
            .collect();
        if self.registered.as_ref() == Some(&items) {
            return Ok(());
        }

        if self.registered.take().is_some() {
            self.surface.clear_cluster_items();
        }
        self.surface.register_cluster_items(&items)?;
        log::debug!("registered {} items with the surface clusterer", items.len());
        self.metrics.cluster_registrations += 1;
        self.registered = Some(items);
        Ok(())
    }

    fn release_clusterer(&mut self) {
        if self.registered.take().is_some() {
            self.surface.clear_cluster_items();
        }
    }

    fn restyle_selection(&mut self, poi_id: &str, selected: bool) {
        let Some(live) = self.overlays.get_mut(&OverlayKey::poi(poi_id)) else {
            return;
        };
        self.factory.restyle(&mut live.overlay.visual, selected);
        match self.surface.update(live.handle, &live.overlay) {
            Ok(()) => self.metrics.overlays_restyled += 1,
            Err(err) => log::warn!("failed to restyle overlay of {}: {}", poi_id, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Coordinate;
    use crate::rendering::headless::HeadlessSurface;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ready_engine() -> MapEngine<HeadlessSurface> {
        let mut engine = MapEngine::new(&EngineConfig::default(), HeadlessSurface::new());
        engine.begin_initialization();
        engine.surface_ready();
        engine
    }

    fn viewport(zoom_level: i32) -> Viewport {
        Viewport::around(Coordinate::new(37.5, 127.0), zoom_level, 0.2, 0.2)
    }

    fn pois() -> Vec<Poi> {
        vec![
            Poi::new("a", Coordinate::new(37.51, 127.01), "Alpha"),
            Poi::new("b", Coordinate::new(37.49, 126.99), "Bravo"),
            Poi::new("far", Coordinate::new(35.1, 129.0), "Far"),
        ]
    }

    #[test]
    fn test_inputs_buffered_until_ready() {
        let mut engine = MapEngine::new(&EngineConfig::default(), HeadlessSurface::new());
        engine.set_pois(pois());
        engine.set_viewport(viewport(3));
        engine.begin_initialization();
        assert_eq!(engine.lifecycle(), EngineLifecycle::Initializing);
        assert_eq!(engine.overlay_count(), 0);
        assert_eq!(engine.surface().attach_calls, 0);

        engine.handle_event(SurfaceEvent::Ready);
        assert_eq!(engine.lifecycle(), EngineLifecycle::Ready);
        assert_eq!(engine.overlay_count(), 2);
        assert_eq!(engine.metrics().recomputes, 1);
    }

    #[test]
    fn test_same_list_is_not_a_change() {
        let mut engine = ready_engine();
        engine.set_viewport(viewport(3));
        let list: Arc<[Poi]> = Arc::from(pois());
        engine.set_pois(list.clone());
        let runs = engine.metrics().recomputes;
        engine.set_pois(list);
        assert_eq!(engine.metrics().recomputes, runs);
    }

    #[test]
    fn test_host_selection_flag_is_adopted() {
        let mut engine = ready_engine();
        engine.set_viewport(viewport(3));
        let mut list = pois();
        list[1].is_selected = true;
        engine.set_pois(list);
        assert_eq!(engine.selected(), Some("b"));
        assert_eq!(engine.overlay_for("b").unwrap().visual.z_index, 1000);
        assert_eq!(engine.overlay_for("a").unwrap().visual.z_index, 1);
    }

    #[test]
    fn test_moved_poi_updates_in_place() {
        let mut engine = ready_engine();
        engine.set_viewport(viewport(3));
        engine.set_pois(pois());
        let handle = engine.handle_for("a").unwrap();

        let mut moved = pois();
        moved[0].coordinate = Coordinate::new(37.52, 127.02);
        engine.set_pois(moved);

        assert_eq!(engine.handle_for("a"), Some(handle));
        assert_eq!(
            engine.overlay_for("a").unwrap().position,
            Coordinate::new(37.52, 127.02)
        );
        assert_eq!(engine.metrics().overlays_created, 2);
        assert_eq!(engine.metrics().overlays_restyled, 1);
    }

    #[test]
    fn test_attach_failure_is_not_fatal() {
        let mut surface = HeadlessSurface::new();
        surface.reject_poi("a");
        let mut engine = MapEngine::new(&EngineConfig::default(), surface);
        engine.surface_ready();
        engine.set_viewport(viewport(3));
        engine.set_pois(pois());
        assert!(engine.overlay_for("a").is_none());
        assert!(engine.overlay_for("b").is_some());
    }

    #[test]
    fn test_overlay_click_routes_to_host() {
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let mut engine = ready_engine();
        let sink = clicked.clone();
        engine.on_poi_click(move |poi| sink.borrow_mut().push(poi.id.clone()));
        engine.set_viewport(viewport(3));
        engine.set_pois(pois());

        let handle = engine.handle_for("b").unwrap();
        engine.handle_event(SurfaceEvent::OverlayClick(handle));
        engine.handle_event(SurfaceEvent::OverlayClick(OverlayHandle(9_999)));
        assert_eq!(*clicked.borrow(), vec!["b".to_string()]);
    }

    #[test]
    fn test_grid_cluster_click_reports_representative() {
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let mut engine = ready_engine();
        let sink = clicked.clone();
        engine.on_cluster_click(move |poi| sink.borrow_mut().push(poi.id.clone()));

        let list: Vec<Poi> = (0..12)
            .map(|i| Poi::new(format!("p{}", i), Coordinate::new(37.5 + i as f64 * 1e-5, 127.0), "x"))
            .collect();
        engine.set_viewport(viewport(8));
        engine.set_pois(list);

        let cluster = engine.overlays().into_iter().find(|o| o.is_cluster()).cloned().unwrap();
        assert_eq!(cluster.members.len(), 12);
        let handle = engine
            .surface()
            .attached()
            .find(|(_, o)| o.is_cluster())
            .map(|(h, _)| *h)
            .unwrap();
        engine.handle_event(SurfaceEvent::OverlayClick(handle));
        assert_eq!(*clicked.borrow(), vec!["p0".to_string()]);
    }

    #[test]
    fn test_duplicate_ids_keep_first_and_stay_idempotent() {
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let mut engine = ready_engine();
        let sink = clicked.clone();
        engine.on_poi_click(move |poi| sink.borrow_mut().push(poi.label.clone()));
        engine.set_viewport(viewport(3));
        engine.set_pois(vec![
            Poi::new("dup", Coordinate::new(37.51, 127.01), "First"),
            Poi::new("dup", Coordinate::new(37.49, 126.99), "Second"),
        ]);
        assert_eq!(engine.overlay_count(), 1);
        assert_eq!(
            engine.overlay_for("dup").unwrap().position,
            Coordinate::new(37.51, 127.01)
        );

        let updates = engine.surface().update_calls;
        engine.set_viewport(viewport(3));
        engine.set_viewport(viewport(3));
        assert_eq!(engine.surface().update_calls, updates);
        assert_eq!(engine.surface().attach_calls, 1);

        let handle = engine.handle_for("dup").unwrap();
        engine.handle_event(SurfaceEvent::OverlayClick(handle));
        assert_eq!(*clicked.borrow(), vec!["First".to_string()]);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let config = EngineConfig {
            grid_cell_px: 0.0,
            ..EngineConfig::default()
        };
        let mut engine = MapEngine::new(&config, HeadlessSurface::new());
        engine.surface_ready();

        let mut list: Vec<Poi> = (0..12)
            .map(|i| Poi::new(format!("p{}", i), Coordinate::new(37.5 + i as f64 * 1e-5, 127.0), "x"))
            .collect();
        list.push(Poi::new("lonely", Coordinate::new(37.58, 127.08), "Lonely"));
        engine.set_viewport(viewport(8));
        engine.set_pois(list);

        // A zero cell would have swallowed every POI into one badge
        assert_eq!(engine.overlay_count(), 2);
        assert!(engine.overlay_for("lonely").is_some());
    }
}
