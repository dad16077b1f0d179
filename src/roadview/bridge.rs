use crate::{
    core::{geo::Coordinate, poi::Poi},
    layers::{
        manager::{OverlayKey, OverlaySet},
        overlay::{Overlay, OverlayFactory, RenderedAt},
    },
    prelude::{HashMap, HashSet},
    rendering::surface::{OverlayHandle, OverlaySurface},
    roadview::store::{NearbyPoi, NearbyStore},
    MapError, Result,
};

/// Identifies one nearby-venue fetch issued for a panorama position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchTicket {
    pub token: u64,
    pub position: Coordinate,
    pub radius_meters: f64,
}

/// What happened to a fetch result handed to [`RoadviewOverlayBridge::apply_fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Overlays now reflect this fetch; `count` live overlays
    Applied { count: usize },
    /// The panorama moved on before the fetch resolved; result dropped
    Stale,
    /// The fetch failed; the previous overlays stay on screen
    Failed,
}

type PoiCallback = Box<dyn FnMut(&Poi)>;

/// Projects venues into a panorama around the current panorama position.
///
/// Every position change issues a new fetch; only the result of the latest
/// one is ever applied.
pub struct RoadviewOverlayBridge<S: OverlaySurface> {
    factory: OverlayFactory,
    surface: S,
    radius_meters: f64,
    position: Option<Coordinate>,
    token: u64,
    overlays: OverlaySet,
    pois: HashMap<String, Poi>,
    selected: Option<String>,
    on_poi_click: Option<PoiCallback>,
}

impl<S: OverlaySurface> RoadviewOverlayBridge<S> {
    pub fn new(factory: OverlayFactory, surface: S, radius_meters: f64) -> Self {
        Self {
            factory,
            surface,
            radius_meters,
            position: None,
            token: 0,
            overlays: OverlaySet::new(),
            pois: HashMap::default(),
            selected: None,
            on_poi_click: None,
        }
    }

    pub fn on_poi_click(&mut self, callback: impl FnMut(&Poi) + 'static) {
        self.on_poi_click = Some(Box::new(callback));
    }

    pub fn position(&self) -> Option<Coordinate> {
        self.position
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn overlays(&self) -> Vec<&Overlay> {
        self.overlays.render_order()
    }

    pub fn overlay_for(&self, poi_id: &str) -> Option<&Overlay> {
        self.overlays
            .get(&OverlayKey::poi(poi_id))
            .map(|live| &live.overlay)
    }

    pub fn handle_for(&self, poi_id: &str) -> Option<OverlayHandle> {
        self.overlays.get(&OverlayKey::poi(poi_id)).map(|live| live.handle)
    }

    /// Pure projection: renderable POIs within `radius_meters` of `position`,
    /// nearest first.
    pub fn project_overlays(
        &self,
        pois: &[Poi],
        position: Coordinate,
        radius_meters: f64,
    ) -> Vec<Overlay> {
        let mut in_range: Vec<(f64, &Poi)> = pois
            .iter()
            .filter(|poi| poi.coordinate.is_renderable())
            .map(|poi| (position.distance_to(&poi.coordinate), poi))
            .filter(|(distance, _)| *distance <= radius_meters)
            .collect();
        in_range.sort_by(|a, b| a.0.total_cmp(&b.0));

        in_range
            .into_iter()
            .filter_map(|(_, poi)| {
                let selected = self.selected.as_deref() == Some(poi.id.as_str());
                let mut visual = self.factory.build_with_selection(poi, selected).ok()?;
                visual.pulse = selected;
                Some(Overlay::individual(poi, visual, RenderedAt::Panorama(position)))
            })
            .collect()
    }

    /// Records a new panorama position and returns the ticket its fetch must
    /// present. Earlier tickets become stale.
    pub fn set_position(&mut self, position: Coordinate) -> FetchTicket {
        self.token += 1;
        self.position = Some(position);
        FetchTicket {
            token: self.token,
            position,
            radius_meters: self.radius_meters,
        }
    }

    /// Applies a fetch result if its ticket is still current.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<NearbyPoi>>,
    ) -> FetchOutcome {
        if ticket.token != self.token {
            let err = MapError::StaleFetchDiscarded {
                token: ticket.token,
            };
            log::debug!("{}", err);
            return FetchOutcome::Stale;
        }

        let hits = match result {
            Ok(hits) => hits,
            Err(err) => {
                log::warn!(
                    "nearby fetch at {:?} failed, keeping {} overlays: {}",
                    ticket.position,
                    self.overlays.len(),
                    err
                );
                return FetchOutcome::Failed;
            }
        };

        let mut seen = HashSet::default();
        let pois: Vec<Poi> = hits
            .into_iter()
            .map(|hit| hit.poi)
            .filter(|poi| {
                let first = seen.insert(poi.id.clone());
                if !first {
                    log::warn!("duplicate POI id {} in nearby response, keeping the first", poi.id);
                }
                first
            })
            .collect();
        let projected = self.project_overlays(&pois, ticket.position, ticket.radius_meters);
        self.pois = pois.into_iter().map(|poi| (poi.id.clone(), poi)).collect();
        self.reconcile(projected);
        FetchOutcome::Applied {
            count: self.overlays.len(),
        }
    }

    /// Moves the panorama and refreshes the overlays from `store`.
    pub async fn move_to<St>(&mut self, store: &St, position: Coordinate) -> FetchOutcome
    where
        St: NearbyStore + ?Sized,
    {
        let ticket = self.set_position(position);
        let result = store.nearby(ticket.position, ticket.radius_meters).await;
        self.apply_fetch(ticket, result)
    }

    /// Moves the highlight by mutating the two affected overlays in place,
    /// so a running pulse animation is never interrupted by a rebuild.
    pub fn set_selected(&mut self, poi_id: Option<&str>) {
        if self.selected.as_deref() == poi_id {
            return;
        }
        let previous = std::mem::replace(&mut self.selected, poi_id.map(str::to_string));
        if let Some(prev) = previous {
            self.restyle(&prev, false);
        }
        if let Some(next) = poi_id {
            self.restyle(next, true);
        }
    }

    pub fn handle_click(&mut self, poi_id: &str) {
        match (self.pois.get(poi_id), self.on_poi_click.as_mut()) {
            (Some(poi), Some(callback)) => callback(poi),
            (None, _) => log::debug!("roadview click on unknown POI {}", poi_id),
            _ => {}
        }
    }

    pub fn handle_overlay_click(&mut self, handle: OverlayHandle) {
        let poi_id = self
            .overlays
            .by_handle(handle)
            .and_then(|(_, live)| live.overlay.poi_id.clone());
        if let Some(id) = poi_id {
            self.handle_click(&id);
        }
    }

    fn restyle(&mut self, poi_id: &str, selected: bool) {
        let Some(live) = self.overlays.get_mut(&OverlayKey::poi(poi_id)) else {
            return;
        };
        self.factory.restyle(&mut live.overlay.visual, selected);
        live.overlay.visual.pulse = selected;
        if let Err(err) = self.surface.update(live.handle, &live.overlay) {
            log::warn!("failed to restyle roadview overlay of {}: {}", poi_id, err);
        }
    }

    fn reconcile(&mut self, projected: Vec<Overlay>) {
        let wanted: HashSet<String> = projected
            .iter()
            .filter_map(|overlay| overlay.poi_id.clone())
            .collect();

        for key in self.overlays.keys() {
            let keep = matches!(&key, OverlayKey::Poi(id) if wanted.contains(id));
            if !keep {
                if let Some(live) = self.overlays.remove(&key) {
                    self.surface.detach(live.handle);
                }
            }
        }

        for overlay in projected {
            let Some(id) = overlay.poi_id.clone() else {
                continue;
            };
            let key = OverlayKey::Poi(id);
            match self.overlays.get_mut(&key) {
                Some(live) => {
                    if live.overlay.same_content(&overlay) {
                        continue;
                    }
                    match self.surface.update(live.handle, &overlay) {
                        Ok(()) => live.overlay = overlay,
                        Err(err) => log::warn!("failed to update roadview overlay: {}", err),
                    }
                }
                None => match self.surface.attach(&overlay) {
                    Ok(handle) => {
                        self.overlays.insert(key, overlay, handle);
                    }
                    Err(err) => log::warn!("failed to attach roadview overlay: {}", err),
                },
            }
        }
    }
}
