use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use venuemap::prelude::*;

const CITY_HALL: Coordinate = Coordinate {
    lat: 37.5665,
    lng: 126.9780,
};
const GANGNAM: Coordinate = Coordinate {
    lat: 37.4979,
    lng: 127.0276,
};

fn venues() -> Vec<Poi> {
    vec![
        Poi::new("hall-cafe", Coordinate::new(37.5668, 126.9782), "Hall Cafe"),
        Poi::new("hall-books", Coordinate::new(37.5650, 126.9770), "Hall Books")
            .with_image("https://cdn.example.com/books.png"),
        Poi::new("gn-bar", Coordinate::new(37.4981, 127.0279), "GN Bar"),
        Poi::new("ungeocoded", Coordinate::new(0.0, 0.0), "Nowhere"),
    ]
}

fn bridge() -> RoadviewOverlayBridge<HeadlessSurface> {
    let config = EngineConfig::default();
    RoadviewOverlayBridge::new(
        OverlayFactory::default(),
        HeadlessSurface::new(),
        config.roadview_radius_meters,
    )
}

fn ids(bridge: &RoadviewOverlayBridge<HeadlessSurface>) -> Vec<String> {
    let mut ids: Vec<String> = bridge
        .overlays()
        .iter()
        .filter_map(|o| o.poi_id.clone())
        .collect();
    ids.sort();
    ids
}

/// Store that fails for one position.
struct FlakyStore {
    inner: InMemoryStore,
    broken_at: Coordinate,
}

#[async_trait]
impl NearbyStore for FlakyStore {
    async fn nearby(&self, at: Coordinate, radius_meters: f64) -> Result<Vec<NearbyPoi>> {
        if at == self.broken_at {
            return Err(MapError::Store("HTTP 502".to_string()));
        }
        self.inner.nearby(at, radius_meters).await
    }
}

/// Store whose response time depends on the position.
struct SlowAtCityHall {
    inner: InMemoryStore,
}

#[async_trait]
impl NearbyStore for SlowAtCityHall {
    async fn nearby(&self, at: Coordinate, radius_meters: f64) -> Result<Vec<NearbyPoi>> {
        if at == CITY_HALL {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        self.inner.nearby(at, radius_meters).await
    }
}

#[tokio::test]
async fn test_walking_between_neighbourhoods() {
    let store = InMemoryStore::new(venues());
    let mut bridge = bridge();

    let outcome = bridge.move_to(&store, CITY_HALL).await;
    assert_eq!(outcome, FetchOutcome::Applied { count: 2 });
    assert_eq!(ids(&bridge), vec!["hall-books", "hall-cafe"]);
    assert!(bridge
        .overlays()
        .iter()
        .all(|o| o.rendered_at == RenderedAt::Panorama(CITY_HALL)));

    let outcome = bridge.move_to(&store, GANGNAM).await;
    assert_eq!(outcome, FetchOutcome::Applied { count: 1 });
    assert_eq!(ids(&bridge), vec!["gn-bar"]);
    assert_eq!(bridge.surface().detach_calls, 2);
    assert_eq!(bridge.surface().attached_count(), 1);
}

#[tokio::test]
async fn test_out_of_order_responses_keep_latest_position() {
    let store = InMemoryStore::new(venues());
    let mut bridge = bridge();

    let first = bridge.set_position(CITY_HALL);
    let second = bridge.set_position(GANGNAM);
    let second_result = store.nearby(second.position, second.radius_meters).await;
    let first_result = store.nearby(first.position, first.radius_meters).await;

    // Second request answers first, first request answers last
    assert_eq!(
        bridge.apply_fetch(second, second_result),
        FetchOutcome::Applied { count: 1 }
    );
    assert_eq!(bridge.apply_fetch(first, first_result), FetchOutcome::Stale);
    assert_eq!(ids(&bridge), vec!["gn-bar"]);
    assert_eq!(bridge.position(), Some(GANGNAM));
}

#[tokio::test]
async fn test_failed_fetch_leaves_previous_markers() {
    let store = FlakyStore {
        inner: InMemoryStore::new(venues()),
        broken_at: GANGNAM,
    };
    let mut bridge = bridge();

    bridge.move_to(&store, CITY_HALL).await;
    let outcome = bridge.move_to(&store, GANGNAM).await;

    assert_eq!(outcome, FetchOutcome::Failed);
    assert_eq!(ids(&bridge), vec!["hall-books", "hall-cafe"]);
    assert_eq!(bridge.position(), Some(GANGNAM));
}

#[tokio::test]
async fn test_selection_pulses_nearest_marker_in_place() {
    let store = InMemoryStore::new(venues());
    let mut bridge = bridge();
    bridge.move_to(&store, CITY_HALL).await;
    let handle = bridge.handle_for("hall-cafe").unwrap();

    bridge.set_selected(Some("hall-cafe"));

    assert_eq!(bridge.handle_for("hall-cafe"), Some(handle));
    let drawn = bridge.surface().overlay(handle).unwrap();
    assert!(drawn.visual.pulse);
    assert_eq!(drawn.visual.z_index, SELECTED_Z_INDEX);

    // A re-fetch keeps the selection styling
    bridge.move_to(&store, CITY_HALL).await;
    assert!(bridge.overlay_for("hall-cafe").unwrap().visual.pulse);
    assert_eq!(bridge.surface().attach_calls, 2);
}

#[tokio::test]
async fn test_following_a_walk_applies_only_the_latest_stop() {
    let store = SlowAtCityHall {
        inner: InMemoryStore::new(venues()),
    };
    let mut bridge = bridge();
    let (tx, rx) = watch::channel(None);

    let walk = async move {
        tx.send(Some(CITY_HALL)).ok();
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(Some(GANGNAM)).ok();
        tokio::time::sleep(Duration::from_millis(50)).await;
    };

    let (applied, ()) = tokio::join!(follow_positions(&mut bridge, &store, rx), walk);

    assert_eq!(applied, 1);
    assert_eq!(ids(&bridge), vec!["gn-bar"]);
}
