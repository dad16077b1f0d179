use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;
use venuemap::prelude::*;

const SEOUL_CITY_HALL: Coordinate = Coordinate {
    lat: 37.5665,
    lng: 126.9780,
};

/// Replays a scripted map session against a headless surface and logs what
/// the engine did.
///
/// Usage: `venuemap-sim [config.json]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    venuemap::init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_file(&path)
            .with_context(|| format!("loading engine config from {}", path))?,
        None => EngineConfig::default(),
    };
    log::info!(
        "cluster at level >= {}, {} badge tiers",
        config.cluster_zoom_level,
        config.badge_size_tiers.len()
    );

    let venues = synthetic_venues(400);
    replay_map(&config, venues.clone());
    replay_roadview(&config, venues).await;
    Ok(())
}

/// Venues scattered over central Seoul, a few of them without a geocode.
fn synthetic_venues(count: usize) -> Vec<Poi> {
    (0..count)
        .map(|i| {
            // Cheap deterministic scatter
            let t = i as f64;
            let lat = SEOUL_CITY_HALL.lat + ((t * 0.618).fract() - 0.5) * 0.12;
            let lng = SEOUL_CITY_HALL.lng + ((t * 0.414).fract() - 0.5) * 0.16;
            let coordinate = if i % 97 == 0 {
                Coordinate::new(0.0, 0.0)
            } else {
                Coordinate::new(lat, lng)
            };
            let poi = Poi::new(format!("store-{:03}", i), coordinate, format!("Store {}", i));
            if i % 3 == 0 {
                poi.with_image(format!("https://cdn.example.com/stores/{}.png", i))
            } else {
                poi
            }
        })
        .collect()
}

fn replay_map(config: &EngineConfig, venues: Vec<Poi>) {
    let mut engine = MapEngine::new(config, HeadlessSurface::with_clusterer());
    engine.on_viewport_settled(|viewport| {
        log::info!(
            "host refetch around ({:.4}, {:.4})",
            viewport.center.lat,
            viewport.center.lng
        )
    });
    engine.on_poi_click(|poi| log::info!("host opens detail sheet of {}", poi.label));

    // Inputs arrive before the map SDK finished loading
    engine.set_pois(venues);
    engine.set_viewport(Viewport::around(SEOUL_CITY_HALL, 4, 0.05, 0.07));
    engine.handle_event(SurfaceEvent::Ready);
    report("ready", &engine);

    engine.set_selected(Some("store-004"));
    if let Some(handle) = engine.handle_for("store-004") {
        engine.handle_event(SurfaceEvent::OverlayClick(handle));
    }
    report("selected", &engine);

    // User pans east
    engine.handle_event(SurfaceEvent::DragStart);
    for step in 1..=5 {
        let center = Coordinate::new(SEOUL_CITY_HALL.lat, SEOUL_CITY_HALL.lng + step as f64 * 0.005);
        engine.handle_event(SurfaceEvent::ViewportChanged(Viewport::around(center, 4, 0.05, 0.07)));
    }
    engine.handle_event(SurfaceEvent::DragEnd);
    report("after drag", &engine);

    // Pinch out past the cluster threshold
    engine.handle_event(SurfaceEvent::ZoomStart);
    let center = engine.viewport().map(|v| v.center).unwrap_or(SEOUL_CITY_HALL);
    engine.handle_event(SurfaceEvent::ViewportChanged(Viewport::around(center, 7, 0.4, 0.55)));
    engine.handle_event(SurfaceEvent::DragEnd);
    engine.handle_event(SurfaceEvent::ZoomEnd);
    report("zoomed out", &engine);

    log::info!(
        "surface clusterer holds {} items after {} registrations",
        engine.surface().registered().len(),
        engine.surface().registrations.len()
    );
}

async fn replay_roadview(config: &EngineConfig, venues: Vec<Poi>) {
    let store = InMemoryStore::new(venues);
    let mut bridge = RoadviewOverlayBridge::new(
        OverlayFactory::default(),
        HeadlessSurface::new(),
        config.roadview_radius_meters,
    );

    let outcome = bridge.move_to(&store, SEOUL_CITY_HALL).await;
    log::info!("roadview at city hall: {:?}", outcome);
    let nearest = store
        .query(SEOUL_CITY_HALL, config.roadview_radius_meters)
        .into_iter()
        .next()
        .map(|hit| hit.poi.id);
    bridge.set_selected(nearest.as_deref());

    // Walk north in 40 m steps while the bridge follows
    let (tx, rx) = watch::channel(None);
    let walk = async move {
        for step in 1..=5 {
            let position = Coordinate::new(
                SEOUL_CITY_HALL.lat + step as f64 * 0.00036,
                SEOUL_CITY_HALL.lng,
            );
            if tx.send(Some(position)).is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    let (applied, ()) = tokio::join!(follow_positions(&mut bridge, &store, rx), walk);

    log::info!(
        "roadview walk applied {} fetches, {} markers in view",
        applied,
        bridge.overlays().len()
    );
}

fn report(stage: &str, engine: &MapEngine<HeadlessSurface>) {
    let metrics = engine.metrics();
    log::info!(
        "{}: {} overlays live ({} attached on surface), {} recomputes, {} deferred, +{} -{} ~{}",
        stage,
        engine.overlay_count(),
        engine.surface().attached_count(),
        metrics.recomputes,
        metrics.deferred,
        metrics.overlays_created,
        metrics.overlays_destroyed,
        metrics.overlays_restyled
    );
}
