use crate::{
    core::geo::Coordinate,
    rendering::surface::OverlaySurface,
    roadview::{
        bridge::{FetchOutcome, RoadviewOverlayBridge},
        store::NearbyStore,
    },
};
use tokio::sync::watch;

/// Keeps `bridge` in step with a stream of panorama positions.
///
/// A fetch still in flight when the position changes is dropped, so a slow
/// response for an old position can never overwrite a newer one. Returns the
/// number of fetches applied once the sender side is gone.
pub async fn follow_positions<S, St>(
    bridge: &mut RoadviewOverlayBridge<S>,
    store: &St,
    mut positions: watch::Receiver<Option<Coordinate>>,
) -> usize
where
    S: OverlaySurface,
    St: NearbyStore + ?Sized,
{
    let mut applied = 0;

    loop {
        let current = *positions.borrow_and_update();
        if let Some(position) = current {
            let ticket = bridge.set_position(position);
            let fetch = store.nearby(ticket.position, ticket.radius_meters);
            tokio::pin!(fetch);

            let result = tokio::select! {
                result = &mut fetch => Some(result),
                changed = positions.changed() => match changed {
                    Ok(()) => {
                        log::debug!("panorama moved, dropping fetch {}", ticket.token);
                        None
                    }
                    // Sender gone: the last position still deserves its overlays
                    Err(_) => {
                        let result = fetch.await;
                        if let FetchOutcome::Applied { .. } = bridge.apply_fetch(ticket, result) {
                            applied += 1;
                        }
                        return applied;
                    }
                },
            };

            match result {
                Some(result) => {
                    if let FetchOutcome::Applied { .. } = bridge.apply_fetch(ticket, result) {
                        applied += 1;
                    }
                }
                None => continue,
            }
        }

        if positions.changed().await.is_err() {
            return applied;
        }
    }
}
