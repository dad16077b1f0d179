//! # venuemap
//!
//! Viewport-driven marker clustering and overlay lifecycle engine.
//!
//! The crate decides, for a dynamic set of points of interest, which of them
//! are visible in the current viewport, whether they are drawn one by one or
//! merged into count badges, and how the live overlay set on a rendering
//! surface is reconciled while the user pans and zooms. A secondary bridge
//! projects the same points into a street-level panorama.
//!
//! The rendering backend is abstracted behind [`OverlaySurface`]; the engine
//! never talks to a concrete map SDK.

pub mod core;
pub mod input;
pub mod layers;
pub mod rendering;
pub mod roadview;
pub mod spatial;

pub mod prelude;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{BadgeTier, EngineConfig, StoreConfig},
    geo::{Bounds, Coordinate},
    map::{EngineLifecycle, EngineMetrics, MapEngine},
    poi::Poi,
    viewport::Viewport,
};

pub use input::{
    events::SurfaceEvent,
    gestures::{GestureState, GestureTracker, Settle},
};

pub use layers::{
    manager::{OverlayKey, OverlaySet},
    overlay::{Overlay, OverlayFactory, OverlayImage, OverlayKind, OverlayVisual, RenderedAt},
};

pub use rendering::{
    headless::HeadlessSurface,
    surface::{ClusterItem, OverlayHandle, OverlaySurface},
};

pub use roadview::{
    bridge::{FetchOutcome, FetchTicket, RoadviewOverlayBridge},
    store::{HttpNearbyStore, InMemoryStore, NearbyPoi, NearbyStore},
};

#[cfg(feature = "tokio-runtime")]
pub use roadview::follow::follow_positions;

pub use spatial::{
    clustering::{badge_tier, CellCluster, GridClusterer},
    policy::{ClusterPolicy, Partition},
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Error taxonomy of the engine.
///
/// The first four variants are recovered inside the engine and the roadview
/// bridge; they only surface through logs, metrics and outcome values.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("rendering surface is not initialized yet")]
    BackendNotReady,

    #[error("roadview fetch {token} resolved for a stale panorama position")]
    StaleFetchDiscarded { token: u64 },

    #[error("malformed POI {id}: {reason}")]
    MalformedPoi { id: String, reason: String },

    #[error("rendering surface has no built-in clusterer")]
    ClustererUnavailable,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs an `env_logger` backend reading `RUST_LOG` (default filter `info`).
///
/// Safe to call more than once; later calls are ignored.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env).try_init();
}
