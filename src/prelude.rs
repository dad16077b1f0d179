//! Prelude module for common venuemap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use venuemap::prelude::*;`

pub use crate::core::{
    config::{BadgeTier, EngineConfig, StoreConfig},
    constants::{CLUSTER_ZOOM_LEVEL, DEFAULT_Z_INDEX, SELECTED_Z_INDEX},
    geo::{Bounds, Coordinate},
    map::{EngineLifecycle, EngineMetrics, MapEngine},
    poi::Poi,
    viewport::Viewport,
};

pub use crate::input::{
    events::SurfaceEvent,
    gestures::{GestureState, GestureTracker, Settle},
};

pub use crate::layers::{
    manager::{OverlayKey, OverlaySet},
    overlay::{
        MarkerGeometry, Overlay, OverlayFactory, OverlayImage, OverlayKind, OverlayVisual,
        RenderedAt,
    },
};

pub use crate::rendering::{
    headless::HeadlessSurface,
    surface::{ClusterItem, OverlayHandle, OverlaySurface},
};

pub use crate::roadview::{
    bridge::{FetchOutcome, FetchTicket, RoadviewOverlayBridge},
    store::{HttpNearbyStore, InMemoryStore, NearbyPoi, NearbyStore},
};

#[cfg(feature = "tokio-runtime")]
pub use crate::roadview::follow::follow_positions;

pub use crate::spatial::{
    clustering::{badge_tier, CellCluster, GridClusterer},
    policy::{ClusterPolicy, Partition},
};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
