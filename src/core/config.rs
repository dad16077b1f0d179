//! Configuration for the clustering engine and the roadview store client
//!
//! Hosts build an [`EngineConfig`] in code or load it from JSON; every field
//! has a default so a partial document is enough.

use crate::core::constants::{
    BADGE_TIER_MIN_COUNTS, BADGE_TIER_SIZES, CLUSTER_ZOOM_LEVEL, DEFAULT_GRID_CELL_PX,
    DEFAULT_ROADVIEW_RADIUS_METERS,
};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One visual size of a cluster badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeTier {
    /// Smallest member count drawn with this tier.
    pub min_count: usize,
    /// Badge diameter in pixels.
    pub size_px: u32,
}

impl BadgeTier {
    pub fn new(min_count: usize, size_px: u32) -> Self {
        Self { min_count, size_px }
    }

    /// The four default tiers: 1-9, 10-59, 60-99 and 100+.
    pub fn defaults() -> Vec<BadgeTier> {
        BADGE_TIER_MIN_COUNTS
            .iter()
            .zip(BADGE_TIER_SIZES.iter())
            .map(|(&min_count, &size_px)| BadgeTier::new(min_count, size_px))
            .collect()
    }
}

/// Nearby-store API settings used by the roadview bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    pub base_url: String,
    /// Map-provider key handed over by the host at startup
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            api_key: None,
            timeout_ms: 5_000,
        }
    }
}

impl StoreConfig {
    /// Fills `api_key` from the environment variable `var` when it is set.
    pub fn with_api_key_from_env(mut self, var: &str) -> Self {
        if let Ok(key) = std::env::var(var) {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }
        self
    }
}

/// Construction-time configuration of a [`MapEngine`](crate::MapEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Map level at and above which markers are clustered
    pub cluster_zoom_level: i32,
    /// Badge size tiers, ascending by `min_count`
    pub badge_size_tiers: Vec<BadgeTier>,
    /// Cell size of the fallback grid clusterer, in screen pixels
    pub grid_cell_px: f64,
    /// Fetch radius around a panorama position
    pub roadview_radius_meters: f64,
    pub store: StoreConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cluster_zoom_level: CLUSTER_ZOOM_LEVEL,
            badge_size_tiers: BadgeTier::defaults(),
            grid_cell_px: DEFAULT_GRID_CELL_PX,
            roadview_radius_meters: DEFAULT_ROADVIEW_RADIUS_METERS,
            store: StoreConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn with_cluster_zoom_level(mut self, level: i32) -> Self {
        self.cluster_zoom_level = level;
        self
    }

    pub fn with_badge_size_tiers(mut self, tiers: Vec<BadgeTier>) -> Self {
        self.badge_size_tiers = tiers;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let tiers = &self.badge_size_tiers;
        match tiers.first() {
            None => {
                return Err(MapError::InvalidConfig(
                    "badgeSizeTiers must not be empty".to_string(),
                ))
            }
            Some(first) if first.min_count != 1 => {
                return Err(MapError::InvalidConfig(format!(
                    "first badge tier must start at 1, got {}",
                    first.min_count
                )))
            }
            Some(_) => {}
        }
        if tiers.windows(2).any(|w| w[0].min_count >= w[1].min_count) {
            return Err(MapError::InvalidConfig(
                "badgeSizeTiers must be strictly ascending by minCount".to_string(),
            ));
        }
        if !(self.grid_cell_px.is_finite() && self.grid_cell_px > 0.0) {
            return Err(MapError::InvalidConfig(format!(
                "gridCellPx must be positive, got {}",
                self.grid_cell_px
            )));
        }
        if !(self.roadview_radius_meters.is_finite() && self.roadview_radius_meters > 0.0) {
            return Err(MapError::InvalidConfig(format!(
                "roadviewRadiusMeters must be positive, got {}",
                self.roadview_radius_meters
            )));
        }
        Ok(())
    }
}
