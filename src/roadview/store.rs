use crate::core::{config::StoreConfig, geo::Coordinate, poi::Poi};
use crate::{MapError, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{header::AUTHORIZATION, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shared HTTP client; building it once avoids TLS and connection pool setup
/// for every panorama move.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("venuemap/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// One entry of a nearby-venue response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyPoi {
    pub poi: Poi,
    pub distance_meters: f64,
}

/// Read-only "venues near a coordinate" query of the external store API.
#[async_trait]
pub trait NearbyStore: Send + Sync {
    async fn nearby(&self, at: Coordinate, radius_meters: f64) -> Result<Vec<NearbyPoi>>;
}

/// [`NearbyStore`] backed by the store REST API.
///
/// Issues `GET {base_url}/stores/nearby?lat=..&lng=..&radius=..`.
#[derive(Debug, Clone)]
pub struct HttpNearbyStore {
    config: StoreConfig,
}

impl HttpNearbyStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/stores/nearby", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl NearbyStore for HttpNearbyStore {
    async fn nearby(&self, at: Coordinate, radius_meters: f64) -> Result<Vec<NearbyPoi>> {
        let mut request = HTTP_CLIENT
            .get(self.endpoint())
            .query(&[
                ("lat", at.lat.to_string()),
                ("lng", at.lng.to_string()),
                ("radius", radius_meters.round().to_string()),
            ])
            .timeout(Duration::from_millis(self.config.timeout_ms));
        if let Some(key) = &self.config.api_key {
            request = request.header(AUTHORIZATION, format!("KakaoAK {}", key));
        }

        log::debug!("fetching venues within {}m of {:?}", radius_meters, at);
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(MapError::Store(format!("HTTP {}", response.status())));
        }
        Ok(response.json::<Vec<NearbyPoi>>().await?)
    }
}

/// [`NearbyStore`] over a fixed list, for offline hosts and the simulator.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pois: Vec<Poi>,
}

impl InMemoryStore {
    pub fn new(pois: Vec<Poi>) -> Self {
        Self { pois }
    }

    /// Renderable venues within the radius, nearest first.
    pub fn query(&self, at: Coordinate, radius_meters: f64) -> Vec<NearbyPoi> {
        let mut hits: Vec<NearbyPoi> = self
            .pois
            .iter()
            .filter(|poi| poi.coordinate.is_renderable())
            .map(|poi| NearbyPoi {
                distance_meters: at.distance_to(&poi.coordinate),
                poi: poi.clone(),
            })
            .filter(|hit| hit.distance_meters <= radius_meters)
            .collect();
        hits.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
        hits
    }
}

#[async_trait]
impl NearbyStore for InMemoryStore {
    async fn nearby(&self, at: Coordinate, radius_meters: f64) -> Result<Vec<NearbyPoi>> {
        Ok(self.query(at, radius_meters))
    }
}
