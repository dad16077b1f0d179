use crate::core::{
    config::BadgeTier,
    constants::{PROVIDER_LEVEL_OFFSET, TILE_SIZE},
    geo::Coordinate,
    poi::Poi,
};
use crate::prelude::HashMap;
use std::f64::consts::PI;

const MAX_LATITUDE: f64 = 85.0511287798;

/// Index of the badge tier used for a cluster of `count` members: the last
/// tier whose `min_count` does not exceed `count`.
pub fn badge_tier(count: usize, tiers: &[BadgeTier]) -> usize {
    tiers
        .iter()
        .rposition(|tier| tier.min_count <= count)
        .unwrap_or(0)
}

/// Members of one grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellCluster {
    /// Grid cell index in world-pixel space
    pub cell: (i64, i64),
    /// Members in input order; the first one represents the cluster
    pub members: Vec<Poi>,
    /// Mean position of the members
    pub center: Coordinate,
    pub tier: usize,
    pub size_px: u32,
}

impl CellCluster {
    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn is_single(&self) -> bool {
        self.members.len() == 1
    }

    pub fn representative(&self) -> &Poi {
        &self.members[0]
    }
}

/// Grid-bucket clusterer for rendering surfaces without a built-in one.
///
/// Points are projected to Web-Mercator world pixels at the scale of the
/// current map level and bucketed into square cells of `grid_cell_px`.
#[derive(Debug, Clone)]
pub struct GridClusterer {
    grid_cell_px: f64,
    tiers: Vec<BadgeTier>,
}

impl GridClusterer {
    pub fn new(grid_cell_px: f64, tiers: Vec<BadgeTier>) -> Self {
        let tiers = if tiers.is_empty() {
            BadgeTier::defaults()
        } else {
            tiers
        };
        Self {
            grid_cell_px,
            tiers,
        }
    }

    pub fn tiers(&self) -> &[BadgeTier] {
        &self.tiers
    }

    /// World pixel position of a coordinate at the given provider level.
    pub fn project(coordinate: &Coordinate, zoom_level: i32) -> (f64, f64) {
        let zoom = (PROVIDER_LEVEL_OFFSET - zoom_level).max(0);
        let scale = TILE_SIZE * 2_f64.powi(zoom);
        let lat_rad = coordinate.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();

        let x = (coordinate.lng + 180.0) / 360.0 * scale;
        let y = (1.0 - (PI / 4.0 + lat_rad / 2.0).tan().ln() / PI) / 2.0 * scale;
        (x, y)
    }

    /// Groups the POIs into cells. Cells come out in order of their first
    /// member's position in `pois`.
    pub fn cluster(&self, pois: &[Poi], zoom_level: i32) -> Vec<CellCluster> {
        let mut slots: HashMap<(i64, i64), usize> = HashMap::default();
        let mut cells: Vec<((i64, i64), Vec<Poi>)> = Vec::new();

        for poi in pois {
            let (x, y) = Self::project(&poi.coordinate, zoom_level);
            let cell = (
                (x / self.grid_cell_px).floor() as i64,
                (y / self.grid_cell_px).floor() as i64,
            );
            match slots.get(&cell) {
                Some(&slot) => cells[slot].1.push(poi.clone()),
                None => {
                    slots.insert(cell, cells.len());
                    cells.push((cell, vec![poi.clone()]));
                }
            }
        }

        cells
            .into_iter()
            .map(|(cell, members)| {
                let count = members.len() as f64;
                let center = Coordinate::new(
                    members.iter().map(|p| p.coordinate.lat).sum::<f64>() / count,
                    members.iter().map(|p| p.coordinate.lng).sum::<f64>() / count,
                );
                let tier = badge_tier(members.len(), &self.tiers);
                CellCluster {
                    cell,
                    center,
                    tier,
                    size_px: self.tiers[tier].size_px,
                    members,
                }
            })
            .collect()
    }
}
