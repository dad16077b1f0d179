use crate::core::{poi::Poi, viewport::Viewport};

/// Outcome of [`ClusterPolicy::partition`] for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Renderable POIs inside the viewport bounds, in input order
    pub visible: Vec<Poi>,
    /// True when the frame should be drawn as merged count badges
    pub cluster_threshold: bool,
}

impl Partition {
    /// Clustering is requested but nothing is visible; registering an empty
    /// set crashes some clusterers, so callers skip registration.
    pub fn is_empty_cluster(&self) -> bool {
        self.cluster_threshold && self.visible.is_empty()
    }
}

/// Pure decision function: which POIs are visible, and whether to cluster.
///
/// Visibility is a linear scan over the whole list on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterPolicy {
    cluster_zoom_level: i32,
}

impl ClusterPolicy {
    pub fn new(cluster_zoom_level: i32) -> Self {
        Self { cluster_zoom_level }
    }

    pub fn cluster_zoom_level(&self) -> i32 {
        self.cluster_zoom_level
    }

    pub fn should_cluster(&self, zoom_level: i32) -> bool {
        zoom_level >= self.cluster_zoom_level
    }

    /// Drops sentinel/non-finite POIs and those outside the bounds. Dropped
    /// POIs are excluded from the frame entirely, not hidden.
    pub fn partition(&self, pois: &[Poi], viewport: &Viewport) -> Partition {
        let visible = pois
            .iter()
            .filter(|poi| {
                poi.coordinate.is_renderable() && viewport.bounds.contains(&poi.coordinate)
            })
            .cloned()
            .collect();

        Partition {
            visible,
            cluster_threshold: self.should_cluster(viewport.zoom_level),
        }
    }
}

impl Default for ClusterPolicy {
    fn default() -> Self {
        Self::new(crate::core::constants::CLUSTER_ZOOM_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Coordinate;

    fn viewport(zoom_level: i32) -> Viewport {
        Viewport::around(Coordinate::new(37.5, 127.0), zoom_level, 0.2, 0.2)
    }

    #[test]
    fn test_filters_out_of_bounds_and_sentinel() {
        let pois = vec![
            Poi::new("in", Coordinate::new(37.5, 127.0), "In"),
            Poi::new("out", Coordinate::new(35.1, 129.0), "Out"),
            Poi::new("zero", Coordinate::new(0.0, 0.0), "Zero"),
            Poi::new("nan", Coordinate::new(f64::NAN, 127.0), "NaN"),
            Poi::new("edge", Coordinate::new(37.4, 126.95), "Edge"),
        ];
        let partition = ClusterPolicy::default().partition(&pois, &viewport(3));
        let ids: Vec<_> = partition.visible.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["in", "edge"]);
        assert!(!partition.cluster_threshold);
    }

    #[test]
    fn test_sentinel_excluded_even_when_bounds_cover_origin() {
        let pois = vec![Poi::new("zero", Coordinate::new(0.0, 0.0), "Zero")];
        let world = Viewport::around(Coordinate::new(0.0, 0.0), 12, 170.0, 359.0);
        assert!(ClusterPolicy::default().partition(&pois, &world).visible.is_empty());
    }

    #[test]
    fn test_cluster_threshold_is_inclusive() {
        let policy = ClusterPolicy::new(6);
        assert!(!policy.should_cluster(5));
        assert!(policy.should_cluster(6));
        assert!(policy.should_cluster(9));
    }

    #[test]
    fn test_empty_cluster_guard() {
        let partition = ClusterPolicy::new(6).partition(&[], &viewport(7));
        assert!(partition.cluster_threshold);
        assert!(partition.is_empty_cluster());
    }
}
