//! Engine-wide constants derived from the map provider's defaults and the
//! venue marker design. Keeping them in a single place makes it easier to
//! tweak engine-wide magic numbers.

/// Map level at and above which markers are merged into clusters.
/// Larger levels are further zoomed out.
pub const CLUSTER_ZOOM_LEVEL: i32 = 6;

/// Z-index of the selected marker; always drawn above everything else.
pub const SELECTED_Z_INDEX: i32 = 1000;

/// Z-index of every non-selected marker and cluster badge.
pub const DEFAULT_Z_INDEX: i32 = 1;

/// Square image box of a venue marker in pixels.
pub const MARKER_IMAGE_SIZE: (u32, u32) = (48, 48);

/// Height of the pointer drawn under the image box.
pub const MARKER_POINTER_HEIGHT: u32 = 10;

/// Border width of a selected marker.
pub const SELECTED_BORDER_WIDTH: u32 = 3;

/// Border width of a non-selected marker.
pub const DEFAULT_BORDER_WIDTH: u32 = 1;

/// Minimum member counts of the default badge size tiers
/// (1-9, 10-59, 60-99, 100+).
pub const BADGE_TIER_MIN_COUNTS: [usize; 4] = [1, 10, 60, 100];

/// Badge diameters in pixels, one per tier.
pub const BADGE_TIER_SIZES: [u32; 4] = [30, 40, 50, 60];

/// Fallback clusterer cell size in screen pixels.
pub const DEFAULT_GRID_CELL_PX: f64 = 60.0;

/// Radius used when fetching nearby venues around a panorama position.
pub const DEFAULT_ROADVIEW_RADIUS_METERS: f64 = 500.0;

/// Provider map level 1 corresponds roughly to web zoom 19; the provider's
/// level and the web zoom always add up to this value.
pub const PROVIDER_LEVEL_OFFSET: i32 = 20;

/// Default square tile size in pixels, used to size the world pixel plane.
pub const TILE_SIZE: f64 = 256.0;
