pub mod events;
pub mod gestures;

// Re-export the essential types
pub use events::SurfaceEvent;
pub use gestures::{GestureState, GestureTracker, Settle};
