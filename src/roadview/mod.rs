//! Street-level panorama mode: the same venues projected as in-panorama
//! markers, driven by the panorama position instead of a 2-D viewport.

pub mod bridge;
#[cfg(feature = "tokio-runtime")]
pub mod follow;
pub mod store;
