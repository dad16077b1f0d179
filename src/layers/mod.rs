pub mod manager;
pub mod overlay;
