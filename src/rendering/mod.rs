pub mod headless;
pub mod surface;
