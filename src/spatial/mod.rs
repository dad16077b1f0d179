pub mod clustering;
pub mod policy;
