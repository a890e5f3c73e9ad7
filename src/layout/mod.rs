pub mod cover;
pub mod placement;
