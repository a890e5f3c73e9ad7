pub mod transform;
pub mod viewport;
