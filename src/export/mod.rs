pub mod png;
pub mod rasterizer;
pub mod settings;
pub mod sink;
