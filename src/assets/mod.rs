pub mod color;
pub mod decode;
pub mod library;
pub mod upload;
