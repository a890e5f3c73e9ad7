pub mod editor;
pub mod project;
