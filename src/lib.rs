//! Yearframe composes a year of photos into a single picture.
//!
//! A template defines one slot per month plus an optional full-canvas overlay. Each month's
//! image is cover-fitted into its slot and can be panned and zoomed. The same geometry drives
//! both the interactive preview and the exported PNG:
//!
//! - Load a [`Template`] through a [`ConfigSource`]
//! - Open an [`Editor`] and add images to its [`ImageLibrary`]
//! - Drag / zoom through the editor, then [`Editor::export`] into an [`ArtifactSink`]
#![forbid(unsafe_code)]

mod foundation;

/// Colors, uploads, decoding and the image library.
pub mod assets;
/// Scene compilation into draw operations.
pub mod compile;
/// Per-slot transforms and the preview viewport.
pub mod edit;
/// PNG export.
pub mod export;
/// Cover fit and image placement.
pub mod layout;
/// Raster backends and the interactive preview.
pub mod render;
/// Editing sessions and project documents.
pub mod session;
/// Template model and config loading.
pub mod template;

pub use crate::foundation::core::{Affine, Canvas, Month, Point, Rect, Rgba8Premul, Size, Vec2};
pub use crate::foundation::error::{YearframeError, YearframeResult};

pub use crate::assets::color::ColorDef;
pub use crate::assets::decode::{DecodeHandle, PreparedImage};
pub use crate::assets::library::{ImageId, ImageLibrary, IncomingFile};
pub use crate::assets::upload::{RejectionReason, UploadPolicy, UploadRejection};
pub use crate::compile::plan::{DrawOp, ImageKey, PlanOptions, RenderPlan, Scene, compile_scene};
pub use crate::edit::transform::{Transform, TransformModel};
pub use crate::edit::viewport::{ContainerScale, Viewport};
pub use crate::export::rasterizer::{ExportRasterizer, ExportReport};
pub use crate::export::settings::ExportSettings;
pub use crate::export::sink::{Artifact, ArtifactSink, FileSink, InMemorySink};
pub use crate::layout::cover::cover_fit;
pub use crate::layout::placement::{ImagePlacement, place_image};
pub use crate::render::backend::{FrameRGBA, RenderBackend};
pub use crate::render::preview::{InteractiveRenderer, SlotView};
pub use crate::session::editor::Editor;
pub use crate::session::project::{OpenedProject, ProjectDocument, open_project};
pub use crate::template::config::{ConfigSource, FsConfigSource, InMemoryConfigSource, LoadNotice};
pub use crate::template::model::{Template, TemplateDescriptor, TemplateSlot};
