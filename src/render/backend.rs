use std::collections::HashMap;

use crate::{
    assets::decode::PreparedImage,
    compile::plan::{ImageKey, RenderPlan},
    foundation::error::YearframeResult,
};

/// A rendered surface as RGBA8 pixels.
///
/// Frames are **premultiplied alpha** unless `premultiplied` says otherwise.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Decoded rasters referenced by a plan's image ops.
#[derive(Clone, Debug, Default)]
pub struct PreparedImages {
    map: HashMap<ImageKey, PreparedImage>,
}

impl PreparedImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ImageKey, image: PreparedImage) {
        self.map.insert(key, image);
    }

    pub fn get(&self, key: ImageKey) -> Option<&PreparedImage> {
        self.map.get(&key)
    }

    pub fn contains(&self, key: ImageKey) -> bool {
        self.map.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Executes a compiled [`RenderPlan`] into a [`FrameRGBA`].
pub trait RenderBackend {
    /// Draw every op of `plan`, bottom to top, and read the surface back.
    ///
    /// Every image key the plan references must be present in `images`.
    fn render_plan(
        &mut self,
        plan: &RenderPlan,
        images: &PreparedImages,
    ) -> YearframeResult<FrameRGBA>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, Default)]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    #[default]
    Cpu,
}

/// Create a rendering backend implementation.
pub fn create_backend(kind: BackendKind) -> YearframeResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new())),
    }
}
