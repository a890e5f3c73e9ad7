use std::collections::BTreeMap;

use crate::{
    assets::{color::ColorDef, decode::DecodeHandle, library::ImageLibrary},
    edit::transform::TransformModel,
    foundation::{
        core::{Affine, Canvas, Month, Rect, Rgba8Premul, Size},
        error::{YearframeError, YearframeResult},
    },
    layout::placement::{ImagePlacement, place_image},
    template::model::Template,
};

/// Selection outline color (`#6366f1`).
pub const SELECTION_COLOR: Rgba8Premul = Rgba8Premul {
    r: 0x63,
    g: 0x66,
    b: 0xf1,
    a: 0xff,
};

/// Selection outline width in output pixels.
pub const SELECTION_WIDTH_PX: f64 = 2.0;

/// Everything a composition depends on, borrowed from the editing session.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    pub template: &'a Template,
    pub images: &'a ImageLibrary,
    pub transforms: &'a TransformModel,
    /// Pixels of the template overlay, when the template has one and it was fetched.
    pub overlay: Option<&'a DecodeHandle>,
}

impl<'a> Scene<'a> {
    /// Decode handle behind an image key.
    pub fn handle(&self, key: ImageKey) -> Option<&'a DecodeHandle> {
        match key {
            ImageKey::Slot(m) => self.images.image_for_month(m).map(|img| &img.pixels),
            ImageKey::Overlay => self.overlay,
        }
    }

    /// Human-readable reference for an image key (file name or overlay path).
    pub fn reference(&self, key: ImageKey) -> String {
        self.handle(key)
            .map(|h| h.reference().to_owned())
            .unwrap_or_else(|| key.to_string())
    }
}

/// Which decoded raster an [`DrawOp::Image`] samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageKey {
    Slot(Month),
    Overlay,
}

impl std::fmt::Display for ImageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slot(m) => write!(f, "slot {m}"),
            Self::Overlay => f.write_str("overlay"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Draw operation in template pixels. The plan's surface scale maps them to output pixels.
pub enum DrawOp {
    FillRect {
        rect: Rect,
        color: Rgba8Premul,
    },
    /// Stretch the whole image into `dest`, showing only the part inside `clip`.
    Image {
        key: ImageKey,
        dest: Rect,
        clip: Rect,
    },
    /// Border drawn inside `rect`; `width` is in template pixels.
    Outline {
        rect: Rect,
        width: f64,
        color: Rgba8Premul,
    },
}

/// How a scene is compiled.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanOptions {
    /// Uniform factor from template pixels to output pixels.
    pub surface_scale: f64,
    pub background: ColorDef,
    /// Month whose slot gets a selection outline. Never set for export.
    pub selection: Option<Month>,
}

impl PlanOptions {
    /// Export surface: integer supersample, never a selection outline.
    pub fn export(supersample: u32, background: ColorDef) -> Self {
        Self {
            surface_scale: f64::from(supersample),
            background,
            selection: None,
        }
    }

    pub fn preview(container_scale: f64, background: ColorDef, selection: Option<Month>) -> Self {
        Self {
            surface_scale: container_scale,
            background,
            selection,
        }
    }
}

/// Backend-agnostic composition of one scene.
///
/// Both the interactive preview and the export rasterizer execute this type; they differ only in
/// `surface_scale` and in the preview-only outline op.
#[derive(Clone, Debug)]
pub struct RenderPlan {
    pub canvas: Canvas,
    pub surface_scale: f64,
    /// Output surface size in pixels.
    pub width: u32,
    pub height: u32,
    pub ops: Vec<DrawOp>,
    /// Image geometry per month, template pixels.
    pub placements: BTreeMap<Month, ImagePlacement>,
}

impl RenderPlan {
    /// Template pixels -> output pixels.
    pub fn surface_transform(&self) -> Affine {
        Affine::scale(self.surface_scale)
    }

    /// Image keys referenced by this plan, bottom to top.
    pub fn image_keys(&self) -> impl Iterator<Item = ImageKey> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Image { key, .. } => Some(*key),
            _ => None,
        })
    }

    /// Drop image ops whose raster is not available yet.
    pub fn retain_images(&mut self, mut available: impl FnMut(ImageKey) -> bool) {
        self.ops.retain(|op| match op {
            DrawOp::Image { key, .. } => available(*key),
            _ => true,
        });
    }
}

fn surface_extent(canonical: u32, scale: f64) -> YearframeResult<u32> {
    let v = (f64::from(canonical) * scale).round();
    if !(v.is_finite() && v >= 1.0 && v <= f64::from(u32::MAX)) {
        return Err(YearframeError::validation(format!(
            "surface scale {scale} gives an unusable surface size"
        )));
    }
    Ok(v as u32)
}

/// Compile a scene into draw operations, bottom to top:
/// background, slot placeholders or images (clipped to their slots), overlay, selection outline.
#[tracing::instrument(skip(scene, opts), fields(template = %scene.template.id))]
pub fn compile_scene(scene: &Scene<'_>, opts: &PlanOptions) -> YearframeResult<RenderPlan> {
    let canvas = scene.template.canvas;
    canvas.validate()?;
    if !(opts.surface_scale.is_finite() && opts.surface_scale > 0.0) {
        return Err(YearframeError::validation(format!(
            "surface scale must be finite and > 0, got {}",
            opts.surface_scale
        )));
    }
    let width = surface_extent(canvas.width, opts.surface_scale)?;
    let height = surface_extent(canvas.height, opts.surface_scale)?;

    let mut ops = Vec::with_capacity(scene.template.slots.len() + 3);
    let mut placements = BTreeMap::new();

    ops.push(DrawOp::FillRect {
        rect: canvas.rect(),
        color: opts.background.to_rgba8_premul(),
    });

    for slot in &scene.template.slots {
        match scene.images.image_for_month(slot.month) {
            None => ops.push(DrawOp::FillRect {
                rect: slot.rect(),
                color: slot.placeholder_color().to_rgba8_premul(),
            }),
            Some(img) => {
                let natural = Size::new(
                    f64::from(img.natural_width),
                    f64::from(img.natural_height),
                );
                let placement = place_image(slot, natural, scene.transforms.get(slot.month));
                tracing::debug!(
                    month = %slot.month,
                    x = placement.absolute.x0,
                    y = placement.absolute.y0,
                    w = placement.size.width,
                    h = placement.size.height,
                    "slot placement"
                );
                ops.push(DrawOp::Image {
                    key: ImageKey::Slot(slot.month),
                    dest: placement.absolute,
                    clip: placement.clip,
                });
                placements.insert(slot.month, placement);
            }
        }
    }

    if scene.overlay.is_some() {
        ops.push(DrawOp::Image {
            key: ImageKey::Overlay,
            dest: canvas.rect(),
            clip: canvas.rect(),
        });
    }

    if let Some(slot) = opts.selection.and_then(|m| scene.template.slot(m)) {
        ops.push(DrawOp::Outline {
            rect: slot.rect(),
            width: SELECTION_WIDTH_PX / opts.surface_scale,
            color: SELECTION_COLOR,
        });
    }

    Ok(RenderPlan {
        canvas,
        surface_scale: opts.surface_scale,
        width,
        height,
        ops,
        placements,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;
