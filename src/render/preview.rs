//! On-screen composition of the editing scene.
//!
//! The preview draws the same [`RenderPlan`] the exporter draws, scaled uniformly by the
//! container scale. Images that are still decoding are left out instead of blocking.

use crate::{
    assets::{color::ColorDef, library::ImageId},
    compile::plan::{PlanOptions, RenderPlan, Scene, compile_scene},
    edit::viewport::Viewport,
    foundation::{
        core::{Month, Point, Rect, Size},
        error::YearframeResult,
    },
    layout::placement::{ImagePlacement, place_image},
    render::backend::{
        BackendKind, FrameRGBA, PreparedImages, RenderBackend, create_backend,
    },
};

/// What the editor shows for one slot.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotView {
    pub month: Month,
    /// Slot rectangle, template pixels.
    pub slot: Rect,
    /// Slot rectangle, display pixels.
    pub display: Rect,
    pub image_id: Option<ImageId>,
    /// Image geometry in template pixels; `None` shows the empty placeholder.
    pub image: Option<ImagePlacement>,
    pub selected: bool,
}

impl SlotView {
    pub fn is_placeholder(&self) -> bool {
        self.image.is_none()
    }
}

fn to_display(r: Rect, viewport: &Viewport) -> Rect {
    Rect::from_points(
        viewport.template_to_display(Point::new(r.x0, r.y0)),
        viewport.template_to_display(Point::new(r.x1, r.y1)),
    )
}

/// One view per template slot, in slot order.
pub fn slot_views(scene: &Scene<'_>, viewport: &Viewport, selection: Option<Month>) -> Vec<SlotView> {
    scene
        .template
        .slots
        .iter()
        .map(|slot| {
            let img = scene.images.image_for_month(slot.month);
            let image = img.map(|img| {
                place_image(
                    slot,
                    Size::new(f64::from(img.natural_width), f64::from(img.natural_height)),
                    scene.transforms.get(slot.month),
                )
            });
            SlotView {
                month: slot.month,
                slot: slot.rect(),
                display: to_display(slot.rect(), viewport),
                image_id: img.map(|i| i.id),
                image,
                selected: selection == Some(slot.month),
            }
        })
        .collect()
}

/// Gather whatever rasters `plan` needs that are already decoded.
pub(crate) fn ready_images(scene: &Scene<'_>, plan: &RenderPlan) -> PreparedImages {
    let mut images = PreparedImages::new();
    for key in plan.image_keys() {
        if let Some(img) = scene.handle(key).and_then(|h| h.try_get()) {
            images.insert(key, img);
        }
    }
    images
}

/// Renders the interactive preview at the viewport's display size.
pub struct InteractiveRenderer {
    backend: Box<dyn RenderBackend>,
    background: ColorDef,
}

impl InteractiveRenderer {
    pub fn new(background: ColorDef) -> YearframeResult<Self> {
        Ok(Self {
            backend: create_backend(BackendKind::Cpu)?,
            background,
        })
    }

    pub fn with_backend(backend: Box<dyn RenderBackend>, background: ColorDef) -> Self {
        Self {
            backend,
            background,
        }
    }

    /// Compile the scene at the current container scale.
    pub fn plan(
        &self,
        scene: &Scene<'_>,
        viewport: &Viewport,
        selection: Option<Month>,
    ) -> YearframeResult<RenderPlan> {
        compile_scene(
            scene,
            &PlanOptions::preview(viewport.scale().get(), self.background, selection),
        )
    }

    /// Draw the scene, skipping images that have not finished decoding.
    pub fn render(
        &mut self,
        scene: &Scene<'_>,
        viewport: &Viewport,
        selection: Option<Month>,
    ) -> YearframeResult<FrameRGBA> {
        let mut plan = self.plan(scene, viewport, selection)?;
        let images = ready_images(scene, &plan);
        plan.retain_images(|k| images.contains(k));
        self.backend.render_plan(&plan, &images)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/preview.rs"]
mod tests;
