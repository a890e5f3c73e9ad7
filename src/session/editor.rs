//! Editing session: template, uploads, per-month transforms, selection and the two renderers.

use crate::{
    assets::{
        decode::{DecodeHandle, PreparedImage},
        library::{AddReport, ImageLibrary, IncomingFile},
    },
    compile::plan::Scene,
    edit::{
        transform::{SCALE_STEP, TransformModel},
        viewport::{ContainerScale, Viewport},
    },
    export::{
        rasterizer::{ExportRasterizer, ExportReport},
        settings::ExportSettings,
        sink::ArtifactSink,
    },
    foundation::{
        core::{Month, Point},
        error::{YearframeError, YearframeResult},
    },
    render::{
        backend::FrameRGBA,
        preview::{InteractiveRenderer, SlotView, slot_views},
    },
    template::{
        config::{ConfigSource, LoadNotice, load_template_or_placeholder},
        model::{Template, TemplateDescriptor},
    },
};

/// One user's editing state.
///
/// Transforms are keyed by month and survive template switches; the selection and any active
/// drag do not.
pub struct Editor {
    template: Template,
    notice: Option<LoadNotice>,
    overlay: Option<DecodeHandle>,
    library: ImageLibrary,
    transforms: TransformModel,
    selection: Option<Month>,
    viewport: Viewport,
    preview: InteractiveRenderer,
    exporter: ExportRasterizer,
}

impl Editor {
    /// Session on `template`, shown at canonical size until the first [`Editor::resize`].
    pub fn new(template: Template, settings: ExportSettings) -> YearframeResult<Self> {
        let preview = InteractiveRenderer::new(settings.background)?;
        let exporter = ExportRasterizer::new(settings)?;
        Ok(Self {
            viewport: Viewport::canonical(template.canvas),
            template,
            notice: None,
            overlay: None,
            library: ImageLibrary::new(),
            transforms: TransformModel::new(),
            selection: None,
            preview,
            exporter,
        })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Why the current template has no slots, if its config failed to load.
    pub fn notice(&self) -> Option<&LoadNotice> {
        self.notice.as_ref()
    }

    pub fn overlay(&self) -> Option<&DecodeHandle> {
        self.overlay.as_ref()
    }

    pub fn library(&self) -> &ImageLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut ImageLibrary {
        &mut self.library
    }

    pub fn transforms(&self) -> &TransformModel {
        &self.transforms
    }

    pub fn transforms_mut(&mut self) -> &mut TransformModel {
        &mut self.transforms
    }

    pub fn selection(&self) -> Option<Month> {
        self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn export_settings(&self) -> &ExportSettings {
        self.exporter.settings()
    }

    /// Swap in another template. Selection and drag state are dropped.
    pub fn set_template(&mut self, template: Template, notice: Option<LoadNotice>) {
        if template.canvas != self.viewport.canvas() {
            let width = self.viewport.display_size().width;
            self.viewport = Viewport::new(template.canvas, width)
                .unwrap_or_else(|_| Viewport::canonical(template.canvas));
        }
        self.template = template;
        self.notice = notice;
        self.overlay = None;
        self.clear_selection();
    }

    /// Load `descriptor` from `source` and switch to it, falling back to an empty template.
    ///
    /// The overlay is fetched from the same source and decoded in the background; a missing
    /// overlay is logged and skipped.
    pub fn load_template(
        &mut self,
        source: &dyn ConfigSource,
        descriptor: &TemplateDescriptor,
    ) -> YearframeResult<Option<&LoadNotice>> {
        let (template, notice) = load_template_or_placeholder(source, descriptor)?;
        self.set_template(template, notice);
        if let Some(reference) = &descriptor.overlay {
            match source.fetch(reference) {
                Ok(bytes) => {
                    self.overlay = Some(DecodeHandle::spawn(reference.clone(), bytes.into()));
                }
                Err(e) => tracing::warn!(overlay = %reference, error = %e, "overlay unavailable"),
            }
        }
        Ok(self.notice.as_ref())
    }

    pub fn set_overlay(&mut self, overlay: Option<DecodeHandle>) {
        self.overlay = overlay;
    }

    pub fn add_files(&mut self, files: impl IntoIterator<Item = IncomingFile>) -> AddReport {
        self.library.add_files(files)
    }

    /// Give every month without an image the shared default raster.
    pub fn fill_missing_with(&mut self, name: &str, image: &PreparedImage) -> Vec<Month> {
        self.library.fill_missing_with(name, image)
    }

    /// Recompute the container scale after the preview surface changed width.
    pub fn resize(&mut self, rendered_width: f64) -> YearframeResult<ContainerScale> {
        self.viewport.resize(rendered_width)
    }

    /// Month of the topmost slot under a display-space point.
    pub fn hit_test(&self, display: Point) -> Option<Month> {
        let p = self.viewport.display_to_template(display);
        self.template.slot_at(p).map(|s| s.month)
    }

    /// Press on the preview surface.
    ///
    /// A slot holding an image becomes the selection and starts a drag. Anything else clears
    /// the selection.
    pub fn pointer_down(&mut self, display: Point) -> Option<Month> {
        self.transforms.end_any_drag();
        let hit = self
            .hit_test(display)
            .filter(|&m| self.library.image_for_month(m).is_some());
        match hit {
            Some(month) => {
                self.selection = Some(month);
                self.transforms.begin_drag(month, display);
            }
            None => self.selection = None,
        }
        hit
    }

    /// Returns whether the active drag moved.
    pub fn pointer_move(&mut self, display: Point) -> bool {
        let Some(month) = self.transforms.active_month() else {
            return false;
        };
        self.transforms
            .update_drag(month, display, self.viewport.scale())
    }

    pub fn pointer_up(&mut self) {
        self.transforms.end_any_drag();
    }

    pub fn pointer_leave(&mut self) {
        self.transforms.end_any_drag();
    }

    /// Select the slot for `month`. Fails when the template has no such slot.
    pub fn select(&mut self, month: Month) -> YearframeResult<()> {
        if self.template.slot(month).is_none() {
            return Err(YearframeError::validation(format!(
                "template '{}' has no slot for month {month}",
                self.template.id
            )));
        }
        if self.transforms.active_month().is_some_and(|m| m != month) {
            self.transforms.end_any_drag();
        }
        self.selection = Some(month);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.transforms.end_any_drag();
        self.selection = None;
    }

    /// Zoom the selected image in by one step. Returns the new scale.
    pub fn zoom_in(&mut self) -> Option<f64> {
        let month = self.selection?;
        Some(self.transforms.nudge_scale(month, SCALE_STEP))
    }

    /// Zoom the selected image out by one step. Returns the new scale.
    pub fn zoom_out(&mut self) -> Option<f64> {
        let month = self.selection?;
        Some(self.transforms.nudge_scale(month, -SCALE_STEP))
    }

    /// Restore the selected image's transform to identity.
    pub fn reset_selected(&mut self) -> bool {
        match self.selection {
            Some(month) => {
                self.transforms.reset(month);
                true
            }
            None => false,
        }
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            template: &self.template,
            images: &self.library,
            transforms: &self.transforms,
            overlay: self.overlay.as_ref(),
        }
    }

    pub fn slot_views(&self) -> Vec<SlotView> {
        slot_views(&self.scene(), &self.viewport, self.selection)
    }

    /// Rasterize the preview at display size.
    pub fn render_preview(&mut self) -> YearframeResult<FrameRGBA> {
        let scene = Scene {
            template: &self.template,
            images: &self.library,
            transforms: &self.transforms,
            overlay: self.overlay.as_ref(),
        };
        self.preview.render(&scene, &self.viewport, self.selection)
    }

    /// Export the current composition. Editing state is left untouched on failure.
    pub fn export(&self, sink: &mut dyn ArtifactSink) -> YearframeResult<ExportReport> {
        self.exporter.export(&self.scene(), sink)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
