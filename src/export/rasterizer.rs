use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use crate::{
    compile::plan::{ImageKey, PlanOptions, Scene, compile_scene},
    export::{
        png::encode_png,
        settings::ExportSettings,
        sink::{Artifact, ArtifactSink},
    },
    foundation::{
        core::Month,
        error::{YearframeError, YearframeResult},
    },
    layout::placement::ImagePlacement,
    render::backend::{BackendKind, PreparedImages, create_backend},
};

/// Message of the error returned when an export is requested while another is running.
pub const EXPORT_BUSY: &str = "another export is already in progress";

/// Summary of a finished export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportReport {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub supersample: u32,
    pub byte_len: usize,
    /// Image geometry per month in template pixels (divide output pixels by `supersample`).
    pub placements: BTreeMap<Month, ImagePlacement>,
}

/// Offscreen compositor producing the final PNG.
///
/// One export runs at a time; overlapping requests fail fast instead of queueing.
#[derive(Debug, Default)]
pub struct ExportRasterizer {
    settings: ExportSettings,
    in_flight: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ExportRasterizer {
    pub fn new(settings: ExportSettings) -> YearframeResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn acquire(&self) -> YearframeResult<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| YearframeError::export(EXPORT_BUSY))?;
        Ok(InFlight(&self.in_flight))
    }

    /// Wait (bounded) for every raster the scene needs.
    fn await_images(
        &self,
        scene: &Scene<'_>,
        keys: impl Iterator<Item = ImageKey>,
    ) -> YearframeResult<PreparedImages> {
        let started = Instant::now();
        let deadline = started + self.settings.decode_timeout;
        let mut images = PreparedImages::new();

        for key in keys {
            let handle = scene.handle(key).ok_or_else(|| {
                YearframeError::export(format!("no image source for {key}"))
            })?;
            let remaining = deadline.saturating_duration_since(Instant::now());
            let img = handle.wait(remaining).map_err(|e| match e {
                YearframeError::ImageDecodeTimeout { reference, .. } => {
                    YearframeError::ImageDecodeTimeout {
                        reference,
                        waited_ms: u64::try_from(started.elapsed().as_millis())
                            .unwrap_or(u64::MAX),
                    }
                }
                other => other,
            })?;
            images.insert(key, img);
        }
        Ok(images)
    }

    /// Compose the scene at canonical size times the supersample factor, encode it as PNG and
    /// hand it to `sink`.
    ///
    /// Nothing is delivered unless every step succeeds.
    #[tracing::instrument(skip(self, scene, sink), fields(template = %scene.template.id))]
    pub fn export(
        &self,
        scene: &Scene<'_>,
        sink: &mut dyn ArtifactSink,
    ) -> YearframeResult<ExportReport> {
        let _guard = self.acquire()?;
        let s = &self.settings;

        let plan = compile_scene(scene, &PlanOptions::export(s.supersample, s.background))?;
        let images = self.await_images(scene, plan.image_keys())?;

        let mut backend = create_backend(BackendKind::Cpu)?;
        let frame = backend.render_plan(&plan, &images)?;
        let bytes = encode_png(&frame).map_err(|e| YearframeError::export(e.to_string()))?;

        let artifact = Artifact {
            file_name: s.file_name.clone(),
            mime_type: "image/png",
            bytes,
        };
        sink.deliver(&artifact)?;

        tracing::info!(
            width = frame.width,
            height = frame.height,
            bytes = artifact.bytes.len(),
            "export finished"
        );
        Ok(ExportReport {
            file_name: artifact.file_name,
            width: frame.width,
            height: frame.height,
            supersample: s.supersample,
            byte_len: artifact.bytes.len(),
            placements: plan.placements,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/rasterizer.rs"]
mod tests;
