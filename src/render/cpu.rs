use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::decode::PreparedImage,
    compile::plan::{DrawOp, ImageKey, RenderPlan},
    foundation::{
        core::{Affine, Rect, Rgba8Premul, Vec2},
        error::{YearframeError, YearframeResult},
        math::unpremultiply_rgba8_in_place,
    },
    render::backend::{FrameRGBA, PreparedImages, RenderBackend},
};

#[derive(Clone)]
struct ImagePaint {
    /// Identity of the pixel buffer the paint was built from.
    source: usize,
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

/// CPU backend built on `vello_cpu`.
///
/// Image paints are cached per key and rebuilt only when the underlying pixel buffer changes,
/// so repeated preview renders of the same scene do not re-upload pixels.
pub struct CpuBackend {
    ctx: Option<vello_cpu::RenderContext>,
    image_cache: HashMap<ImageKey, ImagePaint>,
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            ctx: None,
            image_cache: HashMap::new(),
        }
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> YearframeResult<R>,
    ) -> YearframeResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn image_paint_for(
        &mut self,
        key: ImageKey,
        images: &PreparedImages,
    ) -> YearframeResult<ImagePaint> {
        let prepared = images
            .get(key)
            .ok_or_else(|| YearframeError::export(format!("no decoded pixels for {key}")))?;
        let source = Arc::as_ptr(&prepared.rgba8_premul) as usize;
        if let Some(p) = self.image_cache.get(&key)
            && p.source == source
        {
            return Ok(p.clone());
        }

        let out = ImagePaint {
            source,
            paint: rgba_premul_to_image(prepared)?,
            w: prepared.width,
            h: prepared.height,
        };
        self.image_cache.insert(key, out.clone());
        Ok(out)
    }

    fn draw_op(
        &mut self,
        op: &DrawOp,
        surface: Affine,
        images: &PreparedImages,
        ctx: &mut vello_cpu::RenderContext,
    ) -> YearframeResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match op {
            DrawOp::FillRect { rect, color } => {
                ctx.set_transform(affine_to_cpu(surface));
                ctx.set_paint(solid_paint(*color));
                ctx.fill_rect(&rect_to_cpu(*rect));
                Ok(())
            }
            DrawOp::Image { key, dest, clip } => {
                let visible = dest.intersect(*clip);
                if visible.width() <= 0.0
                    || visible.height() <= 0.0
                    || dest.width() <= 0.0
                    || dest.height() <= 0.0
                {
                    return Ok(());
                }
                let img = self.image_paint_for(*key, images)?;
                if img.w == 0 || img.h == 0 {
                    return Ok(());
                }

                // Image pixel space -> template space -> surface.
                let sx = dest.width() / f64::from(img.w);
                let sy = dest.height() / f64::from(img.h);
                let tr = surface
                    * Affine::translate(Vec2::new(dest.x0, dest.y0))
                    * Affine::scale_non_uniform(sx, sy);
                let src = Rect::new(
                    (visible.x0 - dest.x0) / sx,
                    (visible.y0 - dest.y0) / sy,
                    (visible.x1 - dest.x0) / sx,
                    (visible.y1 - dest.y0) / sy,
                );

                ctx.set_transform(affine_to_cpu(tr));
                ctx.set_paint(img.paint);
                ctx.fill_rect(&rect_to_cpu(src));
                Ok(())
            }
            DrawOp::Outline { rect, width, color } => {
                let w = width.min(rect.width() / 2.0).min(rect.height() / 2.0);
                if w <= 0.0 {
                    return Ok(());
                }
                ctx.set_transform(affine_to_cpu(surface));
                ctx.set_paint(solid_paint(*color));
                for edge in [
                    Rect::new(rect.x0, rect.y0, rect.x1, rect.y0 + w),
                    Rect::new(rect.x0, rect.y1 - w, rect.x1, rect.y1),
                    Rect::new(rect.x0, rect.y0 + w, rect.x0 + w, rect.y1 - w),
                    Rect::new(rect.x1 - w, rect.y0 + w, rect.x1, rect.y1 - w),
                ] {
                    ctx.fill_rect(&rect_to_cpu(edge));
                }
                Ok(())
            }
        }
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(skip(self, plan, images), fields(width = plan.width, height = plan.height))]
    fn render_plan(
        &mut self,
        plan: &RenderPlan,
        images: &PreparedImages,
    ) -> YearframeResult<FrameRGBA> {
        let width: u16 = plan
            .width
            .try_into()
            .map_err(|_| YearframeError::export("surface width exceeds u16"))?;
        let height: u16 = plan
            .height
            .try_into()
            .map_err(|_| YearframeError::export("surface height exceeds u16"))?;

        let surface = plan.surface_transform();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);

        self.with_ctx_mut(width, height, |this, ctx| {
            for op in &plan.ops {
                this.draw_op(op, surface, images, ctx)?;
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(())
        })?;

        Ok(FrameRGBA {
            width: plan.width,
            height: plan.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn solid_paint(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    let mut px = c.to_array();
    unpremultiply_rgba8_in_place(&mut px);
    vello_cpu::peniko::Color::from_rgba8(px[0], px[1], px[2], px[3])
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> YearframeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| YearframeError::export("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| YearframeError::export("image height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(YearframeError::export("image byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn rgba_premul_to_image(prepared: &PreparedImage) -> YearframeResult<vello_cpu::Image> {
    let pixmap =
        pixmap_from_premul_bytes(&prepared.rgba8_premul, prepared.width, prepared.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
