use crate::foundation::{
    core::{Canvas, Point, Size, Vec2},
    error::{YearframeError, YearframeResult},
};

/// Ratio of on-screen width to canonical template width.
///
/// Used to convert pointer motion into template pixels; never applied to stored offsets.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ContainerScale(f64);

impl ContainerScale {
    pub const IDENTITY: ContainerScale = ContainerScale(1.0);

    /// Rejects zero, negative and non-finite factors.
    pub fn new(value: f64) -> YearframeResult<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(YearframeError::validation(format!(
                "container scale must be finite and > 0, got {value}"
            )))
        }
    }

    /// `rendered_width / canonical_width`.
    pub fn from_widths(rendered_width: f64, canonical_width: u32) -> YearframeResult<Self> {
        if canonical_width == 0 {
            return Err(YearframeError::validation("canonical width must be > 0"));
        }
        Self::new(rendered_width / f64::from(canonical_width))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Display-pixel delta -> template-pixel delta.
    pub fn to_template(self, display_delta: Vec2) -> Vec2 {
        display_delta / self.0
    }
}

impl Default for ContainerScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// On-screen placement of the template, recomputed whenever the container is resized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    canvas: Canvas,
    scale: ContainerScale,
}

impl Viewport {
    /// Viewport showing the canvas at its canonical size.
    pub fn canonical(canvas: Canvas) -> Self {
        Self {
            canvas,
            scale: ContainerScale::IDENTITY,
        }
    }

    /// Viewport for a canvas drawn `rendered_width` display pixels wide.
    pub fn new(canvas: Canvas, rendered_width: f64) -> YearframeResult<Self> {
        canvas.validate()?;
        Ok(Self {
            canvas,
            scale: ContainerScale::from_widths(rendered_width, canvas.width)?,
        })
    }

    /// Recompute the container scale for a new rendered width. Invalid widths leave it unchanged.
    pub fn resize(&mut self, rendered_width: f64) -> YearframeResult<ContainerScale> {
        self.scale = ContainerScale::from_widths(rendered_width, self.canvas.width)?;
        tracing::debug!(rendered_width, scale = self.scale.get(), "viewport resized");
        Ok(self.scale)
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn scale(&self) -> ContainerScale {
        self.scale
    }

    /// Rendered size in display pixels; the aspect ratio always matches the canvas.
    pub fn display_size(&self) -> Size {
        self.canvas.size() * self.scale.get()
    }

    /// Map a pointer position into template coordinates.
    pub fn display_to_template(&self, p: Point) -> Point {
        Point::new(p.x / self.scale.get(), p.y / self.scale.get())
    }

    pub fn template_to_display(&self, p: Point) -> Point {
        Point::new(p.x * self.scale.get(), p.y * self.scale.get())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/viewport.rs"]
mod tests;
