use crate::{
    assets::color::ColorDef,
    foundation::{
        core::{Canvas, Month, Point, Rect, Size},
        error::{YearframeError, YearframeResult},
    },
};

/// Placeholder fill (`#f1f5f9`) for slots whose config carries no usable background.
pub const DEFAULT_SLOT_BACKGROUND: ColorDef = ColorDef {
    r: 241.0 / 255.0,
    g: 245.0 / 255.0,
    b: 249.0 / 255.0,
    a: 1.0,
};

/// Rectangular region of the template reserved for one month, in template pixels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TemplateSlot {
    pub month: Month,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<ColorDef>,
}

impl TemplateSlot {
    /// Slot without a background color. Not validated.
    pub fn new(month: Month, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            month,
            x,
            y,
            width,
            height,
            background: None,
        }
    }

    /// Slot size in template pixels.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Top-left corner in template coordinates.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Slot rectangle in template coordinates.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.origin(), self.size())
    }

    /// Placeholder color, falling back to the template default.
    pub fn placeholder_color(&self) -> ColorDef {
        self.background.unwrap_or(DEFAULT_SLOT_BACKGROUND)
    }

    /// Reject non-finite coordinates and non-positive sizes.
    pub fn validate(&self) -> YearframeResult<()> {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(YearframeError::validation(format!(
                "slot {} has non-finite geometry",
                self.month
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(YearframeError::validation(format!(
                "slot {} must have positive size, got {}x{}",
                self.month, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Static description of a template: where its config and overlay live.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TemplateDescriptor {
    pub id: String,
    pub name: String,
    /// Relative reference of the rectangle-list config.
    pub config: String,
    /// Relative reference of the full-canvas overlay image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<String>,
    #[serde(default = "default_canvas")]
    pub canvas: Canvas,
}

fn default_canvas() -> Canvas {
    Canvas::HD
}

impl TemplateDescriptor {
    /// The frames shipped with the application.
    pub fn builtin() -> Vec<TemplateDescriptor> {
        [(1, "Basic"), (2, "Ganadi white"), (3, "Ganadi black")]
            .into_iter()
            .map(|(n, name)| TemplateDescriptor {
                id: format!("frame-{n}"),
                name: name.to_owned(),
                config: format!("frame-{n}.json"),
                overlay: Some(format!("frame-{n}.png")),
                canvas: Canvas::HD,
            })
            .collect()
    }
}

/// Loaded template. An empty slot list is valid (still loading, or the load failed).
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub canvas: Canvas,
    /// Sorted by month, one per month.
    pub slots: Vec<TemplateSlot>,
    pub overlay: Option<String>,
}

impl Template {
    /// Template with no slots yet.
    pub fn placeholder(descriptor: &TemplateDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            canvas: descriptor.canvas,
            slots: Vec::new(),
            overlay: descriptor.overlay.clone(),
        }
    }

    /// Build a template from slots, sorting them and rejecting duplicate months.
    pub fn new(
        descriptor: &TemplateDescriptor,
        mut slots: Vec<TemplateSlot>,
    ) -> YearframeResult<Self> {
        descriptor.canvas.validate()?;
        slots.sort_by_key(|s| s.month);
        for s in &slots {
            s.validate()?;
        }
        if let Some(w) = slots.windows(2).find(|w| w[0].month == w[1].month) {
            return Err(YearframeError::validation(format!(
                "duplicate slot for month {}",
                w[0].month
            )));
        }
        Ok(Self {
            slots,
            ..Self::placeholder(descriptor)
        })
    }

    /// Slot for `month`, if the template defines one.
    pub fn slot(&self, month: Month) -> Option<&TemplateSlot> {
        self.slots.iter().find(|s| s.month == month)
    }

    /// Topmost slot containing `p` (template coordinates). Later slots paint above earlier ones.
    pub fn slot_at(&self, p: Point) -> Option<&TemplateSlot> {
        self.slots.iter().rev().find(|s| {
            let r = s.rect();
            p.x >= r.x0 && p.x < r.x1 && p.y >= r.y0 && p.y < r.y1
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/model.rs"]
mod tests;
