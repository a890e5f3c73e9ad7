//! Per-month pan/zoom state and the drag gesture that edits it.
//!
//! Offsets are stored in template pixels and are independent of zoom and of how large the
//! template is drawn on screen. A drag always recomputes the offset from the position where the
//! gesture started, so any sequence of pointer moves ending at the same position yields the same
//! offset.

use std::collections::BTreeMap;

use crate::{
    edit::viewport::ContainerScale,
    foundation::core::{Month, Point, Vec2},
};

pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 3.0;
/// Increment used by the zoom in/out controls.
pub const SCALE_STEP: f64 = 0.1;

/// Pan and zoom applied on top of an image's cover-fit size.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Transform {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        offset_x: 0.0,
        offset_y: 0.0,
        scale: 1.0,
    };

    /// Raw constructor; see [`Transform::sanitized`] for the clamped form.
    pub fn new(offset_x: f64, offset_y: f64, scale: f64) -> Self {
        Self {
            offset_x,
            offset_y,
            scale,
        }
    }

    /// Pan in template pixels.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.offset_x, self.offset_y)
    }

    /// Copy with `scale` clamped to the allowed range and non-finite offsets zeroed.
    pub fn sanitized(self) -> Self {
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            offset_x: finite_or_zero(self.offset_x),
            offset_y: finite_or_zero(self.offset_y),
            scale: clamp_scale(self.scale),
        }
    }
}

/// Clamp a zoom factor into `[MIN_SCALE, MAX_SCALE]`; NaN becomes 1.
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        1.0
    } else {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct DragBaseline {
    month: Month,
    start_pointer: Point,
    start_offset: Vec2,
}

/// Transform store for all months plus the single in-progress drag.
#[derive(Clone, Debug, Default)]
pub struct TransformModel {
    transforms: BTreeMap<Month, Transform>,
    drag: Option<DragBaseline>,
}

impl TransformModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current transform for `month`; identity when never edited.
    pub fn get(&self, month: Month) -> Transform {
        self.transforms.get(&month).copied().unwrap_or_default()
    }

    /// Replace a month's transform wholesale (project load, undo). The value is sanitized.
    pub fn set(&mut self, month: Month, t: Transform) {
        self.transforms.insert(month, t.sanitized());
    }

    /// Months with a non-default transform, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (Month, Transform)> + '_ {
        self.transforms
            .iter()
            .filter(|(_, t)| **t != Transform::IDENTITY)
            .map(|(m, t)| (*m, *t))
    }

    /// Start dragging `month`, ending any other gesture first.
    pub fn begin_drag(&mut self, month: Month, pointer: Point) {
        if let Some(prev) = self.drag
            && prev.month != month
        {
            tracing::debug!(previous = %prev.month, next = %month, "drag replaced");
        }
        self.drag = Some(DragBaseline {
            month,
            start_pointer: pointer,
            start_offset: self.get(month).offset(),
        });
    }

    /// Move the active drag to `pointer` (display pixels).
    ///
    /// Returns `false` when `month` is not the month being dragged; nothing changes then.
    pub fn update_drag(&mut self, month: Month, pointer: Point, scale: ContainerScale) -> bool {
        let Some(base) = self.drag.filter(|d| d.month == month) else {
            return false;
        };
        let delta = scale.to_template(pointer - base.start_pointer);
        let offset = base.start_offset + delta;
        if !(offset.x.is_finite() && offset.y.is_finite()) {
            return false;
        }

        let t = self.transforms.entry(month).or_default();
        t.offset_x = offset.x;
        t.offset_y = offset.y;
        true
    }

    /// End the gesture on `month`. The last applied offset stays.
    pub fn end_drag(&mut self, month: Month) {
        if self.drag.is_some_and(|d| d.month == month) {
            self.drag = None;
        }
    }

    /// End whatever gesture is active (pointer up / pointer left the surface).
    pub fn end_any_drag(&mut self) {
        self.drag = None;
    }

    /// Month being dragged, if any.
    pub fn active_month(&self) -> Option<Month> {
        self.drag.map(|d| d.month)
    }

    /// Set the zoom factor, clamped. Offset is untouched.
    pub fn set_scale(&mut self, month: Month, scale: f64) -> f64 {
        let clamped = clamp_scale(scale);
        self.transforms.entry(month).or_default().scale = clamped;
        clamped
    }

    /// Add `delta` to the zoom factor, then clamp. Off-grid values stay off-grid.
    pub fn nudge_scale(&mut self, month: Month, delta: f64) -> f64 {
        let current = self.get(month).scale;
        self.set_scale(month, current + delta)
    }

    /// Back to identity. Cancels a drag on that month.
    pub fn reset(&mut self, month: Month) {
        self.transforms.remove(&month);
        self.end_drag(month);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/transform.rs"]
mod tests;
