use crate::{
    edit::transform::Transform,
    foundation::core::{Point, Rect, Size, Vec2},
    layout::cover::cover_fit,
    template::model::TemplateSlot,
};

/// Where an image lands for one slot, in template pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImagePlacement {
    /// Cover-fit size before zoom.
    pub base_size: Size,
    /// Drawn size (`base_size * scale`).
    pub size: Size,
    /// Image rectangle relative to the slot's top-left corner. May extend past the slot.
    pub local: Rect,
    /// Image rectangle in canvas coordinates.
    pub absolute: Rect,
    /// Clip rectangle (the slot) in canvas coordinates.
    pub clip: Rect,
}

impl ImagePlacement {
    /// Part of the image that is actually visible, in canvas coordinates.
    pub fn visible(&self) -> Rect {
        self.absolute.intersect(self.clip)
    }

    pub fn center(&self) -> Point {
        self.absolute.center()
    }
}

/// Place a `natural` sized image inside `slot` with `transform` applied.
///
/// `center = slot_center + offset` and `top_left = center - size / 2`. This is the only place the
/// formula lives; preview and export both go through it.
pub fn place_image(slot: &TemplateSlot, natural: Size, transform: Transform) -> ImagePlacement {
    let base_size = cover_fit(natural.width, natural.height, slot.width, slot.height);
    let size = base_size * transform.scale;

    let slot_center = Vec2::new(slot.width / 2.0, slot.height / 2.0);
    let center = slot_center + transform.offset();
    let top_left = center - Vec2::new(size.width / 2.0, size.height / 2.0);

    let local = Rect::from_origin_size(top_left.to_point(), size);
    let absolute = local + slot.origin().to_vec2();

    ImagePlacement {
        base_size,
        size,
        local,
        absolute,
        clip: slot.rect(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/placement.rs"]
mod tests;
