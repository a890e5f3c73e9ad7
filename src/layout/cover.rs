use crate::foundation::core::Size;

fn ratio(w: f64, h: f64) -> f64 {
    let r = w / h;
    if w > 0.0 && h > 0.0 && r.is_finite() {
        r
    } else {
        1.0
    }
}

/// Size an image so it covers a `slot_w x slot_h` rectangle with its aspect preserved.
///
/// Images at least as wide (relative to height) as the slot are pinned to the slot height and
/// overflow horizontally; narrower images are pinned to the slot width. Degenerate dimensions
/// count as a square.
pub fn cover_fit(img_w: f64, img_h: f64, slot_w: f64, slot_h: f64) -> Size {
    let img_ratio = ratio(img_w, img_h);
    let slot_ratio = ratio(slot_w, slot_h);

    if img_ratio >= slot_ratio {
        Size::new(slot_h * img_ratio, slot_h)
    } else {
        Size::new(slot_w, slot_w / img_ratio)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/cover.rs"]
mod tests;
