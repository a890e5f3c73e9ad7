use std::io::Cursor;

use anyhow::Context;

use crate::{
    foundation::{error::YearframeResult, math::unpremultiply_rgba8_in_place},
    render::backend::FrameRGBA,
};

/// Encode a frame as a lossless straight-alpha RGBA8 PNG.
pub fn encode_png(frame: &FrameRGBA) -> YearframeResult<Vec<u8>> {
    let mut rgba = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut rgba);
    }

    let mut out = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut out),
        &rgba,
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .context("encode png")?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/export/png.rs"]
mod tests;
