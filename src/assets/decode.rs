use std::{
    io::Cursor,
    sync::{Arc, Condvar, Mutex, PoisonError},
    time::Duration,
};

use anyhow::Context;
use image::{ImageDecoder, metadata::Orientation};

use crate::foundation::{
    error::{YearframeError, YearframeResult},
    math::premultiply_rgba8_in_place,
};

/// Decoded raster in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Build a single-color image; used for default fills and fixtures.
    pub fn solid(width: u32, height: u32, premul: [u8; 4]) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            rgba8_premul: Arc::new(premul.repeat(len)),
        }
    }
}

/// Header-level information available before the full pixel decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbedImage {
    pub format: image::ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Sniff the container format and read natural dimensions without decoding pixels.
///
/// Dimensions are reported as displayed: an EXIF orientation that rotates by a quarter turn
/// swaps width and height.
pub fn probe_image(bytes: &[u8]) -> YearframeResult<ProbedImage> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("sniff image format")?;
    let format = reader
        .format()
        .ok_or_else(|| YearframeError::validation("unrecognized image format"))?;
    let mut decoder = reader.into_decoder().context("read image header")?;
    let (width, height) = oriented_size(decoder.dimensions(), read_orientation(&mut decoder));
    Ok(ProbedImage {
        format,
        width,
        height,
    })
}

/// Decode encoded image bytes to 8-bit sRGB, apply EXIF orientation, and premultiply.
///
/// Grayscale, 16-bit and palette sources all land in the same RGBA8 representation.
pub fn decode_image(bytes: &[u8]) -> YearframeResult<PreparedImage> {
    let mut decoder = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("sniff image format")?
        .into_decoder()
        .context("read image header")?;
    let orientation = read_orientation(&mut decoder);
    let mut dyn_img =
        image::DynamicImage::from_decoder(decoder).context("decode image from memory")?;
    dyn_img.apply_orientation(orientation);

    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

// Unreadable EXIF is treated as upright.
fn read_orientation(decoder: &mut impl ImageDecoder) -> Orientation {
    match decoder.orientation() {
        Ok(o) => o,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unreadable image orientation");
            Orientation::NoTransforms
        }
    }
}

fn oriented_size((width, height): (u32, u32), orientation: Orientation) -> (u32, u32) {
    match orientation {
        Orientation::Rotate90
        | Orientation::Rotate270
        | Orientation::Rotate90FlipH
        | Orientation::Rotate270FlipH => (height, width),
        _ => (width, height),
    }
}

#[derive(Debug)]
enum DecodeState {
    Pending,
    Ready(PreparedImage),
    Failed(String),
}

#[derive(Debug)]
struct DecodeSlot {
    reference: String,
    state: Mutex<DecodeState>,
    ready: Condvar,
}

/// Shared handle to an image whose pixels may still be decoding.
///
/// Cloning is cheap; the decoded buffer is released when the last clone is dropped.
#[derive(Clone, Debug)]
pub struct DecodeHandle {
    slot: Arc<DecodeSlot>,
}

impl DecodeHandle {
    fn with_state(reference: impl Into<String>, state: DecodeState) -> Self {
        Self {
            slot: Arc::new(DecodeSlot {
                reference: reference.into(),
                state: Mutex::new(state),
                ready: Condvar::new(),
            }),
        }
    }

    /// Handle that is already decoded.
    pub fn ready(reference: impl Into<String>, image: PreparedImage) -> Self {
        Self::with_state(reference, DecodeState::Ready(image))
    }

    /// Handle that stays pending until [`DecodeHandle::complete`] is called.
    pub fn pending(reference: impl Into<String>) -> Self {
        Self::with_state(reference, DecodeState::Pending)
    }

    /// Decode `bytes` on the rayon pool; the handle becomes ready when the worker finishes.
    pub fn spawn(reference: impl Into<String>, bytes: Arc<Vec<u8>>) -> Self {
        let handle = Self::pending(reference);
        let worker = handle.clone();
        rayon::spawn(move || {
            let result = decode_image(&bytes);
            worker.complete(result);
        });
        handle
    }

    /// Resolve a pending handle. Later calls after the first resolution are ignored.
    pub fn complete(&self, result: YearframeResult<PreparedImage>) {
        let mut state = self.slot.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !matches!(*state, DecodeState::Pending) {
            return;
        }
        *state = match result {
            Ok(img) => DecodeState::Ready(img),
            Err(e) => DecodeState::Failed(e.to_string()),
        };
        drop(state);
        self.slot.ready.notify_all();
    }

    /// Name of the file or resource this handle decodes.
    pub fn reference(&self) -> &str {
        &self.slot.reference
    }

    pub fn is_ready(&self) -> bool {
        let state = self.slot.state.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(*state, DecodeState::Ready(_))
    }

    /// Decoded pixels if already available; never blocks.
    pub fn try_get(&self) -> Option<PreparedImage> {
        let state = self.slot.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            DecodeState::Ready(img) => Some(img.clone()),
            _ => None,
        }
    }

    /// Block until decoded, failed, or `timeout` elapses.
    ///
    /// A timeout yields [`YearframeError::ImageDecodeTimeout`]; a decoder failure yields
    /// [`YearframeError::ExportRasterization`] naming the reference.
    pub fn wait(&self, timeout: Duration) -> YearframeResult<PreparedImage> {
        let state = self.slot.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (state, _) = self
            .slot
            .ready
            .wait_timeout_while(state, timeout, |s| matches!(s, DecodeState::Pending))
            .unwrap_or_else(PoisonError::into_inner);

        match &*state {
            DecodeState::Ready(img) => Ok(img.clone()),
            DecodeState::Failed(msg) => Err(YearframeError::export(format!(
                "failed to decode '{}': {msg}",
                self.slot.reference
            ))),
            DecodeState::Pending => Err(YearframeError::ImageDecodeTimeout {
                reference: self.slot.reference.clone(),
                waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
