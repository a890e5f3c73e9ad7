use image::ImageFormat;

use crate::assets::decode::{ProbedImage, probe_image};

/// Default upload size ceiling (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Acceptance rules applied to every incoming file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    pub accepted: Vec<ImageFormat>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            accepted: vec![ImageFormat::Png, ImageFormat::Jpeg],
        }
    }
}

impl UploadPolicy {
    /// Validate one file and read its header.
    ///
    /// Size is checked before the content is sniffed, so oversized files are never parsed.
    pub fn check(&self, file_name: &str, bytes: &[u8]) -> Result<ProbedImage, UploadRejection> {
        let reject = |reason| UploadRejection {
            file_name: file_name.to_owned(),
            reason,
        };

        let size_bytes = bytes.len() as u64;
        if size_bytes > self.max_bytes {
            return Err(reject(RejectionReason::TooLarge {
                size_bytes,
                max_bytes: self.max_bytes,
            }));
        }

        let detected = image::guess_format(bytes).ok();
        match detected {
            Some(f) if self.accepted.contains(&f) => {}
            _ => {
                return Err(reject(RejectionReason::UnsupportedType {
                    detected: detected.map(|f| format!("{f:?}").to_ascii_lowercase()),
                }));
            }
        }

        probe_image(bytes).map_err(|e| reject(RejectionReason::Unreadable(e.to_string())))
    }
}

/// Why a single file was not accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectionReason {
    TooLarge { size_bytes: u64, max_bytes: u64 },
    UnsupportedType { detected: Option<String> },
    Unreadable(String),
}

impl RejectionReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TooLarge { .. } => "too-large",
            Self::UnsupportedType { .. } => "invalid-type",
            Self::Unreadable(_) => "other",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLarge {
                size_bytes,
                max_bytes,
            } => write!(f, "file is {size_bytes} bytes, limit is {max_bytes}"),
            Self::UnsupportedType { detected: Some(d) } => {
                write!(f, "unsupported type '{d}' (PNG or JPEG required)")
            }
            Self::UnsupportedType { detected: None } => {
                write!(f, "unrecognized file type (PNG or JPEG required)")
            }
            Self::Unreadable(msg) => write!(f, "unreadable image: {msg}"),
        }
    }
}

/// Per-file upload rejection; never blocks the rest of a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadRejection {
    pub file_name: String,
    pub reason: RejectionReason,
}

impl std::fmt::Display for UploadRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' [{}]: {}", self.file_name, self.reason.code(), self.reason)
    }
}

impl std::error::Error for UploadRejection {}

#[cfg(test)]
#[path = "../../tests/unit/assets/upload.rs"]
mod tests;
