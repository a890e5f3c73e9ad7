use crate::assets::upload::UploadRejection;

/// Convenience result type used across yearframe.
pub type YearframeResult<T> = Result<T, YearframeError>;

/// Top-level error taxonomy used by editor and export APIs.
///
/// Every variant has a defined recovered state; none of them should end an editing session.
#[derive(thiserror::Error, Debug)]
pub enum YearframeError {
    /// Invalid caller-provided arguments or model data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Template slot configuration could not be fetched.
    #[error("config load error: {0}")]
    ConfigLoad(String),

    /// Template slot configuration was fetched but is not a valid rectangle list.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// An image did not finish decoding within the export deadline.
    #[error("image decode timeout: '{reference}' was not ready after {waited_ms} ms")]
    ImageDecodeTimeout {
        /// Reference (file name or overlay path) of the image that was not ready.
        reference: String,
        /// Time spent waiting before giving up.
        waited_ms: u64,
    },

    /// A single uploaded file was rejected.
    #[error("upload rejected: {0}")]
    UploadRejected(UploadRejection),

    /// Offscreen composition, encoding, or artifact delivery failed.
    #[error("export rasterization error: {0}")]
    ExportRasterization(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl YearframeError {
    /// Build a [`YearframeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`YearframeError::ConfigLoad`] value.
    pub fn config_load(msg: impl Into<String>) -> Self {
        Self::ConfigLoad(msg.into())
    }

    /// Build a [`YearframeError::ConfigParse`] value.
    pub fn config_parse(msg: impl Into<String>) -> Self {
        Self::ConfigParse(msg.into())
    }

    /// Build a [`YearframeError::ExportRasterization`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::ExportRasterization(msg.into())
    }

    /// `true` for the config variants that callers recover from with an empty-slot template.
    pub fn is_config_failure(&self) -> bool {
        matches!(self, Self::ConfigLoad(_) | Self::ConfigParse(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
