use std::time::Duration;

use crate::{
    assets::color::ColorDef,
    foundation::error::{YearframeError, YearframeResult},
};

pub const DEFAULT_SUPERSAMPLE: u32 = 2;
pub const MAX_SUPERSAMPLE: u32 = 4;
pub const DEFAULT_DECODE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_FILE_NAME: &str = "year-recap.png";

/// Export configuration.
///
/// `supersample` multiplies the canonical resolution uniformly for every slot and the overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportSettings {
    pub supersample: u32,
    /// Total time allowed for every involved image to finish decoding.
    pub decode_timeout: Duration,
    pub background: ColorDef,
    pub file_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            supersample: DEFAULT_SUPERSAMPLE,
            decode_timeout: DEFAULT_DECODE_TIMEOUT,
            background: ColorDef::WHITE,
            file_name: DEFAULT_FILE_NAME.to_owned(),
        }
    }
}

impl ExportSettings {
    /// Defaults with `YEARFRAME_EXPORT_SUPERSAMPLE` and `YEARFRAME_DECODE_TIMEOUT_MS` applied.
    ///
    /// Unparseable or out-of-range values are ignored.
    pub fn from_env() -> Self {
        Self::default().with_overrides(
            std::env::var("YEARFRAME_EXPORT_SUPERSAMPLE").ok().as_deref(),
            std::env::var("YEARFRAME_DECODE_TIMEOUT_MS").ok().as_deref(),
        )
    }

    fn with_overrides(mut self, supersample: Option<&str>, timeout_ms: Option<&str>) -> Self {
        if let Some(n) = supersample
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|n| (1..=MAX_SUPERSAMPLE).contains(n))
        {
            self.supersample = n;
        }
        if let Some(ms) = timeout_ms
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&ms| ms > 0)
        {
            self.decode_timeout = Duration::from_millis(ms);
        }
        self
    }

    pub fn validate(&self) -> YearframeResult<()> {
        if !(1..=MAX_SUPERSAMPLE).contains(&self.supersample) {
            return Err(YearframeError::validation(format!(
                "supersample must be in 1..={MAX_SUPERSAMPLE}, got {}",
                self.supersample
            )));
        }
        if self.file_name.trim().is_empty() {
            return Err(YearframeError::validation("export file name must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/settings.rs"]
mod tests;
