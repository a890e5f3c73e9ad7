//! Rectangle-list slot configuration.
//!
//! A template's slots are described by a small JSON document:
//!
//! ```json
//! { "rectangles": [
//!     { "id": 6, "position": { "left": 800, "top": 400 },
//!       "size": { "width": 300, "height": 200 },
//!       "style": { "background": "#f1f5f9", "borderRadius": 8 } }
//! ] }
//! ```
//!
//! `id` is the month. Rectangles may appear in any order; the loader sorts them.

use std::{
    collections::{BTreeMap, HashMap},
    path::PathBuf,
};

use crate::{
    assets::color::ColorDef,
    foundation::{
        core::Month,
        error::{YearframeError, YearframeResult},
    },
    template::model::{Template, TemplateDescriptor, TemplateSlot},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameConfig {
    pub rectangles: Vec<RectangleConfig>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RectangleConfig {
    pub id: i64,
    pub position: RectPosition,
    pub size: RectSize,
    #[serde(default)]
    pub style: Option<RectStyle>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RectPosition {
    pub left: f64,
    pub top: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RectSize {
    pub width: f64,
    pub height: f64,
}

/// Presentation hints. Only `background` is honored; corners are always square.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectStyle {
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub border_radius: Option<f64>,
}

/// Convert a parsed config into slots sorted by month.
pub fn convert_config_to_slots(config: &FrameConfig) -> YearframeResult<Vec<TemplateSlot>> {
    let mut by_month = BTreeMap::<Month, TemplateSlot>::new();
    for rect in &config.rectangles {
        let month = u8::try_from(rect.id)
            .ok()
            .and_then(|n| Month::new(n).ok())
            .ok_or_else(|| {
                YearframeError::config_parse(format!(
                    "rectangle id must be a month in 1..=12, got {}",
                    rect.id
                ))
            })?;

        let background = rect
            .style
            .as_ref()
            .and_then(|s| s.background.as_deref())
            .and_then(|bg| match ColorDef::parse(bg) {
                Ok(c) => Some(c),
                Err(e) => {
                    tracing::debug!(month = %month, background = bg, error = %e, "ignoring slot background");
                    None
                }
            });

        let slot = TemplateSlot {
            background,
            ..TemplateSlot::new(
                month,
                rect.position.left,
                rect.position.top,
                rect.size.width,
                rect.size.height,
            )
        };
        slot.validate()
            .map_err(|e| YearframeError::config_parse(e.to_string()))?;

        if by_month.insert(month, slot).is_some() {
            return Err(YearframeError::config_parse(format!(
                "duplicate rectangle for month {month}"
            )));
        }
    }
    Ok(by_month.into_values().collect())
}

/// Parse config bytes and convert them to slots.
pub fn parse_config(bytes: &[u8]) -> YearframeResult<Vec<TemplateSlot>> {
    let config: FrameConfig = serde_json::from_slice(bytes)
        .map_err(|e| YearframeError::config_parse(format!("invalid rectangle config: {e}")))?;
    convert_config_to_slots(&config)
}

/// Where template resources (configs, overlays) are fetched from.
pub trait ConfigSource {
    /// Fetch the raw bytes behind `reference`. Unreachable resources are
    /// [`YearframeError::ConfigLoad`].
    fn fetch(&self, reference: &str) -> YearframeResult<Vec<u8>>;
}

/// Reads resources relative to a root directory.
#[derive(Clone, Debug)]
pub struct FsConfigSource {
    root: PathBuf,
}

impl FsConfigSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl ConfigSource for FsConfigSource {
    fn fetch(&self, reference: &str) -> YearframeResult<Vec<u8>> {
        let rel = normalize_rel_path(reference)
            .map_err(|e| YearframeError::config_load(format!("'{reference}': {e}")))?;
        let path = self.root.join(&rel);
        std::fs::read(&path).map_err(|e| {
            YearframeError::config_load(format!("read '{}': {e}", path.display()))
        })
    }
}

/// Map-backed source, keyed by normalized reference.
#[derive(Clone, Debug, Default)]
pub struct InMemoryConfigSource {
    entries: HashMap<String, Vec<u8>>,
}

impl InMemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: &str, bytes: impl Into<Vec<u8>>) -> YearframeResult<()> {
        self.entries
            .insert(normalize_rel_path(reference)?, bytes.into());
        Ok(())
    }
}

impl ConfigSource for InMemoryConfigSource {
    fn fetch(&self, reference: &str) -> YearframeResult<Vec<u8>> {
        let key = normalize_rel_path(reference)
            .map_err(|e| YearframeError::config_load(format!("'{reference}': {e}")))?;
        self.entries
            .get(&key)
            .cloned()
            .ok_or_else(|| YearframeError::config_load(format!("'{reference}' not found")))
    }
}

/// Normalize a relative resource reference into a stable `/`-separated key.
///
/// Absolute paths and `..` segments are rejected.
pub fn normalize_rel_path(source: &str) -> YearframeResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(YearframeError::validation("resource paths must be relative"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(YearframeError::validation(
                "resource paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(YearframeError::validation(
            "resource path must contain a file name",
        ));
    }
    Ok(out.join("/"))
}

/// Fetch and parse a slot config. No caching: every call hits the source.
#[tracing::instrument(skip(source))]
pub fn load_slots(source: &dyn ConfigSource, reference: &str) -> YearframeResult<Vec<TemplateSlot>> {
    let bytes = source.fetch(reference)?;
    let slots = parse_config(&bytes)?;
    tracing::debug!(count = slots.len(), "loaded template slots");
    Ok(slots)
}

/// Load the template described by `descriptor`.
pub fn load_template(
    source: &dyn ConfigSource,
    descriptor: &TemplateDescriptor,
) -> YearframeResult<Template> {
    let slots = load_slots(source, &descriptor.config)?;
    Template::new(descriptor, slots).map_err(|e| YearframeError::config_parse(e.to_string()))
}

/// Degradation reported when a template fell back to an empty slot list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadNotice {
    pub template_id: String,
    pub message: String,
}

impl std::fmt::Display for LoadNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "template '{}' has no slots: {}",
            self.template_id, self.message
        )
    }
}

/// Load a template, degrading config failures to an empty-slot template plus a notice.
///
/// Only [`YearframeError::ConfigLoad`] and [`YearframeError::ConfigParse`] are recovered.
pub fn load_template_or_placeholder(
    source: &dyn ConfigSource,
    descriptor: &TemplateDescriptor,
) -> YearframeResult<(Template, Option<LoadNotice>)> {
    match load_template(source, descriptor) {
        Ok(t) => Ok((t, None)),
        Err(e) if e.is_config_failure() => {
            tracing::warn!(template = %descriptor.id, error = %e, "template config unavailable");
            let notice = LoadNotice {
                template_id: descriptor.id.clone(),
                message: e.to_string(),
            };
            Ok((Template::placeholder(descriptor), Some(notice)))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/config.rs"]
mod tests;
