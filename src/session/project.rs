//! JSON project documents: a template, a list of image files and the edits made to them.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    assets::{
        color::ColorDef,
        decode::PreparedImage,
        library::{AddReport, DEFAULT_FILL_SIZE, IncomingFile},
        upload::{RejectionReason, UploadRejection},
    },
    edit::transform::Transform,
    export::settings::ExportSettings,
    foundation::{
        core::Month,
        error::{YearframeError, YearframeResult},
    },
    session::editor::Editor,
    template::{
        config::{ConfigSource, FsConfigSource},
        model::{DEFAULT_SLOT_BACKGROUND, Template, TemplateDescriptor},
    },
};

/// One image file, optionally pinned to a month.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectImage {
    /// Path relative to the project file.
    pub path: String,
    /// Overrides the position-based assignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<Month>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SlotTransform {
    pub month: Month,
    #[serde(flatten)]
    pub transform: Transform,
}

/// Per-project export overrides on top of [`ExportSettings::from_env`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supersample: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<ColorDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl ExportOverrides {
    /// Overlay the set fields on `settings` and validate the result.
    pub fn apply(&self, mut settings: ExportSettings) -> YearframeResult<ExportSettings> {
        if let Some(n) = self.supersample {
            settings.supersample = n;
        }
        if let Some(bg) = self.background {
            settings.background = bg;
        }
        if let Some(name) = &self.file_name {
            settings.file_name = name.clone();
        }
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectDocument {
    pub template: TemplateDescriptor,
    #[serde(default)]
    pub images: Vec<ProjectImage>,
    #[serde(default)]
    pub transforms: Vec<SlotTransform>,
    #[serde(default)]
    pub export: ExportOverrides,
    /// Give months without an image a neutral default picture.
    #[serde(default)]
    pub fill_missing: bool,
}

impl ProjectDocument {
    /// Parse and validate a project document.
    pub fn from_json(bytes: &[u8]) -> YearframeResult<Self> {
        let doc: Self = serde_json::from_slice(bytes).context("parse project JSON")?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn from_path(path: &Path) -> YearframeResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("open project '{}'", path.display()))?;
        Self::from_json(&bytes)
    }

    pub fn validate(&self) -> YearframeResult<()> {
        self.template.canvas.validate()?;
        for (i, a) in self.transforms.iter().enumerate() {
            if self.transforms[..i].iter().any(|b| b.month == a.month) {
                return Err(YearframeError::validation(format!(
                    "duplicate transform for month {}",
                    a.month
                )));
            }
        }
        Ok(())
    }
}

/// A project opened into an editing session.
pub struct OpenedProject {
    pub editor: Editor,
    pub uploads: AddReport,
    /// Months filled with the default picture.
    pub filled: Vec<Month>,
}

/// Open a project file. Resources are resolved relative to its directory.
#[tracing::instrument]
pub fn open_project(path: &Path) -> YearframeResult<OpenedProject> {
    let doc = ProjectDocument::from_path(path)?;
    let root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    build_editor(&doc, &FsConfigSource::new(root))
}

/// Build an editing session for `doc`, fetching every resource from `source`.
pub fn build_editor(doc: &ProjectDocument, source: &dyn ConfigSource) -> YearframeResult<OpenedProject> {
    let settings = doc.export.apply(ExportSettings::from_env())?;
    let mut editor = Editor::new(Template::placeholder(&doc.template), settings)?;
    if let Some(notice) = editor.load_template(source, &doc.template)? {
        tracing::warn!(%notice, "continuing with an empty template");
    }

    let mut uploads = AddReport::default();
    let mut pinned = Vec::new();
    for entry in &doc.images {
        let bytes = match source.fetch(&entry.path) {
            Ok(b) => b,
            Err(e) => {
                let rejection = UploadRejection {
                    file_name: entry.path.clone(),
                    reason: RejectionReason::Unreadable(e.to_string()),
                };
                tracing::warn!(%rejection, "upload rejected");
                uploads.rejected.push(rejection);
                continue;
            }
        };
        let mut one = editor.add_files([IncomingFile::new(entry.path.clone(), bytes)]);
        if let (Some(&id), Some(month)) = (one.added.first(), entry.month) {
            pinned.push((id, month));
        }
        uploads.added.append(&mut one.added);
        uploads.rejected.append(&mut one.rejected);
    }
    for (id, month) in pinned {
        editor.library_mut().assign_month(id, Some(month))?;
    }

    for st in &doc.transforms {
        editor.transforms_mut().set(st.month, st.transform);
    }

    let filled = if doc.fill_missing {
        let (w, h) = DEFAULT_FILL_SIZE;
        let fill = PreparedImage::solid(w, h, DEFAULT_SLOT_BACKGROUND.to_rgba8_premul().to_array());
        editor.fill_missing_with("default", &fill)
    } else {
        Vec::new()
    };

    Ok(OpenedProject {
        editor,
        uploads,
        filled,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/session/project.rs"]
mod tests;
