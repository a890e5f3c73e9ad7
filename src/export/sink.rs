use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{YearframeError, YearframeResult};

/// An encoded export ready for delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Destination for finished exports (download, file save, upload...).
pub trait ArtifactSink {
    /// Deliver one artifact. Failures surface as export errors.
    fn deliver(&mut self, artifact: &Artifact) -> YearframeResult<()>;
}

/// Writes artifacts into a directory under their own file name.
#[derive(Clone, Debug)]
pub struct FileSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Paths written so far, in delivery order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn target(&self, file_name: &str) -> YearframeResult<PathBuf> {
        let name = Path::new(file_name)
            .file_name()
            .filter(|n| *n == std::ffi::OsStr::new(file_name))
            .ok_or_else(|| {
                YearframeError::export(format!("artifact name '{file_name}' is not a plain file name"))
            })?;
        Ok(self.dir.join(name))
    }
}

impl ArtifactSink for FileSink {
    fn deliver(&mut self, artifact: &Artifact) -> YearframeResult<()> {
        let path = self.target(&artifact.file_name)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))
            .map_err(|e| YearframeError::export(format!("{e:#}")))?;
        std::fs::write(&path, &artifact.bytes)
            .with_context(|| format!("write '{}'", path.display()))
            .map_err(|e| YearframeError::export(format!("{e:#}")))?;
        tracing::info!(path = %path.display(), bytes = artifact.bytes.len(), "artifact written");
        self.written.push(path);
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    artifacts: Vec<Artifact>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the captured artifacts.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }
}

impl ArtifactSink for InMemorySink {
    fn deliver(&mut self, artifact: &Artifact) -> YearframeResult<()> {
        self.artifacts.push(artifact.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;
