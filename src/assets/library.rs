//! Ordered list of uploaded images and their month assignments.

use std::sync::Arc;

use crate::{
    assets::{
        decode::{DecodeHandle, PreparedImage},
        upload::{UploadPolicy, UploadRejection},
    },
    foundation::{
        core::Month,
        error::{YearframeError, YearframeResult},
    },
};

/// Natural size of the built-in default image used to fill missing months.
pub const DEFAULT_FILL_SIZE: (u32, u32) = (300, 200);

/// Stable identifier of an uploaded image within one library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u64);

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "img-{}", self.0)
    }
}

/// Raw file handed in by the caller.
#[derive(Clone, Debug)]
pub struct IncomingFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

#[derive(Clone, Debug)]
pub struct UploadedImage {
    pub id: ImageId,
    pub source_name: String,
    pub natural_width: u32,
    pub natural_height: u32,
    pub assigned_month: Option<Month>,
    pub pixels: DecodeHandle,
}

/// Outcome of one [`ImageLibrary::add_files`] batch.
#[derive(Debug, Default)]
pub struct AddReport {
    pub added: Vec<ImageId>,
    pub rejected: Vec<UploadRejection>,
}

#[derive(Debug, Default)]
pub struct ImageLibrary {
    images: Vec<UploadedImage>,
    next_id: u64,
    policy: UploadPolicy,
}

impl ImageLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: UploadPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn images(&self) -> &[UploadedImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, id: ImageId) -> Option<&UploadedImage> {
        self.images.iter().find(|img| img.id == id)
    }

    /// Validate, probe and start decoding a batch of files.
    ///
    /// Rejected files are reported and skipped; the accepted ones are appended in input order
    /// and months are then re-assigned by position.
    #[tracing::instrument(skip(self, files))]
    pub fn add_files(&mut self, files: impl IntoIterator<Item = IncomingFile>) -> AddReport {
        let mut report = AddReport::default();
        for file in files {
            match self.policy.check(&file.name, &file.bytes) {
                Ok(probed) => {
                    let pixels = DecodeHandle::spawn(file.name.clone(), Arc::new(file.bytes));
                    let id = self.insert(file.name, probed.width, probed.height, pixels);
                    report.added.push(id);
                }
                Err(rejection) => {
                    tracing::warn!(%rejection, "upload rejected");
                    report.rejected.push(rejection);
                }
            }
        }
        if !report.added.is_empty() {
            self.auto_assign_months();
        }
        report
    }

    /// Append an image whose header is already known. The month is left unassigned.
    pub fn insert(
        &mut self,
        source_name: impl Into<String>,
        natural_width: u32,
        natural_height: u32,
        pixels: DecodeHandle,
    ) -> ImageId {
        let id = ImageId(self.next_id);
        self.next_id += 1;
        self.images.push(UploadedImage {
            id,
            source_name: source_name.into(),
            natural_width,
            natural_height,
            assigned_month: None,
            pixels,
        });
        id
    }

    /// Position `i < 12` gets month `i + 1`; later images keep what they had.
    pub fn auto_assign_months(&mut self) {
        for (idx, img) in self.images.iter_mut().enumerate() {
            if let Some(m) = Month::from_index(idx) {
                img.assigned_month = Some(m);
            }
        }
    }

    /// Every image gets month `(i mod 12) + 1`.
    pub fn cycle_assign_months(&mut self) {
        for (idx, img) in self.images.iter_mut().enumerate() {
            img.assigned_month = Month::from_index(idx % Month::COUNT);
        }
    }

    pub fn assign_month(&mut self, id: ImageId, month: Option<Month>) -> YearframeResult<()> {
        let img = self
            .images
            .iter_mut()
            .find(|img| img.id == id)
            .ok_or_else(|| YearframeError::validation(format!("unknown image {id}")))?;
        img.assigned_month = month;
        Ok(())
    }

    /// Remove an image; its decode handle is released with it.
    pub fn remove(&mut self, id: ImageId) -> Option<UploadedImage> {
        let idx = self.images.iter().position(|img| img.id == id)?;
        Some(self.images.remove(idx))
    }

    /// Move the image at `from` so it ends up at `to`. Month assignments travel with the images.
    pub fn move_image(&mut self, from: usize, to: usize) -> YearframeResult<()> {
        let len = self.images.len();
        if from >= len || to >= len {
            return Err(YearframeError::validation(format!(
                "move {from} -> {to} out of range for {len} images"
            )));
        }
        let img = self.images.remove(from);
        self.images.insert(to, img);
        Ok(())
    }

    /// Months with no assigned image, ascending.
    pub fn missing_months(&self) -> Vec<Month> {
        Month::all()
            .filter(|m| !self.images.iter().any(|img| img.assigned_month == Some(*m)))
            .collect()
    }

    /// Assign `image` to every missing month. Returns the months that were filled.
    pub fn fill_missing_with(&mut self, name: &str, image: &PreparedImage) -> Vec<Month> {
        let missing = self.missing_months();
        for &month in &missing {
            let pixels = DecodeHandle::ready(name, image.clone());
            let id = self.insert(name, image.width, image.height, pixels);
            if let Some(img) = self.images.iter_mut().find(|img| img.id == id) {
                img.assigned_month = Some(month);
            }
        }
        missing
    }

    /// Image shown in `month`'s slot. With duplicate claims the last in list order wins.
    pub fn image_for_month(&self, month: Month) -> Option<&UploadedImage> {
        self.images
            .iter()
            .rev()
            .find(|img| img.assigned_month == Some(month))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/library.rs"]
mod tests;
