//! Image staging for listing drafts.
//!
//! A draft tracks two ordered collections: images the backend already stores
//! (identified by id and URL) and files the admin selected locally but has not
//! uploaded yet. Both count against one maximum.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default number of images a listing may carry.
pub const DEFAULT_MAX_IMAGES: usize = 4;

/// Largest accepted staged file.
pub const MAX_STAGED_FILE_BYTES: usize = 10 * 1024 * 1024;

/// An image already persisted by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingImage {
    /// Backend image id; images without one cannot be retained on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Path relative to the backend's public base URL.
    pub url: String,
}

/// Validation errors for locally selected files.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StagedFileError {
    /// File name was blank.
    #[error("file name must not be empty")]
    EmptyFileName,
    /// Content type was not `image/*`.
    #[error("file must be an image, got {content_type}")]
    NotAnImage { content_type: String },
    /// File had no bytes.
    #[error("file must not be empty")]
    Empty,
    /// File exceeded [`MAX_STAGED_FILE_BYTES`].
    #[error("file is {size} bytes; images may be at most {max} bytes", max = MAX_STAGED_FILE_BYTES)]
    TooLarge { size: usize },
}

/// A locally selected image awaiting upload. Identity is positional.
#[derive(Clone, PartialEq, Eq)]
pub struct StagedFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl StagedFile {
    /// Validate and construct a staged file.
    ///
    /// # Examples
    /// ```
    /// use dashboard::domain::StagedFile;
    ///
    /// let file = StagedFile::new("room.png", "image/png", vec![1, 2, 3]).unwrap();
    /// assert_eq!(file.len(), 3);
    /// assert!(StagedFile::new("notes.txt", "text/plain", vec![1]).is_err());
    /// ```
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, StagedFileError> {
        let file_name = file_name.into();
        let content_type = content_type.into();
        if file_name.trim().is_empty() {
            return Err(StagedFileError::EmptyFileName);
        }
        if !content_type.starts_with("image/") {
            return Err(StagedFileError::NotAnImage { content_type });
        }
        if bytes.is_empty() {
            return Err(StagedFileError::Empty);
        }
        if bytes.len() > MAX_STAGED_FILE_BYTES {
            return Err(StagedFileError::TooLarge { size: bytes.len() });
        }
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Original file name.
    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    /// MIME type, always `image/*`.
    pub fn content_type(&self) -> &str {
        self.content_type.as_str()
    }

    /// Raw file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; empty files are rejected on construction.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for StagedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Result of [`ImageStaging::add_files`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOutcome {
    /// Files appended to the staged collection.
    pub accepted: usize,
    /// Files discarded because no slots were left.
    pub dropped: usize,
}

/// Existing and staged images of one draft.
///
/// ## Invariants
/// - `add_files` never makes `existing + staged` exceed `max_images`.
/// - Removing from one collection never alters the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageStaging {
    existing: Vec<ExistingImage>,
    staged: Vec<StagedFile>,
    max_images: usize,
}

impl Default for ImageStaging {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IMAGES)
    }
}

impl ImageStaging {
    /// Empty staging area with the given capacity.
    pub fn new(max_images: usize) -> Self {
        Self {
            existing: Vec::new(),
            staged: Vec::new(),
            max_images,
        }
    }

    /// Staging area seeded with images the backend already stores.
    ///
    /// Every server image is kept even beyond `max_images`; dropping one here
    /// would delete it on the next update.
    pub fn with_existing(max_images: usize, existing: Vec<ExistingImage>) -> Self {
        Self {
            existing,
            staged: Vec::new(),
            max_images,
        }
    }

    /// Persisted images still retained by the draft.
    pub fn existing(&self) -> &[ExistingImage] {
        &self.existing
    }

    /// Locally selected files awaiting upload.
    pub fn staged(&self) -> &[StagedFile] {
        &self.staged
    }

    /// Configured maximum.
    pub fn max_images(&self) -> usize {
        self.max_images
    }

    /// Images currently held across both collections.
    pub fn total(&self) -> usize {
        self.existing.len() + self.staged.len()
    }

    /// Slots left for new files.
    pub fn remaining_slots(&self) -> usize {
        self.max_images.saturating_sub(self.total())
    }

    /// Append files in order until the maximum is reached; the rest are
    /// dropped without error.
    ///
    /// # Examples
    /// ```
    /// use dashboard::domain::{ImageStaging, StagedFile};
    ///
    /// let file = || StagedFile::new("a.png", "image/png", vec![0]).unwrap();
    /// let mut staging = ImageStaging::new(4);
    /// let outcome = staging.add_files(vec![file(), file(), file(), file(), file()]);
    /// assert_eq!((outcome.accepted, outcome.dropped), (4, 1));
    /// ```
    pub fn add_files(&mut self, files: impl IntoIterator<Item = StagedFile>) -> AddOutcome {
        let slots = self.remaining_slots();
        let mut outcome = AddOutcome {
            accepted: 0,
            dropped: 0,
        };
        for file in files {
            if outcome.accepted < slots {
                self.staged.push(file);
                outcome.accepted += 1;
            } else {
                outcome.dropped += 1;
            }
        }
        if outcome.dropped > 0 {
            tracing::debug!(
                accepted = outcome.accepted,
                dropped = outcome.dropped,
                max_images = self.max_images,
                "image limit reached; extra files dropped"
            );
        }
        outcome
    }

    /// Remove a persisted image by position.
    pub fn remove_existing(&mut self, index: usize) -> Option<ExistingImage> {
        (index < self.existing.len()).then(|| self.existing.remove(index))
    }

    /// Remove a staged file by position.
    pub fn remove_staged(&mut self, index: usize) -> Option<StagedFile> {
        (index < self.staged.len()).then(|| self.staged.remove(index))
    }

    /// Ids of retained persisted images, in order. Images without an id are
    /// skipped.
    pub fn retained_ids(&self) -> Vec<u64> {
        self.existing.iter().filter_map(|image| image.id).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    fn file(name: &str) -> StagedFile {
        StagedFile::new(name, "image/jpeg", vec![0xff, 0xd8]).expect("valid file")
    }

    fn existing(id: u64) -> ExistingImage {
        ExistingImage {
            id: Some(id),
            url: format!("/uploads/{id}.jpg"),
        }
    }

    #[fixture]
    fn half_full() -> ImageStaging {
        let mut staging = ImageStaging::with_existing(4, vec![existing(1), existing(2)]);
        staging.add_files([file("a.jpg"), file("b.jpg")]);
        staging
    }

    #[rstest]
    fn full_staging_accepts_no_more_files(mut half_full: ImageStaging) {
        let outcome = half_full.add_files([file("c.jpg"), file("d.jpg"), file("e.jpg")]);
        assert_eq!(outcome, AddOutcome { accepted: 0, dropped: 3 });
        assert_eq!(half_full.total(), 4);
        assert_eq!(half_full.staged().len(), 2);
    }

    #[test]
    fn add_files_keeps_input_order_and_drops_the_tail() {
        let mut staging = ImageStaging::with_existing(4, vec![existing(9)]);
        let outcome = staging.add_files([file("1"), file("2"), file("3"), file("4")]);
        assert_eq!(outcome, AddOutcome { accepted: 3, dropped: 1 });
        let names: Vec<_> = staging.staged().iter().map(StagedFile::file_name).collect();
        assert_eq!(names, ["1", "2", "3"]);
    }

    #[rstest]
    fn removals_touch_only_their_collection(mut half_full: ImageStaging) {
        let removed = half_full.remove_existing(0).expect("first existing");
        assert_eq!(removed.id, Some(1));
        assert_eq!(half_full.staged().len(), 2);

        let removed = half_full.remove_staged(1).expect("second staged");
        assert_eq!(removed.file_name(), "b.jpg");
        assert_eq!(half_full.existing(), &[existing(2)]);
        assert_eq!(half_full.remaining_slots(), 2);
    }

    #[rstest]
    fn out_of_range_removals_are_no_ops(mut half_full: ImageStaging) {
        assert!(half_full.remove_existing(2).is_none());
        assert!(half_full.remove_staged(9).is_none());
        assert_eq!(half_full.total(), 4);
    }

    #[test]
    fn oversized_hydration_blocks_adds_but_keeps_server_images() {
        let mut staging =
            ImageStaging::with_existing(4, (1..=5).map(existing).collect::<Vec<_>>());
        assert_eq!(staging.remaining_slots(), 0);
        let outcome = staging.add_files([file("x")]);
        assert_eq!(outcome.accepted, 0);
        assert_eq!(staging.retained_ids(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn retained_ids_skip_images_without_ids() {
        let staging = ImageStaging::with_existing(
            4,
            vec![
                existing(7),
                ExistingImage {
                    id: None,
                    url: "/uploads/tmp.jpg".to_owned(),
                },
                existing(9),
            ],
        );
        assert_eq!(staging.retained_ids(), vec![7, 9]);
    }

    #[test]
    fn total_never_exceeds_max_over_mixed_operations() {
        // Deterministic pseudo-random walk over add/remove operations.
        let mut staging = ImageStaging::with_existing(4, vec![existing(1)]);
        let mut seed: u32 = 0x2545_f491;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let pick = (seed % 4) as usize;
            let count = (seed >> 8) as usize % 6;
            match pick {
                0 | 1 => {
                    staging.add_files((0..count).map(|_| file("walk")));
                }
                2 => {
                    staging.remove_staged(count);
                }
                _ => {
                    staging.remove_existing(count);
                }
            }
            assert!(staging.total() <= 4, "total {}", staging.total());
        }
    }

    #[rstest]
    #[case("", "image/png", vec![1], StagedFileError::EmptyFileName)]
    #[case("a.pdf", "application/pdf", vec![1], StagedFileError::NotAnImage { content_type: "application/pdf".to_owned() })]
    #[case("a.png", "image/png", vec![], StagedFileError::Empty)]
    fn rejects_invalid_files(
        #[case] name: &str,
        #[case] content_type: &str,
        #[case] bytes: Vec<u8>,
        #[case] expected: StagedFileError,
    ) {
        let err = StagedFile::new(name, content_type, bytes).expect_err("invalid file");
        assert_eq!(err, expected);
    }

    #[test]
    fn rejects_files_over_ten_megabytes() {
        let err = StagedFile::new("big.png", "image/png", vec![0; MAX_STAGED_FILE_BYTES + 1])
            .expect_err("too large");
        assert_eq!(
            err,
            StagedFileError::TooLarge {
                size: MAX_STAGED_FILE_BYTES + 1
            }
        );
        assert_eq!(
            err.to_string(),
            "file is 10485761 bytes; images may be at most 10485760 bytes"
        );
    }
}
