//! Listing drafts and their conversion into multipart submissions.
//!
//! A [`ListingDraft`] is the in-memory form state behind the listing dialog.
//! [`ListingDraft::assemble`] validates it and produces a [`ListingSubmission`]:
//! a transport-neutral list of form parts plus the create/update target. The
//! outbound REST adapter turns the parts into a `multipart/form-data` body.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Error, ImageStaging, Listing, RecordId, RoomType, StagedFile};

/// Field name repeated once per staged image.
pub const IMAGES_FIELD: &str = "images";

/// Field carrying the JSON array of retained image ids.
pub const EXISTING_IMAGES_FIELD: &str = "existingImages";

/// Where a submission goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "listingId", rename_all = "camelCase")]
pub enum SubmissionTarget {
    /// `POST /rooms/create`.
    Create,
    /// `PATCH /rooms/update/{id}`.
    Update(RecordId),
}

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    /// Plain text field.
    Text { name: String, value: String },
    /// File upload.
    File { name: String, file: StagedFile },
}

impl FormPart {
    fn text(name: &str, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.to_owned(),
            value: value.into(),
        }
    }

    /// Form field name.
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name.as_str(),
        }
    }
}

/// Ordered multipart form for a listing create or update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingForm {
    parts: Vec<FormPart>,
}

impl ListingForm {
    /// Parts in submission order.
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Consume the form, yielding its parts.
    pub fn into_parts(self) -> Vec<FormPart> {
        self.parts
    }

    /// Value of the first text part named `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            FormPart::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Number of file parts.
    pub fn file_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|part| matches!(part, FormPart::File { .. }))
            .count()
    }
}

/// A validated listing ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSubmission {
    /// Create or update.
    pub target: SubmissionTarget,
    /// Multipart body.
    pub form: ListingForm,
}

/// A field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as used by the form.
    pub field: &'static str,
    /// Message shown next to the field.
    pub message: String,
}

impl FieldError {
    /// Construct a field error.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Convert field errors into an `invalid_request` domain error.
pub fn validation_error(errors: &[FieldError]) -> Error {
    Error::invalid_request("validation failed").with_details(json!({ "fields": errors }))
}

/// Scalar fields of a draft; images are edited separately.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFields {
    pub title: String,
    pub description: String,
    pub single_occupancy: f64,
    pub double_occupancy: f64,
    #[serde(rename = "type")]
    pub room_type: RoomType,
}

impl ListingFields {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        }
        if self.description.trim().is_empty() {
            errors.push(FieldError::new("description", "Description is required"));
        }
        for (field, value) in [
            ("singleOccupancy", self.single_occupancy),
            ("doubleOccupancy", self.double_occupancy),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(FieldError::new(field, "Price must be zero or more"));
            }
        }
        errors
    }
}

/// Form state of the listing dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    fields: ListingFields,
    images: ImageStaging,
    editing: Option<RecordId>,
}

impl ListingDraft {
    /// Blank draft for creating a listing.
    pub fn blank(max_images: usize) -> Self {
        Self {
            fields: ListingFields::default(),
            images: ImageStaging::new(max_images),
            editing: None,
        }
    }

    /// Draft hydrated from an existing listing; new images start empty.
    pub fn edit(listing: &Listing, max_images: usize) -> Self {
        Self {
            fields: ListingFields {
                title: listing.title.clone(),
                description: listing.description.clone(),
                single_occupancy: listing.single_occupancy,
                double_occupancy: listing.double_occupancy,
                room_type: listing.room_type,
            },
            images: ImageStaging::with_existing(max_images, listing.images.clone()),
            editing: Some(listing.id),
        }
    }

    /// Scalar fields.
    pub fn fields(&self) -> &ListingFields {
        &self.fields
    }

    /// Replace the scalar fields.
    pub fn set_fields(&mut self, fields: ListingFields) {
        self.fields = fields;
    }

    /// Image staging area.
    pub fn images(&self) -> &ImageStaging {
        &self.images
    }

    /// Mutable image staging area.
    pub fn images_mut(&mut self) -> &mut ImageStaging {
        &mut self.images
    }

    /// Listing being edited, if any.
    pub fn editing(&self) -> Option<RecordId> {
        self.editing
    }

    /// Validate and build the multipart submission.
    ///
    /// # Errors
    /// Returns every field error when validation fails; nothing is sent.
    ///
    /// # Examples
    /// ```
    /// use dashboard::domain::{ListingDraft, ListingFields, RoomType, SubmissionTarget};
    ///
    /// let mut draft = ListingDraft::blank(4);
    /// draft.set_fields(ListingFields {
    ///     title: "Loft".into(),
    ///     description: "Top floor".into(),
    ///     single_occupancy: 4500.0,
    ///     double_occupancy: 3000.0,
    ///     room_type: RoomType::Both,
    /// });
    /// let submission = draft.assemble().unwrap();
    /// assert_eq!(submission.target, SubmissionTarget::Create);
    /// assert_eq!(submission.form.text("singleOccupancy"), Some("4500"));
    /// assert_eq!(submission.form.text("existingImages"), None);
    /// ```
    pub fn assemble(&self) -> Result<ListingSubmission, Vec<FieldError>> {
        let errors = self.fields.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let fields = &self.fields;
        let mut parts = vec![
            FormPart::text("title", fields.title.as_str()),
            FormPart::text("description", fields.description.as_str()),
            FormPart::text("singleOccupancy", format_number(fields.single_occupancy)),
            FormPart::text("doubleOccupancy", format_number(fields.double_occupancy)),
            FormPart::text("type", fields.room_type.as_str()),
        ];
        parts.extend(self.images.staged().iter().map(|file| FormPart::File {
            name: IMAGES_FIELD.to_owned(),
            file: file.clone(),
        }));
        if !self.images.existing().is_empty() {
            let ids = serde_json::to_string(&self.images.retained_ids()).map_err(|err| {
                vec![FieldError::new(
                    "existingImages",
                    format!("could not encode image ids: {err}"),
                )]
            })?;
            parts.push(FormPart::text(EXISTING_IMAGES_FIELD, ids));
        }

        let target = self
            .editing
            .map_or(SubmissionTarget::Create, SubmissionTarget::Update);
        Ok(ListingSubmission {
            target,
            form: ListingForm { parts },
        })
    }
}

/// Render a number the way a browser's `String(n)` would for integral values.
fn format_number(value: f64) -> String {
    // `f64` Display already omits the fractional part for integral values
    // (`1200` not `1200.0`) and never uses exponents. Negative zero prints
    // as `0`.
    if value == 0.0 { 0.0_f64 } else { value }.to_string()
}
