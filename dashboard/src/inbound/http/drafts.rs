//! Listing dialog handlers.
//!
//! ```text
//! POST   /api/listings/drafts                       {"listingId":3}
//! GET    /api/listings/drafts/{id}
//! PATCH  /api/listings/drafts/{id}                  {"title":..,"type":"AC",..}
//! DELETE /api/listings/drafts/{id}
//! POST   /api/listings/drafts/{id}/images           {"files":[{"fileName":..,"contentType":..,"data":<base64>}]}
//! DELETE /api/listings/drafts/{id}/existing/{index}
//! DELETE /api/listings/drafts/{id}/staged/{index}
//! POST   /api/listings/drafts/{id}/submit
//! ```
//!
//! Uploads arrive as JSON with base64 bytes; the draft turns them into the
//! multipart form the backend expects only on submit.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{
    DraftSnapshot, FieldError, IMAGES_FIELD, Listing, ListingFields, MAX_STAGED_FILE_BYTES,
    MutationFailure, MutationOutcome, RecordId, StagedFile, StagedImages, validation_error,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionToken;
use crate::inbound::http::state::HttpState;

/// Body of `POST /api/listings/drafts`.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenDraftRequest {
    /// Listing to edit; omit to create a new one.
    #[serde(default)]
    pub listing_id: Option<RecordId>,
}

/// One uploaded image.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    /// File bytes, base64 encoded.
    pub data: String,
}

/// Body of `POST /api/listings/drafts/{id}/images`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UploadRequest {
    pub files: Vec<UploadedFile>,
}

fn staged_files(upload: UploadRequest) -> Result<Vec<StagedFile>, Vec<FieldError>> {
    let mut files = Vec::with_capacity(upload.files.len());
    let mut errors = Vec::new();
    for file in upload.files {
        let staged = STANDARD
            .decode(file.data.as_bytes())
            .map_err(|err| format!("{}: invalid base64 data: {err}", file.file_name))
            .and_then(|bytes| {
                StagedFile::new(file.file_name.as_str(), file.content_type, bytes)
                    .map_err(|err| format!("{}: {err}", file.file_name))
            });
        match staged {
            Ok(staged) => files.push(staged),
            Err(message) => errors.push(FieldError::new(IMAGES_FIELD, message)),
        }
    }
    if errors.is_empty() {
        Ok(files)
    } else {
        Err(errors)
    }
}

/// JSON payload limit for an upload of `max_images` full-size files.
///
/// Base64 grows the bytes by a third; 64 KiB covers names and framing.
#[must_use]
pub fn upload_json_limit(max_images: usize) -> usize {
    max_images.max(1) * MAX_STAGED_FILE_BYTES.div_ceil(3) * 4 + 64 * 1024
}

/// Open a create or edit dialog.
#[utoipa::path(
    post,
    path = "/api/listings/drafts",
    request_body = OpenDraftRequest,
    responses(
        (status = 201, description = "Draft opened"),
        (status = 404, description = "Listing to edit not found"),
        (status = 503, description = "Backend unavailable")
    ),
    tags = ["listings"],
    operation_id = "openListingDraft"
)]
#[post("/api/listings/drafts")]
pub async fn open_draft(
    state: web::Data<HttpState>,
    session: SessionToken,
    body: Option<web::Json<OpenDraftRequest>>,
) -> ApiResult<HttpResponse> {
    let listing_id = body.and_then(|json| json.into_inner().listing_id);
    let snapshot = state.editor.open(session.token(), listing_id).await?;
    Ok(HttpResponse::Created().json(snapshot))
}

/// Current state of a draft.
#[utoipa::path(
    get,
    path = "/api/listings/drafts/{id}",
    params(("id" = String, Path, description = "Draft id")),
    responses(
        (status = 200, description = "Draft state"),
        (status = 404, description = "Unknown draft")
    ),
    tags = ["listings"],
    operation_id = "getListingDraft"
)]
#[get("/api/listings/drafts/{id}")]
pub async fn get_draft(
    state: web::Data<HttpState>,
    session: SessionToken,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<DraftSnapshot>> {
    state.editor.get(session.token(), id.into_inner()).await.map(web::Json)
}

/// Replace the draft's scalar fields.
#[utoipa::path(
    patch,
    path = "/api/listings/drafts/{id}",
    params(("id" = String, Path, description = "Draft id")),
    request_body = crate::inbound::http::schemas::ListingFieldsSchema,
    responses(
        (status = 200, description = "Draft state"),
        (status = 404, description = "Unknown draft")
    ),
    tags = ["listings"],
    operation_id = "updateListingDraft"
)]
#[patch("/api/listings/drafts/{id}")]
pub async fn update_draft(
    state: web::Data<HttpState>,
    session: SessionToken,
    id: web::Path<Uuid>,
    fields: web::Json<ListingFields>,
) -> ApiResult<web::Json<DraftSnapshot>> {
    state
        .editor
        .update_fields(session.token(), id.into_inner(), fields.into_inner())
        .await
        .map(web::Json)
}

/// Close a draft without submitting it.
#[utoipa::path(
    delete,
    path = "/api/listings/drafts/{id}",
    params(("id" = String, Path, description = "Draft id")),
    responses(
        (status = 204, description = "Draft discarded"),
        (status = 404, description = "Unknown draft")
    ),
    tags = ["listings"],
    operation_id = "discardListingDraft"
)]
#[delete("/api/listings/drafts/{id}")]
pub async fn discard_draft(
    state: web::Data<HttpState>,
    session: SessionToken,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state.editor.discard(session.token(), id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Stage images; files beyond the image limit are dropped and counted.
#[utoipa::path(
    post,
    path = "/api/listings/drafts/{id}/images",
    params(("id" = String, Path, description = "Draft id")),
    request_body = UploadRequest,
    responses(
        (status = 200, description = "Accepted and dropped counts plus draft state"),
        (status = 400, description = "A file is not an image, is empty or too large"),
        (status = 404, description = "Unknown draft")
    ),
    tags = ["listings"],
    operation_id = "stageListingImages"
)]
#[post("/api/listings/drafts/{id}/images")]
pub async fn stage_images(
    state: web::Data<HttpState>,
    session: SessionToken,
    id: web::Path<Uuid>,
    upload: web::Json<UploadRequest>,
) -> ApiResult<web::Json<StagedImages>> {
    let files = staged_files(upload.into_inner()).map_err(|errors| validation_error(&errors))?;
    state
        .editor
        .add_images(session.token(), id.into_inner(), files)
        .await
        .map(web::Json)
}

/// Remove a persisted image from the draft.
#[utoipa::path(
    delete,
    path = "/api/listings/drafts/{id}/existing/{index}",
    params(
        ("id" = String, Path, description = "Draft id"),
        ("index" = usize, Path, description = "Position among existing images")
    ),
    responses(
        (status = 200, description = "Draft state; out-of-range indices change nothing"),
        (status = 404, description = "Unknown draft")
    ),
    tags = ["listings"],
    operation_id = "removeExistingImage"
)]
#[delete("/api/listings/drafts/{id}/existing/{index}")]
pub async fn remove_existing_image(
    state: web::Data<HttpState>,
    session: SessionToken,
    path: web::Path<(Uuid, usize)>,
) -> ApiResult<web::Json<DraftSnapshot>> {
    let (id, index) = path.into_inner();
    state
        .editor
        .remove_existing(session.token(), id, index)
        .await
        .map(web::Json)
}

/// Remove a staged file from the draft.
#[utoipa::path(
    delete,
    path = "/api/listings/drafts/{id}/staged/{index}",
    params(
        ("id" = String, Path, description = "Draft id"),
        ("index" = usize, Path, description = "Position among staged files")
    ),
    responses(
        (status = 200, description = "Draft state; out-of-range indices change nothing"),
        (status = 404, description = "Unknown draft")
    ),
    tags = ["listings"],
    operation_id = "removeStagedImage"
)]
#[delete("/api/listings/drafts/{id}/staged/{index}")]
pub async fn remove_staged_image(
    state: web::Data<HttpState>,
    session: SessionToken,
    path: web::Path<(Uuid, usize)>,
) -> ApiResult<web::Json<DraftSnapshot>> {
    let (id, index) = path.into_inner();
    state
        .editor
        .remove_staged(session.token(), id, index)
        .await
        .map(web::Json)
}

/// Validate, assemble and send the draft to the backend.
#[utoipa::path(
    post,
    path = "/api/listings/drafts/{id}/submit",
    params(("id" = String, Path, description = "Draft id")),
    responses(
        (status = 200, description = "Saved; the draft is closed and the body carries the refetched listings"),
        (status = 400, description = "Field validation failed; the draft is kept"),
        (status = 409, description = "The draft is already being submitted"),
        (status = 503, description = "Backend unavailable; the draft is kept")
    ),
    tags = ["listings"],
    operation_id = "submitListingDraft"
)]
#[post("/api/listings/drafts/{id}/submit")]
pub async fn submit_draft(
    state: web::Data<HttpState>,
    session: SessionToken,
    id: web::Path<Uuid>,
) -> Result<web::Json<MutationOutcome<Listing>>, MutationFailure> {
    state
        .editor
        .submit(session.token(), id.into_inner())
        .await
        .map(web::Json)
}
