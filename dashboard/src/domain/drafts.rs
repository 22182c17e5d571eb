//! Listing dialog sessions.
//!
//! Each open create or edit dialog is a [`ListingDraft`] addressed by a
//! random id and owned by the session that opened it. The editor applies
//! image staging edits to it and, on submit, assembles and sends it through
//! the [`ListingService`]. A draft is dropped after a successful submit and
//! kept after a failed one. While a submit is in flight the draft is locked
//! against edits and further submits.
//!
//! Drafts idle for longer than the idle timeout are dropped, and opening a
//! draft at capacity evicts the least recently used one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    AccessToken, AddOutcome, Error, ExistingImage, Listing, ListingDraft, ListingFields,
    ListingService, MutationFailure, MutationOutcome, RecordId, StagedFile, validation_error,
};

/// Default bound on concurrently open drafts.
pub const DEFAULT_MAX_DRAFTS: usize = 256;

/// Default time after which an untouched draft is dropped.
pub const DEFAULT_DRAFT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Metadata of a staged file as shown in the dialog's preview grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedFileSummary {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

/// Serializable state of one draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<RecordId>,
    pub fields: ListingFields,
    pub existing_images: Vec<ExistingImage>,
    pub staged_images: Vec<StagedFileSummary>,
    pub max_images: usize,
    pub remaining_slots: usize,
}

impl DraftSnapshot {
    fn of(id: Uuid, draft: &ListingDraft) -> Self {
        let images = draft.images();
        Self {
            id,
            listing_id: draft.editing(),
            fields: draft.fields().clone(),
            existing_images: images.existing().to_vec(),
            staged_images: images
                .staged()
                .iter()
                .map(|file| StagedFileSummary {
                    file_name: file.file_name().to_owned(),
                    content_type: file.content_type().to_owned(),
                    size: file.len(),
                })
                .collect(),
            max_images: images.max_images(),
            remaining_slots: images.remaining_slots(),
        }
    }
}

/// Outcome of staging new files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagedImages {
    pub outcome: AddOutcome,
    pub draft: DraftSnapshot,
}

struct OpenDraft {
    owner: AccessToken,
    draft: ListingDraft,
    touched: Instant,
    submitting: bool,
}

impl OpenDraft {
    fn is_idle(&self, timeout: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.touched) >= timeout
    }
}

/// Owns every open listing draft.
#[derive(Clone)]
pub struct ListingEditor {
    drafts: Arc<Mutex<HashMap<Uuid, OpenDraft>>>,
    listings: ListingService,
    max_images: usize,
    max_drafts: usize,
    idle_timeout: Duration,
}

impl ListingEditor {
    pub fn new(listings: ListingService, max_images: usize) -> Self {
        Self {
            drafts: Arc::new(Mutex::new(HashMap::new())),
            listings,
            max_images,
            max_drafts: DEFAULT_MAX_DRAFTS,
            idle_timeout: DEFAULT_DRAFT_IDLE_TIMEOUT,
        }
    }

    /// Override the open-draft bound (minimum one).
    #[must_use]
    pub fn with_max_drafts(mut self, max_drafts: usize) -> Self {
        self.max_drafts = max_drafts.max(1);
        self
    }

    /// Override the idle timeout.
    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Open a blank draft, or one hydrated from listing `listing_id`.
    pub async fn open(
        &self,
        token: &AccessToken,
        listing_id: Option<RecordId>,
    ) -> Result<DraftSnapshot, Error> {
        let draft = match listing_id {
            Some(id) => {
                let listing: Listing = self.listings.find(token, id).await?;
                ListingDraft::edit(&listing, self.max_images)
            }
            None => ListingDraft::blank(self.max_images),
        };
        let mut drafts = self.drafts.lock().await;
        let now = Instant::now();
        self.drop_idle(&mut drafts, now);
        if drafts.len() >= self.max_drafts {
            let oldest = drafts
                .iter()
                .filter(|(_, open)| !open.submitting)
                .min_by_key(|(_, open)| open.touched)
                .map(|(id, _)| *id)
                .ok_or_else(|| Error::service_unavailable("every listing draft is being submitted"))?;
            drafts.remove(&oldest);
            tracing::debug!(draft_id = %oldest, "evicted least recently used listing draft");
        }
        let id = Uuid::new_v4();
        let snapshot = DraftSnapshot::of(id, &draft);
        drafts.insert(
            id,
            OpenDraft {
                owner: token.clone(),
                draft,
                touched: now,
                submitting: false,
            },
        );
        tracing::debug!(draft_id = %id, listing_id = ?listing_id, "opened listing draft");
        Ok(snapshot)
    }

    /// Current state of a draft.
    pub async fn get(&self, token: &AccessToken, id: Uuid) -> Result<DraftSnapshot, Error> {
        self.with_draft(token, id, |_| ())
            .await
            .map(|(snapshot, ())| snapshot)
    }

    /// Replace the scalar fields.
    pub async fn update_fields(
        &self,
        token: &AccessToken,
        id: Uuid,
        fields: ListingFields,
    ) -> Result<DraftSnapshot, Error> {
        self.with_draft(token, id, |draft| draft.set_fields(fields))
            .await
            .map(|(snapshot, ())| snapshot)
    }

    /// Stage new files, dropping those beyond the image limit.
    pub async fn add_images(
        &self,
        token: &AccessToken,
        id: Uuid,
        files: Vec<StagedFile>,
    ) -> Result<StagedImages, Error> {
        let (draft, outcome) = self
            .with_draft(token, id, |draft| draft.images_mut().add_files(files))
            .await?;
        if outcome.dropped > 0 {
            tracing::debug!(draft_id = %id, dropped = outcome.dropped, "image limit reached");
        }
        Ok(StagedImages { outcome, draft })
    }

    /// Remove a persisted image; out-of-range indices change nothing.
    pub async fn remove_existing(
        &self,
        token: &AccessToken,
        id: Uuid,
        index: usize,
    ) -> Result<DraftSnapshot, Error> {
        self.with_draft(token, id, |draft| {
            draft.images_mut().remove_existing(index);
        })
        .await
        .map(|(snapshot, ())| snapshot)
    }

    /// Remove a staged file; out-of-range indices change nothing.
    pub async fn remove_staged(
        &self,
        token: &AccessToken,
        id: Uuid,
        index: usize,
    ) -> Result<DraftSnapshot, Error> {
        self.with_draft(token, id, |draft| {
            draft.images_mut().remove_staged(index);
        })
        .await
        .map(|(snapshot, ())| snapshot)
    }

    /// Close a draft without submitting it.
    pub async fn discard(&self, token: &AccessToken, id: Uuid) -> Result<(), Error> {
        let mut drafts = self.drafts.lock().await;
        owned(&mut drafts, token, id)?;
        drafts.remove(&id);
        Ok(())
    }

    /// Validate, assemble and send a draft.
    ///
    /// The draft is locked while the backend call is in flight and removed
    /// only when the backend accepts it. A second submit of a locked draft
    /// fails with a conflict.
    pub async fn submit(
        &self,
        token: &AccessToken,
        id: Uuid,
    ) -> Result<MutationOutcome<Listing>, MutationFailure> {
        let submission = {
            let mut drafts = self.drafts.lock().await;
            self.drop_idle(&mut drafts, Instant::now());
            let open = owned(&mut drafts, token, id).map_err(MutationFailure::invalid)?;
            if open.submitting {
                return Err(MutationFailure::invalid(draft_busy(id)));
            }
            let submission = open
                .draft
                .assemble()
                .map_err(|errors| MutationFailure::invalid(validation_error(&errors)))?;
            open.submitting = true;
            open.touched = Instant::now();
            submission
        };
        let result = self.listings.submit(token, &submission).await;
        let mut drafts = self.drafts.lock().await;
        match result {
            Ok(outcome) => {
                drafts.remove(&id);
                Ok(outcome)
            }
            Err(failure) => {
                if let Some(open) = drafts.get_mut(&id) {
                    open.submitting = false;
                    open.touched = Instant::now();
                }
                Err(failure)
            }
        }
    }

    /// Drop every draft opened with `token`, returning how many were open.
    pub async fn end_session(&self, token: &AccessToken) -> usize {
        let mut drafts = self.drafts.lock().await;
        let before = drafts.len();
        drafts.retain(|_, open| open.owner != *token);
        before - drafts.len()
    }

    /// Number of open drafts.
    pub async fn open_drafts(&self) -> usize {
        self.drafts.lock().await.len()
    }

    fn drop_idle(&self, drafts: &mut HashMap<Uuid, OpenDraft>, now: Instant) {
        let before = drafts.len();
        drafts.retain(|_, open| !open.is_idle(self.idle_timeout, now));
        let dropped = before - drafts.len();
        if dropped > 0 {
            tracing::debug!(dropped, "dropped idle listing drafts");
        }
    }

    async fn with_draft<R>(
        &self,
        token: &AccessToken,
        id: Uuid,
        edit: impl FnOnce(&mut ListingDraft) -> R,
    ) -> Result<(DraftSnapshot, R), Error> {
        let mut drafts = self.drafts.lock().await;
        let now = Instant::now();
        self.drop_idle(&mut drafts, now);
        let open = owned(&mut drafts, token, id)?;
        if open.submitting {
            return Err(draft_busy(id));
        }
        open.touched = now;
        let result = edit(&mut open.draft);
        Ok((DraftSnapshot::of(id, &open.draft), result))
    }
}

/// The draft `id` if `token` opened it; drafts of other sessions look absent.
fn owned<'a>(
    drafts: &'a mut HashMap<Uuid, OpenDraft>,
    token: &AccessToken,
    id: Uuid,
) -> Result<&'a mut OpenDraft, Error> {
    drafts
        .get_mut(&id)
        .filter(|open| open.owner == *token)
        .ok_or_else(|| draft_not_found(id))
}

fn draft_not_found(id: Uuid) -> Error {
    Error::not_found(format!("listing draft {id} not found"))
}

fn draft_busy(id: Uuid) -> Error {
    Error::conflict(format!("listing draft {id} is already being submitted"))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        Acknowledgement, BackendError, ListingRepository, MockListingRepository,
    };
    use crate::domain::test_support::{listing, token};
    use crate::domain::{CacheRegistry, ErrorCode, ListingForm, Notification, RoomType};
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn png(name: &str) -> StagedFile {
        StagedFile::new(name, "image/png", vec![0x89, 0x50]).expect("png")
    }

    fn other_token() -> AccessToken {
        AccessToken::new("h.eyJyb2xlIjoiQURNSU4iLCJpZCI6Mn0.s").expect("token")
    }

    fn editor(repo: MockListingRepository) -> ListingEditor {
        editor_over(Arc::new(repo))
    }

    fn editor_over(repo: Arc<dyn ListingRepository>) -> ListingEditor {
        ListingEditor::new(ListingService::new(repo, CacheRegistry::default()), 4)
    }

    fn fields() -> ListingFields {
        ListingFields {
            title: "Loft".to_owned(),
            description: "Top floor".to_owned(),
            single_occupancy: 4500.0,
            double_occupancy: 3000.0,
            room_type: RoomType::Both,
        }
    }

    /// Accepts every create after a short delay and counts the calls.
    #[derive(Default)]
    struct SlowListingRepository {
        creates: AtomicUsize,
    }

    #[async_trait]
    impl ListingRepository for SlowListingRepository {
        async fn list(&self, _token: &AccessToken) -> Result<Vec<Listing>, BackendError> {
            Ok(vec![listing(9, "Loft")])
        }

        async fn create(
            &self,
            _token: &AccessToken,
            _form: &ListingForm,
        ) -> Result<Acknowledgement, BackendError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.creates.fetch_add(1, Ordering::SeqCst);
            Ok(Acknowledgement::new("Listing created"))
        }

        async fn update(
            &self,
            _token: &AccessToken,
            _id: RecordId,
            _form: &ListingForm,
        ) -> Result<Acknowledgement, BackendError> {
            Ok(Acknowledgement::new("Listing updated"))
        }

        async fn delete(
            &self,
            _token: &AccessToken,
            _id: RecordId,
        ) -> Result<Acknowledgement, BackendError> {
            Ok(Acknowledgement::new("Listing deleted"))
        }
    }

    #[tokio::test]
    async fn edit_draft_hydrates_existing_images() {
        let mut repo = MockListingRepository::new();
        repo.expect_list()
            .times(1)
            .returning(|_| Ok(vec![listing(3, "Garden room")]));
        let editor = editor(repo);

        let snapshot = editor.open(&token(), Some(3)).await.expect("open");
        assert_eq!(snapshot.listing_id, Some(3));
        assert_eq!(snapshot.existing_images.len(), 1);
        assert_eq!(snapshot.remaining_slots, 3);

        let staged = editor
            .add_images(
                &token(),
                snapshot.id,
                vec![png("a.png"), png("b.png"), png("c.png"), png("d.png")],
            )
            .await
            .expect("stage");
        assert_eq!(staged.outcome, AddOutcome { accepted: 3, dropped: 1 });
        assert_eq!(staged.draft.remaining_slots, 0);
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(5, 1, 1)]
    #[tokio::test]
    async fn removals_touch_one_collection(
        #[case] index: usize,
        #[case] existing_left: usize,
        #[case] staged_left: usize,
    ) {
        let mut repo = MockListingRepository::new();
        repo.expect_list()
            .returning(|_| Ok(vec![listing(3, "Garden room")]));
        let editor = editor(repo);
        let id = editor.open(&token(), Some(3)).await.expect("open").id;
        editor
            .add_images(&token(), id, vec![png("a.png")])
            .await
            .expect("stage");

        let snapshot = editor
            .remove_existing(&token(), id, index)
            .await
            .expect("remove");
        assert_eq!(snapshot.existing_images.len(), existing_left);
        assert_eq!(snapshot.staged_images.len(), 1);
        let snapshot = editor
            .remove_staged(&token(), id, index)
            .await
            .expect("remove");
        assert_eq!(snapshot.staged_images.len(), staged_left);
    }

    #[tokio::test]
    async fn invalid_draft_is_kept_and_not_sent() {
        let editor = editor(MockListingRepository::new());
        let id = editor.open(&token(), None).await.expect("open").id;
        let failure = editor.submit(&token(), id).await.expect_err("blank draft");
        assert_eq!(failure.error.code(), ErrorCode::InvalidRequest);
        assert_eq!(editor.open_drafts().await, 1);
    }

    #[tokio::test]
    async fn successful_submit_closes_the_draft() {
        let mut repo = MockListingRepository::new();
        repo.expect_create()
            .withf(|_, form| form.text("title") == Some("Loft") && form.file_count() == 1)
            .times(1)
            .returning(|_, _| Ok(Acknowledgement::new("Listing created")));
        repo.expect_list()
            .times(1)
            .returning(|_| Ok(vec![listing(9, "Loft")]));
        let editor = editor(repo);
        let id = editor.open(&token(), None).await.expect("open").id;
        editor
            .update_fields(&token(), id, fields())
            .await
            .expect("fields");
        editor
            .add_images(&token(), id, vec![png("a.png")])
            .await
            .expect("stage");

        let outcome = editor.submit(&token(), id).await.expect("submit");
        assert_eq!(outcome.notification, Notification::success("Listing created"));
        assert_eq!(editor.open_drafts().await, 0);
        let error = editor.get(&token(), id).await.expect_err("closed");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn failed_submit_keeps_the_draft() {
        let mut repo = MockListingRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|_, _| Err(BackendError::transport("connection reset")));
        let editor = editor(repo);
        let id = editor.open(&token(), None).await.expect("open").id;
        editor
            .update_fields(&token(), id, fields())
            .await
            .expect("fields");

        let failure = editor.submit(&token(), id).await.expect_err("backend down");
        assert_eq!(failure.notification.message, "Failed to process listing");
        let kept = editor.get(&token(), id).await.expect("kept");
        assert_eq!(kept.fields, fields());
    }

    #[tokio::test]
    async fn concurrent_submits_send_the_draft_once() {
        let repo = Arc::new(SlowListingRepository::default());
        let editor = editor_over(repo.clone());
        let id = editor.open(&token(), None).await.expect("open").id;
        editor
            .update_fields(&token(), id, fields())
            .await
            .expect("fields");

        let session = token();
        let (first, second) = tokio::join!(editor.submit(&session, id), editor.submit(&session, id));
        assert!(first.is_ok());
        let failure = second.expect_err("draft already in flight");
        assert_eq!(failure.error.code(), ErrorCode::Conflict);
        assert_eq!(repo.creates.load(Ordering::SeqCst), 1);
        assert_eq!(editor.open_drafts().await, 0);
    }

    #[tokio::test]
    async fn drafts_of_other_sessions_are_hidden() {
        let editor = editor(MockListingRepository::new());
        let id = editor.open(&token(), None).await.expect("open").id;

        let error = editor.get(&other_token(), id).await.expect_err("foreign draft");
        assert_eq!(error.code(), ErrorCode::NotFound);
        let failure = editor
            .submit(&other_token(), id)
            .await
            .expect_err("foreign draft");
        assert_eq!(failure.error.code(), ErrorCode::NotFound);
        let error = editor
            .discard(&other_token(), id)
            .await
            .expect_err("foreign draft");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert!(editor.get(&token(), id).await.is_ok());
    }

    #[tokio::test]
    async fn ending_a_session_drops_only_its_drafts() {
        let editor = editor(MockListingRepository::new());
        editor.open(&token(), None).await.expect("first");
        editor.open(&token(), None).await.expect("second");
        let kept = editor.open(&other_token(), None).await.expect("other").id;

        assert_eq!(editor.end_session(&token()).await, 2);
        assert_eq!(editor.open_drafts().await, 1);
        assert!(editor.get(&other_token(), kept).await.is_ok());
    }

    #[tokio::test]
    async fn full_editor_evicts_least_recently_used_draft() {
        let editor = editor(MockListingRepository::new()).with_max_drafts(2);
        let stale = editor.open(&token(), None).await.expect("first").id;
        let fresh = editor.open(&token(), None).await.expect("second").id;
        editor
            .update_fields(&token(), stale, fields())
            .await
            .expect("touch first");

        editor.open(&token(), None).await.expect("third");
        assert_eq!(editor.open_drafts().await, 2);
        assert!(editor.get(&token(), stale).await.is_ok());
        let error = editor.get(&token(), fresh).await.expect_err("evicted");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn idle_drafts_expire() {
        let editor = editor(MockListingRepository::new()).with_idle_timeout(Duration::ZERO);
        let id = editor.open(&token(), None).await.expect("open").id;
        let error = editor.get(&token(), id).await.expect_err("expired");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(editor.open_drafts().await, 0);
    }
}
