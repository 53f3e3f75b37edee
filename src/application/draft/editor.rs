use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use contentdesk_api_types::{DraftPayload, PlatformLink, UploadedFile};
use metrics::counter;
use tracing::{debug, info, warn};

use super::{
    CancelOutcome, CompleteOutcome, DraftEditorOptions, DraftExtra, DraftPhase, PayloadBuilder,
    SavedSnapshot, UploadOutcome, slot::AutosaveSlot,
};
use crate::{
    application::{
        repos::{DraftApi, MediaUploader},
        shell::Shell,
        uploads::{MediaFile, UploadTarget},
    },
    domain::{
        drafts::{CompletionRule, DraftFields},
        entities::DraftEntity,
        types::UploadContentType,
    },
    infra::{http::ApiError, telemetry::METRIC_AUTOSAVE},
    util::lock::mutex_lock,
};

const SOURCE: &str = "application::draft::editor";

const LOAD_FAILED: &str = "임시저장 불러오기 실패";
const COMPLETE_FAILED: &str = "정식 등록 실패";
const UPLOAD_FAILED: &str = "이미지 업로드 실패";
const DELETE_FAILED: &str = "임시저장 삭제 실패";
const CONFIRM_DISCARD: &str = "임시저장을 삭제하고 나가시겠습니까?";

/// Editor for one in-progress draft.
///
/// Cloning yields another handle to the same editor. Pending autosave timers
/// hold only a weak reference, so dropping the last handle aborts them.
pub struct DraftEditor<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for DraftEditor<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T> {
    api: Arc<dyn DraftApi<T>>,
    uploader: Arc<dyn MediaUploader>,
    shell: Arc<dyn Shell>,
    complete_route: String,
    cancel_route: String,
    use_hashtags: bool,
    use_platform_links: bool,
    payload_builder: Option<PayloadBuilder>,
    debounce: Duration,
    state: Mutex<DraftState>,
    /// Serializes create-or-fetch so concurrent callers share one draft.
    acquire: tokio::sync::Mutex<()>,
    slot: AutosaveSlot,
}

#[derive(Debug)]
struct DraftState {
    /// Only `Loading`, `Ready`, `Completing`, `Cancelling` and `Finished` are stored;
    /// saving and uploading are derived from the counters below.
    stage: DraftPhase,
    draft_id: Option<i64>,
    fields: DraftFields,
    /// Field values the editor was opened with.
    seed: DraftFields,
    image_preview: Option<String>,
    current_image_url: Option<String>,
    uploads_in_flight: usize,
    saves_in_flight: usize,
    last_saved: Option<SavedSnapshot>,
}

/// How a freshly acquired draft meets the local fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Adopt {
    /// Activation: the server copy replaces the seed unless the user has
    /// already edited or a save is pending.
    Activation,
    /// Acquired on demand: local edits win, the server only fills gaps.
    KeepLocal,
}

impl<T> DraftEditor<T>
where
    T: DraftEntity + Send + Sync + 'static,
{
    pub fn new(options: DraftEditorOptions<T>) -> Self {
        let DraftEditorOptions {
            api,
            uploader,
            shell,
            complete_route,
            cancel_route,
            seed,
            use_hashtags,
            use_platform_links,
            payload_builder,
            debounce,
        } = options;

        let fields = DraftFields {
            title: seed.title,
            content: seed.content,
            file_id: None,
            hashtags: seed.hashtags,
            platform_links: seed.platform_links,
        };
        let state = DraftState {
            stage: DraftPhase::Loading,
            draft_id: None,
            seed: fields.clone(),
            fields,
            image_preview: None,
            current_image_url: None,
            uploads_in_flight: 0,
            saves_in_flight: 0,
            last_saved: None,
        };

        Self {
            inner: Arc::new(Inner {
                api,
                uploader,
                shell,
                complete_route,
                cancel_route,
                use_hashtags,
                use_platform_links,
                payload_builder,
                debounce,
                state: Mutex::new(state),
                acquire: tokio::sync::Mutex::new(()),
                slot: AutosaveSlot::default(),
            }),
        }
    }

    /// Fetch the open draft or create one, and load its fields.
    ///
    /// On failure the user is told and sent to the cancellation route.
    pub async fn activate(&self) -> Result<i64, ApiError> {
        let inner = &self.inner;
        let _serial = inner.acquire.lock().await;

        if let Some(id) = inner.state().draft_id {
            return Ok(id);
        }

        match inner.api.create_or_fetch_draft().await {
            Ok(draft) => {
                let id = draft.id();
                inner.adopt(&draft, Adopt::Activation);
                info!(target = SOURCE, draft_id = id, "draft ready");
                Ok(id)
            }
            Err(err) => {
                warn!(target = SOURCE, error = %err, "draft acquisition failed");
                inner.state().stage = DraftPhase::Finished;
                inner.shell.notify(&user_message(&err, LOAD_FAILED));
                inner.shell.navigate(&inner.cancel_route);
                Err(err)
            }
        }
    }

    /// Schedule a save of the current fields merged with `extra`.
    ///
    /// Returns `false` when nothing changed since the last save or the editor
    /// is past the point of saving. A call within the debounce window replaces
    /// the pending one.
    pub fn autosave(&self, extra: DraftExtra) -> bool {
        let inner = &self.inner;
        let payload = {
            let state = inner.state();
            if !matches!(state.stage, DraftPhase::Loading | DraftPhase::Ready) {
                return false;
            }
            let payload = inner.build_payload(&state, &extra);
            if state.last_saved.as_ref() == Some(&SavedSnapshot::of_payload(&payload)) {
                counter!(METRIC_AUTOSAVE, "result" => "skipped").increment(1);
                return false;
            }
            payload
        };

        let weak = Arc::downgrade(inner);
        let debounce = inner.debounce;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.state().saves_in_flight += 1;
            tokio::spawn(inner.save(payload));
        });
        inner.slot.arm(timer);
        true
    }

    /// Upload `file` against the draft, creating the draft first if needed,
    /// then autosave the new file id.
    pub async fn upload(&self, file: MediaFile, content_type: UploadContentType) -> UploadOutcome {
        let inner = &self.inner;
        let result = {
            let _uploading = UploadingGuard::enter(inner);
            inner.upload_file(&file, content_type).await
        };

        match result {
            Ok(uploaded) => {
                {
                    let mut state = inner.state();
                    state.fields.file_id = Some(uploaded.id);
                    state.image_preview = Some(file.preview.clone());
                    state.current_image_url = Some(uploaded.url.clone());
                }
                info!(
                    target = SOURCE,
                    file_id = uploaded.id,
                    file_name = %file.file_name,
                    "file attached to draft"
                );
                self.autosave(DraftExtra::file(uploaded.id));
                UploadOutcome::Uploaded {
                    file_id: uploaded.id,
                    url: uploaded.url,
                }
            }
            Err(err) => {
                warn!(target = SOURCE, error = %err, "draft upload failed");
                inner.shell.notify(&user_message(&err, UPLOAD_FAILED));
                UploadOutcome::Failed(err)
            }
        }
    }

    /// Promote the draft.
    ///
    /// The pending autosave is dropped, `validator` runs against the current
    /// fields, and anything not yet saved goes out in one update before the
    /// completion call.
    pub async fn complete(&self, validator: Option<CompletionRule>) -> CompleteOutcome<T> {
        let inner = &self.inner;
        if inner.slot.cancel() {
            debug!(target = SOURCE, "pending autosave dropped before completion");
        }

        if let Some(rule) = validator
            && let Some(message) = rule(&self.fields())
        {
            inner.shell.notify(&message);
            return CompleteOutcome::Blocked(message);
        }

        inner.state().stage = DraftPhase::Completing;
        match inner.flush_and_complete().await {
            Ok(entity) => {
                inner.state().stage = DraftPhase::Finished;
                info!(target = SOURCE, id = entity.id(), "draft completed");
                inner.shell.navigate(&inner.complete_route);
                CompleteOutcome::Completed(entity)
            }
            Err(err) => {
                inner.settle();
                warn!(target = SOURCE, error = %err, "draft completion failed");
                inner.shell.notify(&user_message(&err, COMPLETE_FAILED));
                CompleteOutcome::Failed(err)
            }
        }
    }

    /// Leave the editor, deleting the draft after confirmation.
    pub async fn cancel(&self) -> CancelOutcome {
        let inner = &self.inner;
        inner.slot.cancel();

        let draft_id = inner.state().draft_id;
        let Some(id) = draft_id else {
            inner.state().stage = DraftPhase::Finished;
            inner.shell.navigate(&inner.cancel_route);
            return CancelOutcome::Left;
        };

        if !inner.shell.confirm(CONFIRM_DISCARD) {
            return CancelOutcome::Declined;
        }

        inner.state().stage = DraftPhase::Cancelling;
        match inner.api.delete_draft(id).await {
            Ok(()) => {
                inner.state().stage = DraftPhase::Finished;
                info!(target = SOURCE, draft_id = id, "draft discarded");
                inner.shell.navigate(&inner.cancel_route);
                CancelOutcome::Deleted
            }
            Err(err) => {
                inner.settle();
                warn!(target = SOURCE, draft_id = id, error = %err, "draft deletion failed");
                inner.shell.notify(&user_message(&err, DELETE_FAILED));
                CancelOutcome::Failed(err)
            }
        }
    }

    pub fn phase(&self) -> DraftPhase {
        let state = self.inner.state();
        match state.stage {
            DraftPhase::Loading | DraftPhase::Ready if state.uploads_in_flight > 0 => {
                DraftPhase::Uploading
            }
            DraftPhase::Loading | DraftPhase::Ready
                if state.saves_in_flight > 0 || self.inner.slot.is_armed() =>
            {
                DraftPhase::Saving
            }
            stage => stage,
        }
    }

    pub fn draft_id(&self) -> Option<i64> {
        self.inner.state().draft_id
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state().stage == DraftPhase::Loading
    }

    pub fn is_uploading(&self) -> bool {
        self.inner.state().uploads_in_flight > 0
    }

    /// Snapshot of the editable fields.
    pub fn fields(&self) -> DraftFields {
        self.inner.state().fields.clone()
    }

    pub fn title(&self) -> String {
        self.inner.state().fields.title.clone()
    }

    pub fn content(&self) -> String {
        self.inner.state().fields.content.clone()
    }

    pub fn hashtags(&self) -> Vec<String> {
        self.inner.state().fields.hashtags.clone()
    }

    pub fn platform_links(&self) -> Vec<PlatformLink> {
        self.inner.state().fields.platform_links.clone()
    }

    pub fn file_id(&self) -> Option<i64> {
        self.inner.state().fields.file_id
    }

    /// Local reference to the file picked in this session, if any.
    pub fn image_preview(&self) -> Option<String> {
        self.inner.state().image_preview.clone()
    }

    pub fn current_image_url(&self) -> Option<String> {
        self.inner.state().current_image_url.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.inner.state().fields.title = title.into();
    }

    pub fn set_content(&self, content: impl Into<String>) {
        self.inner.state().fields.content = content.into();
    }

    pub fn set_hashtags(&self, hashtags: Vec<String>) {
        self.inner.state().fields.hashtags = hashtags;
    }

    pub fn set_platform_links(&self, platform_links: Vec<PlatformLink>) {
        self.inner.state().fields.platform_links = platform_links;
    }

    pub fn set_file_id(&self, file_id: Option<i64>) {
        self.inner.state().fields.file_id = file_id;
    }
}

impl<T> Inner<T>
where
    T: DraftEntity + Send + Sync + 'static,
{
    fn state(&self) -> MutexGuard<'_, DraftState> {
        mutex_lock(&self.state, SOURCE, "state")
    }

    /// Draft id, acquiring the draft on demand.
    async fn ensure_draft_id(&self) -> Result<i64, ApiError> {
        if let Some(id) = self.state().draft_id {
            return Ok(id);
        }

        let _serial = self.acquire.lock().await;
        if let Some(id) = self.state().draft_id {
            return Ok(id);
        }

        let draft = self.api.create_or_fetch_draft().await?;
        self.adopt(&draft, Adopt::KeepLocal);
        debug!(target = SOURCE, draft_id = draft.id(), "draft acquired on demand");
        Ok(draft.id())
    }

    fn adopt(&self, draft: &T, mode: Adopt) {
        let mut server = draft.draft_fields();
        let mut state = self.state();

        if !self.use_hashtags {
            server.hashtags = Vec::new();
        }
        if !self.use_platform_links {
            server.platform_links = Vec::new();
        }

        state.draft_id = Some(draft.id());
        if state.stage == DraftPhase::Loading {
            state.stage = DraftPhase::Ready;
        }

        let keep_local = match mode {
            Adopt::KeepLocal => true,
            Adopt::Activation => {
                state.fields != state.seed
                    || state.saves_in_flight > 0
                    || state.uploads_in_flight > 0
                    || self.slot.is_armed()
            }
        };

        let server_url = draft.first_file().map(|file| file.url.clone());
        if keep_local {
            if state.fields.file_id.is_none() {
                state.fields.file_id = server.file_id;
                state.current_image_url = server_url;
            }
        } else {
            let local = std::mem::replace(&mut state.fields, server.clone());
            if !self.use_hashtags {
                state.fields.hashtags = local.hashtags;
            }
            if !self.use_platform_links {
                state.fields.platform_links = local.platform_links;
            }
            state.current_image_url = server_url;
        }
        state.last_saved = Some(SavedSnapshot::of_fields(&server));
    }

    fn build_payload(&self, state: &DraftState, extra: &DraftExtra) -> DraftPayload {
        let fields = &state.fields;
        let payload = DraftPayload {
            title: fields.title.clone(),
            content: fields.content.clone(),
            hashtags: extra
                .hashtags
                .clone()
                .or_else(|| self.use_hashtags.then(|| fields.hashtags.clone())),
            platform_links: extra
                .platform_links
                .clone()
                .or_else(|| self.use_platform_links.then(|| fields.platform_links.clone())),
            file_id: extra.file_id.or(fields.file_id),
        };
        match &self.payload_builder {
            Some(builder) => builder(payload),
            None => payload,
        }
    }

    /// Body of a fired autosave. Failures are logged and dropped.
    async fn save(self: Arc<Self>, payload: DraftPayload) {
        let result = if self.is_closed() {
            Ok(None)
        } else {
            self.store(&payload).await.map(Some)
        };

        let mut state = self.state();
        state.saves_in_flight = state.saves_in_flight.saturating_sub(1);
        match result {
            Ok(Some(updated)) => {
                let mut saved = SavedSnapshot::of_payload(&payload);
                if self.use_hashtags
                    && let Some(hashtags) = updated.hashtags()
                {
                    state.fields.hashtags = hashtags.to_vec();
                    saved.hashtags = hashtags.to_vec();
                }
                if self.use_platform_links
                    && let Some(links) = updated.platform_links()
                {
                    state.fields.platform_links = links.to_vec();
                    saved.platform_links = links.to_vec();
                }
                state.last_saved = Some(saved);
                counter!(METRIC_AUTOSAVE, "result" => "saved").increment(1);
                debug!(target = SOURCE, draft_id = updated.id(), "autosave stored");
            }
            Ok(None) => {
                debug!(target = SOURCE, "autosave skipped; editor closed");
            }
            Err(err) => {
                counter!(METRIC_AUTOSAVE, "result" => "failed").increment(1);
                debug!(target = SOURCE, error = %err, "autosave failed");
            }
        }
    }

    async fn store(&self, payload: &DraftPayload) -> Result<T, ApiError> {
        let id = self.ensure_draft_id().await?;
        self.api.update_draft(id, payload).await
    }

    async fn upload_file(
        &self,
        file: &MediaFile,
        content_type: UploadContentType,
    ) -> Result<UploadedFile, ApiError> {
        let id = self.ensure_draft_id().await?;
        let target = UploadTarget::new(id, content_type);
        self.uploader.upload(file, &target).await
    }

    async fn flush_and_complete(&self) -> Result<T, ApiError> {
        let id = self.ensure_draft_id().await?;

        let unsaved = {
            let state = self.state();
            let payload = self.build_payload(&state, &DraftExtra::default());
            let saved = state.last_saved.as_ref() == Some(&SavedSnapshot::of_payload(&payload));
            (!saved).then_some(payload)
        };
        if let Some(payload) = unsaved {
            self.api.update_draft(id, &payload).await?;
            self.state().last_saved = Some(SavedSnapshot::of_payload(&payload));
            debug!(target = SOURCE, draft_id = id, "unsaved fields flushed");
        }

        self.api.complete_draft(id).await
    }

    fn is_closed(&self) -> bool {
        matches!(
            self.state().stage,
            DraftPhase::Cancelling | DraftPhase::Finished
        )
    }

    /// Back to an editable stage after a failed completion or deletion.
    fn settle(&self) {
        let mut state = self.state();
        state.stage = if state.draft_id.is_some() {
            DraftPhase::Ready
        } else {
            DraftPhase::Loading
        };
    }
}

/// Counts an upload in flight for as long as it lives.
struct UploadingGuard<'a, T> {
    inner: &'a Inner<T>,
}

impl<'a, T> UploadingGuard<'a, T>
where
    T: DraftEntity + Send + Sync + 'static,
{
    fn enter(inner: &'a Inner<T>) -> Self {
        inner.state().uploads_in_flight += 1;
        Self { inner }
    }
}

impl<T> Drop for UploadingGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = mutex_lock(&self.inner.state, SOURCE, "uploading_guard");
        state.uploads_in_flight = state.uploads_in_flight.saturating_sub(1);
    }
}

fn user_message(err: &ApiError, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
