//! Draft editing: acquire-or-create, debounced autosave, uploads, completion and cancellation.

mod editor;
mod slot;


use std::{fmt, sync::Arc, time::Duration};

use contentdesk_api_types::{DraftPayload, PlatformLink};

use crate::{
    application::{
        content::ContentRecord,
        repos::{DraftApi, MediaUploader},
        shell::Shell,
    },
    config::EditorSettings,
    domain::drafts::DraftFields,
    infra::http::ApiError,
};

pub use editor::DraftEditor;

/// Reshapes the assembled autosave payload for types that accept a different field subset.
pub type PayloadBuilder = Arc<dyn Fn(DraftPayload) -> DraftPayload + Send + Sync>;

/// Field values the editor starts from before the draft is known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftSeed {
    pub title: String,
    pub content: String,
    pub hashtags: Vec<String>,
    pub platform_links: Vec<PlatformLink>,
}

/// Per-call additions merged over the current fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftExtra {
    pub file_id: Option<i64>,
    pub hashtags: Option<Vec<String>>,
    pub platform_links: Option<Vec<PlatformLink>>,
}

impl DraftExtra {
    pub fn file(file_id: i64) -> Self {
        Self {
            file_id: Some(file_id),
            ..Self::default()
        }
    }
}

pub struct DraftEditorOptions<T> {
    pub api: Arc<dyn DraftApi<T>>,
    pub uploader: Arc<dyn MediaUploader>,
    pub shell: Arc<dyn Shell>,
    pub complete_route: String,
    pub cancel_route: String,
    pub seed: DraftSeed,
    pub use_hashtags: bool,
    pub use_platform_links: bool,
    pub payload_builder: Option<PayloadBuilder>,
    pub debounce: Duration,
}

impl<T> DraftEditorOptions<T> {
    /// Options with every switch off, an empty seed and the default debounce window.
    pub fn new(
        api: Arc<dyn DraftApi<T>>,
        uploader: Arc<dyn MediaUploader>,
        shell: Arc<dyn Shell>,
        complete_route: impl Into<String>,
        cancel_route: impl Into<String>,
    ) -> Self {
        Self {
            api,
            uploader,
            shell,
            complete_route: complete_route.into(),
            cancel_route: cancel_route.into(),
            seed: DraftSeed::default(),
            use_hashtags: false,
            use_platform_links: false,
            payload_builder: None,
            debounce: EditorSettings::default().autosave_debounce,
        }
    }

    pub fn with_seed(mut self, seed: DraftSeed) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_hashtags(mut self) -> Self {
        self.use_hashtags = true;
        self
    }

    pub fn with_platform_links(mut self) -> Self {
        self.use_platform_links = true;
        self
    }

    pub fn with_payload_builder(
        mut self,
        builder: impl Fn(DraftPayload) -> DraftPayload + Send + Sync + 'static,
    ) -> Self {
        self.payload_builder = Some(Arc::new(builder));
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

impl<T: ContentRecord> DraftEditorOptions<T> {
    /// Options for a stock content type; completion and cancellation both
    /// return to its list.
    pub fn for_record(
        api: Arc<dyn DraftApi<T>>,
        uploader: Arc<dyn MediaUploader>,
        shell: Arc<dyn Shell>,
    ) -> Self {
        let resource = T::RESOURCE;
        let mut options = Self::new(api, uploader, shell, resource.list_route, resource.list_route);
        options.use_hashtags = resource.uses_hashtags;
        options.use_platform_links = resource.uses_platform_links;
        options
    }
}

impl<T> fmt::Debug for DraftEditorOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftEditorOptions")
            .field("complete_route", &self.complete_route)
            .field("cancel_route", &self.cancel_route)
            .field("seed", &self.seed)
            .field("use_hashtags", &self.use_hashtags)
            .field("use_platform_links", &self.use_platform_links)
            .field("payload_builder", &self.payload_builder.is_some())
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPhase {
    /// Waiting for the draft to be fetched or created.
    Loading,
    Ready,
    /// An autosave is waiting for its window or talking to the server.
    Saving,
    Uploading,
    Completing,
    Cancelling,
    /// Completed or deleted; the editor no longer writes anything.
    Finished,
}

impl DraftPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Saving => "saving",
            Self::Uploading => "uploading",
            Self::Completing => "completing",
            Self::Cancelling => "cancelling",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for DraftPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields captured by the last successful save, used to skip no-op autosaves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SavedSnapshot {
    title: String,
    content: String,
    hashtags: Vec<String>,
    platform_links: Vec<PlatformLink>,
    file_id: Option<i64>,
}

impl SavedSnapshot {
    pub(crate) fn of_payload(payload: &DraftPayload) -> Self {
        Self {
            title: payload.title.clone(),
            content: payload.content.clone(),
            hashtags: payload.hashtags.clone().unwrap_or_default(),
            platform_links: payload.platform_links.clone().unwrap_or_default(),
            file_id: payload.file_id,
        }
    }

    pub(crate) fn of_fields(fields: &DraftFields) -> Self {
        Self {
            title: fields.title.clone(),
            content: fields.content.clone(),
            hashtags: fields.hashtags.clone(),
            platform_links: fields.platform_links.clone(),
            file_id: fields.file_id,
        }
    }
}

#[derive(Debug)]
pub enum CompleteOutcome<T> {
    /// The draft was promoted; carries the published entity.
    Completed(T),
    /// The validator refused; nothing was sent.
    Blocked(String),
    Failed(ApiError),
}

#[derive(Debug)]
pub enum CancelOutcome {
    /// No draft existed, so there was nothing to delete.
    Left,
    /// The user chose to stay.
    Declined,
    Deleted,
    Failed(ApiError),
}

#[derive(Debug)]
pub enum UploadOutcome {
    Uploaded { file_id: i64, url: String },
    Failed(ApiError),
}
