//! Fetch-edit-save for published content, with dirty tracking on title and content.

use std::{fmt, sync::Arc};

use contentdesk_api_types::ContentPatch;
use tracing::{debug, error, info};

use crate::{
    application::{repos::PublishedApi, shell::Shell},
    domain::entities::DraftEntity,
    infra::http::ApiError,
};

const SOURCE: &str = "application::edit";
const INVALID_ACCESS: &str = "잘못된 접근입니다.";
pub const LEAVE_CONFIRM: &str = "변경된 내용이 있습니다. 저장하지 않고 목록으로 돌아가시겠습니까?";

/// What the editor shows for a fetched entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectedFields {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}

pub type FieldProjection<T> = Arc<dyn Fn(&T) -> ProjectedFields + Send + Sync>;

/// Builds the update body from the tracked title and content.
pub type PatchBuilder = Arc<dyn Fn(&str, &str) -> ContentPatch + Send + Sync>;

/// Title, content and first file URL of any draftable type.
pub fn entity_projection<T: DraftEntity>() -> FieldProjection<T> {
    Arc::new(|entity: &T| ProjectedFields {
        title: entity.title().to_string(),
        content: entity.content().to_string(),
        image_url: entity.first_file().map(|file| file.url.clone()),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Baseline {
    title: String,
    content: String,
}

pub struct ContentEditor<T> {
    api: Arc<dyn PublishedApi<T>>,
    projection: FieldProjection<T>,
    patch_builder: Option<PatchBuilder>,
    id: Option<i64>,
    data: Option<T>,
    loading: bool,
    saving: bool,
    title: String,
    content: String,
    image_url: Option<String>,
    baseline: Baseline,
}

impl<T> ContentEditor<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(api: Arc<dyn PublishedApi<T>>, projection: FieldProjection<T>) -> Self {
        Self {
            api,
            projection,
            patch_builder: None,
            id: None,
            data: None,
            loading: true,
            saving: false,
            title: String::new(),
            content: String::new(),
            image_url: None,
            baseline: Baseline::default(),
        }
    }

    pub fn with_patch_builder(
        mut self,
        builder: impl Fn(&str, &str) -> ContentPatch + Send + Sync + 'static,
    ) -> Self {
        self.patch_builder = Some(Arc::new(builder));
        self
    }

    /// Fetch the entity named by a raw route identifier.
    ///
    /// The same identifier is fetched only once. A missing or non-numeric
    /// identifier and fetch failures are logged and leave [`Self::data`] empty.
    pub async fn load(&mut self, raw_id: Option<&str>) -> Option<&T> {
        let Some(id) = raw_id.and_then(|raw| raw.trim().parse::<i64>().ok()) else {
            error!(target = SOURCE, raw_id = ?raw_id, "{}", INVALID_ACCESS);
            self.reset(None);
            return None;
        };

        if self.id == Some(id) && self.data.is_some() {
            return self.data.as_ref();
        }

        self.reset(Some(id));
        let fetched = self.api.fetch(id).await;
        self.loading = false;
        match fetched {
            Ok(entity) => {
                let fields = (self.projection)(&entity);
                self.baseline = Baseline {
                    title: fields.title.clone(),
                    content: fields.content.clone(),
                };
                self.title = fields.title;
                self.content = fields.content;
                self.image_url = fields.image_url;
                self.data = Some(entity);
                debug!(target = SOURCE, id, "content loaded");
                self.data.as_ref()
            }
            Err(err) => {
                error!(target = SOURCE, id, error = %err, "content fetch failed");
                None
            }
        }
    }

    /// Send the update and take the server's answer as the new baseline.
    pub async fn save(&mut self) -> Result<&T, ApiError> {
        let id = self.id.ok_or_else(|| ApiError::precondition(INVALID_ACCESS))?;
        let patch = self.patch();
        let api = Arc::clone(&self.api);

        let updated = {
            let _saving = SavingFlag::raise(&mut self.saving);
            api.update(id, &patch).await?
        };

        self.clear_changes();
        info!(target = SOURCE, id, "content saved");
        Ok(&*self.data.insert(updated))
    }

    /// Accept the current values as saved without contacting the server.
    pub fn clear_changes(&mut self) {
        self.baseline = Baseline {
            title: self.title.clone(),
            content: self.content.clone(),
        };
    }

    /// Ask before leaving with unsaved edits. `extra_dirty` covers fields this
    /// editor does not track.
    pub fn confirm_leave(&self, extra_dirty: bool, shell: &dyn Shell) -> bool {
        if self.is_dirty() || extra_dirty {
            shell.confirm(LEAVE_CONFIRM)
        } else {
            true
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.title != self.baseline.title || self.content != self.baseline.content
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    fn patch(&self) -> ContentPatch {
        match &self.patch_builder {
            Some(builder) => builder(&self.title, &self.content),
            None => ContentPatch {
                title: Some(self.title.clone()),
                content: Some(self.content.clone()),
                ..ContentPatch::default()
            },
        }
    }

    fn reset(&mut self, id: Option<i64>) {
        self.id = id;
        self.data = None;
        self.loading = id.is_some();
        self.title.clear();
        self.content.clear();
        self.image_url = None;
        self.baseline = Baseline::default();
    }
}

impl<T> fmt::Debug for ContentEditor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dirty = self.title != self.baseline.title || self.content != self.baseline.content;
        f.debug_struct("ContentEditor")
            .field("id", &self.id)
            .field("loaded", &self.data.is_some())
            .field("saving", &self.saving)
            .field("dirty", &dirty)
            .finish_non_exhaustive()
    }
}

/// Holds the saving flag up until dropped, including when the save is abandoned.
struct SavingFlag<'a>(&'a mut bool);

impl<'a> SavingFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for SavingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

#[cfg(test)]
mod tests;
