//! Traits the editors depend on. HTTP clients implement them; tests use fakes.

use async_trait::async_trait;
use contentdesk_api_types::{ContentPatch, DraftPayload, UploadedFile};

use crate::{
    application::uploads::{MediaFile, UploadTarget},
    infra::http::ApiError,
};

/// Draft lifecycle endpoints of one content type.
#[async_trait]
pub trait DraftApi<T>: Send + Sync {
    /// Returns the caller's open draft, creating it if there is none.
    async fn create_or_fetch_draft(&self) -> Result<T, ApiError>;

    async fn update_draft(&self, id: i64, payload: &DraftPayload) -> Result<T, ApiError>;

    /// Promote the draft; returns the published entity.
    async fn complete_draft(&self, id: i64) -> Result<T, ApiError>;

    async fn delete_draft(&self, id: i64) -> Result<(), ApiError>;
}

/// Read and update access to published entities of one content type.
#[async_trait]
pub trait PublishedApi<T>: Send + Sync {
    async fn fetch(&self, id: i64) -> Result<T, ApiError>;

    async fn update(&self, id: i64, patch: &ContentPatch) -> Result<T, ApiError>;
}

#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, file: &MediaFile, target: &UploadTarget)
    -> Result<UploadedFile, ApiError>;
}
