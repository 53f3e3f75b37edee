//! Clients for the draftable content types: banners, heroes, games news, news.

use std::marker::PhantomData;

use async_trait::async_trait;
use contentdesk_api_types::{
    ContentPatch, DirectReorderRequest, DraftPayload, GamesNews, Hero, ListPage, ListQuery, News,
    PromotionBanner, ReorderRequest,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    application::{
        repos::{DraftApi, PublishedApi},
        shell::routes,
    },
    domain::{
        drafts::{
            CompletionRule, banner_completion, games_completion, hero_completion, news_completion,
        },
        entities::DraftEntity,
        error::DomainError,
        ordering,
        types::UploadContentType,
    },
    infra::http::{ApiError, ApiRequest, RestClient},
};

const DRAFT_ACQUIRE_FAILED: &str = "임시저장 생성/불러오기 실패";
const DRAFT_UPDATE_FAILED: &str = "임시저장 수정 실패";
const DRAFT_DELETE_FAILED: &str = "임시저장 삭제 실패";
const DRAFT_COMPLETE_FAILED: &str = "임시저장 완료 실패";

/// Static description of one REST resource, its envelope keys and editor traits.
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    pub path: &'static str,
    /// Noun used in fallback messages.
    pub label: &'static str,
    pub list_key: &'static str,
    pub item_key: &'static str,
    pub completed_key: &'static str,
    pub updated_key: &'static str,
    pub upload_type: UploadContentType,
    pub list_route: &'static str,
    pub supports_activation: bool,
    pub supports_status_filter: bool,
    pub uses_hashtags: bool,
    pub uses_platform_links: bool,
    /// Checked before a draft of this type is completed.
    pub completion: CompletionRule,
}

pub const PROMOTIONS: Resource = Resource {
    path: "promotions",
    label: "배너",
    list_key: "banners",
    item_key: "banner",
    completed_key: "banner",
    updated_key: "updatedBanner",
    upload_type: UploadContentType::PromotionBanner,
    list_route: routes::PROMOTION_BANNERS,
    supports_activation: true,
    supports_status_filter: true,
    uses_hashtags: false,
    uses_platform_links: false,
    completion: banner_completion,
};

pub const HEROES: Resource = Resource {
    path: "heroes",
    label: "히어로",
    list_key: "heroes",
    item_key: "hero",
    completed_key: "hero",
    updated_key: "updatedHero",
    upload_type: UploadContentType::Hero,
    list_route: routes::HEROES,
    supports_activation: true,
    supports_status_filter: true,
    uses_hashtags: false,
    uses_platform_links: false,
    completion: hero_completion,
};

pub const GAMES: Resource = Resource {
    path: "games",
    label: "게임 뉴스",
    list_key: "newsList",
    item_key: "news",
    completed_key: "news",
    updated_key: "news",
    upload_type: UploadContentType::GamesNews,
    list_route: routes::GAMES,
    supports_activation: false,
    supports_status_filter: false,
    uses_hashtags: false,
    uses_platform_links: true,
    completion: games_completion,
};

pub const NEWS: Resource = Resource {
    path: "news",
    label: "뉴스",
    list_key: "newsList",
    item_key: "news",
    completed_key: "news",
    updated_key: "news",
    upload_type: UploadContentType::News,
    list_route: routes::NEWS,
    supports_activation: false,
    supports_status_filter: false,
    uses_hashtags: true,
    uses_platform_links: false,
    completion: news_completion,
};

impl Resource {
    fn failure(&self, action: &str) -> String {
        format!("{} {action} 실패", self.label)
    }

    fn item_path(&self, id: i64) -> String {
        format!("{}/{id}", self.path)
    }

    fn draft_path(&self, id: i64) -> String {
        format!("{}/draft/{id}", self.path)
    }
}

/// A content type served by a [`Resource`].
pub trait ContentRecord: DraftEntity + DeserializeOwned + Clone + Send + Sync + 'static {
    const RESOURCE: Resource;
}

impl ContentRecord for PromotionBanner {
    const RESOURCE: Resource = PROMOTIONS;
}

impl ContentRecord for Hero {
    const RESOURCE: Resource = HEROES;
}

impl ContentRecord for GamesNews {
    const RESOURCE: Resource = GAMES;
}

impl ContentRecord for News {
    const RESOURCE: Resource = NEWS;
}

pub struct ContentClient<T> {
    rest: RestClient,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for ContentClient<T> {
    fn clone(&self) -> Self {
        Self {
            rest: self.rest.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: ContentRecord> ContentClient<T> {
    pub fn new(rest: RestClient) -> Self {
        Self {
            rest,
            _record: PhantomData,
        }
    }

    pub fn resource(&self) -> Resource {
        T::RESOURCE
    }

    pub async fn list(&self, query: ListQuery) -> Result<ListPage<T>, ApiError> {
        let resource = T::RESOURCE;
        let status = if resource.supports_status_filter {
            query.status.as_query()
        } else {
            None
        };
        let request = ApiRequest::get(resource.path)
            .query_opt("status", status)
            .query("page", query.page)
            .query("pageSize", query.page_size);
        self.rest
            .list(request, resource.list_key, &resource.failure("목록 조회"))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<T, ApiError> {
        let resource = T::RESOURCE;
        self.rest
            .field(
                ApiRequest::get(resource.item_path(id)),
                resource.item_key,
                &resource.failure("상세 조회"),
            )
            .await
    }

    pub async fn create_or_fetch_draft(&self) -> Result<T, ApiError> {
        let request = ApiRequest::post(format!("{}/draft-or-create", T::RESOURCE.path))
            .json_value(serde_json::json!({}));
        self.rest
            .field(request, "draft", DRAFT_ACQUIRE_FAILED)
            .await
    }

    pub async fn update_draft(&self, id: i64, payload: &DraftPayload) -> Result<T, ApiError> {
        let request = ApiRequest::patch(T::RESOURCE.draft_path(id))
            .json(payload)
            .map_err(|err| encode_error(DRAFT_UPDATE_FAILED, &err))?;
        self.rest
            .field(request, "draft", DRAFT_UPDATE_FAILED)
            .await
    }

    pub async fn delete_draft(&self, id: i64) -> Result<(), ApiError> {
        self.rest
            .unit(
                ApiRequest::delete(T::RESOURCE.draft_path(id)),
                DRAFT_DELETE_FAILED,
            )
            .await
    }

    pub async fn complete_draft(&self, id: i64) -> Result<T, ApiError> {
        let resource = T::RESOURCE;
        let request = ApiRequest::post(format!("{}/complete", resource.draft_path(id)));
        self.rest
            .field(request, resource.completed_key, DRAFT_COMPLETE_FAILED)
            .await
    }

    pub async fn update(&self, id: i64, patch: &ContentPatch) -> Result<T, ApiError> {
        let resource = T::RESOURCE;
        let fallback = resource.failure("수정");
        let request = ApiRequest::patch(resource.item_path(id))
            .json(patch)
            .map_err(|err| encode_error(&fallback, &err))?;
        self.rest
            .field(request, resource.updated_key, &fallback)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let resource = T::RESOURCE;
        self.rest
            .unit(
                ApiRequest::delete(resource.item_path(id)),
                &resource.failure("삭제"),
            )
            .await
    }

    pub async fn activate(&self, id: i64) -> Result<(), ApiError> {
        self.set_active(id, true).await
    }

    pub async fn deactivate(&self, id: i64) -> Result<(), ApiError> {
        self.set_active(id, false).await
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<(), ApiError> {
        let resource = T::RESOURCE;
        if !resource.supports_activation {
            return Err(ApiError::precondition(format!(
                "{}은(는) 활성화 상태를 지원하지 않습니다.",
                resource.label
            )));
        }
        let (segment, action) = if active {
            ("activate", "활성화")
        } else {
            ("deactivate", "비활성화")
        };
        let request = ApiRequest::patch(format!("{}/{segment}", resource.item_path(id)));
        self.rest.unit(request, &resource.failure(action)).await
    }

    /// Save the order of one page of items.
    pub async fn reorder(&self, ids: &[i64], page: u32, page_size: u32) -> Result<(), ApiError> {
        ordering::validate_bulk_order(ids).map_err(precondition)?;
        let resource = T::RESOURCE;
        let fallback = resource.failure("순서 저장");
        let request = ApiRequest::patch(format!("{}/order", resource.path))
            .query("page", page)
            .query("pageSize", page_size)
            .json(&ReorderRequest { ids: ids.to_vec() })
            .map_err(|err| encode_error(&fallback, &err))?;
        self.rest.unit(request, &fallback).await
    }

    /// Move one item to `new_order` among the `current_max` items on screen.
    pub async fn reorder_direct(
        &self,
        id: i64,
        new_order: i64,
        current_max: usize,
        page: u32,
        page_size: u32,
    ) -> Result<(), ApiError> {
        let new_order =
            ordering::validate_direct_order(new_order, current_max).map_err(precondition)?;
        let resource = T::RESOURCE;
        let fallback = resource.failure("직접 순서 변경");
        let request = ApiRequest::patch(format!("{}/order/direct", resource.path))
            .query("page", page)
            .query("pageSize", page_size)
            .json(&DirectReorderRequest { id, new_order })
            .map_err(|err| encode_error(&fallback, &err))?;
        debug!(resource = resource.path, id, new_order, "direct reorder");
        self.rest.unit(request, &fallback).await
    }
}

#[async_trait]
impl<T: ContentRecord> DraftApi<T> for ContentClient<T> {
    async fn create_or_fetch_draft(&self) -> Result<T, ApiError> {
        ContentClient::create_or_fetch_draft(self).await
    }

    async fn update_draft(&self, id: i64, payload: &DraftPayload) -> Result<T, ApiError> {
        ContentClient::update_draft(self, id, payload).await
    }

    async fn complete_draft(&self, id: i64) -> Result<T, ApiError> {
        ContentClient::complete_draft(self, id).await
    }

    async fn delete_draft(&self, id: i64) -> Result<(), ApiError> {
        ContentClient::delete_draft(self, id).await
    }
}

#[async_trait]
impl<T: ContentRecord> PublishedApi<T> for ContentClient<T> {
    async fn fetch(&self, id: i64) -> Result<T, ApiError> {
        self.get(id).await
    }

    async fn update(&self, id: i64, patch: &ContentPatch) -> Result<T, ApiError> {
        ContentClient::update(self, id, patch).await
    }
}

fn precondition(err: DomainError) -> ApiError {
    ApiError::precondition(err.to_string())
}

fn encode_error(fallback: &str, err: &serde_json::Error) -> ApiError {
    ApiError::Decode {
        message: fallback.to_string(),
        detail: format!("failed to encode request body: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallbacks_use_the_resource_noun() {
        assert_eq!(PROMOTIONS.failure("목록 조회"), "배너 목록 조회 실패");
        assert_eq!(HEROES.failure("비활성화"), "히어로 비활성화 실패");
        assert_eq!(GAMES.failure("수정"), "게임 뉴스 수정 실패");
    }

    #[test]
    fn paths_are_relative_to_the_api_base() {
        assert_eq!(NEWS.draft_path(4), "news/draft/4");
        assert_eq!(PROMOTIONS.item_path(9), "promotions/9");
    }

    #[test]
    fn envelope_keys_follow_the_server_contract() {
        assert_eq!(PromotionBanner::RESOURCE.updated_key, "updatedBanner");
        assert_eq!(Hero::RESOURCE.updated_key, "updatedHero");
        assert_eq!(GamesNews::RESOURCE.list_key, "newsList");
        assert_eq!(News::RESOURCE.completed_key, "news");
    }
}
