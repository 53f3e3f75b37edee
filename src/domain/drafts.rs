//! Field snapshot of a draft and the stock completion rules per content type.

use contentdesk_api_types::PlatformLink;

use super::content::{is_content_empty, is_valid_tag};

/// The fields a completion check looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftFields {
    pub title: String,
    pub content: String,
    pub file_id: Option<i64>,
    pub hashtags: Vec<String>,
    pub platform_links: Vec<PlatformLink>,
}

/// Returns the message to show when the draft may not be published yet.
pub type CompletionRule = fn(&DraftFields) -> Option<String>;

const IMAGE_REQUIRED: &str = "이미지를 등록해야 정식 등록이 가능합니다.";
const TITLE_REQUIRED: &str = "제목을 입력해야 정식 등록이 가능합니다.";
const CONTENT_REQUIRED: &str = "내용을 입력해야 정식 등록이 가능합니다.";

pub fn banner_completion(fields: &DraftFields) -> Option<String> {
    if fields.file_id.is_none() {
        return Some(IMAGE_REQUIRED.to_string());
    }
    if fields.title.trim().is_empty() {
        return Some(TITLE_REQUIRED.to_string());
    }
    if is_content_empty(&fields.content) {
        return Some(CONTENT_REQUIRED.to_string());
    }
    None
}

pub fn hero_completion(fields: &DraftFields) -> Option<String> {
    if fields.file_id.is_none() {
        return Some("이미지 또는 동영상을 등록해야 정식 등록이 가능합니다.".to_string());
    }
    if fields.title.trim().is_empty() {
        return Some("이름을 입력해야 정식 등록이 가능합니다.".to_string());
    }
    if is_content_empty(&fields.content) {
        return Some("설명을 입력해야 정식 등록이 가능합니다.".to_string());
    }
    None
}

pub fn games_completion(fields: &DraftFields) -> Option<String> {
    banner_completion(fields).or_else(|| platform_links_problem(&fields.platform_links))
}

/// News articles need a title and a body; hashtags, when present, must be well formed.
pub fn news_completion(fields: &DraftFields) -> Option<String> {
    if fields.title.trim().is_empty() {
        return Some(TITLE_REQUIRED.to_string());
    }
    if is_content_empty(&fields.content) {
        return Some(CONTENT_REQUIRED.to_string());
    }
    fields
        .hashtags
        .iter()
        .find(|tag| !is_valid_tag(tag))
        .map(|tag| format!("해시태그 `{tag}`에는 한글, 영문, 숫자, _만 사용할 수 있습니다."))
}

/// Checks applied before saving an already published games article.
pub fn games_update_problem(fields: &DraftFields) -> Option<String> {
    if fields.title.trim().is_empty() {
        return Some("제목을 입력해야 합니다.".to_string());
    }
    if is_content_empty(&fields.content) {
        return Some("내용을 입력해야 합니다.".to_string());
    }
    if fields.platform_links.is_empty() {
        return Some("플랫폼/링크를 하나 이상 입력해야 합니다.".to_string());
    }
    if fields.platform_links.iter().any(|pl| !pl.is_complete()) {
        return Some("플랫폼명과 링크는 모두 입력해야 합니다.".to_string());
    }
    None
}

fn platform_links_problem(links: &[PlatformLink]) -> Option<String> {
    if links.is_empty() {
        return Some("플랫폼/링크를 1개 이상 입력해야 합니다.".to_string());
    }
    if links.iter().any(|pl| !pl.is_complete()) {
        return Some("플랫폼명과 링크는 모두 입력해야 합니다.".to_string());
    }
    None
}
