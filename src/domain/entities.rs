//! Capability contract shared by every draftable content type.

use contentdesk_api_types::{ContentFile, GamesNews, Hero, News, PlatformLink, PromotionBanner};

use super::drafts::DraftFields;

/// Read access the draft engine needs from a content item.
///
/// Optional groups return `None` when the type has no such field at all,
/// which is different from an empty list.
pub trait DraftEntity {
    fn id(&self) -> i64;
    fn title(&self) -> &str;
    fn content(&self) -> &str;
    fn files(&self) -> &[ContentFile];

    fn hashtags(&self) -> Option<&[String]> {
        None
    }

    fn platform_links(&self) -> Option<&[PlatformLink]> {
        None
    }

    fn order(&self) -> Option<i64> {
        None
    }

    /// Activation flag for types that can be switched on and off.
    fn is_active(&self) -> Option<bool> {
        None
    }

    fn first_file(&self) -> Option<&ContentFile> {
        self.files().first()
    }

    fn draft_fields(&self) -> DraftFields {
        DraftFields {
            title: self.title().to_string(),
            content: self.content().to_string(),
            file_id: self.first_file().map(|file| file.id),
            hashtags: self.hashtags().map(<[String]>::to_vec).unwrap_or_default(),
            platform_links: self
                .platform_links()
                .map(<[PlatformLink]>::to_vec)
                .unwrap_or_default(),
        }
    }
}

impl DraftEntity for PromotionBanner {
    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    fn content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    fn files(&self) -> &[ContentFile] {
        &self.files
    }

    fn order(&self) -> Option<i64> {
        self.order
    }

    fn is_active(&self) -> Option<bool> {
        Some(self.is_active)
    }
}

impl DraftEntity for Hero {
    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    fn content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    fn files(&self) -> &[ContentFile] {
        &self.files
    }

    fn order(&self) -> Option<i64> {
        self.order
    }

    fn is_active(&self) -> Option<bool> {
        Some(self.is_active)
    }
}

impl DraftEntity for GamesNews {
    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    fn content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    fn files(&self) -> &[ContentFile] {
        &self.files
    }

    fn platform_links(&self) -> Option<&[PlatformLink]> {
        Some(&self.platform_links)
    }

    fn order(&self) -> Option<i64> {
        self.order
    }
}

impl DraftEntity for News {
    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    fn content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    fn files(&self) -> &[ContentFile] {
        &self.files
    }

    fn hashtags(&self) -> Option<&[String]> {
        Some(&self.hashtags)
    }

    fn order(&self) -> Option<i64> {
        self.order
    }
}
