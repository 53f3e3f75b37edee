//! Shared domain enumerations aligned with the server's wire values.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// `contentType` attached to a media upload so the server can link the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadContentType {
    Hero,
    PromotionBanner,
    GamesNews,
    News,
}

impl UploadContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadContentType::Hero => "HERO",
            UploadContentType::PromotionBanner => "PROMOTION_BANNER",
            UploadContentType::GamesNews => "GAMES_NEWS",
            UploadContentType::News => "NEWS",
        }
    }
}

impl fmt::Display for UploadContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadContentType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "HERO" => Ok(UploadContentType::Hero),
            "PROMOTION_BANNER" => Ok(UploadContentType::PromotionBanner),
            "GAMES_NEWS" => Ok(UploadContentType::GamesNews),
            "NEWS" => Ok(UploadContentType::News),
            _ => Err(DomainError::validation("contentType이 유효하지 않습니다.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_content_type_parses_wire_values() {
        assert_eq!(
            "GAMES_NEWS".parse::<UploadContentType>().expect("valid"),
            UploadContentType::GamesNews
        );
        assert!("".parse::<UploadContentType>().is_err());
        assert_eq!(UploadContentType::PromotionBanner.to_string(), "PROMOTION_BANNER");
    }
}
