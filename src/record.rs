use serde::{Deserialize, Serialize};

/// Functional category assigned to a season image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRole {
    /// Season poster.
    Primary,
    /// Wide season banner.
    Banner,
    /// Fanart backdrop.
    Backdrop,
}

impl ImageRole {
    /// Every role the banner feed can supply for a season.
    pub const ALL: [ImageRole; 3] = [Self::Primary, Self::Banner, Self::Backdrop];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Banner => "banner",
            Self::Backdrop => "backdrop",
        }
    }
}

impl std::fmt::Display for ImageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<Banner>` element as it appears in the feed, before any filtering.
///
/// Every field is optional: the feed is third-party and only loosely
/// validated, so the extractor emits whatever was present and leaves
/// acceptance decisions to the ranker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBannerRecord {
    /// Coarse role hint ("season", "fanart", ...).
    pub banner_type: Option<String>,
    /// Fine role hint ("season", "seasonwide"). The feed sometimes stuffs
    /// the image resolution in here instead; when that happens the parsed
    /// dimensions land in `width`/`height` and the raw string is kept.
    pub banner_type2: Option<String>,
    /// Image path relative to [`BANNER_BASE_URL`](crate::BANNER_BASE_URL).
    pub path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub season: Option<i32>,
    /// `Some("")` when the feed carried an explicitly blank language tag,
    /// `None` when the element was missing entirely. The distinction feeds
    /// into ranking.
    pub language: Option<String>,
    pub rating: Option<f64>,
    pub vote_count: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A season image that passed filtering, ready for the caller. Serialized
/// form is consumed by the artwork layer of the library server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedImageInfo {
    /// Absolute image URL.
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub role: ImageRole,
    pub language: Option<String>,
    pub rating: Option<f64>,
    pub vote_count: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_role_serializes_snake_case() {
        assert_eq!(serde_json::to_value(ImageRole::Primary).unwrap(), "primary");
        assert_eq!(
            serde_json::to_value(ImageRole::Backdrop).unwrap(),
            "backdrop"
        );
        assert_eq!(ImageRole::Banner.to_string(), "banner");
    }

    #[test]
    fn ranked_image_round_trips_through_json() {
        let info = RankedImageInfo {
            url: "https://thetvdb.com/banners/seasons/1.jpg".into(),
            thumbnail_url: None,
            role: ImageRole::Primary,
            language: Some("en".into()),
            rating: Some(8.2),
            vote_count: Some(17),
            width: Some(680),
            height: Some(1000),
        };

        let json = serde_json::to_string(&info).unwrap();
        let back: RankedImageInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }
}
