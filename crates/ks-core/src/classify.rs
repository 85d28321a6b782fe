//! Categorical attributes inferred from the ad name.
//!
//! Exports in the adapted report format carry only the ad name, so media
//! source, theme, creative type and platform are recovered from naming
//! conventions such as `ttcx_blinddate_img_aos_03`.

use serde::Serialize;
use std::fmt;

/// Media source inferred from the ad name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    TikTok,
    Meta,
    Echo,
    Spoon,
    Innoceans,
    Unknown,
}

impl MediaType {
    /// Known media sources, in the order the summary and pivot list them.
    pub const KNOWN: [MediaType; 5] = [
        MediaType::Echo,
        MediaType::TikTok,
        MediaType::Meta,
        MediaType::Innoceans,
        MediaType::Spoon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::TikTok => "tiktok",
            MediaType::Meta => "meta",
            MediaType::Echo => "echo",
            MediaType::Spoon => "spoon",
            MediaType::Innoceans => "innoceans",
            MediaType::Unknown => "unknown",
        }
    }

    /// Human-facing label for sheet rows.
    pub fn label(self) -> &'static str {
        match self {
            MediaType::TikTok => "TikTok",
            MediaType::Meta => "Meta",
            MediaType::Echo => "Echo",
            MediaType::Spoon => "Spoon",
            MediaType::Innoceans => "Innoceans",
            MediaType::Unknown => "Other",
        }
    }
}

/// Content theme inferred from the ad name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTheme {
    Participation,
    Blinddate,
    Interest,
    Tpo,
    General,
}

impl ContentTheme {
    /// Themes that are matched by keyword (everything but `General`).
    pub const KNOWN: [ContentTheme; 4] = [
        ContentTheme::Participation,
        ContentTheme::Blinddate,
        ContentTheme::Interest,
        ContentTheme::Tpo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentTheme::Participation => "participation",
            ContentTheme::Blinddate => "blinddate",
            ContentTheme::Interest => "interest",
            ContentTheme::Tpo => "tpo",
            ContentTheme::General => "general",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentTheme::Participation => "Participation",
            ContentTheme::Blinddate => "Blinddate",
            ContentTheme::Interest => "Interest",
            ContentTheme::Tpo => "TPO",
            ContentTheme::General => "General",
        }
    }
}

/// Creative format inferred from the ad name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CreativeType {
    Video,
    Image,
}

impl CreativeType {
    pub fn as_str(self) -> &'static str {
        match self {
            CreativeType::Video => "video",
            CreativeType::Image => "image",
        }
    }
}

/// Target platform inferred from the ad name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Platform {
    #[serde(rename = "AOS")]
    Aos,
    #[serde(rename = "iOS")]
    Ios,
    #[serde(rename = "mixed")]
    Mixed,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Aos, Platform::Ios, Platform::Mixed];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Aos => "AOS",
            Platform::Ios => "iOS",
            Platform::Mixed => "mixed",
        }
    }
}

macro_rules! impl_display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_as_str!(MediaType, ContentTheme, CreativeType, Platform);

/// Categorical attributes of one ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdAttributes {
    pub media_type: MediaType,
    pub content_theme: ContentTheme,
    pub creative_type: CreativeType,
    pub platform: Platform,
}

impl Default for AdAttributes {
    fn default() -> Self {
        Self {
            media_type: MediaType::Unknown,
            content_theme: ContentTheme::General,
            creative_type: CreativeType::Video,
            platform: Platform::Mixed,
        }
    }
}

const MEDIA_KEYWORDS: &[(MediaType, &[&str])] = &[
    (MediaType::TikTok, &["ttcx", "tiktok"]),
    (MediaType::Meta, &["meta", "facebook", "instagram"]),
    (MediaType::Echo, &["echo"]),
    (MediaType::Spoon, &["spoon"]),
    (MediaType::Innoceans, &["innoceans"]),
];

/// Classify an ad by its name. First keyword match wins, in the order of
/// the keyword tables; a blank name yields the defaults.
pub fn classify(ad_name: &str) -> AdAttributes {
    let name = ad_name.trim().to_lowercase();
    if name.is_empty() {
        return AdAttributes::default();
    }

    let media_type = MEDIA_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
        .map_or(MediaType::Unknown, |(media, _)| *media);

    let content_theme = ContentTheme::KNOWN
        .into_iter()
        .find(|theme| name.contains(theme.as_str()))
        .unwrap_or(ContentTheme::General);

    let creative_type = if name.contains("img") || name.contains("image") {
        CreativeType::Image
    } else {
        CreativeType::Video
    };

    // Platform markers are short, so match whole tokens only.
    let mut platform = Platform::Mixed;
    for token in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        match token {
            "aos" | "android" => {
                platform = Platform::Aos;
                break;
            }
            "ios" => {
                platform = Platform::Ios;
                break;
            }
            _ => {}
        }
    }

    AdAttributes {
        media_type,
        content_theme,
        creative_type,
        platform,
    }
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
