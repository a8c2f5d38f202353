// File: agentsim-common/src/models/platform.rs

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Social network a draft targets. Serialized with the display names the
/// drafting step produces ("Instagram", "YouTube Shorts", ...).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Platform {
    Instagram,
    Tiktok,
    Threads,
    #[serde(rename = "YouTube Shorts", alias = "YouTubeShorts")]
    YouTubeShorts,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Instagram,
        Platform::Tiktok,
        Platform::Threads,
        Platform::YouTubeShorts,
    ];

    /// Short-form video platforms, where cross-posted drafts become reels.
    pub fn is_video_first(&self) -> bool {
        matches!(self, Platform::Tiktok | Platform::YouTubeShorts)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Instagram => write!(f, "Instagram"),
            Platform::Tiktok => write!(f, "Tiktok"),
            Platform::Threads => write!(f, "Threads"),
            Platform::YouTubeShorts => write!(f, "YouTube Shorts"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "instagram" | "ig" => Ok(Platform::Instagram),
            "tiktok" => Ok(Platform::Tiktok),
            "threads" => Ok(Platform::Threads),
            "youtube shorts" | "youtube-shorts" | "youtubeshorts" | "shorts" => {
                Ok(Platform::YouTubeShorts)
            }
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trips_through_display() {
        for p in Platform::ALL {
            let parsed: Platform = p.to_string().parse().expect("display name should parse");
            assert_eq!(parsed, p);
        }
    }

    #[test]
    fn test_platform_parse_aliases() {
        assert_eq!("youtube-shorts".parse::<Platform>(), Ok(Platform::YouTubeShorts));
        assert_eq!("TIKTOK".parse::<Platform>(), Ok(Platform::Tiktok));
        assert!("myspace".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_serde_uses_display_names() {
        let json = serde_json::to_string(&Platform::YouTubeShorts).unwrap();
        assert_eq!(json, "\"YouTube Shorts\"");
        let back: Platform = serde_json::from_str("\"YouTubeShorts\"").unwrap();
        assert_eq!(back, Platform::YouTubeShorts);
    }
}
