use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Data domain served by one endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Finance,
    Search,
    News,
    Music,
}

impl Domain {
    pub const ALL: [Self; 4] = [Self::Finance, Self::Search, Self::News, Self::Music];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Finance => "finance",
            Self::Search => "search",
            Self::News => "news",
            Self::Music => "music",
        }
    }

    /// Provider backing this domain.
    pub const fn provider(self) -> ProviderId {
        match self {
            Self::Finance => ProviderId::Yahoo,
            Self::Search => ProviderId::DuckDuckGo,
            Self::News => ProviderId::GoogleNews,
            Self::Music => ProviderId::YoutubeMusic,
        }
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical provider identifiers used in outcome metadata and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Yahoo,
    DuckDuckGo,
    GoogleNews,
    YoutubeMusic,
}

impl ProviderId {
    pub const ALL: [Self; 4] = [
        Self::Yahoo,
        Self::DuckDuckGo,
        Self::GoogleNews,
        Self::YoutubeMusic,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::DuckDuckGo => "duck_duck_go",
            Self::GoogleNews => "google_news",
            Self::YoutubeMusic => "youtube_music",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
