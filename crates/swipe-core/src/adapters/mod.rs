//! Production provider adapters, one per domain.

pub mod duckduckgo;
pub mod google_news;
pub mod yahoo;
pub mod youtube_music;

pub use duckduckgo::DuckDuckGoAdapter;
pub use google_news::GoogleNewsAdapter;
pub use yahoo::YahooAdapter;
pub use youtube_music::YoutubeMusicAdapter;
