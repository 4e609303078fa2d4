//! # Domain Services
//!
//! One service per data domain. Each owns its field catalog, parses its
//! domain options and drives its gateway through the shared
//! [`PartialFetchCoordinator`](crate::PartialFetchCoordinator).
//!
//! | Service | Primary fetch | Optional slots |
//! |---------|---------------|----------------|
//! | [`FinanceService`] | quote summary | `historical`, `recommendations`, previous-close backfill |
//! | [`SearchService`] | web hits, windowed | none |
//! | [`NewsService`] | feed articles, windowed | per-article `sentiment` |
//! | [`MusicService`] | search hits, windowed; id lookups | none |

mod finance;
mod music;
mod news;
mod search;

pub use finance::{FinanceOptions, FinanceService, FINANCE_CATALOG};
pub use music::{MusicService, MUSIC_CATALOG};
pub use news::{clean_html, NewsOptions, NewsService, NEWS_CATALOG};
pub use search::{region_for_language, SearchOptions, SearchService, SEARCH_CATALOG};

use serde::Serialize;
use serde_json::Value;

use crate::ServiceError;

/// Serializes a payload fragment; failure here is an internal error.
fn encode<T: Serialize>(value: &T) -> Result<Value, ServiceError> {
    serde_json::to_value(value)
        .map_err(|e| ServiceError::Internal(format!("failed to encode payload: {e}")))
}
