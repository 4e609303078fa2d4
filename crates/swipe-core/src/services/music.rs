//! YouTube Music search and id lookups.

use std::sync::Arc;

use serde_json::{json, Value};

use super::encode;
use crate::catalog::{FieldCatalog, FieldSelection, FieldSpec};
use crate::coordinator::PartialFetchCoordinator;
use crate::gateway::{GatewayFuture, MusicGateway};
use crate::outcome::RequestOutcome;
use crate::paginator::{window, Window};
use crate::projector::project_ranked;
use crate::record::RawRecord;
use crate::{Domain, ServiceError, ValidationError};

static MUSIC_FIELDS: [FieldSpec; 7] = [
    FieldSpec::key("result_type", "resultType"),
    FieldSpec::key("title", "title"),
    FieldSpec::key("video_id", "videoId"),
    FieldSpec::key("browse_id", "browseId"),
    FieldSpec::key("artists", "artists"),
    FieldSpec::key("album", "album"),
    FieldSpec::key("duration", "duration"),
];

/// Music search hit fields; every field is returned by default.
pub static MUSIC_CATALOG: FieldCatalog = FieldCatalog::new(
    Domain::Music,
    &MUSIC_FIELDS,
    &[
        "result_type",
        "title",
        "video_id",
        "browse_id",
        "artists",
        "album",
        "duration",
    ],
);

/// Music search plus id lookups. Lookups return the provider record as is.
#[derive(Clone)]
pub struct MusicService {
    gateway: Arc<dyn MusicGateway>,
    coordinator: PartialFetchCoordinator,
    default_count: usize,
    max_count: usize,
}

impl MusicService {
    pub fn new(
        gateway: Arc<dyn MusicGateway>,
        coordinator: PartialFetchCoordinator,
        default_count: usize,
        max_count: usize,
    ) -> Self {
        Self {
            gateway,
            coordinator,
            default_count,
            max_count,
        }
    }

    /// Payload: `{"results": [...]}`.
    pub async fn search(
        &self,
        query: &str,
        selection: &FieldSelection,
        start: Option<usize>,
        count: Option<usize>,
    ) -> RequestOutcome {
        self.coordinator
            .run(&MUSIC_CATALOG, selection, |fields| async move {
                let query = non_empty(query, "search query")?;
                let page = Window::new(
                    start.unwrap_or(0),
                    count.unwrap_or(self.default_count),
                    self.max_count,
                )?;

                let hits = self
                    .coordinator
                    .bounded(self.gateway.search(query, page.fetch_depth()))
                    .await?;

                let ranked = window(hits, page);
                Ok(json!({ "results": encode(&project_ranked(&ranked, &fields, false))? }))
            })
            .await
    }

    pub async fn song(&self, video_id: &str) -> RequestOutcome {
        self.lookup(video_id, "video id", |gateway, id| gateway.song(id))
            .await
    }

    pub async fn album(&self, browse_id: &str) -> RequestOutcome {
        self.lookup(browse_id, "browse id", |gateway, id| gateway.album(id))
            .await
    }

    pub async fn artist(&self, channel_id: &str) -> RequestOutcome {
        self.lookup(channel_id, "artist id", |gateway, id| gateway.artist(id))
            .await
    }

    /// A song without lyrics is `NotFound`.
    pub async fn lyrics(&self, video_id: &str) -> RequestOutcome {
        self.lookup(video_id, "video id", |gateway, id| gateway.lyrics(id))
            .await
    }

    pub async fn charts(&self) -> RequestOutcome {
        self.coordinator
            .run_lookup(Domain::Music, async {
                let record = self.coordinator.bounded(self.gateway.charts()).await?;
                Ok(record.into_value())
            })
            .await
    }

    async fn lookup<F>(&self, id: &str, what: &'static str, call: F) -> RequestOutcome
    where
        F: for<'a> FnOnce(&'a dyn MusicGateway, &'a str) -> GatewayFuture<'a, RawRecord>,
    {
        self.coordinator
            .run_lookup(Domain::Music, async {
                let id = non_empty(id, what)?;
                let record = self
                    .coordinator
                    .bounded(call(self.gateway.as_ref(), id))
                    .await?;
                Ok(record.into_value())
            })
            .await
    }
}

fn non_empty<'a>(value: &'a str, what: &'static str) -> Result<&'a str, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::EmptyQuery { what }.into());
    }
    Ok(value)
}
