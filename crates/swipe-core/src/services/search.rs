//! Windowed web search (DuckDuckGo).

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use super::encode;
use crate::catalog::{FieldCatalog, FieldSelection, FieldSpec};
use crate::coordinator::PartialFetchCoordinator;
use crate::gateway::{SearchGateway, SearchQuery};
use crate::options::OptionMap;
use crate::outcome::RequestOutcome;
use crate::paginator::{window, Window};
use crate::projector::project_ranked;
use crate::record::RawRecord;
use crate::{Domain, ServiceError, ValidationError};

const DEFAULT_REGION: &str = "us-en";

fn source_host(raw: &RawRecord) -> Option<Value> {
    let link = raw.get_str("href").or_else(|| raw.get_str("url"))?;
    let url = Url::parse(link).ok()?;
    url.host_str().map(Value::from)
}

static SEARCH_FIELDS: [FieldSpec; 5] = [
    FieldSpec::first_of("url", &["href", "url"]),
    FieldSpec::key("title", "title"),
    FieldSpec::first_of("description", &["body", "description"]),
    FieldSpec::derived("source", source_host),
    FieldSpec::rank("rank"),
];

/// Web hit fields; every field is returned by default.
pub static SEARCH_CATALOG: FieldCatalog = FieldCatalog::new(
    Domain::Search,
    &SEARCH_FIELDS,
    &["url", "title", "description", "source", "rank"],
);

/// Search region for a UI language; unknown languages search `us-en`.
pub fn region_for_language(language: &str) -> &'static str {
    match language.trim().to_ascii_lowercase().as_str() {
        "en" => "us-en",
        "es" => "es-es",
        "fr" => "fr-fr",
        "de" => "de-de",
        "ja" => "jp-jp",
        "zh" => "cn-zh",
        "ru" => "ru-ru",
        "pt" => "br-pt",
        "it" => "it-it",
        _ => DEFAULT_REGION,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub region: &'static str,
    /// `true` is moderate filtering, `false` turns it off.
    pub safe: bool,
    pub include_rank: bool,
}

impl SearchOptions {
    pub fn parse(options: &OptionMap) -> Result<Self, ValidationError> {
        Ok(Self {
            region: options
                .get_str("language")
                .map_or(DEFAULT_REGION, region_for_language),
            safe: options.bool_or("safe", true)?,
            include_rank: options.bool_or("include_rank", false)?,
        })
    }
}

/// Windowed web search.
#[derive(Clone)]
pub struct SearchService {
    gateway: Arc<dyn SearchGateway>,
    coordinator: PartialFetchCoordinator,
    default_count: usize,
    max_count: usize,
}

impl SearchService {
    pub fn new(
        gateway: Arc<dyn SearchGateway>,
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

    /// Payload: an array of projected hits for the requested window.
    pub async fn search(
        &self,
        query: &str,
        selection: &FieldSelection,
        start: Option<usize>,
        count: Option<usize>,
        options: &OptionMap,
    ) -> RequestOutcome {
        self.coordinator
            .run(&SEARCH_CATALOG, selection, |fields| async move {
                let query = query.trim();
                if query.is_empty() {
                    return Err(ServiceError::from(ValidationError::EmptyQuery {
                        what: "search query",
                    }));
                }
                let page = Window::new(
                    start.unwrap_or(0),
                    count.unwrap_or(self.default_count),
                    self.max_count,
                )?;
                let options = SearchOptions::parse(options)?;

                let request = SearchQuery {
                    query: query.to_owned(),
                    region: options.region.to_owned(),
                    safe: options.safe,
                    depth: page.fetch_depth(),
                };
                let hits = self
                    .coordinator
                    .bounded(self.gateway.search(&request))
                    .await?;

                let ranked = window(hits, page);
                encode(&project_ranked(&ranked, &fields, options.include_rank))
            })
            .await
    }
}
