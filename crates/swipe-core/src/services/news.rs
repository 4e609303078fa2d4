//! News search and top headlines (Google News RSS), with per-article
//! sentiment when requested.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use super::encode;
use crate::catalog::{FieldCatalog, FieldSelection, FieldSpec};
use crate::coordinator::{PartialFetchCoordinator, SubFetchOutcome};
use crate::gateway::{NewsGateway, NewsQuery};
use crate::options::OptionMap;
use crate::outcome::RequestOutcome;
use crate::paginator::{window, Window};
use crate::projector::project_ranked;
use crate::record::RawRecord;
use crate::sentiment::{analyzer, SentimentScores};
use crate::{CalendarDate, Domain, ServiceError, ValidationError};

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("tag regex should compile"));

/// Strips markup tags and decodes HTML entities.
pub fn clean_html(raw: &str) -> String {
    let stripped = TAG.replace_all(raw, "");
    html_escape::decode_html_entities(&stripped).into_owned()
}

fn description(raw: &RawRecord) -> Option<Value> {
    raw.get_str("summary").map(|summary| Value::from(clean_html(summary)))
}

// The feed never carries article images.
fn no_image(_: &RawRecord) -> Option<Value> {
    None
}

static NEWS_FIELDS: [FieldSpec; 7] = [
    FieldSpec::key("title", "title"),
    FieldSpec::key("url", "link"),
    FieldSpec::key("source", "source_title"),
    FieldSpec::key("published", "published"),
    FieldSpec::derived("description", description),
    FieldSpec::derived("image", no_image),
    FieldSpec::key("category", "category"),
];

pub static NEWS_CATALOG: FieldCatalog = FieldCatalog::new(
    Domain::News,
    &NEWS_FIELDS,
    &[
        "title",
        "url",
        "source",
        "published",
        "description",
        "image",
        "category",
    ],
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsOptions {
    pub from: Option<CalendarDate>,
    pub to: Option<CalendarDate>,
    pub language: String,
    pub region: String,
    pub category: Option<String>,
    pub include_sentiment: bool,
}

impl NewsOptions {
    pub fn parse(
        options: &OptionMap,
        default_language: &str,
        default_region: &str,
    ) -> Result<Self, ValidationError> {
        let from = options.date("from_date")?;
        let to = options.date("to_date")?;
        if let (Some(from), Some(to)) = (from, to) {
            if to < from {
                return Err(ValidationError::InvertedDateRange {
                    start: from.to_string(),
                    end: to.to_string(),
                });
            }
        }

        Ok(Self {
            from,
            to,
            language: options
                .get_str("language")
                .unwrap_or(default_language)
                .to_owned(),
            region: options
                .get_str("region")
                .unwrap_or(default_region)
                .to_owned(),
            category: options.get_str("category").map(str::to_owned),
            include_sentiment: options.bool_or("include_sentiment", false)?,
        })
    }
}

/// News search and top headlines with optional per-article sentiment.
#[derive(Clone)]
pub struct NewsService {
    gateway: Arc<dyn NewsGateway>,
    coordinator: PartialFetchCoordinator,
    default_count: usize,
    max_count: usize,
    default_language: String,
    default_region: String,
}

impl NewsService {
    pub fn new(
        gateway: Arc<dyn NewsGateway>,
        coordinator: PartialFetchCoordinator,
        default_count: usize,
        max_count: usize,
    ) -> Self {
        Self {
            gateway,
            coordinator,
            default_count,
            max_count,
            default_language: String::from("en"),
            default_region: String::from("US"),
        }
    }

    pub fn with_locale(mut self, language: impl Into<String>, region: impl Into<String>) -> Self {
        self.default_language = language.into();
        self.default_region = region.into();
        self
    }

    /// Payload: `{"articles": [...]}`. A blank or absent query asks for top
    /// headlines.
    pub async fn articles(
        &self,
        query: Option<&str>,
        selection: &FieldSelection,
        start: Option<usize>,
        count: Option<usize>,
        options: &OptionMap,
    ) -> RequestOutcome {
        self.coordinator
            .run(&NEWS_CATALOG, selection, |fields| async move {
                let page = Window::new(
                    start.unwrap_or(0),
                    count.unwrap_or(self.default_count),
                    self.max_count,
                )?;
                let options =
                    NewsOptions::parse(options, &self.default_language, &self.default_region)?;

                let request = NewsQuery {
                    query: query
                        .map(str::trim)
                        .filter(|query| !query.is_empty())
                        .map(str::to_owned),
                    language: options.language,
                    region: options.region,
                    from: options.from,
                    to: options.to,
                    category: options.category,
                };
                let entries = self
                    .coordinator
                    .bounded(self.gateway.articles(&request))
                    .await?;

                let ranked = window(entries, page);
                let projected = project_ranked(&ranked, &fields, false);

                let mut articles = Vec::with_capacity(projected.len());
                for (entry, article) in ranked.iter().zip(&projected) {
                    let mut article = encode(article)?;
                    if options.include_sentiment {
                        if let Value::Object(map) = &mut article {
                            map.insert(String::from("sentiment"), encode(&score(&entry.item))?);
                        }
                    }
                    articles.push(article);
                }

                Ok(json!({ "articles": articles }))
            })
            .await
    }
}

/// Scores `"<title>. <description>"`; a failure stays on this article.
fn score(entry: &RawRecord) -> SubFetchOutcome<SentimentScores> {
    let title = entry.get_str("title").unwrap_or_default();
    let description = entry.get_str("summary").map(clean_html).unwrap_or_default();
    let text = format!("{title}. {description}");

    match analyzer().polarity_scores(text.trim_matches(|ch: char| ch == '.' || ch.is_whitespace())) {
        Ok(scores) => SubFetchOutcome::Success(scores),
        Err(error) => SubFetchOutcome::Failed(format!("Could not score sentiment: {error}")),
    }
}
