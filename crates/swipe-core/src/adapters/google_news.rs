use std::sync::Arc;

use rss::Channel;
use serde_json::{Map, Value};
use tracing::debug;

use crate::gateway::{GatewayError, GatewayFuture, NewsGateway, NewsQuery};
use crate::http_client::{HttpClient, HttpRequest};
use crate::record::{RawCollection, RawRecord};

const FEED_BASE: &str = "https://news.google.com/rss";

/// Google News RSS gateway.
///
/// Raw articles carry `title`, `link`, `published`, `summary` (feed HTML),
/// `source_title`, and `category`: the requested category for searches,
/// `top` for headlines.
#[derive(Clone)]
pub struct GoogleNewsAdapter {
    http_client: Arc<dyn HttpClient>,
}

impl GoogleNewsAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }
}

impl NewsGateway for GoogleNewsAdapter {
    fn articles<'a>(&'a self, query: &'a NewsQuery) -> GatewayFuture<'a, RawCollection> {
        Box::pin(async move {
            let url = feed_url(query);
            debug!(url = %url, "google news request");

            let response = self.http_client.execute(HttpRequest::get(url)).await?;
            if !response.is_success() {
                return Err(GatewayError::unavailable(format!(
                    "google news returned status {}",
                    response.status
                )));
            }

            let channel = Channel::read_from(response.body.as_bytes()).map_err(|e| {
                GatewayError::unavailable(format!("failed to parse google news feed: {e}"))
            })?;

            let category = match (&query.query, &query.category) {
                (None, _) => Value::from("top"),
                (Some(_), Some(category)) => Value::from(category.as_str()),
                (Some(_), None) => Value::Null,
            };

            Ok(channel
                .items()
                .iter()
                .map(|item| {
                    let text = |value: Option<&str>| value.map(Value::from).unwrap_or(Value::Null);
                    let mut article = Map::new();
                    article.insert(String::from("title"), text(item.title()));
                    article.insert(String::from("link"), text(item.link()));
                    article.insert(String::from("published"), text(item.pub_date()));
                    article.insert(String::from("summary"), text(item.description()));
                    article.insert(
                        String::from("source_title"),
                        text(item.source().and_then(|source| source.title())),
                    );
                    article.insert(String::from("category"), category.clone());
                    RawRecord::new(article)
                })
                .collect())
        })
    }
}

/// Search feed when a query is given, else the top-headlines feed. Date
/// bounds travel inside the query as `after:`/`before:` operators.
fn feed_url(query: &NewsQuery) -> String {
    let language = query.language.to_lowercase();
    let region = query.region.to_uppercase();
    let locale = format!("hl={language}&gl={region}&ceid={region}:{language}");

    let Some(mut text) = query.search_text() else {
        return format!("{FEED_BASE}?{locale}");
    };
    if let Some(from) = query.from {
        text.push_str(&format!(" after:{from}"));
    }
    if let Some(to) = query.to {
        text.push_str(&format!(" before:{to}"));
    }

    format!("{FEED_BASE}/search?q={}&{locale}", urlencoding::encode(&text))
}
