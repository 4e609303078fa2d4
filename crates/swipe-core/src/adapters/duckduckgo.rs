use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::gateway::{GatewayError, GatewayFuture, SearchGateway, SearchQuery};
use crate::http_client::HttpClient;
use crate::http_client::HttpRequest;
use crate::record::{RawCollection, RawRecord};

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
/// Upper bound on result pages walked for one request.
const MAX_PAGES: usize = 12;

fn selector(css: &str) -> Result<Selector, GatewayError> {
    Selector::parse(css)
        .map_err(|e| GatewayError::internal(format!("invalid selector '{css}': {e}")))
}

/// Web search over DuckDuckGo's HTML endpoint.
///
/// Raw hits carry `href`, `title` and `body`, in page order.
#[derive(Clone)]
pub struct DuckDuckGoAdapter {
    http_client: Arc<dyn HttpClient>,
}

impl DuckDuckGoAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    async fn page(&self, query: &SearchQuery, offset: usize) -> Result<RawCollection, GatewayError> {
        let url = search_url(query, offset);
        debug!(offset, "duckduckgo request");

        let response = self
            .http_client
            .execute(HttpRequest::get(url).with_header("referer", "https://html.duckduckgo.com/"))
            .await?;

        // A 202 answer is DuckDuckGo's bot challenge page.
        if response.status != 200 {
            return Err(GatewayError::unavailable(format!(
                "duckduckgo returned status {}",
                response.status
            )));
        }

        parse_results(&response.body)
    }
}

impl SearchGateway for DuckDuckGoAdapter {
    fn search<'a>(&'a self, query: &'a SearchQuery) -> GatewayFuture<'a, RawCollection> {
        Box::pin(async move {
            let mut hits: RawCollection = Vec::new();
            for _ in 0..MAX_PAGES {
                if hits.len() >= query.depth {
                    break;
                }

                let page = self.page(query, hits.len()).await?;
                let before = hits.len();
                for hit in page {
                    let duplicate = hits
                        .iter()
                        .any(|seen| seen.get_str("href") == hit.get_str("href"));
                    if !duplicate {
                        hits.push(hit);
                    }
                }
                if hits.len() == before {
                    break;
                }
            }

            hits.truncate(query.depth);
            Ok(hits)
        })
    }
}

fn search_url(query: &SearchQuery, offset: usize) -> String {
    let safe = if query.safe { "-1" } else { "-2" };
    let mut url = format!(
        "{SEARCH_URL}?q={}&kl={}&kp={safe}",
        urlencoding::encode(&query.query),
        urlencoding::encode(&query.region)
    );
    if offset > 0 {
        url.push_str(&format!("&s={offset}&dc={}", offset + 1));
    }
    url
}

/// Extracts organic results; sponsored entries are skipped.
pub(crate) fn parse_results(html: &str) -> Result<RawCollection, GatewayError> {
    let result_selector = selector("div.result")?;
    let title_selector = selector("a.result__a")?;
    let snippet_selector = selector(".result__snippet")?;

    let document = Html::parse_document(html);
    let hits = document
        .select(&result_selector)
        .filter(|result| {
            !result
                .value()
                .classes()
                .any(|class| class == "result--ad")
        })
        .filter_map(|result| {
            let link = result.select(&title_selector).next()?;
            let href = resolve_href(link.value().attr("href")?)?;

            let mut hit = Map::new();
            hit.insert(String::from("href"), Value::String(href));
            hit.insert(String::from("title"), Value::String(text_of(link)));
            hit.insert(
                String::from("body"),
                result
                    .select(&snippet_selector)
                    .next()
                    .map(|snippet| Value::String(text_of(snippet)))
                    .unwrap_or(Value::Null),
            );
            Some(RawRecord::new(hit))
        })
        .collect();
    Ok(hits)
}

fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Result links point at a redirect (`//duckduckgo.com/l/?uddg=<target>`);
/// the target is returned instead.
fn resolve_href(raw: &str) -> Option<String> {
    let base = Url::parse("https://duckduckgo.com/").ok()?;
    let url = base.join(raw).ok()?;

    if url.path().starts_with("/l/") {
        return url
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, target)| target.into_owned());
    }

    Some(url.to_string())
}
