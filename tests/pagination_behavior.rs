//! Behavior tests for windowed endpoints: offsets, counts and ranks.

mod support;

use std::sync::Arc;

use serde_json::{json, Value};
use support::{rows, FakeMusic, FakeSearch, Fakes};
use swipe_core::{window, Endpoint, InboundRequest, OutcomeStatus, ServiceHub, Window};

fn numbered_hits(total: usize) -> Vec<Value> {
    (1..=total)
        .map(|n| json!({"href": format!("https://site{n}.example/"), "title": format!("hit {n}")}))
        .collect()
}

fn search_hub(total: usize) -> (ServiceHub, Arc<FakeSearch>) {
    let search = Arc::new(FakeSearch::new(Ok(rows(numbered_hits(total)))));
    let fakes = Fakes {
        search: search.clone(),
        ..Fakes::default()
    };
    (fakes.hub(), search)
}

fn ranks(payload: &Value) -> Vec<u64> {
    payload
        .as_array()
        .expect("search payload is an array")
        .iter()
        .filter_map(|hit| hit["rank"].as_u64())
        .collect()
}

// =============================================================================
// Windows and ranks
// =============================================================================

#[tokio::test]
async fn when_walking_pages_ranks_stay_contiguous() {
    // Given: A provider with 25 results in a stable order
    let (hub, _) = search_hub(25);

    // When: The caller fetches the first two pages of ten with ranks
    let page = |start| {
        InboundRequest::new("rust")
            .with_window(start, 10)
            .with_option("include_rank", "true")
    };
    let first = hub.handle(Endpoint::Search, &page(0)).await;
    let second = hub.handle(Endpoint::Search, &page(10)).await;

    // Then: Ranks run 1..=10 then 11..=20
    assert_eq!(ranks(first.payload().expect("payload")), (1..=10u64).collect::<Vec<_>>());
    assert_eq!(ranks(second.payload().expect("payload")), (11..=20u64).collect::<Vec<_>>());

    // And: The two pages hold exactly the items of one page of twenty
    let double = hub
        .handle(
            Endpoint::Search,
            &InboundRequest::new("rust")
                .with_window(0, 20)
                .with_option("include_rank", "true"),
        )
        .await;
    let joined = [first, second]
        .iter()
        .flat_map(|outcome| outcome.payload().and_then(Value::as_array).cloned().unwrap_or_default())
        .collect::<Vec<_>>();
    assert_eq!(Some(&Value::Array(joined)), double.payload());
}

#[tokio::test]
async fn when_a_window_is_requested_the_provider_is_asked_for_start_plus_count() {
    // Given: A search provider
    let (hub, search) = search_hub(30);

    // When: The caller asks for five results after the first ten
    let request = InboundRequest::new("rust").with_window(10, 5);
    let outcome = hub.handle(Endpoint::Search, &request).await;

    // Then: Fifteen hits were requested and hits 11..=15 come back
    assert_eq!(search.queries()[0].depth, 15);
    let payload = outcome.payload().expect("payload");
    let titles = payload
        .as_array()
        .expect("array")
        .iter()
        .map(|hit| hit["title"].clone())
        .collect::<Vec<_>>();
    assert_eq!(
        titles,
        vec![json!("hit 11"), json!("hit 12"), json!("hit 13"), json!("hit 14"), json!("hit 15")]
    );
}

#[tokio::test]
async fn when_start_is_past_the_end_an_empty_page_is_returned() {
    // Given: Only three results exist
    let (hub, _) = search_hub(3);

    // When: The caller asks for the page starting at 50
    let request = InboundRequest::new("rust").with_window(50, 10);
    let outcome = hub.handle(Endpoint::Search, &request).await;

    // Then: Ok with an empty array
    assert_eq!(outcome.status(), OutcomeStatus::Ok);
    assert_eq!(outcome.payload(), Some(&json!([])));
}

#[tokio::test]
async fn when_count_is_out_of_bounds_the_request_is_rejected_before_fetching() {
    // Given: A search provider and the default cap of 100
    let (hub, search) = search_hub(10);

    // When: The caller asks for zero results, then for too many
    let zero = hub
        .handle(Endpoint::Search, &InboundRequest::new("rust").with_window(0, 0))
        .await;
    let too_many = hub
        .handle(Endpoint::Search, &InboundRequest::new("rust").with_window(0, 101))
        .await;

    // Then: Both are invalid input and the provider was never called
    assert_eq!(zero.status(), OutcomeStatus::InvalidInput);
    assert_eq!(too_many.status(), OutcomeStatus::InvalidInput);
    assert!(search.queries().is_empty());
}

// =============================================================================
// Rank inclusion
// =============================================================================

#[tokio::test]
async fn rank_needs_both_the_field_and_the_option() {
    let (hub, _) = search_hub(3);

    // Rank flag without the rank field
    let flag_only = InboundRequest::new("rust")
        .with_fields("url,title")
        .with_option("include_rank", "true");
    let outcome = hub.handle(Endpoint::Search, &flag_only).await;
    assert!(ranks(outcome.payload().expect("payload")).is_empty());

    // Rank field without the flag
    let field_only = InboundRequest::new("rust").with_fields("url,rank");
    let outcome = hub.handle(Endpoint::Search, &field_only).await;
    let payload = outcome.payload().expect("payload");
    assert!(ranks(payload).is_empty());
    assert!(payload[0].get("rank").is_none());

    // Both
    let both = InboundRequest::new("rust")
        .with_fields("rank,url")
        .with_option("include_rank", "true");
    let outcome = hub.handle(Endpoint::Search, &both).await;
    let payload = outcome.payload().expect("payload");
    assert_eq!(payload[0], json!({"rank": 1, "url": "https://site1.example/"}));
}

// =============================================================================
// Music search window
// =============================================================================

#[tokio::test]
async fn music_search_uses_its_own_default_page_size() {
    // Given: A music provider with plenty of results
    let music = Arc::new(FakeMusic::new(Ok(rows(
        (1..=40)
            .map(|n| json!({"resultType": "song", "title": format!("track {n}")}))
            .collect(),
    ))));
    let fakes = Fakes {
        music: music.clone(),
        ..Fakes::default()
    };

    // When: The caller searches without a count
    let outcome = fakes
        .hub()
        .handle(Endpoint::MusicSearch, &InboundRequest::new("daft punk"))
        .await;

    // Then: Twenty results under "results"
    assert_eq!(music.depths(), vec![20]);
    let results = outcome.payload().expect("payload")["results"]
        .as_array()
        .expect("results array")
        .len();
    assert_eq!(results, 20);
}

#[test]
fn window_never_reorders() {
    let page = Window::new(2, 3, 10).expect("valid window");
    let items = window(vec!['a', 'b', 'c', 'd', 'e', 'f'], page);

    assert_eq!(
        items.iter().map(|ranked| (ranked.rank, ranked.item)).collect::<Vec<_>>(),
        vec![(3, 'c'), (4, 'd'), (5, 'e')]
    );
}
