//! Tests for the iterator module

use super::*;
use crate::config::ClientConfig;
use crate::http::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const BASE: &str = "https://vt.test/api/v3/";
const PAGE_1: &str = "https://vt.test/api/v3/comments";
const PAGE_2: &str = "https://vt.test/api/v3/comments?cursor=p2";
const PAGE_3: &str = "https://vt.test/api/v3/comments?cursor=p3";

// ============================================================================
// Test Transports
// ============================================================================

/// Serves canned responses by URL and records every requested URL
#[derive(Default)]
struct FakeTransport {
    routes: Mutex<HashMap<String, HttpResponse>>,
    requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    fn route(&self, url: &str, response: HttpResponse) {
        self.routes.lock().unwrap().insert(url.to_string(), response);
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> crate::Result<HttpResponse> {
        let url = request.url.to_string();
        self.requests.lock().unwrap().push(url.clone());
        let response = self.routes.lock().unwrap().get(&url).cloned();
        Ok(response.unwrap_or_else(|| {
            json_response(
                404,
                json!({"error": {"code": "NotFoundError", "message": url}}),
            )
        }))
    }
}

/// Never answers
struct PendingTransport;

#[async_trait]
impl Transport for PendingTransport {
    async fn send(&self, _request: HttpRequest) -> crate::Result<HttpResponse> {
        std::future::pending().await
    }
}

fn json_response(status: u16, body: serde_json::Value) -> HttpResponse {
    HttpResponse::new(status, body.to_string()).with_header("content-type", "application/json")
}

fn page(ids: &[&str], self_link: &str, next: &str) -> HttpResponse {
    let data: Vec<_> = ids
        .iter()
        .map(|id| json!({"type": "comment", "id": id, "attributes": {"text": format!("text of {id}")}}))
        .collect();
    let mut links = json!({"self": self_link});
    if !next.is_empty() {
        links["next"] = json!(next);
    }
    json_response(200, json!({"data": data, "links": links}))
}

fn client(transport: Arc<dyn Transport>) -> Client {
    let config = ClientConfig::builder()
        .api_key("test-key")
        .base_url(BASE)
        .build();
    Client::with_transport(config, transport).unwrap()
}

/// Two pages: a, b then c, d
fn two_pages() -> Arc<FakeTransport> {
    let fake = Arc::new(FakeTransport::default());
    fake.route(PAGE_1, page(&["a", "b"], PAGE_1, PAGE_2));
    fake.route(PAGE_2, page(&["c", "d"], PAGE_2, ""));
    fake
}

async fn drain(it: &mut CollectionIterator) -> Vec<String> {
    let mut ids = Vec::new();
    while it.advance().await {
        ids.push(it.current().unwrap().id().to_string());
    }
    ids
}

fn comments_url(client: &Client) -> url::Url {
    client.url("comments").unwrap()
}

// ============================================================================
// Traversal Tests
// ============================================================================

#[tokio::test]
async fn test_iterates_across_pages() {
    let fake = two_pages();
    let client = client(fake.clone());
    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();

    let mut seen = Vec::new();
    let mut cursors = Vec::new();
    while it.advance().await {
        let obj = it.current().unwrap();
        assert_eq!(obj.object_type(), "comment");
        seen.push(obj.id().to_string());
        cursors.push(Cursor::decode(it.cursor()).unwrap());
    }

    assert_eq!(seen, vec!["a", "b", "c", "d"]);
    assert!(it.error().is_none());
    assert_eq!(it.count(), 4);
    assert!(!it.advance().await);

    assert_eq!(
        cursors,
        vec![
            Cursor::new(PAGE_1, 1),
            Cursor::new(PAGE_2, 0),
            Cursor::new(PAGE_2, 1),
            Cursor::default(),
        ]
    );
    assert_eq!(it.cursor(), "");
    assert_eq!(fake.requests(), vec![PAGE_1, PAGE_2]);
}

#[tokio::test]
async fn test_empty_collection() {
    let fake = Arc::new(FakeTransport::default());
    fake.route(PAGE_1, json_response(200, json!({"data": [], "links": {"self": PAGE_1}})));
    let client = client(fake.clone());

    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();

    assert!(!it.advance().await);
    assert!(it.current().is_none());
    assert!(it.error().is_none());
    assert_eq!(it.cursor(), "");
}

#[tokio::test]
async fn test_single_object_page() {
    let fake = Arc::new(FakeTransport::default());
    fake.route(
        PAGE_1,
        json_response(200, json!({"data": {"type": "comment", "id": "only"}})),
    );
    let client = client(fake.clone());

    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();

    assert_eq!(drain(&mut it).await, vec!["only"]);
    assert_eq!(it.cursor(), "");
    assert!(it.error().is_none());
}

#[tokio::test]
async fn test_missing_self_link_falls_back_to_fetched_url() {
    let fake = Arc::new(FakeTransport::default());
    fake.route(
        PAGE_1,
        json_response(
            200,
            json!({"data": [{"type": "comment", "id": "a"}, {"type": "comment", "id": "b"}]}),
        ),
    );
    let client = client(fake.clone());

    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();

    assert!(it.advance().await);
    assert_eq!(
        Cursor::decode(it.cursor()).unwrap(),
        Cursor::new(PAGE_1, 1)
    );
}

#[tokio::test]
async fn test_null_next_link_ends_collection() {
    let fake = Arc::new(FakeTransport::default());
    fake.route(
        PAGE_1,
        json_response(
            200,
            json!({
                "data": [{"type": "comment", "id": "a"}],
                "links": {"self": PAGE_1, "next": null}
            }),
        ),
    );
    let client = client(fake.clone());

    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();

    assert_eq!(drain(&mut it).await, vec!["a"]);
    assert!(it.error().is_none());
    assert_eq!(it.cursor(), "");
    assert_eq!(fake.requests(), vec![PAGE_1]);
}

#[tokio::test]
async fn test_read_ahead_is_bounded() {
    let fake = Arc::new(FakeTransport::default());
    fake.route(PAGE_1, page(&["a", "b"], PAGE_1, PAGE_2));
    fake.route(PAGE_2, page(&["c", "d"], PAGE_2, PAGE_3));
    fake.route(PAGE_3, page(&["e"], PAGE_3, ""));
    let client = client(fake.clone());

    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new().buffer_size(1))
        .unwrap();

    // Nobody consumes: the producer parks on a full buffer inside page one
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fake.requests(), vec![PAGE_1]);
    assert!(!it.is_closed());

    assert_eq!(drain(&mut it).await, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(fake.requests(), vec![PAGE_1, PAGE_2, PAGE_3]);
}

#[tokio::test]
async fn test_small_buffer_preserves_order() {
    let fake = Arc::new(FakeTransport::default());
    fake.route(PAGE_1, page(&["a", "b"], PAGE_1, PAGE_2));
    fake.route(PAGE_2, page(&["c", "d"], PAGE_2, PAGE_3));
    fake.route(PAGE_3, page(&["e"], PAGE_3, ""));
    let client = client(fake.clone());

    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new().buffer_size(1))
        .unwrap();

    assert_eq!(drain(&mut it).await, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(fake.requests(), vec![PAGE_1, PAGE_2, PAGE_3]);
}

#[tokio::test]
async fn test_zero_buffer_size_is_usable() {
    let fake = two_pages();
    let client = client(fake.clone());

    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new().buffer_size(0))
        .unwrap();

    assert_eq!(drain(&mut it).await, vec!["a", "b", "c", "d"]);
}

// ============================================================================
// Query Building Tests
// ============================================================================

#[tokio::test]
async fn test_first_request_without_options_has_no_query() {
    let fake = Arc::new(FakeTransport::default());
    let client = client(fake.clone());

    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();
    drain(&mut it).await;

    assert_eq!(fake.requests(), vec![PAGE_1]);
}

#[tokio::test]
async fn test_first_request_carries_batch_size_and_filter() {
    let fake = Arc::new(FakeTransport::default());
    let client = client(fake.clone());

    let options = IteratorOptions::new().batch_size(10).filter("tag:malware");
    let mut it = client.iterator(comments_url(&client), options).unwrap();
    drain(&mut it).await;

    assert_eq!(
        fake.requests(),
        vec!["https://vt.test/api/v3/comments?limit=10&filter=tag%3Amalware"]
    );
}

#[tokio::test]
async fn test_search_query() {
    let fake = Arc::new(FakeTransport::default());
    let client = client(fake.clone());

    let options = SearchOptions::new().descriptors_only(true);
    let mut it = client.search("type:peexe size:90kb+", options).unwrap();
    drain(&mut it).await;

    assert_eq!(
        fake.requests(),
        vec!["https://vt.test/api/v3/intelligence/search?query=type%3Apeexe+size%3A90kb%2B&descriptors_only=true"]
    );
}

// ============================================================================
// Resumption Tests
// ============================================================================

#[tokio::test]
async fn test_resume_at_page_boundary() {
    let fake = two_pages();
    let client = client(fake.clone());

    let mut first = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();
    assert!(first.advance().await);
    assert!(first.advance().await);
    let cursor = first.cursor().to_string();
    drop(first);

    let fake = two_pages();
    let client = self::client(fake.clone());
    let mut resumed = client
        .iterator(comments_url(&client), IteratorOptions::new().cursor(cursor))
        .unwrap();

    assert_eq!(drain(&mut resumed).await, vec!["c", "d"]);
    assert_eq!(fake.requests(), vec![PAGE_2]);
}

#[tokio::test]
async fn test_resume_mid_page_refetches_and_skips() {
    let fake = two_pages();
    let client = client(fake.clone());

    let mut first = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();
    assert!(first.advance().await);
    let cursor = first.cursor().to_string();
    drop(first);

    let fake = two_pages();
    let client = self::client(fake.clone());
    let mut resumed = client
        .iterator(comments_url(&client), IteratorOptions::new().cursor(cursor))
        .unwrap();

    assert_eq!(drain(&mut resumed).await, vec!["b", "c", "d"]);
    assert_eq!(fake.requests(), vec![PAGE_1, PAGE_2]);
}

#[tokio::test]
async fn test_cursor_takes_precedence_over_filter() {
    let fake = two_pages();
    let client = client(fake.clone());

    let cursor = Cursor::new(PAGE_2, 1).encode();
    let options = IteratorOptions::new()
        .cursor(cursor)
        .batch_size(5)
        .filter("ignored");
    let mut it = client.iterator(comments_url(&client), options).unwrap();

    assert_eq!(drain(&mut it).await, vec!["d"]);
    assert_eq!(fake.requests(), vec![PAGE_2]);
}

#[tokio::test]
async fn test_offset_past_page_end_exhausts() {
    let fake = two_pages();
    let client = client(fake.clone());

    let cursor = Cursor::new(PAGE_1, 7).encode();
    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new().cursor(cursor))
        .unwrap();

    assert!(!it.advance().await);
    assert!(it.error().is_none());
    assert_eq!(fake.requests(), vec![PAGE_1]);
}

#[tokio::test]
async fn test_invalid_cursor_is_rejected() {
    let fake = two_pages();
    let client = client(fake.clone());

    let err = client
        .iterator(
            comments_url(&client),
            IteratorOptions::new().cursor("not a cursor!"),
        )
        .unwrap_err();

    assert!(matches!(err, Error::InvalidCursor { .. }));
    assert!(fake.requests().is_empty());
}

// ============================================================================
// Limit Tests
// ============================================================================

#[tokio::test]
async fn test_limit_within_first_page() {
    let fake = two_pages();
    let client = client(fake.clone());

    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new().limit(1))
        .unwrap();

    assert_eq!(drain(&mut it).await, vec!["a"]);
    assert_eq!(it.count(), 1);
    assert!(!it.advance().await);

    // Let the producer finish, it must not ask for page two
    tokio::time::timeout(Duration::from_secs(1), async {
        while !it.is_closed() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
    assert_eq!(fake.requests(), vec![PAGE_1]);
}

#[tokio::test]
async fn test_limit_across_pages() {
    let fake = two_pages();
    let client = client(fake.clone());

    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new().limit(3))
        .unwrap();

    assert_eq!(drain(&mut it).await, vec!["a", "b", "c"]);
    assert_eq!(
        Cursor::decode(it.cursor()).unwrap(),
        Cursor::new(PAGE_2, 1)
    );
}

// ============================================================================
// Error Tests
// ============================================================================

#[tokio::test]
async fn test_api_error_on_first_page() {
    let fake = Arc::new(FakeTransport::default());
    fake.route(
        PAGE_1,
        json_response(
            404,
            json!({"error": {"code": "NotFoundError", "message": "Resource not found"}}),
        ),
    );
    let client = client(fake.clone());

    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();

    assert!(!it.advance().await);
    assert!(it.current().is_none());
    assert_eq!(it.error().and_then(Error::code), Some("NotFoundError"));
    assert!(!it.advance().await);
}

#[tokio::test]
async fn test_error_mid_stream_keeps_last_item() {
    let fake = Arc::new(FakeTransport::default());
    fake.route(PAGE_1, page(&["a", "b"], PAGE_1, PAGE_2));
    fake.route(PAGE_2, HttpResponse::new(502, "Bad gateway"));
    let client = client(fake.clone());

    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();

    assert_eq!(drain(&mut it).await, vec!["a", "b"]);
    assert_eq!(it.current().unwrap().id(), "b");
    assert_eq!(
        Cursor::decode(it.cursor()).unwrap(),
        Cursor::new(PAGE_2, 0)
    );
    assert!(matches!(
        it.error(),
        Some(Error::HttpStatus { status: 502, .. })
    ));
}

#[tokio::test]
async fn test_decode_error_ends_iteration() {
    let fake = Arc::new(FakeTransport::default());
    fake.route(
        PAGE_1,
        json_response(
            200,
            json!({"data": [{"type": "comment", "id": "a"}, {"id": "no-type"}]}),
        ),
    );
    let client = client(fake.clone());

    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();

    assert!(!it.advance().await);
    match it.error() {
        Some(Error::Decode { path, .. }) => assert_eq!(path, "data[1].type"),
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================================
// Cancellation Tests
// ============================================================================

#[tokio::test]
async fn test_cancel_before_advance() {
    let client = client(Arc::new(PendingTransport));
    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();

    it.cancel();
    it.cancel();

    assert!(!it.advance().await);
    assert!(it.error().is_none());
}

#[tokio::test]
async fn test_cancel_from_another_task() {
    let client = client(Arc::new(PendingTransport));
    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();

    let canceller = it.canceller();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let advanced = tokio::time::timeout(Duration::from_secs(5), it.advance())
        .await
        .unwrap();
    assert!(!advanced);

    tokio::time::timeout(Duration::from_secs(1), async {
        while !it.is_closed() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_drop_cancels() {
    let client = client(Arc::new(PendingTransport));
    let it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();
    let canceller = it.canceller();

    assert!(!canceller.is_cancelled());
    drop(it);
    assert!(canceller.is_cancelled());
}

#[tokio::test]
async fn test_cancel_after_end() {
    let fake = two_pages();
    let client = client(fake.clone());
    let mut it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();

    drain(&mut it).await;
    it.cancel();
    assert!(!it.advance().await);
    assert!(it.error().is_none());
}

// ============================================================================
// Stream Tests
// ============================================================================

#[tokio::test]
async fn test_into_stream() {
    let fake = two_pages();
    let client = client(fake.clone());
    let it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();

    let ids: Vec<String> = it
        .into_stream()
        .map(|res| res.unwrap().id().to_string())
        .collect()
        .await;

    assert_eq!(ids, vec!["a", "b", "c", "d"]);
}

#[tokio::test]
async fn test_into_stream_ends_with_error() {
    let fake = Arc::new(FakeTransport::default());
    fake.route(PAGE_1, page(&["a"], PAGE_1, PAGE_2));
    let client = client(fake.clone());
    let it = client
        .iterator(comments_url(&client), IteratorOptions::new())
        .unwrap();

    let items: Vec<_> = it.into_stream().collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().id(), "a");
    assert_eq!(
        items[1].as_ref().unwrap_err().code(),
        Some("NotFoundError")
    );
}

// ============================================================================
// Options Tests
// ============================================================================

#[test]
fn test_iterator_options_default() {
    let options = IteratorOptions::default();
    assert_eq!(options.limit, 0);
    assert_eq!(options.batch_size, 0);
    assert!(options.cursor.is_empty());
    assert!(options.filter.is_empty());
    assert_eq!(options.buffer_size, DEFAULT_BUFFER_SIZE);
}

#[test]
fn test_search_options_builder() {
    let options = SearchOptions::new()
        .iterator(IteratorOptions::new().limit(5))
        .descriptors_only(true);
    assert_eq!(options.iterator.limit, 5);
    assert!(options.descriptors_only);
}
