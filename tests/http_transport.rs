//! End-to-end tests against a local HTTP server.
//!
//! A std `TcpListener` plays the upstream search API, answering each
//! connection with the next canned response. This exercises the real
//! reqwest transport, the retry decorator, and chain fallback together.

use chrono::NaiveDate;
use reqwest::Url;
use space_timeline::search::{SearchError, SearchExecutor};
use space_timeline::state::{DateBounds, FeedStatus, Outcome, Timeline};
use space_timeline::transport::{HttpTransport, RetryPolicy, Retrying, Transport, TransportError};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Serves `responses` in order, one per connection, then stops.
/// Joining the handle yields the request targets that were received.
fn serve(responses: Vec<(u16, String)>) -> (Url, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();

    let handle = thread::spawn(move || {
        let mut targets = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let head = String::from_utf8_lossy(&head);
            let target = head
                .lines()
                .next()
                .and_then(|line| line.split_whitespace().nth(1))
                .unwrap_or_default()
                .to_string();
            targets.push(target);

            let reason = match status {
                200 => "OK",
                404 => "Not Found",
                429 => "Too Many Requests",
                _ => "Internal Server Error",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        }
        targets
    });

    (base, handle)
}

fn collection(items: &[serde_json::Value], total_hits: u64) -> String {
    serde_json::json!({
        "collection": { "items": items, "metadata": { "total_hits": total_hits } }
    })
    .to_string()
}

fn item(href: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "href": href,
        "data": [{ "title": title, "date_created": "1969-07-20T00:00:00Z" }],
        "links": [{ "href": format!("{href}/thumb.jpg"), "rel": "preview", "render": "image" }]
    })
}

fn client() -> Retrying<HttpTransport> {
    Retrying::new(
        HttpTransport::new(Duration::from_secs(5)).unwrap(),
        RetryPolicy {
            retries: 2,
            backoff: Duration::ZERO,
        },
    )
}

fn moon_landing() -> Timeline {
    Timeline::starting_on(
        NaiveDate::from_ymd_opt(1969, 7, 20).unwrap(),
        DateBounds::until(NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()),
    )
}

#[test]
fn http_transport_returns_body() {
    let body = collection(&[], 0);
    let (base, server) = serve(vec![(200, body.clone())]);

    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    let url = base.join("search?keywords=apollo").unwrap();
    assert_eq!(transport.get(&url).unwrap(), body);

    let targets = server.join().unwrap();
    assert_eq!(targets, vec!["/search?keywords=apollo".to_string()]);
}

#[test]
fn date_chain_falls_back_to_year() {
    let (base, server) = serve(vec![
        (200, collection(&[], 0)),
        (
            200,
            collection(&[item("https://images-assets.nasa.gov/image/as11-40-5874", "Aldrin")], 1),
        ),
    ]);
    let executor = SearchExecutor::new(client(), base);
    let timeline = moon_landing();

    let ticket = timeline.start();
    assert_eq!(timeline.refresh(&executor, &ticket), Outcome::Applied);

    match timeline.view().status {
        FeedStatus::Loaded(result) => {
            assert_eq!(result.items.len(), 1);
            assert_eq!(result.total_hits, 1);
        }
        other => panic!("expected loaded feed, got {other:?}"),
    }

    let targets = server.join().unwrap();
    assert_eq!(targets.len(), 2);
    assert!(targets[0].contains("year_start=1969"));
    assert!(targets[0].contains("keywords=07-20"));
    assert!(targets[1].contains("year_end=1969"));
    assert!(!targets[1].contains("keywords"));
    assert!(targets.iter().all(|t| t.contains("media_type=image")));
}

#[test]
fn server_errors_exhaust_retries_without_fallback() {
    let (base, server) = serve(vec![
        (500, "oops".to_string()),
        (500, "oops".to_string()),
        (500, "oops".to_string()),
    ]);
    let executor = SearchExecutor::new(client(), base);
    let timeline = moon_landing();

    let ticket = timeline.start();
    timeline.refresh(&executor, &ticket);
    assert!(matches!(timeline.view().status, FeedStatus::Failed(_)));

    // 1 + retries attempts, all on the first query of the chain.
    let targets = server.join().unwrap();
    assert_eq!(targets.len(), 3);
    assert!(targets.iter().all(|t| t.contains("keywords=07-20")));
}

#[test]
fn client_errors_are_not_retried() {
    let (base, server) = serve(vec![(404, "{}".to_string())]);
    let executor = SearchExecutor::new(client(), base);
    let timeline = moon_landing();

    let ticket = timeline.set_keywords("apollo").unwrap();
    let outcome = executor.execute_chain(&ticket.chain);
    assert!(matches!(
        outcome,
        Err(SearchError::Transport(TransportError::Status { status: 404, .. }))
    ));
    assert_eq!(server.join().unwrap().len(), 1);
}

#[test]
fn rate_limit_recovers_on_retry() {
    let (base, server) = serve(vec![
        (429, String::new()),
        (200, collection(&[item("https://x/apollo", "Apollo")], 40)),
    ]);
    let executor = SearchExecutor::new(client(), base);
    let timeline = moon_landing();

    let ticket = timeline.set_keywords("apollo").unwrap();
    timeline.refresh(&executor, &ticket);
    let view = timeline.view();
    match &view.status {
        FeedStatus::Loaded(result) => assert!(result.is_partial()),
        other => panic!("expected loaded feed, got {other:?}"),
    }
    assert_eq!(server.join().unwrap().len(), 2);
}
