use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use migr8::discovery::DiscoveryEngine;
use migr8::http::{ClientOptions, ProbeClient};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use wiremock::{
    matchers::{header, method, path, path_regex},
    Mock, MockServer, ResponseTemplate,
};

fn client(timeout: Duration) -> ProbeClient {
    ProbeClient::new(ClientOptions {
        timeout,
        ..Default::default()
    })
    .unwrap()
}

fn engine(concurrency: usize) -> DiscoveryEngine {
    DiscoveryEngine::new(client(Duration::from_secs(5)), concurrency)
}

/// Plain HTTP server answering every request with an empty 200 after
/// `delay`, recording the highest number of requests held at once.
async fn counting_server(delay: Duration) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let (in_flight_srv, peak_srv) = (Arc::clone(&in_flight), Arc::clone(&peak));
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let in_flight = Arc::clone(&in_flight_srv);
            let peak = Arc::clone(&peak_srv);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                    .await;
            });
        }
    });

    (format!("http://{}/", addr), peak)
}

async fn fast_and_slow_server(slow_delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/fast\d/$"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/slow\d/$"))
        .respond_with(ResponseTemplate::new(200).set_delay(slow_delay))
        .mount(&server)
        .await;
    server
}

fn sorted_paths(results: &[migr8::discovery::DiscoveryResult]) -> Vec<String> {
    let mut paths: Vec<String> = results.iter().map(|r| r.path.clone()).collect();
    paths.sort();
    paths
}

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

async fn get_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.to_string() == "GET")
        .map(|r| r.url.path().to_string())
        .collect()
}

async fn mixed_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uploads/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Index of /uploads"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/files/index/"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_sweep_classifies_and_dedups() {
    let server = mixed_server().await;
    let candidates = words(&["uploads", "files", "admin", "broken", "nothing", "uploads/", "uploads"]);

    let results = engine(4).sweep(&server.uri(), &candidates).await.unwrap();

    let found: BTreeSet<(String, bool, bool)> = results
        .iter()
        .map(|r| (r.path.trim_matches('/').to_string(), r.accessible, r.protected))
        .collect();
    let expected: BTreeSet<(String, bool, bool)> = [
        ("admin".to_string(), false, true),
        ("files".to_string(), true, false),
        ("uploads".to_string(), true, false),
    ]
    .into_iter()
    .collect();
    assert_eq!(found, expected);
    assert_eq!(results.len(), 3);

    // One request per distinct candidate, redirects not followed
    let paths = get_paths(&server).await;
    assert_eq!(paths.len(), 5);
    assert!(!paths.contains(&"/files/index/".to_string()));

    let files = results.iter().find(|r| r.path == "files").unwrap();
    assert_eq!(files.status_code, 301);
}

#[tokio::test]
async fn test_sweep_results_independent_of_concurrency() {
    let server = mixed_server().await;
    let candidates = words(&["nothing", "admin", "uploads", "files", "broken", "x", "y", "z"]);

    let mut serial = engine(1).sweep(&server.uri(), &candidates).await.unwrap();
    let mut parallel = engine(20).sweep(&server.uri(), &candidates).await.unwrap();

    serial.sort_by(|a, b| a.url.cmp(&b.url));
    parallel.sort_by(|a, b| a.url.cmp(&b.url));
    assert_eq!(serial, parallel);

    let reversed: Vec<String> = candidates.iter().rev().cloned().collect();
    let mut reordered = engine(3).sweep(&server.uri(), &reversed).await.unwrap();
    reordered.sort_by(|a, b| a.url.cmp(&b.url));
    assert_eq!(serial, reordered);
}

#[tokio::test]
async fn test_protected_directories_not_descended() {
    let server = mixed_server().await;
    let candidates = words(&["admin", "uploads"]);
    let base = format!("{}/", server.uri());

    let tree = engine(4).recurse(&base, &candidates, 2, 0).await.unwrap().unwrap();

    assert_eq!(tree.depth, 1);
    assert_eq!(tree.found_paths.len(), 2);
    assert_eq!(tree.children.len(), 1);
    assert!(tree.children[0].base_url.ends_with("/uploads/"));

    let paths = get_paths(&server).await;
    assert!(paths.iter().all(|p| !p.starts_with("/admin/") || p == "/admin/"));
    assert!(paths.contains(&"/uploads/admin/".to_string()));
}

#[tokio::test]
async fn test_recursion_bounded_against_always_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(".*"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let base = format!("{}/", server.uri());
    let tree = engine(8)
        .recurse(&base, &words(&["a", "b"]), 2, 0)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(tree.deepest(), 2);
    assert_eq!(tree.all_paths().len(), 6);

    let paths = get_paths(&server).await;
    assert_eq!(paths.len(), 6);
    for p in &paths {
        let segments = p.trim_matches('/').split('/').count();
        assert!(segments <= 2, "{} is deeper than two levels", p);
    }
}

#[tokio::test]
async fn test_recursion_at_max_depth_issues_nothing() {
    let server = MockServer::start().await;
    let base = format!("{}/", server.uri());

    let result = engine(4).recurse(&base, &words(&["a"]), 2, 2).await.unwrap();

    assert!(result.is_none());
    assert!(get_paths(&server).await.is_empty());
}

#[tokio::test]
async fn test_find_files_requests_every_pair_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uploads/a.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .set_body_string("<p>PHP Version: 8.2.1</p>"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/b.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<?php echo 1; ?>"))
        .mount(&server)
        .await;

    let directories = words(&["", "uploads/", "files", "tmp/"]);
    let filenames = words(&["a.php", "b.php", "c.php"]);

    let mut hits = engine(5)
        .find_files(&server.uri(), &directories, &filenames)
        .await
        .unwrap();
    hits.sort_by(|a, b| a.url.cmp(&b.url));

    assert_eq!(get_paths(&server).await.len(), directories.len() * filenames.len());
    assert_eq!(hits.len(), 2);

    assert_eq!(hits[0].filename, "b.php");
    assert!(!hits[0].executed);
    assert!(hits[0].evidence.is_none());

    assert_eq!(hits[1].directory, "uploads/");
    assert!(hits[1].executed);
    assert!(hits[1].evidence.as_deref().unwrap().contains("PHP Version: 8.2.1"));
}

#[tokio::test]
async fn test_all_404_yields_nothing() {
    let server = MockServer::start().await;
    let candidates = words(&["uploads", "files", "media", "tmp"]);
    let discovery = engine(4);

    assert!(discovery.sweep(&server.uri(), &candidates).await.unwrap().is_empty());

    let report = discovery
        .enumerate_directories(&server.uri(), &candidates, true, 2)
        .await
        .unwrap();
    assert!(report.all_paths().is_empty());
    assert!(report.recursive.is_empty());

    let hits = discovery
        .find_files(&server.uri(), &candidates, &words(&["shell.php"]))
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_smart_enumeration_searches_discovered_directories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uploads/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uploads/2024/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uploads/2024/shell.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>PHP Version: 8</p>"))
        .mount(&server)
        .await;

    let result = engine(4)
        .smart_enumeration(&server.uri(), &words(&["shell.php"]), &words(&["uploads", "2024"]), 2)
        .await
        .unwrap();

    assert_eq!(
        result.searched_directories,
        vec!["".to_string(), "uploads".to_string(), "uploads/2024".to_string()]
    );
    assert_eq!(result.files.len(), 1);
    assert_eq!(result.executed().len(), 1);
    assert!(result.files[0].url.ends_with("/uploads/2024/shell.php"));
    assert!(!result.enumeration.interrupted);
}

#[tokio::test]
async fn test_cancelled_before_start_sends_nothing() {
    let server = mixed_server().await;
    let cancel = CancellationToken::new();
    cancel.cancel();
    let discovery = engine(4).with_cancel_token(cancel);

    let results = discovery
        .sweep(&server.uri(), &words(&["uploads", "files", "admin"]))
        .await
        .unwrap();
    assert!(results.is_empty());

    let report = discovery
        .enumerate_directories(&server.uri(), &words(&["uploads"]), true, 2)
        .await
        .unwrap();
    assert!(report.interrupted);
    assert!(get_paths(&server).await.is_empty());
}

#[tokio::test]
async fn test_invalid_base_url_is_an_error() {
    let result = engine(4).sweep("not a url", &words(&["uploads"])).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_in_flight_requests_bounded_by_concurrency() {
    let (base, peak) = counting_server(Duration::from_millis(150)).await;
    let candidates: Vec<String> = (0..40).map(|i| format!("dir{}", i)).collect();

    let results = engine(4).sweep(&base, &candidates).await.unwrap();
    assert_eq!(results.len(), 40);
    let swept_peak = peak.load(Ordering::SeqCst);
    assert!(swept_peak <= 4 && swept_peak >= 1, "peak {} exceeds 4", swept_peak);

    let (base, peak) = counting_server(Duration::from_millis(150)).await;
    let directories: Vec<String> = (0..5).map(|i| format!("d{}/", i)).collect();
    let filenames: Vec<String> = (0..10).map(|i| format!("f{}.php", i)).collect();

    let hits = engine(3).find_files(&base, &directories, &filenames).await.unwrap();
    assert_eq!(hits.len(), 50);
    let hunted_peak = peak.load(Ordering::SeqCst);
    assert!(hunted_peak <= 3 && hunted_peak >= 1, "peak {} exceeds 3", hunted_peak);
}

#[tokio::test]
async fn test_zero_concurrency_runs_one_at_a_time() {
    let (base, peak) = counting_server(Duration::from_millis(50)).await;
    let candidates = words(&["a", "b", "c", "d"]);

    let results = engine(0).sweep(&base, &candidates).await.unwrap();

    assert_eq!(results.len(), 4);
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancel_mid_sweep_keeps_finished_results() {
    let server = fast_and_slow_server(Duration::from_secs(10)).await;
    let cancel = CancellationToken::new();
    let discovery = engine(10).with_cancel_token(cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(700)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let results = discovery
        .sweep(&server.uri(), &words(&["fast1", "slow1", "fast2", "slow2", "slow3"]))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(sorted_paths(&results), words(&["fast1", "fast2"]));
    assert!(discovery.is_cancelled());
}

#[tokio::test]
async fn test_timed_out_request_is_an_absent_result() {
    let server = fast_and_slow_server(Duration::from_secs(5)).await;
    let discovery = DiscoveryEngine::new(client(Duration::from_secs(1)), 4);

    let started = Instant::now();
    let results = discovery
        .sweep(&server.uri(), &words(&["fast1", "slow1", "fast2"]))
        .await;

    let results = results.expect("a timed-out request must not fail the sweep");
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(sorted_paths(&results), words(&["fast1", "fast2"]));
}

#[tokio::test]
async fn test_session_cookie_carried_into_sweeps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/upload.php"))
        .respond_with(ResponseTemplate::new(200).insert_header("Set-Cookie", "session=abc123; Path=/"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uploads/"))
        .and(header("cookie", "session=abc123"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client(Duration::from_secs(5));
    client.get(&format!("{}/upload.php", server.uri())).await.unwrap();

    let results = DiscoveryEngine::new(client, 2)
        .sweep(&server.uri(), &words(&["uploads"]))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].accessible);
}
