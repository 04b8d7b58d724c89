//! Integration tests for the reqwest network and the worker on top of it,
//! against a wiremock server.

use std::sync::Arc;

use swcache_client::{FetchConfig, FetchOutcome, HttpNetwork, Network, ServiceWorker};
use swcache_core::{AppConfig, CacheDb, CacheStore, Error, Request, ResponseSource};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(server: &MockServer, p: &str) -> Request {
    Request::get(Url::parse(&server.uri()).unwrap().join(p).unwrap())
}

#[tokio::test]
async fn test_fetch_returns_body_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/styles/main.css"))
        .and(header("x-requested-with", "swcache"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("body { margin: 0 }", "text/css"))
        .mount(&server)
        .await;

    let network = HttpNetwork::new(FetchConfig::default()).unwrap();
    let req = request(&server, "/styles/main.css").with_header("x-requested-with", "swcache");
    let response = network.fetch(&req).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type(), Some("text/css"));
    assert_eq!(response.text(), "body { margin: 0 }");
    assert_eq!(response.source, ResponseSource::Network);
}

#[tokio::test]
async fn test_error_status_is_not_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let network = HttpNetwork::new(FetchConfig::default()).unwrap();
    let response = network.fetch(&request(&server, "/api/products")).await.unwrap();

    assert_eq!(response.status, 500);
    assert!(!response.is_ok());
    assert_eq!(response.status_text, "Internal Server Error");
}

#[tokio::test]
async fn test_body_over_limit_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/assets/products/huge.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4096]))
        .mount(&server)
        .await;

    let network = HttpNetwork::new(FetchConfig { max_bytes: 1024, ..Default::default() }).unwrap();
    let result = network.fetch(&request(&server, "/assets/products/huge.jpg")).await;

    assert!(matches!(result, Err(Error::FetchTooLarge(_))));
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let req = Request::get(Url::parse(&format!("http://127.0.0.1:{port}/index.html")).unwrap());

    let network = HttpNetwork::new(FetchConfig::default()).unwrap();
    let err = network.fetch(&req).await.unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn test_worker_serves_precached_assets_from_cache() {
    let server = MockServer::start().await;
    for (p, body) in [("/index.html", "<html></html>"), ("/scripts/main.js", "init()")] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = AppConfig {
        origin: server.uri(),
        static_assets: vec!["/index.html".into(), "/scripts/main.js".into()],
        ..Default::default()
    };
    let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
    let network = Arc::new(HttpNetwork::new(FetchConfig::from(&config)).unwrap());
    let worker = ServiceWorker::from_app_config(db.clone(), network, &config).unwrap();

    let report = worker.install().await.unwrap();
    assert_eq!(report.cached, 2);
    worker.activate().await.unwrap();
    assert!(worker.controls_clients());

    let outcome = worker.handle_fetch(&request(&server, "/scripts/main.js")).await;
    let FetchOutcome::Respond { response, .. } = outcome else {
        panic!("GET requests are always intercepted");
    };
    assert_eq!(response.source, ResponseSource::Cache);
    assert_eq!(response.text(), "init()");
    assert_eq!(db.keys(&worker.buckets().static_bucket).await.unwrap().len(), 2);
    server.verify().await;
}

#[tokio::test]
async fn test_connectivity_probe_uses_head() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = AppConfig { origin: server.uri(), static_assets: Vec::new(), ..Default::default() };
    let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
    let network = Arc::new(HttpNetwork::new(FetchConfig::default()).unwrap());
    let worker = ServiceWorker::from_app_config(db, network, &config).unwrap();

    assert!(worker.check_connectivity().await);
}
