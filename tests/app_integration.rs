use chrono::{Duration, Utc};
use ratecache::core::config::AppConfig;
use ratecache::core::{ManualClock, PairKey, PairRegistry, RateStore, TradingPair};
use ratecache::providers::VpsQuoteSource;
use ratecache::{App, AppCommand};
use std::fs;
use std::sync::Arc;
use tracing::info;

// Upstream mocks and request helpers
mod test_utils {
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn mount_quote(server: &MockServer, from: &str, to: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/api/quote"))
            .and(query_param("from", from))
            .and(query_param("to", to))
            .respond_with(response)
            .mount(server)
            .await;
    }

    pub async fn mount_quote_expect(
        server: &MockServer,
        from: &str,
        to: &str,
        response: ResponseTemplate,
        calls: u64,
    ) {
        Mock::given(method("GET"))
            .and(path("/api/quote"))
            .and(query_param("from", from))
            .and(query_param("to", to))
            .respond_with(response)
            .expect(calls)
            .mount(server)
            .await;
    }

    pub async fn post_json(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

fn config_for(upstream: &str, data_dir: &std::path::Path) -> AppConfig {
    let mut config = AppConfig {
        data_path: Some(data_dir.to_string_lossy().into_owned()),
        ..AppConfig::default()
    };
    config.upstream.base_url = upstream.to_string();
    config
}

#[test_log::test(tokio::test)]
async fn test_miss_then_hit_five_seconds_later() {
    use wiremock::ResponseTemplate;

    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_quote_expect(
        &mock_server,
        "ucore",
        "uusdc",
        ResponseTemplate::new(200).set_body_string(r#"{"rate": 1.23}"#),
        1,
    )
    .await;

    let data_dir = tempfile::tempdir().unwrap();
    let config = config_for(&mock_server.uri(), data_dir.path());
    let stores = ratecache::store::open_store(&config).await.unwrap();
    let source = Arc::new(VpsQuoteSource::new(&config.upstream).unwrap());
    let start = Utc::now();
    let clock = Arc::new(ManualClock::new(start));
    let app = App::with_parts(config, stores, source, clock.clone());
    let router = ratecache::server::app_router(app.state());

    let body = r#"{"from_denom": "ucore", "to_denom": "uusdc"}"#;
    let (status, json) = test_utils::post_json(&router, "/get_best_rate", body).await;
    info!(?json, "First lookup");
    assert_eq!(status, 200);
    assert_eq!(json["rate"], 1.23);
    assert_eq!(json["cached"], false);
    assert_eq!(json["ttl"], 60);

    let row = app
        .stores
        .rates
        .read(&PairKey::new("ucore", "uusdc"))
        .await
        .unwrap()
        .expect("row written on miss");
    assert_eq!(row.source, "VPS");
    assert_eq!(row.expires_at, start + Duration::seconds(60));

    clock.advance(Duration::seconds(5));
    let (status, json) = test_utils::post_json(&router, "/get_best_rate", body).await;
    info!(?json, "Second lookup");
    assert_eq!(status, 200);
    assert_eq!(json["rate"], 1.23);
    assert_eq!(json["cached"], true);
    assert!(json.get("ttl").is_none());

    // Once expired, the next lookup goes upstream again
    mock_server.reset().await;
    test_utils::mount_quote_expect(
        &mock_server,
        "ucore",
        "uusdc",
        ResponseTemplate::new(200).set_body_string(r#"{"rate": 1.3, "path": ["p1"], "liquidity": 10}"#),
        1,
    )
    .await;
    clock.advance(Duration::seconds(60));
    let (_, json) = test_utils::post_json(&router, "/get_best_rate", body).await;
    assert_eq!(json["rate"], 1.3);
    assert_eq!(json["cached"], false);
    assert_eq!(json["path"], serde_json::json!(["p1"]));
    assert_eq!(json["liquidity"], 10.0);
}

#[test_log::test(tokio::test)]
async fn test_non_finite_or_non_numeric_rate_is_rejected() {
    use wiremock::ResponseTemplate;

    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_quote(
        &mock_server,
        "ucore",
        "uusdc",
        ResponseTemplate::new(200).set_body_string(r#"{"rate": "NaN"}"#),
    )
    .await;

    let data_dir = tempfile::tempdir().unwrap();
    let app = App::from_config(config_for(&mock_server.uri(), data_dir.path()))
        .await
        .unwrap();
    let router = ratecache::server::app_router(app.state());

    let (status, json) = test_utils::post_json(
        &router,
        "/get_best_rate",
        r#"{"from_denom": "ucore", "to_denom": "uusdc"}"#,
    )
    .await;
    assert_eq!(status, 502);
    assert_eq!(json["kind"], "invalid_upstream_response");
    assert!(app.stores.rates.entries().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_missing_to_denom_performs_no_io() {
    let mock_server = wiremock::MockServer::start().await;
    let data_dir = tempfile::tempdir().unwrap();
    let app = App::from_config(config_for(&mock_server.uri(), data_dir.path()))
        .await
        .unwrap();
    let router = ratecache::server::app_router(app.state());

    let (status, json) =
        test_utils::post_json(&router, "/get_best_rate", r#"{"from_denom": "ucore"}"#).await;
    assert_eq!(status, 400);
    assert_eq!(json["kind"], "validation");

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_warm_with_one_failing_pair() {
    use wiremock::ResponseTemplate;

    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_quote(
        &mock_server,
        "p1",
        "uusdc",
        ResponseTemplate::new(200).set_body_string(r#"{"rate": 1.0}"#),
    )
    .await;
    test_utils::mount_quote(&mock_server, "p2", "uusdc", ResponseTemplate::new(500)).await;
    test_utils::mount_quote(
        &mock_server,
        "p3",
        "uusdc",
        ResponseTemplate::new(200).set_body_string(r#"{"rate": 3.0}"#),
    )
    .await;

    let data_dir = tempfile::tempdir().unwrap();
    let mut config = config_for(&mock_server.uri(), data_dir.path());
    config.pairs = ["p1", "p2", "p3"]
        .into_iter()
        .map(|from| TradingPair {
            from_denom: from.to_string(),
            to_denom: "uusdc".to_string(),
            is_active: true,
        })
        .collect();
    let app = App::from_config(config).await.unwrap();
    let router = ratecache::server::app_router(app.state());

    let (status, json) = test_utils::post_json(&router, "/refresh_rates_cache", "").await;
    info!(?json, "Warm response");
    assert_eq!(status, 200);
    assert_eq!(json["success"], true);
    assert_eq!(json["warmed"], 2);
    assert_eq!(json["failed"], 1);

    let rates = &app.stores.rates;
    assert_eq!(
        rates.read(&PairKey::new("p1", "uusdc")).await.unwrap().map(|e| e.rate),
        Some(1.0)
    );
    assert_eq!(
        rates.read(&PairKey::new("p3", "uusdc")).await.unwrap().map(|e| e.rate),
        Some(3.0)
    );
    assert!(rates.read(&PairKey::new("p2", "uusdc")).await.unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    use wiremock::ResponseTemplate;

    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_quote(
        &mock_server,
        "ucore",
        "uusdc",
        ResponseTemplate::new(200).set_body_string(r#"{"rate": 1.23, "liquidity": 900}"#),
    )
    .await;

    let data_dir = tempfile::tempdir().unwrap();
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    let config_content = format!(
        r#"
        upstream:
          base_url: {}
        data_path: {}
        pairs:
          - from_denom: ucore
            to_denom: uusdc
    "#,
        mock_server.uri(),
        data_dir.path().display()
    );
    fs::write(config_path, &config_content).expect("Failed to write config file");
    let config_path = config_path.to_str().unwrap();

    for command in [
        AppCommand::Warm,
        AppCommand::Get {
            from_denom: "ucore".to_string(),
            to_denom: "uusdc".to_string(),
            ttl_seconds: Some(120),
        },
        AppCommand::AddPair {
            from_denom: "uusdc".to_string(),
            to_denom: "ucore".to_string(),
        },
        AppCommand::List,
    ] {
        let result = ratecache::run_command(command, Some(config_path)).await;
        assert!(result.is_ok(), "Command failed with: {:?}", result.err());
    }

    // Rows persist across runs
    let config = AppConfig::load_from_path(config_path).unwrap();
    let stores = ratecache::store::open_store(&config).await.unwrap();
    let entries = stores.rates.entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].liquidity, Some(900.0));
    assert_eq!(stores.registry.active_pairs(10).await.unwrap().len(), 2);
}
