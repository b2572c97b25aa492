use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;
use vaultgraph::api;
use vaultgraph::chain::{InMemoryVaultRegistry, MockConfigReader};
use vaultgraph::db::init_db;
use vaultgraph::{Ingestor, Projector, Repository};

struct TestApp {
    app: axum::Router,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let projector = Projector::new(
        repo.clone(),
        Arc::new(MockConfigReader::new()),
        Arc::new(InMemoryVaultRegistry::new()),
    );
    let ingestor = Arc::new(Ingestor::new(projector));
    let app = api::create_router(api::AppState::new(repo, ingestor));

    TestApp {
        app,
        _temp: temp_dir,
    }
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn post_events(
    app: axum::Router,
    events: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/v1/events")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(events.to_string()))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

const FACTORY: &str = "0x00000000000000000000000000000000000000fa";
const VAULT: &str = "0x00000000000000000000000000000000000000aa";
const USER: &str = "0x00000000000000000000000000000000000000bb";

fn meta(emitter: &str, tx_hash: &str, log_index: u32, block_number: u64) -> serde_json::Value {
    json!({
        "emitter": emitter,
        "txSender": USER,
        "txHash": tx_hash,
        "logIndex": log_index,
        "blockNumber": block_number,
        "blockTimestamp": 1_700_000_000u64 + block_number,
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let test_app = setup_test_app().await;
    let (status, body) = get(test_app.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_ready_endpoint_touches_database() {
    let test_app = setup_test_app().await;
    let (status, body) = get(test_app.app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_ingest_batch_reports_counts() {
    let test_app = setup_test_app().await;

    let events = json!([
        {
            "meta": meta(FACTORY, "0xaaa", 0, 1),
            "kind": "vaultAdded",
            "vault": VAULT,
        },
        {
            "meta": meta(VAULT, "0xbbb", 0, 2),
            "kind": "minted",
            "tokenId": 7,
            "liquidity": "1000",
        },
        {
            "meta": meta(VAULT, "0xccc", 0, 3),
            "kind": "burned",
            "tokenId": 999,
        },
    ]);

    let (status, body) = post_events(test_app.app, &events).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed"], 3);
    assert_eq!(body["applied"], 2);
    assert_eq!(body["skipped"], 1);
}

#[tokio::test]
async fn test_ingested_positions_are_queryable() {
    let test_app = setup_test_app().await;

    let events = json!([
        {
            "meta": meta(VAULT, "0xbbb", 0, 1),
            "kind": "minted",
            "tokenId": 7,
            "liquidity": "1000",
        },
        {
            "meta": meta(VAULT, "0xbbb", 1, 1),
            "kind": "collectFee",
            "tokenId": 7,
            "treasuryAmount0": "5",
            "treasuryAmount1": "9",
        },
    ]);
    let (status, _) = post_events(test_app.app.clone(), &events).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(
        test_app.app.clone(),
        &format!("/v1/positions?account={}", USER),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let positions = body["positions"].as_array().unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0]["tokenId"], 7);
    assert_eq!(positions[0]["liquidity"], "1000");
    assert_eq!(positions[0]["fee0"], "5");
    assert_eq!(positions[0]["fee1"], "9");
    assert_eq!(positions[0]["nonce"], 1);
    assert_eq!(positions[0]["active"], true);

    let (status, body) = get(
        test_app.app,
        &format!("/v1/accounts/{}", USER),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["nonce"], 2);
    let deposits = body["deposits"].as_array().unwrap();
    assert_eq!(deposits.len(), 1);
    assert_eq!(deposits[0]["activePositionCount"], 1);
}

#[tokio::test]
async fn test_vault_detail_includes_config_history() {
    let test_app = setup_test_app().await;

    let treasury = "0x00000000000000000000000000000000000000dd";
    let events = json!([
        {
            "meta": meta(FACTORY, "0xaaa", 0, 1),
            "kind": "vaultAdded",
            "vault": VAULT,
        },
        {
            "meta": meta(VAULT, "0xbbb", 0, 2),
            "kind": "treasuryUpdated",
            "treasury": treasury,
            "treasuryFeePercent": "10",
        },
    ]);
    post_events(test_app.app.clone(), &events).await;

    let (status, body) = get(test_app.app.clone(), &format!("/v1/vaults/{}", VAULT)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vault"]["active"], true);
    assert_eq!(body["vault"]["treasury"], treasury);
    let history = body["treasuryUpdates"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["treasuryFeePercent"], "10");

    let (status, body) = get(test_app.app, "/v1/vaults?active=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vaults"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_batch_redelivery_is_idempotent_end_to_end() {
    let test_app = setup_test_app().await;

    let events = json!([
        {
            "meta": meta(VAULT, "0xbbb", 0, 1),
            "kind": "minted",
            "tokenId": 7,
            "liquidity": "1000",
        },
    ]);
    post_events(test_app.app.clone(), &events).await;
    post_events(test_app.app.clone(), &events).await;

    let (_, body) = get(
        test_app.app,
        &format!("/v1/positions?account={}", USER),
    )
    .await;
    let positions = body["positions"].as_array().unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0]["liquidity"], "1000");
}

#[tokio::test]
async fn test_positions_query_requires_filter() {
    let test_app = setup_test_app().await;
    let (status, _) = get(test_app.app, "/v1/positions").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_address_is_rejected() {
    let test_app = setup_test_app().await;
    let (status, _) = get(test_app.app, "/v1/vaults/not-an-address").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_vault_is_not_found() {
    let test_app = setup_test_app().await;
    let (status, _) = get(
        test_app.app,
        "/v1/vaults/0x00000000000000000000000000000000000000ff",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_event_payload_is_rejected() {
    let test_app = setup_test_app().await;
    let events = json!([{ "meta": meta(VAULT, "0xbbb", 0, 1), "kind": "noSuchKind" }]);
    let (status, _) = post_events(test_app.app, &events).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
