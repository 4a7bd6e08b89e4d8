//! Integration tests for the HTTP layer, driven through an in-memory
//! store and scripted oracle/rail fakes.

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::json;

use gratia_api::{auth, build_router, ApiConfig, AppState};
use gratia_nullables::{NullOracle, NullRail, NullStore};
use gratia_store::EventStore;

const SECRET: &str = "test-webhook-secret";
const CHAIN_SECRET: &str = "test-chain-secret";

struct Fixture {
    server: TestServer,
    store: Arc<NullStore>,
    rail: Arc<NullRail>,
}

fn fixture_with_oracle(oracle: NullOracle) -> Fixture {
    let store = Arc::new(NullStore::new());
    let rail = Arc::new(NullRail::new());
    let state = AppState::new(
        store.clone(),
        Arc::new(oracle),
        rail.clone(),
        ApiConfig {
            webhook_secret: SECRET.to_string(),
            chain_webhook_secret: CHAIN_SECRET.to_string(),
        },
    )
    .unwrap();
    let server = TestServer::new(build_router(Arc::new(state))).unwrap();
    Fixture { server, store, rail }
}

fn tip_body(signature: &str, amount: f64) -> serde_json::Value {
    json!({
        "txSignature": signature,
        "type": "tip",
        "signer": "S1",
        "receiver": "R1",
        "amount": amount,
    })
}

#[tokio::test]
async fn health_is_public() {
    let f = fixture_with_oracle(NullOracle::new());
    let response = f.server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn ingest_rejects_missing_secret() {
    let f = fixture_with_oracle(NullOracle::new());
    let response = f
        .server
        .post("/webhooks/tx")
        .json(&tip_body("sigA", 1.5))
        .await;
    response.assert_status_unauthorized();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn ingest_rejects_missing_type() {
    let f = fixture_with_oracle(NullOracle::new());
    let response = f
        .server
        .post("/webhooks/tx")
        .add_header("x-webhook-secret", SECRET)
        .json(&json!({ "txSignature": "sigA", "amount": 1.0 }))
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn ingest_rejects_malformed_signature() {
    let f = fixture_with_oracle(NullOracle::new());
    let response = f
        .server
        .post("/webhooks/tx")
        .add_header("x-webhook-secret", SECRET)
        .json(&tip_body("not base58!", 1.0))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn duplicate_webhook_delivery_is_idempotent() {
    let oracle =
        NullOracle::new().with_tx("sigA", NullOracle::confirmed_tx("sigA", 1234));
    let f = fixture_with_oracle(oracle);

    let first = f
        .server
        .post("/webhooks/tx")
        .add_header("x-webhook-secret", SECRET)
        .json(&tip_body("sigA", 1.5))
        .await;
    first.assert_status(axum::http::StatusCode::ACCEPTED);
    let first: serde_json::Value = first.json();
    assert_eq!(first["ok"], true);
    assert_eq!(first["idempotent"], false);
    assert_eq!(first["verification_status"], "verified");

    let second = f
        .server
        .post("/webhooks/tx")
        .add_header("x-webhook-secret", SECRET)
        .json(&tip_body("sigA", 1.5))
        .await;
    second.assert_status(axum::http::StatusCode::ACCEPTED);
    let second: serde_json::Value = second.json();
    assert_eq!(second["idempotent"], true);
    assert_eq!(second["event_id"], first["event_id"]);

    assert_eq!(f.store.event_count().unwrap(), 1);
}

#[tokio::test]
async fn chain_webhook_verifies_hmac_and_rejects_redelivery() {
    let oracle =
        NullOracle::new().with_tx("sigB", NullOracle::confirmed_tx("sigB", 99));
    let f = fixture_with_oracle(oracle);

    let body = json!({
        "type": "transaction",
        "signature": "sigB",
        "accountData": { "from": "S1", "to": "R1", "amount": 2.0 }
    })
    .to_string();
    let signature = auth::sign_chain_body(body.as_bytes(), CHAIN_SECRET);

    let first = f
        .server
        .post("/webhooks/chain")
        .add_header("x-chain-signature", signature.clone())
        .text(body.clone())
        .await;
    first.assert_status(axum::http::StatusCode::ACCEPTED);

    let replay = f
        .server
        .post("/webhooks/chain")
        .add_header("x-chain-signature", signature)
        .text(body.clone())
        .await;
    replay.assert_status(axum::http::StatusCode::CONFLICT);
    let replay: serde_json::Value = replay.json();
    assert_eq!(replay["status"], "duplicate");

    let forged = f
        .server
        .post("/webhooks/chain")
        .add_header("x-chain-signature", "deadbeef")
        .text(body)
        .await;
    forged.assert_status_unauthorized();
}

#[tokio::test]
async fn payout_trigger_requires_verified_event() {
    // Oracle knows nothing about this signature: verification fails.
    let f = fixture_with_oracle(NullOracle::new());

    let ingest: serde_json::Value = f
        .server
        .post("/webhooks/tx")
        .add_header("x-webhook-secret", SECRET)
        .json(&tip_body("sigC", 1.0))
        .await
        .json();
    assert_eq!(ingest["verification_status"], "failed");

    let response = f
        .server
        .post("/payouts/trigger")
        .add_header("x-webhook-secret", SECRET)
        .json(&json!({
            "eventId": ingest["event_id"],
            "recipientAddress": "R1",
        }))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn payout_trigger_creates_then_reports_existing() {
    let oracle =
        NullOracle::new().with_tx("sigD", NullOracle::confirmed_tx("sigD", 55));
    let f = fixture_with_oracle(oracle);

    let ingest: serde_json::Value = f
        .server
        .post("/webhooks/tx")
        .add_header("x-webhook-secret", SECRET)
        .json(&tip_body("sigD", 1.5))
        .await
        .json();
    assert_eq!(ingest["verification_status"], "verified");

    let trigger_body = json!({
        "eventId": ingest["event_id"],
        "recipientAddress": "R1",
    });
    let created: serde_json::Value = f
        .server
        .post("/payouts/trigger")
        .add_header("x-webhook-secret", SECRET)
        .json(&trigger_body)
        .await
        .json();
    assert_eq!(created["status"], "queued");
    assert_eq!(created["success"], true);
    assert!(created["rail_tip_id"].is_string());

    let repeated: serde_json::Value = f
        .server
        .post("/payouts/trigger")
        .add_header("x-webhook-secret", SECRET)
        .json(&trigger_body)
        .await
        .json();
    assert_eq!(repeated["message"], "Payout already exists");
    assert_eq!(repeated["payout_id"], created["payout_id"]);

    // Only one rail call was ever made.
    assert_eq!(f.rail.payout_requests().len(), 1);

    let fetched: serde_json::Value = f
        .server
        .get(&format!("/payouts/{}", ingest["event_id"].as_str().unwrap()))
        .add_header("x-webhook-secret", SECRET)
        .await
        .json();
    assert_eq!(fetched["payout_id"], created["payout_id"]);
}

#[tokio::test]
async fn payout_lookup_for_unknown_event_is_not_found() {
    let f = fixture_with_oracle(NullOracle::new());
    let response = f
        .server
        .get("/payouts/no-such-event")
        .add_header("x-webhook-secret", SECRET)
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn direct_tip_mints_and_records() {
    let f = fixture_with_oracle(NullOracle::new());
    let response = f
        .server
        .post("/tips")
        .add_header("x-webhook-secret", SECRET)
        .json(&json!({
            "fromWallet": "FromWallet1111111111111111111111",
            "toWallet": "ToWallet111111111111111111111111",
            "amount": 5.0,
            "symbol": "USDC",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "pending");
    assert!(body["rail_tx_id"].is_string());
}

#[tokio::test]
async fn direct_tip_rejects_non_positive_amount() {
    let f = fixture_with_oracle(NullOracle::new());
    let response = f
        .server
        .post("/tips")
        .add_header("x-webhook-secret", SECRET)
        .json(&json!({
            "fromWallet": "F",
            "toWallet": "T",
            "amount": 0.0,
            "symbol": "USDC",
        }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn metrics_refresh_returns_summary() {
    let f = fixture_with_oracle(NullOracle::new());
    let response = f
        .server
        .post("/admin/metrics/refresh")
        .add_header("x-webhook-secret", SECRET)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["ingested_total"], 0);
    assert_eq!(body["duplicates_total"], 0);
}

#[tokio::test]
async fn prometheus_counters_track_ingestion() {
    let oracle =
        NullOracle::new().with_tx("sigE", NullOracle::confirmed_tx("sigE", 7));
    let f = fixture_with_oracle(oracle);

    f.server
        .post("/webhooks/tx")
        .add_header("x-webhook-secret", SECRET)
        .json(&tip_body("sigE", 1.0))
        .await
        .assert_status(axum::http::StatusCode::ACCEPTED);

    let exposition = f.server.get("/metrics").await.text();
    assert!(exposition.contains("gratia_events_ingested_total 1"));
}
