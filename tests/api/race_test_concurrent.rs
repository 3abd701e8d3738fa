use crate::helpers::spawn_app_with_sdk;
use hpp_race_probe::gateway::{ContaminatingHostedPaymentSdk, LoopbackHostedPaymentSdk};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn isolated_sdk_keeps_parallel_trials_apart() {
    let app = spawn_app_with_sdk(Arc::new(LoopbackHostedPaymentSdk)).await;

    let response = app.get_concurrent_race_test(20).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["Requests"], 20);
    assert_eq!(body["Mismatches"], 0);
    assert_eq!(body["CrossContaminated"], 0);
    assert_eq!(body["RaceConditionDetected"], false);
    assert_eq!(body["Results"].as_array().unwrap().len(), 20);
    assert!(body["Failures"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn shared_config_cache_is_caught_by_the_harness() {
    let requests = 6;
    let app = spawn_app_with_sdk(Arc::new(ContaminatingHostedPaymentSdk::with_rendezvous(
        requests,
    )))
    .await;

    let response = app.get_concurrent_race_test(requests).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["RaceConditionDetected"], true);
    let results = body["Results"].as_array().unwrap();
    assert_eq!(results.len(), requests);
    let outputs: HashSet<&str> = results
        .iter()
        .map(|r| r["OutputAccountId"].as_str().unwrap())
        .collect();
    // Everyone saw the configuration registered last
    assert_eq!(outputs.len(), 1);
    let victims = results
        .iter()
        .filter(|r| r["AccountIdsMatch"] == false)
        .count();
    assert!(victims >= 1);
    assert_eq!(body["Mismatches"], victims);
    assert_eq!(body["CrossContaminated"], victims);
}

#[tokio::test]
async fn short_rendezvous_reports_failures_instead_of_hanging() {
    let app = spawn_app_with_sdk(Arc::new(
        ContaminatingHostedPaymentSdk::with_rendezvous_timeout(6, Duration::from_millis(100)),
    ))
    .await;

    let response = app.get_concurrent_race_test(2).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["Failures"].as_array().unwrap().len(), 2);
    assert!(body["Results"].as_array().unwrap().is_empty());
    assert_eq!(body["RaceConditionDetected"], false);
}

#[tokio::test]
async fn request_count_must_be_within_bounds() {
    let app = spawn_app_with_sdk(Arc::new(LoopbackHostedPaymentSdk)).await;

    for requests in [0, 101] {
        let response = app.get_concurrent_race_test(requests).await;
        assert_eq!(
            response.status().as_u16(),
            400,
            "requests={} should be rejected",
            requests
        );
    }
}

#[tokio::test]
async fn request_count_defaults_to_ten() {
    let app = spawn_app_with_sdk(Arc::new(LoopbackHostedPaymentSdk)).await;

    let response = app.get("/debug/realex-race-test/api/concurrent").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["Requests"], 10);
}
