use crate::helpers::spawn_app_with_sdk;
use hpp_race_probe::gateway::{
    ContaminatingHostedPaymentSdk, GpEcomConfig, HostedPaymentSdk, HostedService,
    LoopbackHostedPaymentSdk, SdkError,
};
use std::sync::Arc;

#[derive(Debug)]
struct UnreachableSdk;

impl HostedPaymentSdk for UnreachableSdk {
    fn hosted_service(
        &self,
        _config: GpEcomConfig,
        _config_name: &str,
    ) -> Result<Box<dyn HostedService>, SdkError> {
        Err(SdkError::Unexpected(anyhow::anyhow!("SDK host refused the connection")))
    }
}

#[tokio::test]
async fn race_test_page_is_served_as_html() {
    let app = spawn_app_with_sdk(Arc::new(LoopbackHostedPaymentSdk)).await;

    let response = app.get_race_test_page().await;

    assert_eq!(response.status().as_u16(), 200);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_owned();
    assert!(content_type.starts_with("text/html"));
    let html = response.text().await.unwrap();
    assert!(html.contains("/debug/realex-race-test/api"));
}

#[tokio::test]
async fn isolated_sdk_reports_no_race_condition() {
    let app = spawn_app_with_sdk(Arc::new(LoopbackHostedPaymentSdk)).await;

    let response = app.get_race_test_api().await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["InputMerchantId"], "FeeFree");
    assert_eq!(body["OutputMerchantId"], "FeeFree");
    assert_eq!(body["OutputAccountId"], body["InputAccountId"]);
    assert_eq!(body["MerchantIdsMatch"], true);
    assert_eq!(body["AccountIdsMatch"], true);
    assert_eq!(body["RaceConditionDetected"], false);
    assert!(body["Message"].as_str().unwrap().contains("SUCCESS"));
    assert!(body["TestTimestamp"].is_string());
    let payload = body["FullSerializedJson"].as_str().unwrap();
    assert_eq!(body["SerializedJsonLength"], payload.chars().count());
}

#[tokio::test]
async fn every_request_gets_a_fresh_account_id() {
    let app = spawn_app_with_sdk(Arc::new(LoopbackHostedPaymentSdk)).await;

    let mut account_ids = std::collections::HashSet::new();
    for _ in 0..5 {
        let body: serde_json::Value = app.get_race_test_api().await.json().await.unwrap();
        let account_id = body["InputAccountId"].as_str().unwrap().to_owned();
        assert!(account_id.starts_with("locale_"));
        account_ids.insert(account_id);
    }

    assert!(account_ids.len() > 1);
}

#[tokio::test]
async fn sequential_requests_do_not_trip_a_shared_cache() {
    // With one request in flight the cached config is always the caller's own.
    let app = spawn_app_with_sdk(Arc::new(ContaminatingHostedPaymentSdk::default())).await;

    for _ in 0..3 {
        let body: serde_json::Value = app.get_race_test_api().await.json().await.unwrap();
        assert_eq!(body["RaceConditionDetected"], false);
    }
}

#[tokio::test]
async fn sdk_failure_returns_500_with_error_details() {
    let app = spawn_app_with_sdk(Arc::new(UnreachableSdk)).await;

    let response = app.get_race_test_api().await;

    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["Error"],
        "The hosted-payment SDK failed to serialize the charge."
    );
    assert_eq!(body["InnerException"], "SDK host refused the connection");
    assert!(
        body["StackTrace"]
            .as_str()
            .unwrap()
            .contains("SDK host refused the connection")
    );
}
