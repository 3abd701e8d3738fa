//! One round-trip through the hosted-payment SDK, and a harness firing many at once.
use crate::configuration::{GatewaySettings, TrialSettings};
use crate::domain::{ObservedResult, TrialIdentifiers};
use crate::extract::extract_field;
use crate::gateway::{Charge, HostedPaymentSdk, SdkError};
use crate::telemetry::{error_chain_fmt, spawn_blocking_with_tracing};
use anyhow::Context;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;

pub const MERCHANT_ID_FIELD: &str = "MERCHANT_ID";
pub const ACCOUNT_FIELD: &str = "ACCOUNT";

#[derive(thiserror::Error)]
pub enum TrialError {
    #[error("The hosted-payment SDK failed to serialize the charge.")]
    Sdk(#[source] SdkError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl std::fmt::Debug for TrialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Everything a trial needs. Cheap to clone; nothing in here is mutated by a trial.
#[derive(Clone, Debug)]
pub struct TrialRunner {
    sdk: Arc<dyn HostedPaymentSdk>,
    trial: Arc<TrialSettings>,
    gateway: Arc<GatewaySettings>,
}

impl TrialRunner {
    pub fn new(
        sdk: Arc<dyn HostedPaymentSdk>,
        trial: TrialSettings,
        gateway: GatewaySettings,
    ) -> Self {
        Self {
            sdk,
            trial: Arc::new(trial),
            gateway: Arc::new(gateway),
        }
    }

    pub fn max_concurrent_requests(&self) -> usize {
        self.trial.max_concurrent_requests
    }

    #[tracing::instrument(
        name = "Running race trial",
        skip(self),
        fields(input_account_id = tracing::field::Empty)
    )]
    pub async fn run_trial(&self) -> Result<ObservedResult, TrialError> {
        let identifiers = TrialIdentifiers::generate(&self.trial);
        tracing::Span::current().record(
            "input_account_id",
            tracing::field::display(&identifiers.account_id),
        );
        tracing::warn!(
            "Trial input: merchant_id={}, account_id={}",
            identifiers.merchant_id,
            identifiers.account_id
        );

        let serialized = self.serialize_charge(&identifiers).await?;
        let output_merchant_id = extract_field(&serialized, MERCHANT_ID_FIELD).into_string();
        let output_account_id = extract_field(&serialized, ACCOUNT_FIELD).into_string();
        tracing::warn!(
            "Trial output: merchant_id={}, account_id={}",
            output_merchant_id,
            output_account_id
        );

        let result = ObservedResult::new(
            &identifiers,
            output_merchant_id,
            output_account_id,
            serialized,
        );
        if result.race_condition_detected {
            tracing::error!(
                "Race condition detected! merchant_id input={} output={} | account_id input={} output={}",
                result.input_merchant_id,
                result.output_merchant_id,
                result.input_account_id,
                result.output_account_id
            );
        }
        Ok(result)
    }

    #[tracing::instrument(
        name = "Serializing charge through the hosted-payment SDK",
        skip(self, identifiers),
        fields(merchant_id = %identifiers.merchant_id)
    )]
    async fn serialize_charge(&self, identifiers: &TrialIdentifiers) -> Result<String, TrialError> {
        tracing::info!("Creating gateway configuration for {}", identifiers.merchant_id);
        let config = self.gateway.gp_ecom_config(
            &identifiers.merchant_id,
            &identifiers.account_id,
            &identifiers.shared_secret,
            &identifiers.refund_password,
        );
        let config_name = identifiers.merchant_id.clone();
        let sdk = Arc::clone(&self.sdk);
        // SDK construction is synchronous and may block
        let service = spawn_blocking_with_tracing(move || sdk.hosted_service(config, &config_name))
            .await
            .context("Failed to spawn blocking task.")?
            .map_err(TrialError::Sdk)?;

        let charge =
            Charge::new(self.trial.amount_minor_units).with_currency(&self.trial.currency);
        let serialized = service
            .serialize(&charge, &identifiers.merchant_id)
            .await
            .map_err(TrialError::Sdk)?;
        tracing::warn!("Serialize returned for {}", identifiers.merchant_id);
        Ok(serialized)
    }

    /// Runs `requests` trials in parallel and cross-checks every output against every input.
    #[tracing::instrument(name = "Running concurrent race trials", skip(self))]
    pub async fn run_concurrent(&self, requests: usize) -> ConcurrentReport {
        let mut trials = JoinSet::new();
        for _ in 0..requests {
            let runner = self.clone();
            trials.spawn(async move { runner.run_trial().await });
        }

        let mut results = Vec::with_capacity(requests);
        let mut failures = Vec::new();
        while let Some(joined) = trials.join_next().await {
            match joined {
                Ok(Ok(result)) => results.push(result),
                Ok(Err(e)) => {
                    tracing::error!("Trial failed: {:?}", e);
                    failures.push(e.to_string());
                }
                Err(e) => {
                    tracing::error!("Trial task panicked or was cancelled: {}", e);
                    failures.push(format!("Trial task did not complete: {}", e));
                }
            }
        }
        ConcurrentReport::new(requests, results, failures)
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ConcurrentReport {
    /// Number of trials fired
    pub requests: usize,
    /// Trials whose output differs from their own input
    pub mismatches: usize,
    /// Trials whose output account id is another trial's input account id
    pub cross_contaminated: usize,
    pub race_condition_detected: bool,
    pub failures: Vec<String>,
    pub results: Vec<ObservedResult>,
}

impl ConcurrentReport {
    pub fn new(requests: usize, results: Vec<ObservedResult>, failures: Vec<String>) -> Self {
        let mismatches = results.iter().filter(|r| r.race_condition_detected).count();
        let inputs: HashSet<String> = results
            .iter()
            .map(|r| r.input_account_id.to_ascii_lowercase())
            .collect();
        let cross_contaminated = results
            .iter()
            .filter(|r| {
                !r.account_ids_match && inputs.contains(&r.output_account_id.to_ascii_lowercase())
            })
            .count();
        Self {
            requests,
            mismatches,
            cross_contaminated,
            race_condition_detected: mismatches > 0,
            failures,
            results,
        }
    }
}
