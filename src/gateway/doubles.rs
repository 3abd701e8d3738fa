//! In-process stand-ins for the hosted-payment SDK.
//!
//! [`LoopbackHostedPaymentSdk`] honours per-service isolation. [`ContaminatingHostedPaymentSdk`]
//! keeps a process-wide configuration cache keyed by config name, which is the shared-state
//! defect suspected in the real SDK.
use super::{Charge, GpEcomConfig, HostedPaymentConfig, HostedPaymentSdk, HostedService, SdkError};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;
use uuid::Uuid;

fn hpp_payload(
    merchant_id: &str,
    account_id: &str,
    hosted_payment: &HostedPaymentConfig,
    charge: &Charge,
    identifier: &str,
) -> Result<String, SdkError> {
    let payload = serde_json::json!({
        "MERCHANT_ID": merchant_id,
        "ACCOUNT": account_id,
        "ORDER_ID": format!("{}-{}", identifier, Uuid::new_v4().simple()),
        "AMOUNT": charge.amount_minor_units.to_string(),
        "CURRENCY": charge.currency_or_err()?,
        "TIMESTAMP": Utc::now().format("%Y%m%d%H%M%S").to_string(),
        "AUTO_SETTLE_FLAG": "1",
        "HPP_VERSION": hosted_payment.version,
        "MERCHANT_RESPONSE_URL": hosted_payment.response_url,
        "CARD_PAYMENT_BUTTON": hosted_payment.payment_button_text,
    });
    Ok(payload.to_string())
}

/// Serializes charges from the configuration each service was built with.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackHostedPaymentSdk;

impl HostedPaymentSdk for LoopbackHostedPaymentSdk {
    fn hosted_service(
        &self,
        config: GpEcomConfig,
        _config_name: &str,
    ) -> Result<Box<dyn HostedService>, SdkError> {
        config.validate()?;
        Ok(Box::new(LoopbackHostedService { config }))
    }
}

struct LoopbackHostedService {
    config: GpEcomConfig,
}

#[async_trait::async_trait]
impl HostedService for LoopbackHostedService {
    async fn serialize(&self, charge: &Charge, identifier: &str) -> Result<String, SdkError> {
        hpp_payload(
            &self.config.merchant_id,
            &self.config.account_id,
            &self.config.hosted_payment,
            charge,
            identifier,
        )
    }
}

#[derive(Debug, Clone)]
struct RegisteredConfig {
    merchant_id: String,
    account_id: String,
    hosted_payment: HostedPaymentConfig,
}

/// How long a serialization waits for the rest of its rendezvous before giving up.
pub const DEFAULT_RENDEZVOUS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct Rendezvous {
    barrier: Barrier,
    timeout: Duration,
}

impl Rendezvous {
    async fn wait(&self) -> Result<(), SdkError> {
        tokio::time::timeout(self.timeout, self.barrier.wait())
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "Gave up waiting for the other serializations after {:?}.",
                    self.timeout
                )
            })?;
        Ok(())
    }
}

/// Registers every configuration in a cache shared by all services and reads it back
/// by config name at serialization time, so the last writer wins.
#[derive(Debug, Clone, Default)]
pub struct ContaminatingHostedPaymentSdk {
    registry: Arc<Mutex<HashMap<String, RegisteredConfig>>>,
    rendezvous: Option<Arc<Rendezvous>>,
}

impl ContaminatingHostedPaymentSdk {
    /// Holds every serialization until `parties` serializations are pending, which makes
    /// the leak deterministic for exactly `parties` concurrent trials.
    ///
    /// A serialization that is still waiting after [`DEFAULT_RENDEZVOUS_TIMEOUT`] fails with
    /// [`SdkError::Unexpected`]. Fewer than `parties` concurrent trials therefore all fail
    /// rather than hang.
    pub fn with_rendezvous(parties: usize) -> Self {
        Self::with_rendezvous_timeout(parties, DEFAULT_RENDEZVOUS_TIMEOUT)
    }

    pub fn with_rendezvous_timeout(parties: usize, timeout: Duration) -> Self {
        Self {
            registry: Arc::default(),
            rendezvous: Some(Arc::new(Rendezvous {
                barrier: Barrier::new(parties),
                timeout,
            })),
        }
    }
}

impl HostedPaymentSdk for ContaminatingHostedPaymentSdk {
    fn hosted_service(
        &self,
        config: GpEcomConfig,
        config_name: &str,
    ) -> Result<Box<dyn HostedService>, SdkError> {
        config.validate()?;
        let registered = RegisteredConfig {
            merchant_id: config.merchant_id,
            account_id: config.account_id,
            hosted_payment: config.hosted_payment,
        };
        self.registry
            .lock()
            .map_err(|_| anyhow::anyhow!("Configuration registry is poisoned."))?
            .insert(config_name.to_string(), registered);
        Ok(Box::new(ContaminatedHostedService {
            registry: Arc::clone(&self.registry),
            rendezvous: self.rendezvous.clone(),
            config_name: config_name.to_string(),
        }))
    }
}

struct ContaminatedHostedService {
    registry: Arc<Mutex<HashMap<String, RegisteredConfig>>>,
    rendezvous: Option<Arc<Rendezvous>>,
    config_name: String,
}

#[async_trait::async_trait]
impl HostedService for ContaminatedHostedService {
    async fn serialize(&self, charge: &Charge, identifier: &str) -> Result<String, SdkError> {
        if let Some(rendezvous) = &self.rendezvous {
            rendezvous.wait().await?;
        }
        let registered = self
            .registry
            .lock()
            .map_err(|_| anyhow::anyhow!("Configuration registry is poisoned."))?
            .get(&self.config_name)
            .cloned()
            .ok_or_else(|| {
                anyhow::anyhow!("No configuration registered under `{}`.", self.config_name)
            })?;
        hpp_payload(
            &registered.merchant_id,
            &registered.account_id,
            &registered.hosted_payment,
            charge,
            identifier,
        )
    }
}
