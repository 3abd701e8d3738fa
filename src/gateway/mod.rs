//! Seam around the hosted-payment SDK.
//!
//! The SDK is treated as a black box: build a [`GpEcomConfig`], ask the SDK for a
//! [`HostedService`] bound to it, then serialize a [`Charge`]. Everything behind
//! these traits can be swapped, which is how the tests reproduce shared-state defects.
mod config;
mod doubles;
mod remote;

pub use config::{Charge, GpEcomConfig, HostedPaymentConfig};
pub use doubles::{
    ContaminatingHostedPaymentSdk, DEFAULT_RENDEZVOUS_TIMEOUT, LoopbackHostedPaymentSdk,
};
pub use remote::RemoteHostedPaymentSdk;

#[derive(thiserror::Error, Debug)]
pub enum SdkError {
    #[error("Failed to reach the hosted-payment SDK host.")]
    Transport(#[from] reqwest::Error),
    #[error("The hosted-payment SDK rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Invalid hosted-payment configuration: {0}")]
    InvalidConfiguration(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Produces hosted-payment services from a configuration record.
pub trait HostedPaymentSdk: Send + Sync + std::fmt::Debug {
    /// `config_name` is the key the SDK registers the configuration under.
    fn hosted_service(
        &self,
        config: GpEcomConfig,
        config_name: &str,
    ) -> Result<Box<dyn HostedService>, SdkError>;
}

#[async_trait::async_trait]
pub trait HostedService: Send + Sync {
    /// Serializes the charge into the JSON-like payload the hosted payment page consumes.
    async fn serialize(&self, charge: &Charge, identifier: &str) -> Result<String, SdkError>;
}
