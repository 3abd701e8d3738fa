use crate::gateway::{
    GpEcomConfig, HostedPaymentConfig, HostedPaymentSdk, LoopbackHostedPaymentSdk,
    RemoteHostedPaymentSdk,
};
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use std::sync::Arc;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub trial: TrialSettings,
    pub gateway: GatewaySettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

/// Fixed inputs of every race trial.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct TrialSettings {
    pub merchant_id: String,
    pub base_account_id: String,
    pub shared_secret: Secret<String>,
    pub refund_password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub amount_minor_units: u64,
    pub currency: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_concurrent_requests: usize,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct GatewaySettings {
    pub service_url: String,
    pub hosted_payment: HostedPaymentSettings,
    pub sdk: SdkKind,
    pub sdk_host: SdkHostSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct HostedPaymentSettings {
    pub version: String,
    pub response_url: String,
    pub payment_button_text: String,
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SdkKind {
    Remote,
    Loopback,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct SdkHostSettings {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl SdkHostSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

impl GatewaySettings {
    pub fn sdk(&self) -> Result<Arc<dyn HostedPaymentSdk>, anyhow::Error> {
        let sdk: Arc<dyn HostedPaymentSdk> = match self.sdk {
            SdkKind::Remote => Arc::new(RemoteHostedPaymentSdk::new(
                self.sdk_host.base_url.clone(),
                self.sdk_host.timeout(),
            )?),
            SdkKind::Loopback => Arc::new(LoopbackHostedPaymentSdk),
        };
        Ok(sdk)
    }

    /// Builds the per-trial SDK configuration. The rebate password mirrors the refund password.
    pub fn gp_ecom_config(
        &self,
        merchant_id: &str,
        account_id: &str,
        shared_secret: &Secret<String>,
        refund_password: &Secret<String>,
    ) -> GpEcomConfig {
        GpEcomConfig {
            merchant_id: merchant_id.to_string(),
            account_id: account_id.to_string(),
            shared_secret: Secret::new(shared_secret.expose_secret().clone()),
            refund_password: Secret::new(refund_password.expose_secret().clone()),
            rebate_password: Secret::new(refund_password.expose_secret().clone()),
            service_url: self.service_url.clone(),
            hosted_payment: HostedPaymentConfig {
                version: self.hosted_payment.version.clone(),
                response_url: self.hosted_payment.response_url.clone(),
                payment_button_text: self.hosted_payment.payment_button_text.clone(),
            },
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    // Detect the running environment.
    // Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // Add in settings from environment variables (with a prefix of APP and '__' as separator)
        // E.g. `APP_APPLICATION__PORT=5001 would set `Settings.application.port`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// The possible runtime environment for our application.
#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
