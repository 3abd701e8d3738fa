use super::SdkError;
use secrecy::Secret;

/// Per-trial SDK configuration. Never shared between trials.
#[derive(Debug)]
pub struct GpEcomConfig {
    pub merchant_id: String,
    pub account_id: String,
    pub shared_secret: Secret<String>,
    pub refund_password: Secret<String>,
    pub rebate_password: Secret<String>,
    pub service_url: String,
    pub hosted_payment: HostedPaymentConfig,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedPaymentConfig {
    pub version: String,
    pub response_url: String,
    pub payment_button_text: String,
}

impl GpEcomConfig {
    pub fn validate(&self) -> Result<(), SdkError> {
        if self.merchant_id.trim().is_empty() {
            return Err(SdkError::InvalidConfiguration(
                "merchant id must not be empty".into(),
            ));
        }
        if self.account_id.trim().is_empty() {
            return Err(SdkError::InvalidConfiguration(
                "account id must not be empty".into(),
            ));
        }
        if self.service_url.trim().is_empty() {
            return Err(SdkError::InvalidConfiguration(
                "service url must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// A charge request, built the way the SDK's fluent builder reads:
/// `Charge::new(1000).with_currency("EUR")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    /// Amount in minor currency units (1000 = 10.00).
    pub amount_minor_units: u64,
    pub currency: Option<String>,
}

impl Charge {
    pub fn new(amount_minor_units: u64) -> Self {
        Self {
            amount_minor_units,
            currency: None,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn currency_or_err(&self) -> Result<&str, SdkError> {
        self.currency
            .as_deref()
            .ok_or_else(|| SdkError::InvalidConfiguration("charge currency is not set".into()))
    }
}
