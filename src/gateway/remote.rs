use super::{Charge, GpEcomConfig, HostedPaymentConfig, HostedPaymentSdk, HostedService, SdkError};
use reqwest::Client;
use secrecy::ExposeSecret;

/// Drives a hosted-payment SDK that lives in a separate host process.
///
/// Each call to [`HostedPaymentSdk::hosted_service`] yields a service owning its own
/// configuration; the HTTP client is the only thing shared between services.
#[derive(Clone, Debug)]
pub struct RemoteHostedPaymentSdk {
    base_url: String,
    http_client: Client,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct SerializeChargeRequest<'a> {
    config_name: &'a str,
    identifier: &'a str,
    config: ConfigBody<'a>,
    charge: ChargeBody<'a>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigBody<'a> {
    merchant_id: &'a str,
    account_id: &'a str,
    shared_secret: &'a str,
    refund_password: &'a str,
    rebate_password: &'a str,
    service_url: &'a str,
    hosted_payment_config: &'a HostedPaymentConfig,
}

#[derive(serde::Serialize)]
struct ChargeBody<'a> {
    amount: u64,
    currency: &'a str,
}

impl RemoteHostedPaymentSdk {
    pub fn new(base_url: String, timeout: std::time::Duration) -> Result<Self, SdkError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            http_client,
        })
    }
}

impl HostedPaymentSdk for RemoteHostedPaymentSdk {
    fn hosted_service(
        &self,
        config: GpEcomConfig,
        config_name: &str,
    ) -> Result<Box<dyn HostedService>, SdkError> {
        config.validate()?;
        Ok(Box::new(RemoteHostedService {
            url: format!("{}/hosted-payment/serialize", self.base_url),
            http_client: self.http_client.clone(),
            config,
            config_name: config_name.to_string(),
        }))
    }
}

struct RemoteHostedService {
    url: String,
    http_client: Client,
    config: GpEcomConfig,
    config_name: String,
}

#[async_trait::async_trait]
impl HostedService for RemoteHostedService {
    #[tracing::instrument(
        name = "Serializing charge on the SDK host",
        skip(self, charge),
        fields(config_name = %self.config_name)
    )]
    async fn serialize(&self, charge: &Charge, identifier: &str) -> Result<String, SdkError> {
        let config = &self.config;
        let request_body = SerializeChargeRequest {
            config_name: &self.config_name,
            identifier,
            config: ConfigBody {
                merchant_id: &config.merchant_id,
                account_id: &config.account_id,
                shared_secret: config.shared_secret.expose_secret(),
                refund_password: config.refund_password.expose_secret(),
                rebate_password: config.rebate_password.expose_secret(),
                service_url: &config.service_url,
                hosted_payment_config: &config.hosted_payment,
            },
            charge: ChargeBody {
                amount: charge.amount_minor_units,
                currency: charge.currency_or_err()?,
            },
        };
        let response = self
            .http_client
            .post(&self.url)
            .json(&request_body)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!("SDK host answered {}: {}", status, body);
            return Err(SdkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
