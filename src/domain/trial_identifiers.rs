use crate::configuration::TrialSettings;
use secrecy::{ExposeSecret, Secret};
use uuid::Uuid;

/// Number of hex characters appended to the base account id.
pub const ACCOUNT_SUFFIX_LEN: usize = 3;

/// Identifiers fed into a single trial. Generated once per request and never reused.
#[derive(Debug)]
pub struct TrialIdentifiers {
    pub merchant_id: String,
    pub account_id: String,
    pub shared_secret: Secret<String>,
    pub refund_password: Secret<String>,
}

impl TrialIdentifiers {
    pub fn generate(settings: &TrialSettings) -> Self {
        Self {
            merchant_id: settings.merchant_id.clone(),
            account_id: generate_account_id(&settings.base_account_id),
            shared_secret: Secret::new(settings.shared_secret.expose_secret().clone()),
            refund_password: Secret::new(settings.refund_password.expose_secret().clone()),
        }
    }
}

/// `<base>_<suffix>` where the suffix is the head of a fresh v4 UUID in simple form.
pub fn generate_account_id(base_account_id: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("{}_{}", base_account_id, &token[..ACCOUNT_SUFFIX_LEN])
}
