use crate::domain::TrialIdentifiers;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of comparing the identifiers fed into the SDK with the ones it echoed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierMatch {
    pub merchant_ids_match: bool,
    pub account_ids_match: bool,
}

impl IdentifierMatch {
    /// Comparison ignores ASCII case.
    pub fn compute(
        input_merchant_id: &str,
        input_account_id: &str,
        output_merchant_id: &str,
        output_account_id: &str,
    ) -> Self {
        Self {
            merchant_ids_match: input_merchant_id.eq_ignore_ascii_case(output_merchant_id),
            account_ids_match: input_account_id.eq_ignore_ascii_case(output_account_id),
        }
    }

    pub fn all_match(&self) -> bool {
        self.merchant_ids_match && self.account_ids_match
    }

    pub fn race_condition_detected(&self) -> bool {
        !self.all_match()
    }

    pub fn message(&self) -> String {
        if self.all_match() {
            "✅ SUCCESS: Both MerchantId and AccountId match - No race condition".to_string()
        } else {
            format!(
                "❌ RACE CONDITION DETECTED! MerchantId: {}, AccountId: {}",
                mark(self.merchant_ids_match),
                mark(self.account_ids_match)
            )
        }
    }
}

fn mark(matches: bool) -> &'static str {
    if matches { "✅" } else { "❌" }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ObservedResult {
    /// When the trial finished (UTC)
    pub test_timestamp: DateTime<Utc>,
    pub input_merchant_id: String,
    pub input_account_id: String,
    /// Merchant id recovered from the serialized payload, or an extraction sentinel
    pub output_merchant_id: String,
    /// Account id recovered from the serialized payload, or an extraction sentinel
    pub output_account_id: String,
    pub merchant_ids_match: bool,
    pub account_ids_match: bool,
    pub race_condition_detected: bool,
    /// Human-readable verdict
    pub message: String,
    pub serialized_json_length: usize,
    /// Raw payload returned by the SDK
    pub full_serialized_json: String,
}

impl ObservedResult {
    pub fn new(
        identifiers: &TrialIdentifiers,
        output_merchant_id: String,
        output_account_id: String,
        serialized_json: String,
    ) -> Self {
        let verdict = IdentifierMatch::compute(
            &identifiers.merchant_id,
            &identifiers.account_id,
            &output_merchant_id,
            &output_account_id,
        );
        Self {
            test_timestamp: Utc::now(),
            input_merchant_id: identifiers.merchant_id.clone(),
            input_account_id: identifiers.account_id.clone(),
            output_merchant_id,
            output_account_id,
            merchant_ids_match: verdict.merchant_ids_match,
            account_ids_match: verdict.account_ids_match,
            race_condition_detected: verdict.race_condition_detected(),
            message: verdict.message(),
            serialized_json_length: serialized_json.chars().count(),
            full_serialized_json: serialized_json,
        }
    }
}
