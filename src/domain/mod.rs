mod observed_result;
mod trial_identifiers;

pub use observed_result::{IdentifierMatch, ObservedResult};
pub use trial_identifiers::{ACCOUNT_SUFFIX_LEN, TrialIdentifiers, generate_account_id};
