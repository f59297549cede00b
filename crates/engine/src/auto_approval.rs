//! Auto-approval rule.
//!
//! [`evaluate`] is a pure function of the request total and an explicitly
//! passed [`AutoApprovalSetting`]; the submission gate loads the setting and
//! hands it in, so the rule can be tested without a store.

use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine};

/// The single auto-approval configuration record.
///
/// Serialized as `{"enabled": bool, "amount_minor": i64}` in the settings
/// store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoApprovalSetting {
    pub enabled: bool,
    #[serde(rename = "amount_minor")]
    pub amount: MoneyCents,
}

impl AutoApprovalSetting {
    #[must_use]
    pub fn enabled(amount: MoneyCents) -> Self {
        Self {
            enabled: true,
            amount,
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.amount.is_negative() {
            return Err(EngineError::Validation(
                "auto-approval amount must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Returns `true` iff auto-approval is enabled and `total <= setting.amount`.
#[must_use]
pub fn evaluate(total: MoneyCents, setting: &AutoApprovalSetting) -> bool {
    setting.enabled && total <= setting.amount
}

/// The `admin_notes` text stamped on auto-approved requests.
pub(crate) fn explanation(total: MoneyCents, setting: &AutoApprovalSetting) -> String {
    format!(
        "Auto-approved by system: total {total} is within the auto-approval threshold of {}.",
        setting.amount
    )
}
