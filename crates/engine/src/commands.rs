//! Command structs for engine operations.
//!
//! These types group parameters for write operations (items, bank
//! transactions, decisions), keeping call sites readable and avoiding long
//! argument lists.

use chrono::NaiveDate;

use crate::{ItemCategory, MoneyCents, RequestAction};

/// Fields of a manually entered expense line.
#[derive(Clone, Debug)]
pub struct ItemInput {
    pub amount: MoneyCents,
    pub category: ItemCategory,
    pub description: String,
    pub expense_date: NaiveDate,
    pub receipt_url: Option<String>,
}

impl ItemInput {
    #[must_use]
    pub fn new(
        amount: MoneyCents,
        category: ItemCategory,
        description: impl Into<String>,
        expense_date: NaiveDate,
    ) -> Self {
        Self {
            amount,
            category,
            description: description.into(),
            expense_date,
            receipt_url: None,
        }
    }

    #[must_use]
    pub fn receipt_url(mut self, url: impl Into<String>) -> Self {
        self.receipt_url = Some(url.into());
        self
    }
}

/// Tag a bank transaction into a draft.
///
/// Amount, description and date are copied from the transaction; only the
/// category is chosen by the student.
#[derive(Clone, Debug)]
pub struct TransactionItemInput {
    pub transaction_id: uuid::Uuid,
    pub category: ItemCategory,
    pub description: Option<String>,
    pub receipt_url: Option<String>,
}

impl TransactionItemInput {
    #[must_use]
    pub fn new(transaction_id: uuid::Uuid, category: ItemCategory) -> Self {
        Self {
            transaction_id,
            category,
            description: None,
            receipt_url: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn receipt_url(mut self, url: impl Into<String>) -> Self {
        self.receipt_url = Some(url.into());
        self
    }
}

/// A bank transaction as delivered by the bank-sync collaborator.
#[derive(Clone, Debug)]
pub struct BankTransactionInput {
    pub amount: MoneyCents,
    pub description: String,
    pub merchant: Option<String>,
    pub posted_on: NaiveDate,
}

impl BankTransactionInput {
    #[must_use]
    pub fn new(amount: MoneyCents, description: impl Into<String>, posted_on: NaiveDate) -> Self {
        Self {
            amount,
            description: description.into(),
            merchant: None,
            posted_on,
        }
    }

    #[must_use]
    pub fn merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }
}

/// A reviewer decision on a pending request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Approve {
        admin_notes: Option<String>,
    },
    Reject {
        rejection_reason: String,
        admin_notes: Option<String>,
    },
    RequestInfo {
        note: String,
    },
}

impl Decision {
    #[must_use]
    pub fn approve() -> Self {
        Self::Approve { admin_notes: None }
    }

    #[must_use]
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Reject {
            rejection_reason: reason.into(),
            admin_notes: None,
        }
    }

    #[must_use]
    pub fn request_info(note: impl Into<String>) -> Self {
        Self::RequestInfo { note: note.into() }
    }

    pub(crate) fn action(&self) -> RequestAction {
        match self {
            Self::Approve { .. } => RequestAction::Approve,
            Self::Reject { .. } => RequestAction::Reject,
            Self::RequestInfo { .. } => RequestAction::RequestInfo,
        }
    }
}
