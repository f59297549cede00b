use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod request {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RequestStatus {
        Draft,
        Submitted,
        UnderReview,
        PendingInfo,
        Approved,
        Rejected,
        Paid,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RequestNew {
        pub notes: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RequestNotesUpdate {
        pub notes: Option<String>,
    }

    /// Query string of `GET /requests`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RequestList {
        pub status: Option<RequestStatus>,
        /// Reviewers only.
        pub owner: Option<String>,
        /// RFC3339, inclusive.
        pub from: Option<DateTime<Utc>>,
        /// RFC3339, exclusive.
        pub to: Option<DateTime<Utc>>,
        pub search: Option<String>,
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RequestView {
        pub id: Uuid,
        pub owner: String,
        pub status: RequestStatus,
        pub total_amount_minor: i64,
        /// Human readable total, e.g. `$75.00`.
        pub total_amount: String,
        pub notes: Option<String>,
        pub admin_notes: Option<String>,
        pub rejection_reason: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub submitted_at: Option<DateTime<Utc>>,
        pub reviewed_at: Option<DateTime<Utc>>,
        pub reviewed_by: Option<String>,
        pub paid_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RequestListResponse {
        pub requests: Vec<RequestView>,
        /// Opaque cursor for fetching the next page (older requests).
        pub next_cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RequestDetailView {
        pub request: RequestView,
        pub items: Vec<super::item::ItemView>,
        pub history: Vec<super::history::HistoryEntryView>,
    }

    /// Side-channel result of a transition. The transition itself already
    /// succeeded when this is returned.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DispatchView {
        pub notification_id: Option<Uuid>,
        pub email_sent: bool,
        pub email_error: Option<String>,
        pub warnings: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransitionResponse {
        pub request: RequestView,
        pub auto_approved: bool,
        pub dispatch: DispatchView,
    }
}

pub mod item {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ItemCategory {
        Travel,
        Lodging,
        Meals,
        ConferenceRegistration,
        Supplies,
        Books,
        Software,
        Equipment,
        Transportation,
        Other,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ItemOrigin {
        BankTransaction,
        Manual,
    }

    /// Manual item, also used to replace an item.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemNew {
        /// Must be > 0.
        pub amount_minor: i64,
        pub category: ItemCategory,
        pub description: String,
        pub expense_date: NaiveDate,
        pub receipt_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionItemNew {
        pub transaction_id: Uuid,
        pub category: ItemCategory,
        /// Defaults to the transaction description.
        pub description: Option<String>,
        pub receipt_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: Uuid,
        pub request_id: Uuid,
        pub amount_minor: i64,
        pub category: ItemCategory,
        pub description: String,
        pub expense_date: NaiveDate,
        pub origin: ItemOrigin,
        pub source_transaction_id: Option<Uuid>,
        pub receipt_url: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod history {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum HistoryAction {
        Submitted,
        Approved,
        Rejected,
        InfoRequested,
        InfoProvided,
        Reviewed,
        Paid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryEntryView {
        pub id: Uuid,
        pub sequence: i32,
        pub action: HistoryAction,
        pub actor: String,
        pub note: Option<String>,
        /// `{from_status, to_status, amount_minor?, auto_approved?, threshold_minor?}`
        pub metadata: Option<serde_json::Value>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod decision {
    use super::*;

    /// Body of `POST /requests/{id}/decision`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(tag = "decision", rename_all = "snake_case")]
    pub enum DecisionNew {
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

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct InfoProvided {
        pub note: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct Payout {
        pub note: Option<String>,
    }
}

pub mod bank {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankTransactionNew {
        pub amount_minor: i64,
        pub description: String,
        pub merchant: Option<String>,
        pub posted_on: NaiveDate,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BankTransactionList {
        /// Only transactions that no live request claims.
        pub unclaimed: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankTransactionView {
        pub id: Uuid,
        pub amount_minor: i64,
        pub description: String,
        pub merchant: Option<String>,
        pub posted_on: NaiveDate,
    }
}

pub mod settings {
    use super::*;

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AutoApproval {
        pub enabled: bool,
        /// Requests with a total up to and including this amount are
        /// approved on submission.
        pub amount_minor: i64,
    }
}

pub mod notification {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum NotificationKind {
        Approved,
        AutoApproved,
        Rejected,
        InfoRequested,
        Paid,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct NotificationList {
        pub unread_only: Option<bool>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationView {
        pub id: Uuid,
        pub kind: NotificationKind,
        pub title: String,
        pub message: String,
        pub read: bool,
        pub request_id: Option<Uuid>,
        pub created_at: DateTime<Utc>,
        pub read_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationListResponse {
        pub notifications: Vec<NotificationView>,
        pub unread: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MarkedRead {
        pub updated: u64,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Role {
        Student,
        Accountant,
        Administrator,
        SuperAdministrator,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub username: String,
        pub role: Role,
        pub email: Option<String>,
    }
}
