//! Results returned by transition-causing operations.
//!
//! A transition is reported as successful once its status change and audit
//! entry are committed. What happened afterwards on the best-effort side
//! channel (in-app notification, email) is carried separately in
//! [`DispatchReport`].

use serde::Serialize;

use crate::{
    ApprovalHistoryEntry, Notification, ReimbursementItem, ReimbursementRequest, RequestStatus,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// The in-app notification created for the owner, if the action notifies.
    pub notification: Option<Notification>,
    pub email_sent: bool,
    pub email_error: Option<String>,
    /// Non-fatal failures (notification insert, recipient lookup).
    pub warnings: Vec<String>,
}

impl DispatchReport {
    /// Report for actions that do not notify anyone.
    #[must_use]
    pub fn silent() -> Self {
        Self::default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    pub request: ReimbursementRequest,
    pub auto_approved: bool,
    pub dispatch: DispatchReport,
}

impl TransitionOutcome {
    #[must_use]
    pub fn status(&self) -> RequestStatus {
        self.request.status
    }
}

/// A request with its items and audit trail (oldest entry first).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RequestDetail {
    pub request: ReimbursementRequest,
    pub items: Vec<ReimbursementItem>,
    pub history: Vec<ApprovalHistoryEntry>,
}
