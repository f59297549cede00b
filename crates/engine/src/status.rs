//! Request lifecycle states and the transition table.
//!
//! Every status change in the engine is looked up here; no other module
//! compares status strings.

use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

impl RequestStatus {
    pub const ALL: [RequestStatus; 7] = [
        Self::Draft,
        Self::Submitted,
        Self::UnderReview,
        Self::PendingInfo,
        Self::Approved,
        Self::Rejected,
        Self::Paid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::PendingInfo => "pending_info",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
        }
    }

    /// Returns the target status for `action`, or `None` if the table has no
    /// such edge.
    #[must_use]
    pub fn transition(self, action: RequestAction) -> Option<RequestStatus> {
        use RequestAction as A;
        use RequestStatus as S;

        match (self, action) {
            (S::Draft, A::Submit) => Some(S::Submitted),
            (S::Draft, A::AutoApprove) => Some(S::Approved),
            (S::Submitted, A::StartReview) => Some(S::UnderReview),
            (S::Submitted | S::UnderReview, A::Approve) => Some(S::Approved),
            (S::Submitted | S::UnderReview, A::Reject) => Some(S::Rejected),
            (S::Submitted | S::UnderReview, A::RequestInfo) => Some(S::PendingInfo),
            (S::PendingInfo, A::ProvideInfo) => Some(S::UnderReview),
            (S::Approved, A::MarkPaid) => Some(S::Paid),
            _ => None,
        }
    }

    /// Only `draft` requests accept item and notes edits.
    #[must_use]
    pub fn is_editable(self) -> bool {
        self == Self::Draft
    }

    /// Statuses without outgoing edges (`rejected`, `paid`).
    #[must_use]
    pub fn is_final(self) -> bool {
        RequestAction::ALL
            .iter()
            .all(|action| self.transition(*action).is_none())
    }
}

impl TryFrom<&str> for RequestStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| EngineError::Validation(format!("invalid request status: {value}")))
    }
}

/// An edge label in the lifecycle table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestAction {
    Submit,
    AutoApprove,
    StartReview,
    Approve,
    Reject,
    RequestInfo,
    ProvideInfo,
    MarkPaid,
}

impl RequestAction {
    pub const ALL: [RequestAction; 8] = [
        Self::Submit,
        Self::AutoApprove,
        Self::StartReview,
        Self::Approve,
        Self::Reject,
        Self::RequestInfo,
        Self::ProvideInfo,
        Self::MarkPaid,
    ];

    /// Statuses with an outgoing edge labelled `self`, in table order.
    #[must_use]
    pub fn sources(self) -> Vec<RequestStatus> {
        RequestStatus::ALL
            .into_iter()
            .filter(|status| status.transition(self).is_some())
            .collect()
    }

    /// Used in `IllegalTransition` messages: "cannot {verb} a request in status …".
    pub fn verb(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::AutoApprove => "auto-approve",
            Self::StartReview => "start review of",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::RequestInfo => "request information on",
            Self::ProvideInfo => "provide information for",
            Self::MarkPaid => "mark as paid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_only_leave_submitted_or_under_review() {
        for action in [
            RequestAction::Approve,
            RequestAction::Reject,
            RequestAction::RequestInfo,
        ] {
            assert_eq!(
                action.sources(),
                vec![RequestStatus::Submitted, RequestStatus::UnderReview]
            );
        }
    }

    #[test]
    fn draft_has_exactly_two_exits() {
        assert_eq!(
            RequestStatus::Draft.transition(RequestAction::Submit),
            Some(RequestStatus::Submitted)
        );
        assert_eq!(
            RequestStatus::Draft.transition(RequestAction::AutoApprove),
            Some(RequestStatus::Approved)
        );
        assert_eq!(RequestStatus::Draft.transition(RequestAction::Approve), None);
    }

    #[test]
    fn pending_info_returns_to_under_review() {
        assert_eq!(
            RequestStatus::PendingInfo.transition(RequestAction::ProvideInfo),
            Some(RequestStatus::UnderReview)
        );
        assert_eq!(
            RequestStatus::PendingInfo.transition(RequestAction::Approve),
            None
        );
    }

    #[test]
    fn only_paid_and_rejected_are_final() {
        let finals: Vec<_> = RequestStatus::ALL
            .into_iter()
            .filter(|s| s.is_final())
            .collect();
        assert_eq!(finals, vec![RequestStatus::Rejected, RequestStatus::Paid]);
    }

    #[test]
    fn parses_stored_names() {
        assert_eq!(
            RequestStatus::try_from("under_review").unwrap(),
            RequestStatus::UnderReview
        );
        assert!(RequestStatus::try_from("archived").is_err());
    }
}
