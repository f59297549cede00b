//! In-app notifications and their message templates.
//!
//! `request_id` is a weak reference: there is no foreign key, so deleting a
//! draft leaves any notification pointing at it dangling.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, HistoryAction, MoneyCents, RequestStatus, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Approved,
    AutoApproved,
    Rejected,
    InfoRequested,
    Paid,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::AutoApproved => "auto_approved",
            Self::Rejected => "rejected",
            Self::InfoRequested => "info_requested",
            Self::Paid => "paid",
        }
    }

    /// Which notification, if any, the owner receives for a recorded action.
    ///
    /// Plain submissions, review starts and info responses are silent.
    #[must_use]
    pub fn for_action(action: HistoryAction, to_status: RequestStatus) -> Option<Self> {
        match (action, to_status) {
            (HistoryAction::Submitted, RequestStatus::Approved) => Some(Self::AutoApproved),
            (HistoryAction::Approved, _) => Some(Self::Approved),
            (HistoryAction::Rejected, _) => Some(Self::Rejected),
            (HistoryAction::InfoRequested, _) => Some(Self::InfoRequested),
            (HistoryAction::Paid, _) => Some(Self::Paid),
            _ => None,
        }
    }

    /// Render title and message for a request total and an optional detail
    /// (rejection reason, requested information, reviewer note).
    #[must_use]
    pub fn render(self, total: MoneyCents, detail: Option<&str>) -> RenderedNotification {
        let (title, mut message) = match self {
            Self::Approved => (
                "Reimbursement approved",
                format!("Your reimbursement request for {total} has been approved."),
            ),
            Self::AutoApproved => (
                "Reimbursement approved",
                format!(
                    "Your reimbursement request for {total} was approved automatically and is queued for payment."
                ),
            ),
            Self::Rejected => (
                "Reimbursement rejected",
                format!("Your reimbursement request for {total} was rejected."),
            ),
            Self::InfoRequested => (
                "More information needed",
                format!(
                    "A reviewer needs more information about your reimbursement request for {total}."
                ),
            ),
            Self::Paid => (
                "Reimbursement paid",
                format!("Your reimbursement of {total} has been paid."),
            ),
        };

        if let Some(detail) = detail.map(str::trim).filter(|d| !d.is_empty()) {
            let label = match self {
                Self::Rejected => "Reason",
                Self::InfoRequested => "Requested",
                _ => "Note",
            };
            message.push_str(&format!(" {label}: {detail}"));
        }

        RenderedNotification {
            title: title.to_string(),
            message,
        }
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "approved" => Ok(Self::Approved),
            "auto_approved" => Ok(Self::AutoApproved),
            "rejected" => Ok(Self::Rejected),
            "info_requested" => Ok(Self::InfoRequested),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::Validation(format!(
                "invalid notification kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedNotification {
    pub title: String,
    pub message: String,
}

impl RenderedNotification {
    /// HTML body for the email collaborator.
    #[must_use]
    pub fn html(&self) -> String {
        format!(
            "<h2>{}</h2>\n<p>{}</p>",
            escape_html(&self.title),
            escape_html(&self.message)
        )
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub recipient: String,
    pub kind: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub is_read: bool,
    pub request_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub read_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Notification> for ActiveModel {
    fn from(n: &Notification) -> Self {
        Self {
            id: ActiveValue::Set(n.id.to_string()),
            recipient: ActiveValue::Set(n.recipient.clone()),
            kind: ActiveValue::Set(n.kind.as_str().to_string()),
            title: ActiveValue::Set(n.title.clone()),
            message: ActiveValue::Set(n.message.clone()),
            is_read: ActiveValue::Set(n.read),
            request_id: ActiveValue::Set(n.request_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(n.created_at),
            read_at: ActiveValue::Set(n.read_at),
        }
    }
}

impl TryFrom<Model> for Notification {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "notification")?,
            recipient: model.recipient,
            kind: NotificationKind::try_from(model.kind.as_str())?,
            title: model.title,
            message: model.message,
            read: model.is_read,
            // Weak reference: an unparsable id is treated as dangling.
            request_id: model
                .request_id
                .as_deref()
                .and_then(|id| Uuid::parse_str(id).ok()),
            created_at: model.created_at,
            read_at: model.read_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_submission_is_silent() {
        assert_eq!(
            NotificationKind::for_action(HistoryAction::Submitted, RequestStatus::Submitted),
            None
        );
        assert_eq!(
            NotificationKind::for_action(HistoryAction::Reviewed, RequestStatus::UnderReview),
            None
        );
    }

    #[test]
    fn auto_approved_submission_notifies() {
        assert_eq!(
            NotificationKind::for_action(HistoryAction::Submitted, RequestStatus::Approved),
            Some(NotificationKind::AutoApproved)
        );
    }

    #[test]
    fn rejection_message_includes_reason() {
        let rendered =
            NotificationKind::Rejected.render(MoneyCents::new(50_000), Some("missing receipt"));
        assert_eq!(rendered.title, "Reimbursement rejected");
        assert_eq!(
            rendered.message,
            "Your reimbursement request for $500.00 was rejected. Reason: missing receipt"
        );
    }

    #[test]
    fn html_escapes_user_text() {
        let rendered = NotificationKind::InfoRequested
            .render(MoneyCents::new(100), Some("<b>receipt</b> & invoice"));
        let html = rendered.html();
        assert!(html.contains("&lt;b&gt;receipt&lt;/b&gt; &amp; invoice"));
        assert!(!html.contains("<b>"));
    }
}
