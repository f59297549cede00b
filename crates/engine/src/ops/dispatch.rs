use chrono::Utc;
use sea_orm::prelude::*;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    DispatchReport, EmailMessage, HistoryAction, Notification, NotificationKind,
    ReimbursementRequest, notifications, users,
};

use super::Engine;

impl Engine {
    /// Best-effort side channel for a committed transition.
    ///
    /// Runs after the transaction is committed. Nothing here can fail the
    /// transition: notification insert and email delivery errors end up in the
    /// returned report and in the log.
    pub(super) async fn dispatch(
        &self,
        request: &ReimbursementRequest,
        action: HistoryAction,
        detail: Option<&str>,
    ) -> DispatchReport {
        let Some(kind) = NotificationKind::for_action(action, request.status) else {
            return DispatchReport::silent();
        };

        let rendered = kind.render(request.total_amount, detail);
        let mut report = DispatchReport::default();

        let notification = Notification {
            id: Uuid::new_v4(),
            recipient: request.owner.clone(),
            kind,
            title: rendered.title.clone(),
            message: rendered.message.clone(),
            read: false,
            request_id: Some(request.id),
            created_at: Utc::now(),
            read_at: None,
        };
        match notifications::ActiveModel::from(&notification)
            .insert(&self.database)
            .await
        {
            Ok(_) => report.notification = Some(notification),
            Err(err) => {
                warn!(request_id = %request.id, kind = kind.as_str(), "notification insert failed: {err}");
                report.warnings.push(format!("notification not stored: {err}"));
            }
        }

        let recipient = match users::Entity::find_by_id(request.owner.clone())
            .one(&self.database)
            .await
        {
            Ok(user) => user.and_then(|u| u.email).filter(|e| !e.trim().is_empty()),
            Err(err) => {
                warn!(owner = %request.owner, "recipient lookup failed: {err}");
                report.warnings.push(format!("recipient lookup failed: {err}"));
                report.email_error = Some("recipient lookup failed".to_string());
                return report;
            }
        };
        let Some(to) = recipient else {
            report.email_error = Some("recipient has no email address".to_string());
            return report;
        };

        let message = EmailMessage {
            to,
            subject: rendered.title.clone(),
            html: rendered.html(),
        };
        match self.email.send(&message).await {
            Ok(receipt) => {
                info!(request_id = %request.id, email_id = %receipt.id, "notification email sent");
                report.email_sent = true;
            }
            Err(err) => {
                warn!(request_id = %request.id, "notification email failed: {err}");
                report.email_error = Some(err.to_string());
            }
        }
        report
    }
}
