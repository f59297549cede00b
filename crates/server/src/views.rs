//! Engine → wire type conversions shared by the handlers.

use api_types::{
    bank::BankTransactionView,
    history::{HistoryAction as ApiHistoryAction, HistoryEntryView},
    item::{ItemCategory as ApiCategory, ItemOrigin as ApiOrigin, ItemView},
    notification::{NotificationKind as ApiKind, NotificationView},
    request::{DispatchView, RequestStatus as ApiStatus, RequestView, TransitionResponse},
    user::{Role as ApiRole, UserView},
};

pub fn map_status(status: engine::RequestStatus) -> ApiStatus {
    match status {
        engine::RequestStatus::Draft => ApiStatus::Draft,
        engine::RequestStatus::Submitted => ApiStatus::Submitted,
        engine::RequestStatus::UnderReview => ApiStatus::UnderReview,
        engine::RequestStatus::PendingInfo => ApiStatus::PendingInfo,
        engine::RequestStatus::Approved => ApiStatus::Approved,
        engine::RequestStatus::Rejected => ApiStatus::Rejected,
        engine::RequestStatus::Paid => ApiStatus::Paid,
    }
}

pub fn status_from_api(status: ApiStatus) -> engine::RequestStatus {
    match status {
        ApiStatus::Draft => engine::RequestStatus::Draft,
        ApiStatus::Submitted => engine::RequestStatus::Submitted,
        ApiStatus::UnderReview => engine::RequestStatus::UnderReview,
        ApiStatus::PendingInfo => engine::RequestStatus::PendingInfo,
        ApiStatus::Approved => engine::RequestStatus::Approved,
        ApiStatus::Rejected => engine::RequestStatus::Rejected,
        ApiStatus::Paid => engine::RequestStatus::Paid,
    }
}

fn map_category(category: engine::ItemCategory) -> ApiCategory {
    match category {
        engine::ItemCategory::Travel => ApiCategory::Travel,
        engine::ItemCategory::Lodging => ApiCategory::Lodging,
        engine::ItemCategory::Meals => ApiCategory::Meals,
        engine::ItemCategory::ConferenceRegistration => ApiCategory::ConferenceRegistration,
        engine::ItemCategory::Supplies => ApiCategory::Supplies,
        engine::ItemCategory::Books => ApiCategory::Books,
        engine::ItemCategory::Software => ApiCategory::Software,
        engine::ItemCategory::Equipment => ApiCategory::Equipment,
        engine::ItemCategory::Transportation => ApiCategory::Transportation,
        engine::ItemCategory::Other => ApiCategory::Other,
    }
}

pub fn category_from_api(category: ApiCategory) -> engine::ItemCategory {
    match category {
        ApiCategory::Travel => engine::ItemCategory::Travel,
        ApiCategory::Lodging => engine::ItemCategory::Lodging,
        ApiCategory::Meals => engine::ItemCategory::Meals,
        ApiCategory::ConferenceRegistration => engine::ItemCategory::ConferenceRegistration,
        ApiCategory::Supplies => engine::ItemCategory::Supplies,
        ApiCategory::Books => engine::ItemCategory::Books,
        ApiCategory::Software => engine::ItemCategory::Software,
        ApiCategory::Equipment => engine::ItemCategory::Equipment,
        ApiCategory::Transportation => engine::ItemCategory::Transportation,
        ApiCategory::Other => engine::ItemCategory::Other,
    }
}

fn map_history_action(action: engine::HistoryAction) -> ApiHistoryAction {
    match action {
        engine::HistoryAction::Submitted => ApiHistoryAction::Submitted,
        engine::HistoryAction::Approved => ApiHistoryAction::Approved,
        engine::HistoryAction::Rejected => ApiHistoryAction::Rejected,
        engine::HistoryAction::InfoRequested => ApiHistoryAction::InfoRequested,
        engine::HistoryAction::InfoProvided => ApiHistoryAction::InfoProvided,
        engine::HistoryAction::Reviewed => ApiHistoryAction::Reviewed,
        engine::HistoryAction::Paid => ApiHistoryAction::Paid,
    }
}

fn map_notification_kind(kind: engine::NotificationKind) -> ApiKind {
    match kind {
        engine::NotificationKind::Approved => ApiKind::Approved,
        engine::NotificationKind::AutoApproved => ApiKind::AutoApproved,
        engine::NotificationKind::Rejected => ApiKind::Rejected,
        engine::NotificationKind::InfoRequested => ApiKind::InfoRequested,
        engine::NotificationKind::Paid => ApiKind::Paid,
    }
}

pub fn map_role(role: engine::Role) -> ApiRole {
    match role {
        engine::Role::Student => ApiRole::Student,
        engine::Role::Accountant => ApiRole::Accountant,
        engine::Role::Administrator => ApiRole::Administrator,
        engine::Role::SuperAdministrator => ApiRole::SuperAdministrator,
    }
}

pub fn request_view(request: engine::ReimbursementRequest) -> RequestView {
    RequestView {
        id: request.id,
        owner: request.owner,
        status: map_status(request.status),
        total_amount_minor: request.total_amount.cents(),
        total_amount: request.total_amount.to_string(),
        notes: request.notes,
        admin_notes: request.admin_notes,
        rejection_reason: request.rejection_reason,
        created_at: request.created_at,
        updated_at: request.updated_at,
        submitted_at: request.submitted_at,
        reviewed_at: request.reviewed_at,
        reviewed_by: request.reviewed_by,
        paid_at: request.paid_at,
    }
}

pub fn item_view(item: engine::ReimbursementItem) -> ItemView {
    ItemView {
        id: item.id,
        request_id: item.request_id,
        amount_minor: item.amount.cents(),
        category: map_category(item.category),
        description: item.description,
        expense_date: item.expense_date,
        origin: match item.origin {
            engine::ItemOrigin::BankTransaction => ApiOrigin::BankTransaction,
            engine::ItemOrigin::Manual => ApiOrigin::Manual,
        },
        source_transaction_id: item.source_transaction_id,
        receipt_url: item.receipt_url,
        created_at: item.created_at,
    }
}

pub fn history_view(entry: engine::ApprovalHistoryEntry) -> HistoryEntryView {
    HistoryEntryView {
        id: entry.id,
        sequence: entry.sequence,
        action: map_history_action(entry.action),
        actor: entry.actor,
        note: entry.note,
        metadata: entry
            .metadata
            .and_then(|meta| serde_json::to_value(meta).ok()),
        created_at: entry.created_at,
    }
}

pub fn notification_view(notification: engine::Notification) -> NotificationView {
    NotificationView {
        id: notification.id,
        kind: map_notification_kind(notification.kind),
        title: notification.title,
        message: notification.message,
        read: notification.read,
        request_id: notification.request_id,
        created_at: notification.created_at,
        read_at: notification.read_at,
    }
}

pub fn bank_transaction_view(tx: engine::BankTransaction) -> BankTransactionView {
    BankTransactionView {
        id: tx.id,
        amount_minor: tx.amount.cents(),
        description: tx.description,
        merchant: tx.merchant,
        posted_on: tx.posted_on,
    }
}

pub fn user_view(profile: engine::UserProfile) -> UserView {
    UserView {
        username: profile.username,
        role: map_role(profile.role),
        email: profile.email,
    }
}

pub fn transition_response(outcome: engine::TransitionOutcome) -> TransitionResponse {
    let dispatch = outcome.dispatch;
    TransitionResponse {
        request: request_view(outcome.request),
        auto_approved: outcome.auto_approved,
        dispatch: DispatchView {
            notification_id: dispatch.notification.map(|n| n.id),
            email_sent: dispatch.email_sent,
            email_error: dispatch.email_error,
            warnings: dispatch.warnings,
        },
    }
}
