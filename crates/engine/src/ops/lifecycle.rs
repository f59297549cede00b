//! Conditional status writes.
//!
//! Every transition is an `UPDATE … WHERE id = ? AND status = <source>` for
//! each legal source status of the action. Zero affected rows means the
//! request was not (or no longer) in a legal source status; callers turn that
//! into a domain error instead of retrying.

use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseTransaction, QueryFilter,
    prelude::*,
    sea_query::{Expr, SimpleExpr},
};

use crate::{EngineError, RequestAction, RequestStatus, ResultEngine, requests};

use super::Engine;

/// A status write guarded on the request's current status.
pub(super) struct GuardedTransition {
    action: RequestAction,
    owner: Option<String>,
    sets: Vec<(requests::Column, SimpleExpr)>,
    require_items: bool,
}

impl GuardedTransition {
    pub(super) fn new(action: RequestAction) -> Self {
        Self {
            action,
            owner: None,
            sets: Vec::new(),
            require_items: false,
        }
    }

    /// Only match rows owned by `owner`.
    pub(super) fn owned_by(mut self, owner: &str) -> Self {
        self.owner = Some(owner.to_string());
        self
    }

    /// Extra column assignment applied together with the status change.
    pub(super) fn set(mut self, column: requests::Column, value: impl Into<SimpleExpr>) -> Self {
        self.sets.push((column, value.into()));
        self
    }

    /// Only match requests with at least one item.
    pub(super) fn require_items(mut self) -> Self {
        self.require_items = true;
        self
    }
}

/// `(SELECT SUM(amount_minor) …)` over the items of `request_id`.
pub(super) fn items_total_expr(request_id: &str) -> SimpleExpr {
    Expr::cust_with_values(
        "(SELECT COALESCE(SUM(amount_minor), 0) FROM reimbursement_items \
         WHERE reimbursement_items.request_id = ?)",
        [request_id.to_string()],
    )
}

impl Engine {
    /// Applies `guard` and returns the `(from, to)` edge that matched, or
    /// `None` when the row is in none of the action's source statuses.
    pub(super) async fn guarded_transition(
        &self,
        db: &DatabaseTransaction,
        request_id: &str,
        guard: GuardedTransition,
        now: DateTime<Utc>,
    ) -> ResultEngine<Option<(RequestStatus, RequestStatus)>> {
        for from in guard.action.sources() {
            let Some(to) = from.transition(guard.action) else {
                continue;
            };

            let mut update = requests::Entity::update_many()
                .col_expr(requests::Column::Status, Expr::value(to.as_str()))
                .col_expr(requests::Column::UpdatedAt, Expr::value(now));
            for (column, value) in &guard.sets {
                update = update.col_expr(*column, value.clone());
            }

            let mut update = update
                .filter(requests::Column::Id.eq(request_id))
                .filter(requests::Column::Status.eq(from.as_str()));
            if let Some(owner) = &guard.owner {
                update = update.filter(requests::Column::Owner.eq(owner.as_str()));
            }
            if guard.require_items {
                update = update.filter(Expr::cust_with_values(
                    "EXISTS (SELECT 1 FROM reimbursement_items \
                     WHERE reimbursement_items.request_id = ?)",
                    [request_id.to_string()],
                ));
            }

            let result = update.exec(db).await?;
            if result.rows_affected > 0 {
                return Ok(Some((from, to)));
            }
        }
        Ok(None)
    }

    /// Explains why a guarded transition matched nothing.
    pub(super) async fn illegal_transition(
        &self,
        db: &DatabaseTransaction,
        request_id: &str,
        action: RequestAction,
    ) -> ResultEngine<EngineError> {
        let model = self.require_request(db, request_id).await?;
        Ok(EngineError::IllegalTransition(format!(
            "cannot {} a request in status {}",
            action.verb(),
            model.status
        )))
    }
}
