use chrono::{DateTime, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};

use crate::{Actor, EngineError, RequestStatus, ResultEngine, requests};

use super::Engine;

fn request_not_found() -> EngineError {
    EngineError::KeyNotFound("request not exists".to_string())
}

impl Engine {
    pub(super) async fn find_request(
        &self,
        db: &DatabaseTransaction,
        request_id: &str,
    ) -> ResultEngine<Option<requests::Model>> {
        requests::Entity::find_by_id(request_id.to_string())
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_request(
        &self,
        db: &DatabaseTransaction,
        request_id: &str,
    ) -> ResultEngine<requests::Model> {
        self.find_request(db, request_id)
            .await?
            .ok_or_else(request_not_found)
    }

    /// Owners see their own requests in any status; reviewers see every
    /// request that has left `draft`. Anything else is reported as missing.
    pub(super) async fn require_request_read(
        &self,
        db: &DatabaseTransaction,
        request_id: &str,
        actor: &Actor,
    ) -> ResultEngine<requests::Model> {
        let model = self.require_request(db, request_id).await?;
        if model.owner == actor.user_id {
            return Ok(model);
        }
        if actor.role.is_reviewer() && model.status != RequestStatus::Draft.as_str() {
            return Ok(model);
        }
        Err(request_not_found())
    }

    pub(super) async fn require_request_owner(
        &self,
        db: &DatabaseTransaction,
        request_id: &str,
        actor: &Actor,
    ) -> ResultEngine<requests::Model> {
        let model = self.require_request(db, request_id).await?;
        if model.owner != actor.user_id {
            return Err(request_not_found());
        }
        Ok(model)
    }

    /// Claims a draft for an edit inside `db`.
    ///
    /// Touches `updated_at` with a write guarded on `owner` and
    /// `status = 'draft'`, so the rest of the transaction runs against a
    /// request that cannot be submitted underneath it.
    pub(super) async fn lock_draft(
        &self,
        db: &DatabaseTransaction,
        request_id: &str,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let result = requests::Entity::update_many()
            .col_expr(requests::Column::UpdatedAt, Expr::value(now))
            .filter(requests::Column::Id.eq(request_id))
            .filter(requests::Column::Owner.eq(actor.user_id.as_str()))
            .filter(requests::Column::Status.eq(RequestStatus::Draft.as_str()))
            .exec(db)
            .await?;
        if result.rows_affected > 0 {
            return Ok(());
        }

        let model = self.require_request_owner(db, request_id, actor).await?;
        Err(EngineError::InvalidState(format!(
            "request is {}; only draft requests can be edited",
            model.status
        )))
    }
}
