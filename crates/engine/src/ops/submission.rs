use chrono::Utc;
use sea_orm::{QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::info;

use crate::{
    Actor, EngineError, HistoryAction, MoneyCents, ReimbursementRequest, RequestAction,
    RequestStatus, ResultEngine, SYSTEM_ACTOR, TransitionMetadata, TransitionOutcome,
    auto_approval::{evaluate, explanation},
    items, requests,
};

use super::{
    Engine,
    lifecycle::{GuardedTransition, items_total_expr},
    with_tx,
};

impl Engine {
    /// Submits a draft.
    ///
    /// The status write, the total snapshot and the auto-approval promotion
    /// happen in one transaction; of two concurrent submits exactly one wins
    /// and the other gets `AlreadySubmitted`. Exactly one `submitted` history
    /// entry is written, whose metadata records the final status.
    pub async fn submit_request(
        &self,
        request_id: &str,
        actor: &Actor,
    ) -> ResultEngine<TransitionOutcome> {
        let now = Utc::now();

        let (request, auto_approved) = with_tx!(self, |db_tx| {
            let guard = GuardedTransition::new(RequestAction::Submit)
                .owned_by(&actor.user_id)
                .require_items()
                .set(requests::Column::TotalAmountMinor, items_total_expr(request_id))
                .set(requests::Column::SubmittedAt, Expr::value(Some(now)));

            if self
                .guarded_transition(&db_tx, request_id, guard, now)
                .await?
                .is_none()
            {
                let model = self.require_request_owner(&db_tx, request_id, actor).await?;
                if model.status != RequestStatus::Draft.as_str() {
                    return Err(EngineError::AlreadySubmitted(format!(
                        "request is already {}",
                        model.status
                    )));
                }
                let has_items = items::Entity::find()
                    .filter(items::Column::RequestId.eq(request_id))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if !has_items {
                    return Err(EngineError::Validation(
                        "cannot submit a request without items".to_string(),
                    ));
                }
                return Err(EngineError::AlreadySubmitted(
                    "request changed while submitting".to_string(),
                ));
            }

            let submitted = self.require_request(&db_tx, request_id).await?;
            let total = MoneyCents::new(submitted.total_amount_minor);
            let setting = self.load_auto_approval(&db_tx).await?;
            let auto_approved = evaluate(total, &setting);

            let mut metadata =
                TransitionMetadata::new(RequestStatus::Draft, RequestStatus::Submitted)
                    .amount_minor(total.cents());

            if auto_approved {
                let to = RequestStatus::Approved;
                requests::Entity::update_many()
                    .col_expr(requests::Column::Status, Expr::value(to.as_str()))
                    .col_expr(requests::Column::ReviewedAt, Expr::value(Some(now)))
                    .col_expr(
                        requests::Column::ReviewedBy,
                        Expr::value(Some(SYSTEM_ACTOR.to_string())),
                    )
                    .col_expr(
                        requests::Column::AdminNotes,
                        Expr::value(Some(explanation(total, &setting))),
                    )
                    .filter(requests::Column::Id.eq(request_id))
                    .filter(requests::Column::Status.eq(RequestStatus::Submitted.as_str()))
                    .exec(&db_tx)
                    .await?;
                metadata = TransitionMetadata::new(RequestStatus::Draft, to)
                    .amount_minor(total.cents())
                    .auto_approved(setting.amount.cents());
            }

            self.record_history(
                &db_tx,
                request_id,
                HistoryAction::Submitted,
                &actor.user_id,
                None,
                Some(metadata),
                now,
            )
            .await?;

            let model = self.require_request(&db_tx, request_id).await?;
            Ok((ReimbursementRequest::try_from(model)?, auto_approved))
        })?;

        info!(
            request_id = %request.id,
            owner = %request.owner,
            total_minor = request.total_amount.cents(),
            auto_approved,
            "request submitted"
        );

        let dispatch = self
            .dispatch(&request, HistoryAction::Submitted, request.admin_notes.as_deref())
            .await;
        Ok(TransitionOutcome {
            request,
            auto_approved,
            dispatch,
        })
    }
}
