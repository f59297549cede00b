use chrono::{DateTime, Utc};
use sea_orm::{TransactionTrait, sea_query::Expr};
use tracing::info;

use crate::{
    Actor, Decision, HistoryAction, ReimbursementRequest, RequestAction, ResultEngine,
    TransitionMetadata, TransitionOutcome, requests,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, lifecycle::GuardedTransition, with_tx};

/// A reviewer or owner transition: the guarded write plus what it leaves in
/// the audit trail.
struct Step {
    action: RequestAction,
    guard: GuardedTransition,
    history: HistoryAction,
    note: Option<String>,
    with_amount: bool,
    /// Report a non-owned request as missing instead of as an illegal move.
    owner_only: bool,
    now: DateTime<Utc>,
}

impl Step {
    fn new(action: RequestAction, history: HistoryAction, now: DateTime<Utc>) -> Self {
        Self {
            action,
            guard: GuardedTransition::new(action),
            history,
            note: None,
            with_amount: false,
            owner_only: false,
            now,
        }
    }

    /// Stamps `reviewed_at` / `reviewed_by`.
    fn reviewed_by(mut self, actor: &Actor) -> Self {
        self.guard = self
            .guard
            .set(requests::Column::ReviewedAt, Expr::value(Some(self.now)))
            .set(
                requests::Column::ReviewedBy,
                Expr::value(Some(actor.user_id.clone())),
            );
        self
    }

    fn set(mut self, column: requests::Column, value: Option<String>) -> Self {
        if value.is_some() {
            self.guard = self.guard.set(column, Expr::value(value));
        }
        self
    }
}

impl Engine {
    /// Approve, reject or request information on a pending request.
    ///
    /// Privilege is checked first, then the decision payload, then the
    /// request's status.
    pub async fn decide(
        &self,
        request_id: &str,
        actor: &Actor,
        decision: Decision,
    ) -> ResultEngine<TransitionOutcome> {
        actor.require_reviewer()?;
        let now = Utc::now();

        let step = match decision {
            Decision::Approve { admin_notes } => {
                let admin_notes = normalize_optional_text(admin_notes.as_deref());
                let mut step = Step::new(RequestAction::Approve, HistoryAction::Approved, now)
                    .reviewed_by(actor)
                    .set(requests::Column::AdminNotes, admin_notes.clone());
                step.note = admin_notes;
                step.with_amount = true;
                step
            }
            Decision::Reject {
                rejection_reason,
                admin_notes,
            } => {
                let reason = normalize_required_text(&rejection_reason, "rejection reason")?;
                let mut step = Step::new(RequestAction::Reject, HistoryAction::Rejected, now)
                    .reviewed_by(actor)
                    .set(requests::Column::RejectionReason, Some(reason.clone()))
                    .set(
                        requests::Column::AdminNotes,
                        normalize_optional_text(admin_notes.as_deref()),
                    );
                step.note = Some(reason);
                step
            }
            Decision::RequestInfo { note } => {
                let note = normalize_required_text(&note, "information request")?;
                let mut step =
                    Step::new(RequestAction::RequestInfo, HistoryAction::InfoRequested, now)
                        .set(requests::Column::AdminNotes, Some(note.clone()));
                step.note = Some(note);
                step
            }
        };

        self.apply_step(request_id, actor, step).await
    }

    /// Move a submitted request to `under_review`.
    pub async fn start_review(
        &self,
        request_id: &str,
        actor: &Actor,
    ) -> ResultEngine<TransitionOutcome> {
        actor.require_reviewer()?;
        let step = Step::new(
            RequestAction::StartReview,
            HistoryAction::Reviewed,
            Utc::now(),
        );
        self.apply_step(request_id, actor, step).await
    }

    /// The owner answers an information request; the request goes back to
    /// `under_review`. The answer is kept on the audit entry.
    pub async fn provide_info(
        &self,
        request_id: &str,
        actor: &Actor,
        note: &str,
    ) -> ResultEngine<TransitionOutcome> {
        let note = normalize_required_text(note, "information")?;
        let mut step = Step::new(
            RequestAction::ProvideInfo,
            HistoryAction::InfoProvided,
            Utc::now(),
        );
        step.guard = step.guard.owned_by(&actor.user_id);
        step.owner_only = true;
        step.note = Some(note);
        self.apply_step(request_id, actor, step).await
    }

    /// Record the payout of an approved request. Administrators only.
    pub async fn mark_paid(
        &self,
        request_id: &str,
        actor: &Actor,
        note: Option<&str>,
    ) -> ResultEngine<TransitionOutcome> {
        actor.require_administrator()?;
        let now = Utc::now();
        let mut step = Step::new(RequestAction::MarkPaid, HistoryAction::Paid, now);
        step.guard = step
            .guard
            .set(requests::Column::PaidAt, Expr::value(Some(now)));
        step.note = normalize_optional_text(note);
        step.with_amount = true;
        self.apply_step(request_id, actor, step).await
    }

    async fn apply_step(
        &self,
        request_id: &str,
        actor: &Actor,
        step: Step,
    ) -> ResultEngine<TransitionOutcome> {
        let Step {
            action,
            guard,
            history,
            note,
            with_amount,
            owner_only,
            now,
        } = step;

        let request = with_tx!(self, |db_tx| {
            let Some((from, to)) = self
                .guarded_transition(&db_tx, request_id, guard, now)
                .await?
            else {
                if owner_only {
                    self.require_request_owner(&db_tx, request_id, actor)
                        .await?;
                }
                return Err(self.illegal_transition(&db_tx, request_id, action).await?);
            };

            let request =
                ReimbursementRequest::try_from(self.require_request(&db_tx, request_id).await?)?;
            let mut metadata = TransitionMetadata::new(from, to);
            if with_amount {
                metadata = metadata.amount_minor(request.total_amount.cents());
            }
            self.record_history(
                &db_tx,
                request_id,
                history,
                &actor.user_id,
                note.clone(),
                Some(metadata),
                now,
            )
            .await?;
            Ok(request)
        })?;

        info!(
            request_id = %request.id,
            actor = %actor.user_id,
            action = history.as_str(),
            status = request.status.as_str(),
            "request transitioned"
        );

        let dispatch = self.dispatch(&request, history, note.as_deref()).await;
        Ok(TransitionOutcome {
            request,
            auto_approved: false,
            dispatch,
        })
    }
}
