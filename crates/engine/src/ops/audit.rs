use chrono::{DateTime, Duration, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Actor, ApprovalHistoryEntry, HistoryAction, ResultEngine, TransitionMetadata, history,
    util::parse_uuid,
};

use super::{Engine, with_tx};

impl Engine {
    /// Appends one audit entry inside `db`.
    ///
    /// Sequence numbers start at 1 and grow by one per request. Timestamps are
    /// pushed forward by a microsecond when the clock would not advance past
    /// the previous entry.
    pub(super) async fn record_history(
        &self,
        db: &DatabaseTransaction,
        request_id: &str,
        action: HistoryAction,
        actor: &str,
        note: Option<String>,
        metadata: Option<TransitionMetadata>,
        now: DateTime<Utc>,
    ) -> ResultEngine<ApprovalHistoryEntry> {
        let last = history::Entity::find()
            .filter(history::Column::RequestId.eq(request_id))
            .order_by_desc(history::Column::Sequence)
            .one(db)
            .await?;

        let (sequence, created_at) = match last {
            Some(last) => (
                last.sequence + 1,
                now.max(last.created_at + Duration::microseconds(1)),
            ),
            None => (1, now),
        };

        let entry = ApprovalHistoryEntry {
            id: Uuid::new_v4(),
            request_id: parse_uuid(request_id, "request")?,
            sequence,
            action,
            actor: actor.to_string(),
            note,
            metadata,
            created_at,
        };
        history::ActiveModel::try_from(&entry)?.insert(db).await?;
        Ok(entry)
    }

    pub(super) async fn load_history(
        &self,
        db: &DatabaseTransaction,
        request_id: &str,
    ) -> ResultEngine<Vec<ApprovalHistoryEntry>> {
        history::Entity::find()
            .filter(history::Column::RequestId.eq(request_id))
            .order_by_asc(history::Column::Sequence)
            .all(db)
            .await?
            .into_iter()
            .map(ApprovalHistoryEntry::try_from)
            .collect()
    }

    /// Audit trail of a request, oldest entry first.
    pub async fn request_history(
        &self,
        request_id: &str,
        actor: &Actor,
    ) -> ResultEngine<Vec<ApprovalHistoryEntry>> {
        with_tx!(self, |db_tx| {
            self.require_request_read(&db_tx, request_id, actor).await?;
            self.load_history(&db_tx, request_id).await
        })
    }
}
