use chrono::Utc;
use sea_orm::{JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use tracing::debug;
use uuid::Uuid;

use crate::{
    Actor, BankTransaction, BankTransactionInput, EngineError, RequestStatus, ResultEngine,
    bank_transactions, items, requests,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Store a bank transaction for the caller.
    pub async fn record_bank_transaction(
        &self,
        actor: &Actor,
        input: BankTransactionInput,
    ) -> ResultEngine<BankTransaction> {
        if !input.amount.is_positive() {
            return Err(EngineError::Validation(
                "transaction amount must be > 0".to_string(),
            ));
        }
        let transaction = BankTransaction {
            id: Uuid::new_v4(),
            owner: actor.user_id.clone(),
            amount: input.amount,
            description: normalize_required_text(&input.description, "description")?,
            merchant: normalize_optional_text(input.merchant.as_deref()),
            posted_on: input.posted_on,
            created_at: Utc::now(),
        };

        with_tx!(self, |db_tx| {
            bank_transactions::ActiveModel::from(&transaction)
                .insert(&db_tx)
                .await?;
            Ok(())
        })?;

        debug!(owner = %transaction.owner, transaction_id = %transaction.id, "bank transaction recorded");
        Ok(transaction)
    }

    /// All bank transactions of the caller, newest first.
    pub async fn bank_transactions(&self, actor: &Actor) -> ResultEngine<Vec<BankTransaction>> {
        with_tx!(self, |db_tx| {
            bank_transactions::Entity::find()
                .filter(bank_transactions::Column::Owner.eq(actor.user_id.as_str()))
                .order_by_desc(bank_transactions::Column::PostedOn)
                .order_by_desc(bank_transactions::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(BankTransaction::try_from)
                .collect()
        })
    }

    /// Bank transactions of the caller that no live request claims yet.
    pub async fn unclaimed_bank_transactions(
        &self,
        actor: &Actor,
    ) -> ResultEngine<Vec<BankTransaction>> {
        with_tx!(self, |db_tx| {
            let claimed: Vec<String> = items::Entity::find()
                .select_only()
                .column(items::Column::SourceTransactionId)
                .join(JoinType::InnerJoin, items::Relation::Requests.def())
                .filter(requests::Column::Owner.eq(actor.user_id.as_str()))
                .filter(requests::Column::Status.ne(RequestStatus::Rejected.as_str()))
                .filter(items::Column::SourceTransactionId.is_not_null())
                .into_tuple::<Option<String>>()
                .all(&db_tx)
                .await?
                .into_iter()
                .flatten()
                .collect();

            bank_transactions::Entity::find()
                .filter(bank_transactions::Column::Owner.eq(actor.user_id.as_str()))
                .filter(bank_transactions::Column::Id.is_not_in(claimed))
                .order_by_desc(bank_transactions::Column::PostedOn)
                .order_by_desc(bank_transactions::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(BankTransaction::try_from)
                .collect()
        })
    }
}
