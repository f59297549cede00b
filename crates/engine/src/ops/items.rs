use chrono::{DateTime, Days, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, JoinType, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    Actor, BankTransaction, EngineError, ItemInput, ItemOrigin, MoneyCents, ReimbursementItem,
    RequestStatus, ResultEngine, TransactionItemInput, bank_transactions, items, requests,
    util::{normalize_optional_text, normalize_required_text, parse_uuid},
};

use super::{Engine, lifecycle::items_total_expr, with_tx};

impl Engine {
    fn validate_expense_date(&self, expense_date: NaiveDate, now: DateTime<Utc>) -> ResultEngine<()> {
        let Some(grace_days) = self.policy.expense_date_grace_days else {
            return Ok(());
        };
        let grace_days = u64::try_from(grace_days).map_err(|_| {
            EngineError::InvalidState(format!("invalid expense date grace: {grace_days}"))
        })?;
        // Past the end of the calendar nothing can be later.
        let Some(latest) = now.date_naive().checked_add_days(Days::new(grace_days)) else {
            return Ok(());
        };
        if expense_date > latest {
            return Err(EngineError::Validation(format!(
                "expense date {expense_date} is in the future"
            )));
        }
        Ok(())
    }

    fn validate_item_amount(amount: MoneyCents) -> ResultEngine<()> {
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "item amount must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Writes the sum of the request's items into `total_amount_minor`.
    async fn refresh_total(&self, db: &DatabaseTransaction, request_id: &str) -> ResultEngine<()> {
        requests::Entity::update_many()
            .col_expr(
                requests::Column::TotalAmountMinor,
                items_total_expr(request_id),
            )
            .filter(requests::Column::Id.eq(request_id))
            .exec(db)
            .await?;
        Ok(())
    }

    async fn require_item(
        &self,
        db: &DatabaseTransaction,
        request_id: &str,
        item_id: &str,
    ) -> ResultEngine<items::Model> {
        items::Entity::find_by_id(item_id.to_string())
            .filter(items::Column::RequestId.eq(request_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))
    }

    /// Add a manually entered expense to a draft.
    pub async fn add_item(
        &self,
        request_id: &str,
        actor: &Actor,
        input: ItemInput,
    ) -> ResultEngine<ReimbursementItem> {
        let now = Utc::now();
        Self::validate_item_amount(input.amount)?;
        let description = normalize_required_text(&input.description, "description")?;
        self.validate_expense_date(input.expense_date, now)?;

        let item = ReimbursementItem {
            id: Uuid::new_v4(),
            request_id: parse_uuid(request_id, "request")?,
            amount: input.amount,
            category: input.category,
            description,
            expense_date: input.expense_date,
            origin: ItemOrigin::Manual,
            source_transaction_id: None,
            receipt_url: normalize_optional_text(input.receipt_url.as_deref()),
            created_at: now,
        };

        with_tx!(self, |db_tx| {
            self.lock_draft(&db_tx, request_id, actor, now).await?;
            items::ActiveModel::from(&item).insert(&db_tx).await?;
            self.refresh_total(&db_tx, request_id).await?;
            Ok(())
        })?;

        debug!(request_id, item_id = %item.id, amount_minor = item.amount.cents(), "item added");
        Ok(item)
    }

    /// Tag one of the owner's bank transactions into a draft.
    ///
    /// A transaction backs at most one item across requests that are not
    /// rejected.
    pub async fn add_transaction_item(
        &self,
        request_id: &str,
        actor: &Actor,
        input: TransactionItemInput,
    ) -> ResultEngine<ReimbursementItem> {
        let now = Utc::now();
        let transaction_id = input.transaction_id.to_string();

        let item = with_tx!(self, |db_tx| {
            self.lock_draft(&db_tx, request_id, actor, now).await?;

            let transaction = bank_transactions::Entity::find_by_id(transaction_id.clone())
                .filter(bank_transactions::Column::Owner.eq(actor.user_id.as_str()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("bank transaction not exists".to_string())
                })?;
            let transaction = BankTransaction::try_from(transaction)?;
            Self::validate_item_amount(transaction.amount)?;
            self.validate_expense_date(transaction.posted_on, now)?;

            let claimed = items::Entity::find()
                .join(JoinType::InnerJoin, items::Relation::Requests.def())
                .filter(items::Column::SourceTransactionId.eq(transaction_id.as_str()))
                .filter(requests::Column::Status.ne(RequestStatus::Rejected.as_str()))
                .one(&db_tx)
                .await?;
            if claimed.is_some() {
                return Err(EngineError::ExistingKey(format!(
                    "bank transaction {transaction_id} is already on a request"
                )));
            }

            let description = normalize_optional_text(input.description.as_deref())
                .unwrap_or_else(|| transaction.description.clone());
            let item = ReimbursementItem {
                id: Uuid::new_v4(),
                request_id: parse_uuid(request_id, "request")?,
                amount: transaction.amount,
                category: input.category,
                description,
                expense_date: transaction.posted_on,
                origin: ItemOrigin::BankTransaction,
                source_transaction_id: Some(transaction.id),
                receipt_url: normalize_optional_text(input.receipt_url.as_deref()),
                created_at: now,
            };
            items::ActiveModel::from(&item).insert(&db_tx).await?;
            self.refresh_total(&db_tx, request_id).await?;
            Ok(item)
        })?;

        debug!(request_id, item_id = %item.id, transaction_id = %input.transaction_id, "transaction item added");
        Ok(item)
    }

    /// Replace the fields of an item while its request is a draft.
    ///
    /// Items copied from a bank transaction keep the transaction's amount and
    /// date.
    pub async fn update_item(
        &self,
        request_id: &str,
        item_id: &str,
        actor: &Actor,
        input: ItemInput,
    ) -> ResultEngine<ReimbursementItem> {
        let now = Utc::now();
        Self::validate_item_amount(input.amount)?;
        let description = normalize_required_text(&input.description, "description")?;
        self.validate_expense_date(input.expense_date, now)?;

        with_tx!(self, |db_tx| {
            self.lock_draft(&db_tx, request_id, actor, now).await?;
            let model = self.require_item(&db_tx, request_id, item_id).await?;
            let current = ReimbursementItem::try_from(model.clone())?;

            if current.origin == ItemOrigin::BankTransaction
                && (current.amount != input.amount || current.expense_date != input.expense_date)
            {
                return Err(EngineError::Validation(
                    "amount and date of a bank transaction item cannot change".to_string(),
                ));
            }

            let mut active: items::ActiveModel = model.into();
            active.amount_minor = ActiveValue::Set(input.amount.cents());
            active.category = ActiveValue::Set(input.category.as_str().to_string());
            active.description = ActiveValue::Set(description);
            active.expense_date = ActiveValue::Set(input.expense_date);
            active.receipt_url =
                ActiveValue::Set(normalize_optional_text(input.receipt_url.as_deref()));
            let updated = active.update(&db_tx).await?;
            self.refresh_total(&db_tx, request_id).await?;
            ReimbursementItem::try_from(updated)
        })
    }

    pub async fn remove_item(
        &self,
        request_id: &str,
        item_id: &str,
        actor: &Actor,
    ) -> ResultEngine<()> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            self.lock_draft(&db_tx, request_id, actor, now).await?;
            let model = self.require_item(&db_tx, request_id, item_id).await?;
            items::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            self.refresh_total(&db_tx, request_id).await?;
            Ok(())
        })
    }

    pub(super) async fn load_items(
        &self,
        db: &DatabaseTransaction,
        request_id: &str,
    ) -> ResultEngine<Vec<ReimbursementItem>> {
        items::Entity::find()
            .filter(items::Column::RequestId.eq(request_id))
            .order_by_asc(items::Column::CreatedAt)
            .order_by_asc(items::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(ReimbursementItem::try_from)
            .collect()
    }

    pub async fn request_items(
        &self,
        request_id: &str,
        actor: &Actor,
    ) -> ResultEngine<Vec<ReimbursementItem>> {
        with_tx!(self, |db_tx| {
            self.require_request_read(&db_tx, request_id, actor).await?;
            self.load_items(&db_tx, request_id).await
        })
    }

    /// Sum of the request's item amounts, computed from the items rather than
    /// read from the stored total.
    pub async fn compute_total(&self, request_id: &str, actor: &Actor) -> ResultEngine<MoneyCents> {
        let items = self.request_items(request_id, actor).await?;
        Ok(items.iter().map(|item| item.amount).sum())
    }
}
