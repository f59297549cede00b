use chrono::Utc;
use sea_orm::{
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{Actor, EngineError, Notification, ResultEngine, notifications};

use super::{Engine, with_tx};

fn notification_not_found() -> EngineError {
    EngineError::KeyNotFound("notification not exists".to_string())
}

impl Engine {
    /// The caller's notifications, newest first.
    pub async fn notifications(
        &self,
        actor: &Actor,
        unread_only: bool,
        limit: u64,
    ) -> ResultEngine<Vec<Notification>> {
        with_tx!(self, |db_tx| {
            let mut query = notifications::Entity::find()
                .filter(notifications::Column::Recipient.eq(actor.user_id.as_str()))
                .order_by_desc(notifications::Column::CreatedAt)
                .order_by_desc(notifications::Column::Id)
                .limit(limit);
            if unread_only {
                query = query.filter(notifications::Column::IsRead.eq(false));
            }
            query
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Notification::try_from)
                .collect()
        })
    }

    pub async fn unread_count(&self, actor: &Actor) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            let count = notifications::Entity::find()
                .filter(notifications::Column::Recipient.eq(actor.user_id.as_str()))
                .filter(notifications::Column::IsRead.eq(false))
                .count(&db_tx)
                .await?;
            Ok(count)
        })
    }

    /// Marks one notification as read. Marking an already read notification
    /// keeps its original `read_at`.
    pub async fn mark_notification_read(
        &self,
        notification_id: &str,
        actor: &Actor,
    ) -> ResultEngine<Notification> {
        with_tx!(self, |db_tx| {
            notifications::Entity::update_many()
                .col_expr(notifications::Column::IsRead, Expr::value(true))
                .col_expr(notifications::Column::ReadAt, Expr::value(Some(Utc::now())))
                .filter(notifications::Column::Id.eq(notification_id))
                .filter(notifications::Column::Recipient.eq(actor.user_id.as_str()))
                .filter(notifications::Column::IsRead.eq(false))
                .exec(&db_tx)
                .await?;

            let model = notifications::Entity::find_by_id(notification_id.to_string())
                .filter(notifications::Column::Recipient.eq(actor.user_id.as_str()))
                .one(&db_tx)
                .await?
                .ok_or_else(notification_not_found)?;
            Notification::try_from(model)
        })
    }

    /// Returns how many notifications changed.
    pub async fn mark_all_notifications_read(&self, actor: &Actor) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            let result = notifications::Entity::update_many()
                .col_expr(notifications::Column::IsRead, Expr::value(true))
                .col_expr(notifications::Column::ReadAt, Expr::value(Some(Utc::now())))
                .filter(notifications::Column::Recipient.eq(actor.user_id.as_str()))
                .filter(notifications::Column::IsRead.eq(false))
                .exec(&db_tx)
                .await?;
            Ok(result.rows_affected)
        })
    }

    pub async fn delete_notification(
        &self,
        notification_id: &str,
        actor: &Actor,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let result = notifications::Entity::delete_many()
                .filter(notifications::Column::Id.eq(notification_id))
                .filter(notifications::Column::Recipient.eq(actor.user_id.as_str()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(notification_not_found());
            }
            Ok(())
        })
    }
}
