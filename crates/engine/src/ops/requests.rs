use base64::Engine as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Actor, EngineError, ReimbursementRequest, RequestDetail, RequestStatus, ResultEngine, Role,
    items, requests,
    util::normalize_optional_text,
};

use super::{Engine, with_tx};

/// Filters for listing requests.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`) on `created_at`.
#[derive(Clone, Debug, Default)]
pub struct RequestListFilter {
    pub status: Option<RequestStatus>,
    /// Reviewers only; students always see their own requests.
    pub owner: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Substring match on notes, owner and request id.
    pub search: Option<String>,
}

fn validate_list_filter(filter: &RequestListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::Validation(
            "invalid range: from must be < to".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RequestsCursor {
    created_at: DateTime<Utc>,
    request_id: String,
}

impl RequestsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid requests cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid requests cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid requests cursor".to_string()))
    }
}

impl Engine {
    /// Open a new draft owned by the caller.
    pub async fn create_request(
        &self,
        actor: &Actor,
        notes: Option<&str>,
    ) -> ResultEngine<ReimbursementRequest> {
        if actor.role != Role::Student {
            return Err(EngineError::Forbidden(
                "only students can open reimbursement requests".to_string(),
            ));
        }
        let request = ReimbursementRequest::new(
            actor.user_id.clone(),
            normalize_optional_text(notes),
            Utc::now(),
        );

        with_tx!(self, |db_tx| {
            requests::ActiveModel::from(&request).insert(&db_tx).await?;
            Ok(())
        })?;

        info!(request_id = %request.id, owner = %request.owner, "draft created");
        Ok(request)
    }

    /// Replace the student's notes on a draft.
    pub async fn update_request_notes(
        &self,
        request_id: &str,
        actor: &Actor,
        notes: Option<&str>,
    ) -> ResultEngine<ReimbursementRequest> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            self.lock_draft(&db_tx, request_id, actor, now).await?;
            let model = self.require_request(&db_tx, request_id).await?;
            let mut active: requests::ActiveModel = model.into();
            active.notes = ActiveValue::Set(normalize_optional_text(notes));
            let updated = active.update(&db_tx).await?;
            ReimbursementRequest::try_from(updated)
        })
    }

    /// Delete a draft and its items. History and notifications are left alone;
    /// a draft has neither history entries nor notifications of its own.
    pub async fn delete_request(&self, request_id: &str, actor: &Actor) -> ResultEngine<()> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            self.lock_draft(&db_tx, request_id, actor, now).await?;
            items::Entity::delete_many()
                .filter(items::Column::RequestId.eq(request_id))
                .exec(&db_tx)
                .await?;
            requests::Entity::delete_by_id(request_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })?;

        info!(request_id, owner = %actor.user_id, "draft deleted");
        Ok(())
    }

    pub async fn request(
        &self,
        request_id: &str,
        actor: &Actor,
    ) -> ResultEngine<ReimbursementRequest> {
        with_tx!(self, |db_tx| {
            let model = self.require_request_read(&db_tx, request_id, actor).await?;
            ReimbursementRequest::try_from(model)
        })
    }

    /// A request with its items and full history.
    pub async fn request_detail(
        &self,
        request_id: &str,
        actor: &Actor,
    ) -> ResultEngine<RequestDetail> {
        with_tx!(self, |db_tx| {
            let model = self.require_request_read(&db_tx, request_id, actor).await?;
            let request = ReimbursementRequest::try_from(model)?;
            let items = self.load_items(&db_tx, request_id).await?;
            let history = self.load_history(&db_tx, request_id).await?;
            Ok(RequestDetail {
                request,
                items,
                history,
            })
        })
    }

    pub async fn list_requests(
        &self,
        actor: &Actor,
        limit: u64,
        filter: &RequestListFilter,
    ) -> ResultEngine<Vec<ReimbursementRequest>> {
        let (requests, _next) = self.list_requests_page(actor, limit, None, filter).await?;
        Ok(requests)
    }

    /// Lists requests visible to the caller, newest first.
    ///
    /// Students see their own requests. Reviewers see every request that has
    /// left `draft`, optionally narrowed to one owner. Pagination is by
    /// `(created_at DESC, id DESC)`.
    pub async fn list_requests_page(
        &self,
        actor: &Actor,
        limit: u64,
        cursor: Option<&str>,
        filter: &RequestListFilter,
    ) -> ResultEngine<(Vec<ReimbursementRequest>, Option<String>)> {
        validate_list_filter(filter)?;

        with_tx!(self, |db_tx| {
            let mut query = requests::Entity::find()
                .order_by_desc(requests::Column::CreatedAt)
                .order_by_desc(requests::Column::Id)
                .limit(limit.saturating_add(1));

            if actor.role.is_reviewer() {
                query = query.filter(requests::Column::Status.ne(RequestStatus::Draft.as_str()));
                if let Some(owner) = &filter.owner {
                    query = query.filter(requests::Column::Owner.eq(owner.as_str()));
                }
            } else {
                query = query.filter(requests::Column::Owner.eq(actor.user_id.as_str()));
            }

            if let Some(status) = filter.status {
                query = query.filter(requests::Column::Status.eq(status.as_str()));
            }
            if let Some(from) = filter.from {
                query = query.filter(requests::Column::CreatedAt.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(requests::Column::CreatedAt.lt(to));
            }
            if let Some(search) = normalize_optional_text(filter.search.as_deref()) {
                query = query.filter(
                    Condition::any()
                        .add(requests::Column::Notes.contains(search.as_str()))
                        .add(requests::Column::Owner.contains(search.as_str()))
                        .add(requests::Column::Id.contains(search.as_str())),
                );
            }

            if let Some(cursor) = cursor {
                let cursor = RequestsCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(requests::Column::CreatedAt.lt(cursor.created_at))
                        .add(
                            Condition::all()
                                .add(requests::Column::CreatedAt.eq(cursor.created_at))
                                .add(requests::Column::Id.lt(cursor.request_id)),
                        ),
                );
            }

            let rows = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;
            let out = rows
                .into_iter()
                .take(limit as usize)
                .map(ReimbursementRequest::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let next_cursor = if has_more {
                out.last()
                    .map(|r| RequestsCursor {
                        created_at: r.created_at,
                        request_id: r.id.to_string(),
                    })
                    .map(|c| c.encode())
                    .transpose()?
            } else {
                None
            };

            Ok((out, next_cursor))
        })
    }
}
