//! Reimbursement requests.
//!
//! A request is owned by one student, aggregates `ReimbursementItem`s while in
//! `draft`, and is frozen once submitted. Its total is stored in cents and
//! recomputed from the items on every item change and at submission.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, RequestStatus, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementRequest {
    pub id: Uuid,
    pub owner: String,
    pub status: RequestStatus,
    pub total_amount: MoneyCents,
    pub notes: Option<String>,
    pub admin_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl ReimbursementRequest {
    pub fn new(owner: String, notes: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            status: RequestStatus::Draft,
            total_amount: MoneyCents::ZERO,
            notes,
            admin_notes: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
            submitted_at: None,
            reviewed_at: None,
            reviewed_by: None,
            paid_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reimbursement_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner: String,
    pub status: String,
    pub total_amount_minor: i64,
    pub notes: Option<String>,
    pub admin_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub submitted_at: Option<DateTimeUtc>,
    pub reviewed_at: Option<DateTimeUtc>,
    pub reviewed_by: Option<String>,
    pub paid_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::items::Entity")]
    Items,
    #[sea_orm(has_many = "super::history::Entity")]
    History,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ReimbursementRequest> for ActiveModel {
    fn from(request: &ReimbursementRequest) -> Self {
        Self {
            id: ActiveValue::Set(request.id.to_string()),
            owner: ActiveValue::Set(request.owner.clone()),
            status: ActiveValue::Set(request.status.as_str().to_string()),
            total_amount_minor: ActiveValue::Set(request.total_amount.cents()),
            notes: ActiveValue::Set(request.notes.clone()),
            admin_notes: ActiveValue::Set(request.admin_notes.clone()),
            rejection_reason: ActiveValue::Set(request.rejection_reason.clone()),
            created_at: ActiveValue::Set(request.created_at),
            updated_at: ActiveValue::Set(request.updated_at),
            submitted_at: ActiveValue::Set(request.submitted_at),
            reviewed_at: ActiveValue::Set(request.reviewed_at),
            reviewed_by: ActiveValue::Set(request.reviewed_by.clone()),
            paid_at: ActiveValue::Set(request.paid_at),
        }
    }
}

impl TryFrom<Model> for ReimbursementRequest {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "request")?,
            owner: model.owner,
            status: RequestStatus::try_from(model.status.as_str())?,
            total_amount: MoneyCents::new(model.total_amount_minor),
            notes: model.notes,
            admin_notes: model.admin_notes,
            rejection_reason: model.rejection_reason,
            created_at: model.created_at,
            updated_at: model.updated_at,
            submitted_at: model.submitted_at,
            reviewed_at: model.reviewed_at,
            reviewed_by: model.reviewed_by,
            paid_at: model.paid_at,
        })
    }
}
