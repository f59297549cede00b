//! Expense lines of a reimbursement request.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Travel,
    Lodging,
    Meals,
    ConferenceRegistration,
    Supplies,
    Books,
    Software,
    Equipment,
    Transportation,
    Other,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 10] = [
        Self::Travel,
        Self::Lodging,
        Self::Meals,
        Self::ConferenceRegistration,
        Self::Supplies,
        Self::Books,
        Self::Software,
        Self::Equipment,
        Self::Transportation,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Travel => "travel",
            Self::Lodging => "lodging",
            Self::Meals => "meals",
            Self::ConferenceRegistration => "conference_registration",
            Self::Supplies => "supplies",
            Self::Books => "books",
            Self::Software => "software",
            Self::Equipment => "equipment",
            Self::Transportation => "transportation",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for ItemCategory {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| EngineError::Validation(format!("invalid category: {value}")))
    }
}

/// Where an item came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOrigin {
    BankTransaction,
    Manual,
}

impl ItemOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BankTransaction => "bank_transaction",
            Self::Manual => "manual",
        }
    }
}

impl TryFrom<&str> for ItemOrigin {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "bank_transaction" => Ok(Self::BankTransaction),
            "manual" => Ok(Self::Manual),
            other => Err(EngineError::Validation(format!(
                "invalid item origin: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementItem {
    pub id: Uuid,
    pub request_id: Uuid,
    pub amount: MoneyCents,
    pub category: ItemCategory,
    pub description: String,
    pub expense_date: NaiveDate,
    pub origin: ItemOrigin,
    pub source_transaction_id: Option<Uuid>,
    pub receipt_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reimbursement_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub request_id: String,
    pub amount_minor: i64,
    pub category: String,
    pub description: String,
    pub expense_date: Date,
    pub origin: String,
    pub source_transaction_id: Option<String>,
    pub receipt_url: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::requests::Entity",
        from = "Column::RequestId",
        to = "super::requests::Column::Id"
    )]
    Requests,
}

impl Related<super::requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ReimbursementItem> for ActiveModel {
    fn from(item: &ReimbursementItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            request_id: ActiveValue::Set(item.request_id.to_string()),
            amount_minor: ActiveValue::Set(item.amount.cents()),
            category: ActiveValue::Set(item.category.as_str().to_string()),
            description: ActiveValue::Set(item.description.clone()),
            expense_date: ActiveValue::Set(item.expense_date),
            origin: ActiveValue::Set(item.origin.as_str().to_string()),
            source_transaction_id: ActiveValue::Set(
                item.source_transaction_id.map(|id| id.to_string()),
            ),
            receipt_url: ActiveValue::Set(item.receipt_url.clone()),
            created_at: ActiveValue::Set(item.created_at),
        }
    }
}

impl TryFrom<Model> for ReimbursementItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "item")?,
            request_id: parse_uuid(&model.request_id, "request")?,
            amount: MoneyCents::new(model.amount_minor),
            category: ItemCategory::try_from(model.category.as_str())?,
            description: model.description,
            expense_date: model.expense_date,
            origin: ItemOrigin::try_from(model.origin.as_str())?,
            source_transaction_id: model
                .source_transaction_id
                .as_deref()
                .map(|id| parse_uuid(id, "bank transaction"))
                .transpose()?,
            receipt_url: model.receipt_url,
            created_at: model.created_at,
        })
    }
}
