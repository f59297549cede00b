//! Bank transactions landed by the bank-sync collaborator.
//!
//! The engine only reads them to build `bank_transaction` items; the import
//! itself happens outside.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub id: Uuid,
    pub owner: String,
    pub amount: MoneyCents,
    pub description: String,
    pub merchant: Option<String>,
    pub posted_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner: String,
    pub amount_minor: i64,
    pub description: String,
    pub merchant: Option<String>,
    pub posted_on: Date,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BankTransaction> for ActiveModel {
    fn from(tx: &BankTransaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            owner: ActiveValue::Set(tx.owner.clone()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            description: ActiveValue::Set(tx.description.clone()),
            merchant: ActiveValue::Set(tx.merchant.clone()),
            posted_on: ActiveValue::Set(tx.posted_on),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for BankTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "bank transaction")?,
            owner: model.owner,
            amount: MoneyCents::new(model.amount_minor),
            description: model.description,
            merchant: model.merchant,
            posted_on: model.posted_on,
            created_at: model.created_at,
        })
    }
}
