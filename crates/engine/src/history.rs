//! Append-only approval history.
//!
//! One row per state transition or system action. Rows are numbered per request
//! (`sequence`, starting at 1) and never updated or deleted; replaying the
//! `from_status → to_status` pairs in sequence order reconstructs every status
//! the request went through.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, RequestStatus, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Submitted,
    Approved,
    Rejected,
    InfoRequested,
    InfoProvided,
    Reviewed,
    Paid,
}

impl HistoryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::InfoRequested => "info_requested",
            Self::InfoProvided => "info_provided",
            Self::Reviewed => "reviewed",
            Self::Paid => "paid",
        }
    }
}

impl TryFrom<&str> for HistoryAction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "info_requested" => Ok(Self::InfoRequested),
            "info_provided" => Ok(Self::InfoProvided),
            "reviewed" => Ok(Self::Reviewed),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::Validation(format!(
                "invalid history action: {other}"
            ))),
        }
    }
}

/// Structured payload stored alongside a history entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionMetadata {
    pub from_status: RequestStatus,
    pub to_status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_minor: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_approved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_minor: Option<i64>,
}

impl TransitionMetadata {
    #[must_use]
    pub fn new(from_status: RequestStatus, to_status: RequestStatus) -> Self {
        Self {
            from_status,
            to_status,
            amount_minor: None,
            auto_approved: None,
            threshold_minor: None,
        }
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn auto_approved(mut self, threshold_minor: i64) -> Self {
        self.auto_approved = Some(true);
        self.threshold_minor = Some(threshold_minor);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalHistoryEntry {
    pub id: Uuid,
    pub request_id: Uuid,
    pub sequence: i32,
    pub action: HistoryAction,
    pub actor: String,
    pub note: Option<String>,
    pub metadata: Option<TransitionMetadata>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "approval_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub request_id: String,
    pub sequence: i32,
    pub action: String,
    pub actor: String,
    pub note: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub metadata: Option<String>,
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

impl TryFrom<&ApprovalHistoryEntry> for ActiveModel {
    type Error = EngineError;

    fn try_from(entry: &ApprovalHistoryEntry) -> Result<Self, Self::Error> {
        let metadata = entry
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|err| EngineError::Validation(format!("invalid history metadata: {err}")))?;

        Ok(Self {
            id: ActiveValue::Set(entry.id.to_string()),
            request_id: ActiveValue::Set(entry.request_id.to_string()),
            sequence: ActiveValue::Set(entry.sequence),
            action: ActiveValue::Set(entry.action.as_str().to_string()),
            actor: ActiveValue::Set(entry.actor.clone()),
            note: ActiveValue::Set(entry.note.clone()),
            metadata: ActiveValue::Set(metadata),
            created_at: ActiveValue::Set(entry.created_at),
        })
    }
}

impl TryFrom<Model> for ApprovalHistoryEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let metadata = model
            .metadata
            .as_deref()
            .map(serde_json::from_str::<TransitionMetadata>)
            .transpose()
            .map_err(|_| {
                EngineError::InvalidState(format!("corrupt metadata on history entry {}", model.id))
            })?;

        Ok(Self {
            id: parse_uuid(&model.id, "history entry")?,
            request_id: parse_uuid(&model.request_id, "request")?,
            sequence: model.sequence,
            action: HistoryAction::try_from(model.action.as_str())?,
            actor: model.actor,
            note: model.note,
            metadata,
            created_at: model.created_at,
        })
    }
}
