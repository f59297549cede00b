use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};
use tracing::info;

use crate::{
    Actor, AutoApprovalSetting, EngineError, ResultEngine,
    settings::{self, AUTO_APPROVAL_KEY},
};

use super::{Engine, with_tx};

impl Engine {
    /// Reads the auto-approval record; a missing record means disabled.
    pub(super) async fn load_auto_approval(
        &self,
        db: &DatabaseTransaction,
    ) -> ResultEngine<AutoApprovalSetting> {
        let Some(model) = settings::Entity::find_by_id(AUTO_APPROVAL_KEY.to_string())
            .one(db)
            .await?
        else {
            return Ok(AutoApprovalSetting::disabled());
        };
        serde_json::from_str(&model.value).map_err(|err| {
            EngineError::InvalidState(format!("corrupt auto-approval setting: {err}"))
        })
    }

    pub async fn auto_approval_setting(&self, actor: &Actor) -> ResultEngine<AutoApprovalSetting> {
        actor.require_reviewer()?;
        with_tx!(self, |db_tx| self.load_auto_approval(&db_tx).await)
    }

    /// Replaces the auto-approval record. Administrators only.
    pub async fn set_auto_approval(
        &self,
        actor: &Actor,
        setting: AutoApprovalSetting,
    ) -> ResultEngine<AutoApprovalSetting> {
        actor.require_administrator()?;
        setting.validate()?;
        let value = serde_json::to_string(&setting)
            .map_err(|err| EngineError::Validation(format!("invalid setting: {err}")))?;

        with_tx!(self, |db_tx| {
            let active = settings::ActiveModel {
                key: ActiveValue::Set(AUTO_APPROVAL_KEY.to_string()),
                value: ActiveValue::Set(value),
                updated_by: ActiveValue::Set(Some(actor.user_id.clone())),
                updated_at: ActiveValue::Set(Utc::now()),
            };
            let exists = settings::Entity::find_by_id(AUTO_APPROVAL_KEY.to_string())
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                active.update(&db_tx).await?;
            } else {
                active.insert(&db_tx).await?;
            }
            Ok(())
        })?;

        info!(
            updated_by = %actor.user_id,
            enabled = setting.enabled,
            amount_minor = setting.amount.cents(),
            "auto-approval setting updated"
        );
        Ok(setting)
    }
}
