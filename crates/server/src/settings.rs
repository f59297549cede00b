use api_types::settings::AutoApproval;
use axum::{Extension, Json, extract::State};
use engine::{Actor, AutoApprovalSetting, MoneyCents};

use crate::{ServerError, server::ServerState};

fn view(setting: AutoApprovalSetting) -> AutoApproval {
    AutoApproval {
        enabled: setting.enabled,
        amount_minor: setting.amount.cents(),
    }
}

pub async fn get_auto_approval(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<AutoApproval>, ServerError> {
    let setting = state.engine.auto_approval_setting(&actor).await?;
    Ok(Json(view(setting)))
}

pub async fn set_auto_approval(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<AutoApproval>,
) -> Result<Json<AutoApproval>, ServerError> {
    let setting = AutoApprovalSetting {
        enabled: payload.enabled,
        amount: MoneyCents::new(payload.amount_minor),
    };
    let saved = state.engine.set_auto_approval(&actor, setting).await?;
    Ok(Json(view(saved)))
}
