use api_types::user::UserView;
use axum::{Extension, Json, extract::State};
use engine::Actor;

use crate::{ServerError, server::ServerState, views::user_view};

pub async fn me(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let profile = state.engine.user_profile(&actor).await?;
    Ok(Json(user_view(profile)))
}
