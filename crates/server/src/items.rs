use api_types::item::{ItemNew, ItemView, TransactionItemNew};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Actor, ItemInput, MoneyCents, TransactionItemInput};

use crate::{
    ServerError,
    server::ServerState,
    views::{category_from_api, item_view},
};

fn item_input(payload: ItemNew) -> ItemInput {
    ItemInput {
        amount: MoneyCents::new(payload.amount_minor),
        category: category_from_api(payload.category),
        description: payload.description,
        expense_date: payload.expense_date,
        receipt_url: payload.receipt_url,
    }
}

pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ItemView>>, ServerError> {
    let items = state.engine.request_items(&id, &actor).await?;
    Ok(Json(items.into_iter().map(item_view).collect()))
}

pub async fn add(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ItemNew>,
) -> Result<(StatusCode, Json<ItemView>), ServerError> {
    let item = state
        .engine
        .add_item(&id, &actor, item_input(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(item_view(item))))
}

pub async fn add_from_transaction(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<TransactionItemNew>,
) -> Result<(StatusCode, Json<ItemView>), ServerError> {
    let input = TransactionItemInput {
        transaction_id: payload.transaction_id,
        category: category_from_api(payload.category),
        description: payload.description,
        receipt_url: payload.receipt_url,
    };
    let item = state.engine.add_transaction_item(&id, &actor, input).await?;
    Ok((StatusCode::CREATED, Json(item_view(item))))
}

pub async fn update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path((id, item_id)): Path<(String, String)>,
    Json(payload): Json<ItemNew>,
) -> Result<Json<ItemView>, ServerError> {
    let item = state
        .engine
        .update_item(&id, &item_id, &actor, item_input(payload))
        .await?;
    Ok(Json(item_view(item)))
}

pub async fn remove(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<StatusCode, ServerError> {
    state.engine.remove_item(&id, &item_id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
