//! Imported bank transactions that students can claim as items.

use api_types::bank::{BankTransactionList, BankTransactionNew, BankTransactionView};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use engine::{Actor, BankTransactionInput, MoneyCents};

use crate::{ServerError, server::ServerState, views::bank_transaction_view};

pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<BankTransactionList>,
) -> Result<Json<Vec<BankTransactionView>>, ServerError> {
    let txs = if query.unclaimed.unwrap_or(false) {
        state.engine.unclaimed_bank_transactions(&actor).await?
    } else {
        state.engine.bank_transactions(&actor).await?
    };
    Ok(Json(txs.into_iter().map(bank_transaction_view).collect()))
}

pub async fn record(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<BankTransactionNew>,
) -> Result<(StatusCode, Json<BankTransactionView>), ServerError> {
    let input = BankTransactionInput {
        amount: MoneyCents::new(payload.amount_minor),
        description: payload.description,
        merchant: payload.merchant,
        posted_on: payload.posted_on,
    };
    let tx = state.engine.record_bank_transaction(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(bank_transaction_view(tx))))
}
