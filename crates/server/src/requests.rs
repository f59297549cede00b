//! Reimbursement request endpoints: drafts, listing, lifecycle transitions.

use api_types::{
    decision::{DecisionNew, InfoProvided, Payout},
    history::HistoryEntryView,
    request::{
        RequestDetailView, RequestList, RequestListResponse, RequestNew, RequestNotesUpdate,
        RequestView, TransitionResponse,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Actor, Decision, RequestListFilter};

use crate::{
    ServerError,
    server::ServerState,
    views::{history_view, item_view, request_view, status_from_api, transition_response},
};

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 200;

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<RequestNew>,
) -> Result<(StatusCode, Json<RequestView>), ServerError> {
    let request = state
        .engine
        .create_request(&actor, payload.notes.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(request_view(request))))
}

pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<RequestList>,
) -> Result<Json<RequestListResponse>, ServerError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(ServerError::Generic(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let filter = RequestListFilter {
        status: query.status.map(status_from_api),
        owner: query.owner,
        from: query.from,
        to: query.to,
        search: query.search,
    };

    let (requests, next_cursor) = state
        .engine
        .list_requests_page(&actor, limit, query.cursor.as_deref(), &filter)
        .await?;

    Ok(Json(RequestListResponse {
        requests: requests.into_iter().map(request_view).collect(),
        next_cursor,
    }))
}

pub async fn get(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<RequestDetailView>, ServerError> {
    let detail = state.engine.request_detail(&id, &actor).await?;
    Ok(Json(RequestDetailView {
        request: request_view(detail.request),
        items: detail.items.into_iter().map(item_view).collect(),
        history: detail.history.into_iter().map(history_view).collect(),
    }))
}

pub async fn update_notes(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<RequestNotesUpdate>,
) -> Result<Json<RequestView>, ServerError> {
    let request = state
        .engine
        .update_request_notes(&id, &actor, payload.notes.as_deref())
        .await?;
    Ok(Json(request_view(request)))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_request(&id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn history(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<HistoryEntryView>>, ServerError> {
    let entries = state.engine.request_history(&id, &actor).await?;
    Ok(Json(entries.into_iter().map(history_view).collect()))
}

pub async fn submit(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, ServerError> {
    let outcome = state.engine.submit_request(&id, &actor).await?;
    Ok(Json(transition_response(outcome)))
}

pub async fn start_review(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, ServerError> {
    let outcome = state.engine.start_review(&id, &actor).await?;
    Ok(Json(transition_response(outcome)))
}

pub async fn decide(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DecisionNew>,
) -> Result<Json<TransitionResponse>, ServerError> {
    let decision = match payload {
        DecisionNew::Approve { admin_notes } => Decision::Approve { admin_notes },
        DecisionNew::Reject {
            rejection_reason,
            admin_notes,
        } => Decision::Reject {
            rejection_reason,
            admin_notes,
        },
        DecisionNew::RequestInfo { note } => Decision::RequestInfo { note },
    };
    let outcome = state.engine.decide(&id, &actor, decision).await?;
    Ok(Json(transition_response(outcome)))
}

pub async fn provide_info(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<InfoProvided>,
) -> Result<Json<TransitionResponse>, ServerError> {
    let outcome = state.engine.provide_info(&id, &actor, &payload.note).await?;
    Ok(Json(transition_response(outcome)))
}

pub async fn mark_paid(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<Payout>,
) -> Result<Json<TransitionResponse>, ServerError> {
    let outcome = state
        .engine
        .mark_paid(&id, &actor, payload.note.as_deref())
        .await?;
    Ok(Json(transition_response(outcome)))
}
