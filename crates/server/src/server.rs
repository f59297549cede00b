use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{ServerError, bank, items, notifications, requests, settings, user};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

impl ServerState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Resolves HTTP Basic credentials to an [`engine::Actor`] request extension.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(EngineError::Unauthorized("missing credentials".to_string()).into());
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(EngineError::Unauthorized("missing credentials".to_string()).into());
    }

    let actor = state
        .engine
        .authenticate(credentials.username(), credentials.password())
        .await?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/requests", post(requests::create).get(requests::list))
        .route(
            "/requests/{id}",
            get(requests::get)
                .patch(requests::update_notes)
                .delete(requests::delete),
        )
        .route("/requests/{id}/history", get(requests::history))
        .route("/requests/{id}/submit", post(requests::submit))
        .route("/requests/{id}/review", post(requests::start_review))
        .route("/requests/{id}/decision", post(requests::decide))
        .route("/requests/{id}/info", post(requests::provide_info))
        .route("/requests/{id}/pay", post(requests::mark_paid))
        .route("/requests/{id}/items", get(items::list).post(items::add))
        .route(
            "/requests/{id}/items/transaction",
            post(items::add_from_transaction),
        )
        .route(
            "/requests/{id}/items/{item_id}",
            put(items::update).delete(items::remove),
        )
        .route("/bank-transactions", get(bank::list).post(bank::record))
        .route(
            "/settings/auto-approval",
            get(settings::get_auto_approval).put(settings::set_auto_approval),
        )
        .route("/notifications", get(notifications::list))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .route(
            "/notifications/{id}",
            axum::routing::delete(notifications::delete),
        )
        .route("/user/me", get(user::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState::new(engine))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
