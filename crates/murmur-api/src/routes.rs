use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use tracing::error;

use murmur_types::api::{Credentials, NewMessageRequest, UpdateMessageRequest};
use murmur_types::models::{Account, Message};

use crate::AppState;
use crate::extractors::JsonBody;
use crate::error::{ApiError, ApiResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/messages", get(list_messages).post(create_message))
        .route(
            "/messages/{message_id}",
            get(get_message).delete(delete_message).patch(update_message),
        )
        .route("/accounts/{account_id}/messages", get(list_account_messages))
        .with_state(state)
}

/// Run rules (and their SQLite calls) off the async runtime.
async fn blocking<F, T>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.to_string())
    })?
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<Credentials>,
) -> ApiResult<Json<Account>> {
    let account = blocking(move || state.accounts.register(&req)).await?;
    Ok(Json(account))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<Credentials>,
) -> ApiResult<Json<Account>> {
    let account = blocking(move || state.accounts.login(&req)).await?;
    Ok(Json(account))
}

pub async fn create_message(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<NewMessageRequest>,
) -> ApiResult<Json<Message>> {
    let message = blocking(move || state.messages.create(&req)).await?;
    Ok(Json(message))
}

pub async fn list_messages(State(state): State<AppState>) -> ApiResult<Json<Vec<Message>>> {
    let messages = blocking(move || state.messages.read_all()).await?;
    Ok(Json(messages))
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> ApiResult<Json<Message>> {
    let message = blocking(move || state.messages.read(message_id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("message {}", message_id)))?;
    Ok(Json(message))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> ApiResult<Json<Message>> {
    let message = blocking(move || state.messages.delete(message_id)).await?;
    Ok(Json(message))
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    JsonBody(req): JsonBody<UpdateMessageRequest>,
) -> ApiResult<Json<Message>> {
    let message =
        blocking(move || state.messages.update(message_id, &req.message_text)).await?;
    Ok(Json(message))
}

pub async fn list_account_messages(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> ApiResult<Json<Vec<Message>>> {
    let messages = blocking(move || state.messages.read_by_account(account_id)).await?;
    Ok(Json(messages))
}
