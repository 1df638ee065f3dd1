use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        Path, Query, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{chatdb::ChatExt, exchangedb::ExchangeExt},
    dtos::response::ApiResponse,
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddeware,
    models::exchangemodel::Exchange,
    service::chat_relay::ChatEvent,
    utils::invalidation::Mutation,
    AppState,
};

const HISTORY_DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageDto {
    #[validate(length(min = 1, max = 2000, message = "Message must be 1 to 2000 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MessageHistoryQuery {
    #[validate(range(min = 1, max = 200))]
    pub limit: Option<i64>,
}

pub fn chat_handler() -> Router {
    Router::new()
        .route(
            "/:exchange_id/messages",
            get(get_messages).post(send_message),
        )
        .route("/:exchange_id/ws", get(chat_ws))
}

/// Loads the exchange and rejects anyone who is not one of its two
/// parties. Chat never leaks across exchanges.
async fn load_exchange_for_chat(
    app_state: &AppState,
    exchange_id: Uuid,
    user_id: Uuid,
) -> Result<Exchange, HttpError> {
    let exchange = app_state
        .db_client
        .get_exchange(exchange_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::ExchangeNotFound.to_string()))?;

    if !exchange.is_party(user_id) {
        return Err(HttpError::forbidden(
            ErrorMessage::NotExchangeParty.to_string(),
        ));
    }

    Ok(exchange)
}

pub async fn get_messages(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(exchange_id): Path<Uuid>,
    Query(query): Query<MessageHistoryQuery>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    load_exchange_for_chat(&app_state, exchange_id, auth.user.id).await?;

    let messages = app_state
        .db_client
        .get_exchange_messages(exchange_id, query.limit.unwrap_or(HISTORY_DEFAULT_LIMIT))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Messages retrieved", messages)))
}

pub async fn send_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(exchange_id): Path<Uuid>,
    Json(body): Json<SendMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let exchange = load_exchange_for_chat(&app_state, exchange_id, auth.user.id).await?;

    if !exchange.status.chat_open() {
        return Err(HttpError::bad_request(ErrorMessage::ChatClosed.to_string()));
    }

    let message = app_state
        .db_client
        .create_message(exchange_id, auth.user.id, body.content)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // Persisted first; fanout and notification are best-effort extras.
    app_state
        .chat_relay
        .publish(exchange_id, ChatEvent::from(&message))
        .await;

    app_state
        .notification_service
        .notify_new_message(&exchange, auth.user.id)
        .await;

    Ok(Json(ApiResponse::mutated(
        "Message sent",
        message,
        Mutation::SendMessage,
    )))
}

pub async fn chat_ws(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(exchange_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, HttpError> {
    let exchange = load_exchange_for_chat(&app_state, exchange_id, auth.user.id).await?;

    if !exchange.status.chat_open() {
        return Err(HttpError::bad_request(ErrorMessage::ChatClosed.to_string()));
    }

    Ok(ws.on_upgrade(move |socket| handle_chat_socket(socket, app_state, exchange_id)))
}

async fn handle_chat_socket(socket: WebSocket, app_state: Arc<AppState>, exchange_id: Uuid) {
    let mut events = app_state.chat_relay.subscribe(exchange_id).await;
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        let payload = match serde_json::to_string(&event) {
                            Ok(payload) => payload,
                            Err(e) => {
                                tracing::warn!("failed to serialize chat event: {}", e);
                                continue;
                            }
                        };
                        if sink.send(WsMessage::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    // Slow readers skip what they missed; history is
                    // recoverable over the REST endpoint.
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "chat subscriber for exchange {} lagged by {} events",
                            exchange_id,
                            skipped
                        );
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            incoming = stream.next() => {
                match incoming {
                    // Sends go through the REST endpoint so they hit the
                    // status gate; the socket is receive-only.
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }
}
