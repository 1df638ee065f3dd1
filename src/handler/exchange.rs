use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{exchangedb::ExchangeExt, servicedb::ServiceExt, userdb::UserExt},
    dtos::{
        exchangedtos::*,
        response::ApiResponse,
        userdtos::FilterUserDto,
    },
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddeware,
    models::exchangemodel::{Exchange, ExchangeAction, ExchangeStatus},
    utils::invalidation::Mutation,
    AppState,
};

const LIST_CAP: i64 = 10;

pub fn exchange_handler() -> Router {
    Router::new()
        .route("/", get(get_user_exchanges).post(request_exchange))
        .route("/pending", get(get_pending_exchanges))
        .route("/upcoming", get(get_upcoming_exchanges))
        .route("/recent", get(get_recent_activity))
        .route("/:exchange_id", get(get_exchange_by_id))
        .route("/:exchange_id/respond", put(respond_to_request))
        .route("/:exchange_id/schedule", put(schedule_exchange))
        .route("/:exchange_id/complete", put(complete_exchange))
        .route("/:exchange_id/cancel", put(cancel_exchange))
}

/// Loads the exchange and verifies the caller is one of its two parties.
async fn load_exchange_for_party(
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

/// Rejects the action up front when the current status forbids it. The
/// compare-and-swap update re-checks the status, so a `None` after this
/// guard passed means a concurrent actor won the transition.
fn guard_status(exchange: &Exchange, action: ExchangeAction, what: &str) -> Result<(), HttpError> {
    if !action.permitted_from(exchange.status) {
        return Err(HttpError::bad_request(format!(
            "Cannot {} an exchange that is {}",
            what,
            exchange.status.to_str()
        )));
    }
    Ok(())
}

fn cas_conflict() -> HttpError {
    HttpError::conflict(ErrorMessage::ConcurrentTransition.to_string())
}

pub async fn request_exchange(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<RequestExchangeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let service = app_state
        .db_client
        .get_service_by_id(body.provider_service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::ServiceNotFound.to_string()))?;

    if service.user_id == auth.user.id {
        return Err(HttpError::bad_request(ErrorMessage::SelfRequest.to_string()));
    }

    if service.is_active == Some(false) {
        return Err(HttpError::bad_request(
            "This service is not accepting requests",
        ));
    }

    // A reciprocal offer must be one of the requester's own services.
    if let Some(requester_service_id) = body.requester_service_id {
        let own = app_state
            .db_client
            .get_service_by_id(requester_service_id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?
            .ok_or_else(|| HttpError::not_found(ErrorMessage::ServiceNotFound.to_string()))?;

        if own.user_id != auth.user.id {
            return Err(HttpError::bad_request(
                "The reciprocal service must be one of your own",
            ));
        }
    }

    let exchange = app_state
        .db_client
        .create_exchange(
            service.user_id,
            auth.user.id,
            service.id,
            body.requester_service_id,
            body.requested_date,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    tracing::info!(
        "exchange {} requested by {} for service {}",
        exchange.id,
        auth.user.id,
        service.id
    );

    app_state
        .notification_service
        .notify_exchange_requested(&exchange, &service.title)
        .await;

    Ok(Json(ApiResponse::mutated(
        "Exchange requested successfully",
        exchange,
        Mutation::RequestExchange,
    )))
}

pub async fn respond_to_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(exchange_id): Path<Uuid>,
    Json(body): Json<RespondToRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let exchange = load_exchange_for_party(&app_state, exchange_id, auth.user.id).await?;

    // The requester is a party but may not answer their own request.
    if !exchange.is_provider(auth.user.id) {
        return Err(HttpError::forbidden(
            ErrorMessage::OnlyProviderMayRespond.to_string(),
        ));
    }

    guard_status(&exchange, ExchangeAction::Respond, "respond to")?;

    let new_status = if body.accept {
        ExchangeStatus::Accepted
    } else {
        ExchangeStatus::Declined
    };
    let scheduled_date = if body.accept { body.scheduled_date } else { None };

    let updated = app_state
        .db_client
        .respond_to_exchange(exchange_id, new_status, scheduled_date)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(cas_conflict)?;

    if body.accept {
        app_state
            .notification_service
            .notify_exchange_accepted(&updated)
            .await;
    } else {
        app_state
            .notification_service
            .notify_exchange_declined(&updated)
            .await;
    }

    Ok(Json(ApiResponse::mutated(
        if body.accept {
            "Exchange request accepted"
        } else {
            "Exchange request declined"
        },
        updated,
        Mutation::RespondToRequest,
    )))
}

pub async fn schedule_exchange(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(exchange_id): Path<Uuid>,
    Json(body): Json<ScheduleExchangeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let exchange = load_exchange_for_party(&app_state, exchange_id, auth.user.id).await?;
    guard_status(&exchange, ExchangeAction::Schedule, "schedule")?;

    let updated = app_state
        .db_client
        .schedule_exchange(exchange_id, body.scheduled_date)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(cas_conflict)?;

    app_state
        .notification_service
        .notify_exchange_scheduled(&updated, auth.user.id)
        .await;

    Ok(Json(ApiResponse::mutated(
        "Exchange scheduled",
        updated,
        Mutation::ScheduleExchange,
    )))
}

pub async fn complete_exchange(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(exchange_id): Path<Uuid>,
    Json(body): Json<CompleteExchangeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let exchange = load_exchange_for_party(&app_state, exchange_id, auth.user.id).await?;
    guard_status(&exchange, ExchangeAction::Complete, "complete")?;

    let hours = match body.hours {
        Some(h) => Some(
            sqlx::types::BigDecimal::try_from(h)
                .map_err(|_| HttpError::bad_request("Invalid hours value"))?,
        ),
        None => None,
    };

    let updated = app_state
        .db_client
        .complete_exchange(exchange_id, hours)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(cas_conflict)?;

    tracing::info!("exchange {} completed by {}", exchange_id, auth.user.id);

    app_state
        .notification_service
        .notify_exchange_completed(&updated, auth.user.id)
        .await;

    Ok(Json(ApiResponse::mutated(
        "Exchange completed",
        updated,
        Mutation::CompleteExchange,
    )))
}

pub async fn cancel_exchange(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(exchange_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let exchange = load_exchange_for_party(&app_state, exchange_id, auth.user.id).await?;
    guard_status(&exchange, ExchangeAction::Cancel, "cancel")?;

    let updated = app_state
        .db_client
        .cancel_exchange(exchange_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(cas_conflict)?;

    app_state
        .notification_service
        .notify_exchange_cancelled(&updated, auth.user.id)
        .await;

    Ok(Json(ApiResponse::mutated(
        "Exchange cancelled",
        updated,
        Mutation::CancelExchange,
    )))
}

pub async fn get_exchange_by_id(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(exchange_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let exchange = load_exchange_for_party(&app_state, exchange_id, auth.user.id).await?;

    let provider_service = app_state
        .db_client
        .get_service_by_id(exchange.provider_service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::ServiceNotFound.to_string()))?;

    let provider = app_state
        .db_client
        .get_user(Some(exchange.provider_id), None, None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNoLongerExist.to_string()))?;

    let requester = app_state
        .db_client
        .get_user(Some(exchange.requester_id), None, None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNoLongerExist.to_string()))?;

    let detail = ExchangeDetailDto {
        exchange,
        provider_service,
        provider: FilterUserDto::filter_user(&provider),
        requester: FilterUserDto::filter_user(&requester),
    };

    Ok(Json(ApiResponse::success("Exchange retrieved", detail)))
}

pub async fn get_user_exchanges(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<ExchangeStatusQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let exchanges = app_state
        .db_client
        .get_user_exchanges(auth.user.id, query.status)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Exchanges retrieved", exchanges)))
}

pub async fn get_pending_exchanges(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let exchanges = app_state
        .db_client
        .get_pending_exchanges(auth.user.id, query.limit.unwrap_or(LIST_CAP))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Pending exchanges retrieved",
        exchanges,
    )))
}

pub async fn get_upcoming_exchanges(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let exchanges = app_state
        .db_client
        .get_upcoming_exchanges(auth.user.id, query.limit.unwrap_or(LIST_CAP))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Upcoming exchanges retrieved",
        exchanges,
    )))
}

pub async fn get_recent_activity(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let exchanges = app_state
        .db_client
        .get_recent_activity(auth.user.id, query.limit.unwrap_or(LIST_CAP))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Recent activity retrieved",
        exchanges,
    )))
}
