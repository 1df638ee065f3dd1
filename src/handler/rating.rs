use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::exchangedb::ExchangeExt,
    dtos::{exchangedtos::CreateRatingDto, response::ApiResponse},
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddeware,
    models::exchangemodel::{Exchange, ExchangeStatus},
    utils::invalidation::Mutation,
    AppState,
};

pub fn rating_handler() -> Router {
    Router::new()
        .route("/received", get(get_received_ratings))
        .route("/given", get(get_given_ratings))
        .route("/:exchange_id", post(create_rating))
}

#[derive(Debug, Serialize)]
pub struct RatingResultDto {
    pub exchange: Exchange,
    pub rated_user_id: Uuid,
    pub average_rating: f64,
    pub rating_count: i32,
}

pub async fn create_rating(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(exchange_id): Path<Uuid>,
    Json(body): Json<CreateRatingDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let exchange = app_state
        .db_client
        .get_exchange(exchange_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::ExchangeNotFound.to_string()))?;

    if !exchange.is_party(auth.user.id) {
        return Err(HttpError::forbidden(
            ErrorMessage::NotExchangeParty.to_string(),
        ));
    }

    if exchange.status != ExchangeStatus::Completed {
        return Err(HttpError::bad_request(
            ErrorMessage::ExchangeNotCompleted.to_string(),
        ));
    }

    if exchange.own_rating(auth.user.id).is_some() {
        return Err(HttpError::bad_request(
            ErrorMessage::AlreadyRated.to_string(),
        ));
    }

    let rater_is_provider = exchange.is_provider(auth.user.id);
    let rated_user_id = exchange.other_party(auth.user.id);

    // Guarded on an empty slot, so a concurrent duplicate loses here.
    let updated = app_state
        .db_client
        .set_exchange_rating(exchange_id, rater_is_provider, body.rating, body.review)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::AlreadyRated.to_string()))?;

    let (average_rating, rating_count) = app_state
        .db_client
        .recompute_user_rating(rated_user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    tracing::info!(
        "user {} rated {} on exchange {}: {} stars (new average {:.2} over {})",
        auth.user.id,
        rated_user_id,
        exchange_id,
        body.rating,
        average_rating,
        rating_count
    );

    Ok(Json(ApiResponse::mutated(
        "Rating recorded",
        RatingResultDto {
            exchange: updated,
            rated_user_id,
            average_rating,
            rating_count,
        },
        Mutation::CreateRating,
    )))
}

pub async fn get_received_ratings(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let ratings = app_state
        .db_client
        .get_received_ratings(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Received ratings", ratings)))
}

pub async fn get_given_ratings(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let ratings = app_state
        .db_client
        .get_given_ratings(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Given ratings", ratings)))
}
