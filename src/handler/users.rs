use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::userdb::UserExt,
    dtos::{
        response::ApiResponse,
        userdtos::{FilterUserDto, UpdateLocationDto, UpdateProfileDto},
    },
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddeware,
    utils::invalidation::Mutation,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/me", get(get_me).put(update_profile))
        .route("/me/location", put(update_location))
        .route("/:user_id", get(get_user_by_id))
}

pub async fn get_me(
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(ApiResponse::success("User retrieved", auth.user)))
}

pub async fn update_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .update_user_profile(auth.user.id, body.name, body.bio)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::mutated(
        "Profile updated",
        user,
        Mutation::UpdateProfile,
    )))
}

pub async fn update_location(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateLocationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .update_user_location(
            auth.user.id,
            body.latitude,
            body.longitude,
            body.search_radius_km,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    tracing::info!(
        "user {} enabled nearby search with radius {} km",
        user.id,
        body.search_radius_km
    );

    Ok(Json(ApiResponse::mutated(
        "Location updated",
        user,
        Mutation::UpdateLocation,
    )))
}

pub async fn get_user_by_id(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let user = app_state
        .db_client
        .get_user(Some(user_id), None, None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNoLongerExist.to_string()))?;

    Ok(Json(ApiResponse::success(
        "User retrieved",
        FilterUserDto::filter_user(&user),
    )))
}
