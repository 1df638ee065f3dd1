// src/handler/notification_handler.rs
use std::sync::Arc;

use axum::{
    extract::Query,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::notificationdb::NotificationExt,
    dtos::{
        notificationdtos::{MarkReadRequest, NotificationListDto, PaginationParams},
        response::ApiResponse,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    utils::invalidation::Mutation,
    AppState,
};

// Widen before multiplying so an adversarial page number cannot
// overflow u32 arithmetic.
fn page_offset(page: u32, limit: u32) -> i64 {
    (page as i64 - 1) * limit as i64
}

pub fn notification_routes() -> Router {
    Router::new()
        .route("/", get(get_notifications))
        .route("/unread-count", get(get_unread_count))
        .route("/read", post(mark_notifications_read))
}

pub async fn get_notifications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, HttpError> {
    pagination
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = pagination.page.unwrap_or(1);
    let limit = pagination.limit.unwrap_or(20).min(100);

    let notifications = app_state
        .db_client
        .get_notifications(auth.user.id, limit as i64, page_offset(page, limit))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let unread_count = app_state
        .db_client
        .get_unread_notification_count(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Notifications retrieved",
        NotificationListDto {
            notifications,
            unread_count,
            page,
            limit,
        },
    )))
}

pub async fn get_unread_count(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let count = app_state
        .db_client
        .get_unread_notification_count(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Unread count",
        serde_json::json!({ "unread_count": count }),
    )))
}

pub async fn mark_notifications_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<MarkReadRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let updated = app_state
        .db_client
        .mark_notifications_read(auth.user.id, body.notification_ids)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::mutated(
        "Notifications marked as read",
        serde_json::json!({ "updated_count": updated }),
        Mutation::MarkNotificationsRead,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_starts_at_zero() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let offset = page_offset(u32::MAX, 100);
        assert_eq!(offset, (u32::MAX as i64 - 1) * 100);
    }
}
