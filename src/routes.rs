use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        auth::auth_handler, chat::chat_handler, exchange::exchange_handler,
        notification_handler::notification_routes, rating::rating_handler,
        services::services_handler, users::users_handler,
    },
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/users", users_handler().layer(middleware::from_fn(auth)))
        .nest(
            "/services",
            services_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/exchanges",
            exchange_handler().layer(middleware::from_fn(auth)),
        )
        .nest("/ratings", rating_handler().layer(middleware::from_fn(auth)))
        .nest(
            "/notifications",
            notification_routes().layer(middleware::from_fn(auth)),
        )
        .nest("/chat", chat_handler().layer(middleware::from_fn(auth)))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
