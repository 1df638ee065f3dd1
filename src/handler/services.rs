use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::get,
    routing::post,
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{exchangedb::ExchangeExt, servicedb::ServiceExt},
    dtos::{response::ApiResponse, servicedtos::*},
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddeware,
    models::servicemodel::LocationType,
    utils::{geo, invalidation::Mutation},
    AppState,
};

const NEARBY_DEFAULT_LIMIT: usize = 20;

pub fn services_handler() -> Router {
    Router::new()
        .route("/", post(create_service))
        .route("/mine", get(get_my_services))
        .route("/browse", get(browse_services))
        .route("/nearby", get(get_nearby_services))
        .route("/categories", get(list_categories))
        .route(
            "/:service_id",
            get(get_service_by_id)
                .put(update_service)
                .delete(delete_service),
        )
}

pub async fn create_service(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateServiceDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    // Coordinates only make sense for services delivered at the
    // provider's own place.
    if body.location_type != LocationType::Own
        && (body.latitude.is_some() || body.longitude.is_some())
    {
        return Err(HttpError::bad_request(
            "Coordinates are only accepted for own-location services",
        ));
    }

    let hourly_rate = sqlx::types::BigDecimal::try_from(body.hourly_rate)
        .map_err(|_| HttpError::bad_request("Invalid hourly rate"))?;

    let service = app_state
        .db_client
        .create_service(
            auth.user.id,
            body.category_id,
            body.title,
            body.description,
            hourly_rate,
            body.location_type,
            body.latitude,
            body.longitude,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::mutated(
        "Service created successfully",
        service,
        Mutation::CreateService,
    )))
}

pub async fn get_service_by_id(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(service_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let service = app_state
        .db_client
        .get_service_by_id(service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::ServiceNotFound.to_string()))?;

    Ok(Json(ApiResponse::success("Service retrieved", service)))
}

pub async fn get_my_services(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let services = app_state
        .db_client
        .get_user_services(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Services retrieved", services)))
}

pub async fn update_service(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(service_id): Path<Uuid>,
    Json(body): Json<UpdateServiceDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let fields = body.into_fields().map_err(HttpError::bad_request)?;

    let updated = app_state
        .db_client
        .update_service(service_id, auth.user.id, fields)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    match updated {
        Some(service) => Ok(Json(ApiResponse::mutated(
            "Service updated successfully",
            service,
            Mutation::UpdateService,
        ))),
        // Zero rows: either no such service or someone else's.
        None => {
            let exists = app_state
                .db_client
                .get_service_by_id(service_id)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;

            match exists {
                Some(_) => Err(HttpError::forbidden(
                    ErrorMessage::PermissionDenied.to_string(),
                )),
                None => Err(HttpError::not_found(
                    ErrorMessage::ServiceNotFound.to_string(),
                )),
            }
        }
    }
}

pub async fn delete_service(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(service_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let service = app_state
        .db_client
        .get_service_by_id(service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::ServiceNotFound.to_string()))?;

    if service.user_id != auth.user.id {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    // Referential guard rather than a cascade: history survives, active
    // exchanges block deletion.
    let has_active = app_state
        .db_client
        .service_has_active_exchanges(service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if has_active {
        return Err(HttpError::conflict(
            "Cannot delete a service with active exchanges",
        ));
    }

    app_state
        .db_client
        .delete_service(service_id, auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::mutated(
        "Service deleted",
        serde_json::json!({}),
        Mutation::DeleteService,
    )))
}

pub async fn browse_services(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<BrowseServicesQuery>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20) as i64;
    let offset = ((page - 1) as i64) * limit;

    let services = app_state
        .db_client
        .browse_services(auth.user.id, query.category_id, limit, offset)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Services retrieved", services)))
}

pub async fn get_nearby_services(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<NearbyServicesQuery>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    // Missing location disables the feature with a distinguished error so
    // the UI can prompt profile completion.
    let (latitude, longitude, radius_km) = match (
        auth.user.latitude,
        auth.user.longitude,
        auth.user.search_radius_km,
    ) {
        (Some(lat), Some(lng), Some(radius)) => (lat, lng, radius),
        _ => {
            return Err(HttpError::precondition_failed(
                ErrorMessage::LocationNotConfigured.to_string(),
            ));
        }
    };

    let origin = (latitude, longitude);
    let limit = query.limit.unwrap_or(NEARBY_DEFAULT_LIMIT);

    let candidates = app_state
        .db_client
        .get_nearby_candidates(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let nearby: Vec<NearbyServiceDto> =
        geo::nearest_within(origin, radius_km, limit, candidates, |service| {
            service.latitude.zip(service.longitude)
        })
        .into_iter()
        .map(|(service, distance_km)| NearbyServiceDto {
            service,
            distance_km,
        })
        .collect();

    Ok(Json(ApiResponse::success("Nearby services", nearby)))
}

pub async fn list_categories(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let categories = app_state
        .db_client
        .list_categories()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Categories retrieved", categories)))
}
