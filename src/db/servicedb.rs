// db/servicedb.rs
use async_trait::async_trait;
use sqlx::types::BigDecimal;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::servicemodel::{LocationType, Service, ServiceCategory};

/// Field set for partial service updates. `None` members are left
/// untouched server-side; the client never computes diffs itself.
#[derive(Debug, Default, Clone)]
pub struct ServiceUpdateFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub hourly_rate: Option<BigDecimal>,
    pub category_id: Option<Uuid>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: Option<bool>,
}

#[async_trait]
pub trait ServiceExt {
    async fn create_service(
        &self,
        user_id: Uuid,
        category_id: Option<Uuid>,
        title: String,
        description: String,
        hourly_rate: BigDecimal,
        location_type: LocationType,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Service, sqlx::Error>;

    async fn get_service_by_id(&self, service_id: Uuid) -> Result<Option<Service>, sqlx::Error>;

    async fn get_user_services(&self, user_id: Uuid) -> Result<Vec<Service>, sqlx::Error>;

    async fn update_service(
        &self,
        service_id: Uuid,
        owner_id: Uuid,
        fields: ServiceUpdateFields,
    ) -> Result<Option<Service>, sqlx::Error>;

    async fn delete_service(&self, service_id: Uuid, owner_id: Uuid) -> Result<u64, sqlx::Error>;

    async fn browse_services(
        &self,
        exclude_user_id: Uuid,
        category_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Service>, sqlx::Error>;

    /// Active own-location services with coordinates, excluding the
    /// caller's. Distance filtering happens in the geo layer.
    async fn get_nearby_candidates(
        &self,
        exclude_user_id: Uuid,
    ) -> Result<Vec<Service>, sqlx::Error>;

    async fn list_categories(&self) -> Result<Vec<ServiceCategory>, sqlx::Error>;
}

#[async_trait]
impl ServiceExt for DBClient {
    async fn create_service(
        &self,
        user_id: Uuid,
        category_id: Option<Uuid>,
        title: String,
        description: String,
        hourly_rate: BigDecimal,
        location_type: LocationType,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Service, sqlx::Error> {
        sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services
                (user_id, category_id, title, description, hourly_rate,
                 location_type, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, category_id, title, description, hourly_rate,
                      location_type, latitude, longitude, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(category_id)
        .bind(title)
        .bind(description)
        .bind(hourly_rate)
        .bind(location_type)
        .bind(latitude)
        .bind(longitude)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_service_by_id(&self, service_id: Uuid) -> Result<Option<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(
            r#"
            SELECT id, user_id, category_id, title, description, hourly_rate,
                   location_type, latitude, longitude, is_active,
                   created_at, updated_at
            FROM services
            WHERE id = $1
            "#,
        )
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_services(&self, user_id: Uuid) -> Result<Vec<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(
            r#"
            SELECT id, user_id, category_id, title, description, hourly_rate,
                   location_type, latitude, longitude, is_active,
                   created_at, updated_at
            FROM services
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_service(
        &self,
        service_id: Uuid,
        owner_id: Uuid,
        fields: ServiceUpdateFields,
    ) -> Result<Option<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                hourly_rate = COALESCE($5, hourly_rate),
                category_id = COALESCE($6, category_id),
                latitude = COALESCE($7, latitude),
                longitude = COALESCE($8, longitude),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, category_id, title, description, hourly_rate,
                      location_type, latitude, longitude, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(service_id)
        .bind(owner_id)
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.hourly_rate)
        .bind(fields.category_id)
        .bind(fields.latitude)
        .bind(fields.longitude)
        .bind(fields.is_active)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_service(&self, service_id: Uuid, owner_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM services
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(service_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn browse_services(
        &self,
        exclude_user_id: Uuid,
        category_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(
            r#"
            SELECT id, user_id, category_id, title, description, hourly_rate,
                   location_type, latitude, longitude, is_active,
                   created_at, updated_at
            FROM services
            WHERE user_id != $1
              AND is_active = true
              AND ($2::uuid IS NULL OR category_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(exclude_user_id)
        .bind(category_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_nearby_candidates(
        &self,
        exclude_user_id: Uuid,
    ) -> Result<Vec<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(
            r#"
            SELECT id, user_id, category_id, title, description, hourly_rate,
                   location_type, latitude, longitude, is_active,
                   created_at, updated_at
            FROM services
            WHERE user_id != $1
              AND is_active = true
              AND location_type = 'own'::location_type
              AND latitude IS NOT NULL
              AND longitude IS NOT NULL
            "#,
        )
        .bind(exclude_user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_categories(&self) -> Result<Vec<ServiceCategory>, sqlx::Error> {
        sqlx::query_as::<_, ServiceCategory>(
            r#"
            SELECT id, name, slug
            FROM service_categories
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
