// db/userdb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::User;

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn save_user<T: Into<String> + Send>(
        &self,
        name: T,
        username: T,
        email: T,
        password: T,
    ) -> Result<User, sqlx::Error>;

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        bio: Option<String>,
    ) -> Result<User, sqlx::Error>;

    async fn update_user_location(
        &self,
        user_id: Uuid,
        latitude: f64,
        longitude: f64,
        search_radius_km: f64,
    ) -> Result<User, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut user: Option<User> = None;

        if let Some(user_id) = user_id {
            user = sqlx::query_as::<_, User>(
                r#"
                SELECT id, name, username, email, password, bio, credits,
                       average_rating, rating_count, latitude, longitude,
                       search_radius_km, created_at, updated_at
                FROM users
                WHERE id = $1
                "#,
            )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(username) = username {
            user = sqlx::query_as::<_, User>(
                r#"
                SELECT id, name, username, email, password, bio, credits,
                       average_rating, rating_count, latitude, longitude,
                       search_radius_km, created_at, updated_at
                FROM users
                WHERE username = $1
                "#,
            )
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(email) = email {
            user = sqlx::query_as::<_, User>(
                r#"
                SELECT id, name, username, email, password, bio, credits,
                       average_rating, rating_count, latitude, longitude,
                       search_radius_km, created_at, updated_at
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        }

        Ok(user)
    }

    async fn save_user<T: Into<String> + Send>(
        &self,
        name: T,
        username: T,
        email: T,
        password: T,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, username, email, password)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, username, email, password, bio, credits,
                      average_rating, rating_count, latitude, longitude,
                      search_radius_km, created_at, updated_at
            "#,
        )
        .bind(name.into())
        .bind(username.into())
        .bind(email.into())
        .bind(password.into())
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        bio: Option<String>,
    ) -> Result<User, sqlx::Error> {
        // Only fields present in the request are written, the rest keep
        // their current values.
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                bio = COALESCE($3, bio),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, username, email, password, bio, credits,
                      average_rating, rating_count, latitude, longitude,
                      search_radius_km, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(bio)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user_location(
        &self,
        user_id: Uuid,
        latitude: f64,
        longitude: f64,
        search_radius_km: f64,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET latitude = $2,
                longitude = $3,
                search_radius_km = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, username, email, password, bio, credits,
                      average_rating, rating_count, latitude, longitude,
                      search_radius_km, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(latitude)
        .bind(longitude)
        .bind(search_radius_km)
        .fetch_one(&self.pool)
        .await
    }
}
