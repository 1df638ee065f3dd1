// db/exchangedb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::BigDecimal;
use sqlx::Row;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::exchangemodel::{Exchange, ExchangeStatus, RatingEntry};

// A service can be referenced by an active exchange either as the
// requested service or as the requester's reciprocal offer; both block
// deletion.
const ACTIVE_EXCHANGE_GUARD_SQL: &str = r#"
    SELECT COUNT(*)
    FROM exchanges
    WHERE (provider_service_id = $1 OR requester_service_id = $1)
      AND status = ANY(ARRAY['requested', 'accepted', 'scheduled']::exchange_status[])
"#;

#[async_trait]
pub trait ExchangeExt {
    async fn create_exchange(
        &self,
        provider_id: Uuid,
        requester_id: Uuid,
        provider_service_id: Uuid,
        requester_service_id: Option<Uuid>,
        requested_date: Option<DateTime<Utc>>,
    ) -> Result<Exchange, sqlx::Error>;

    async fn get_exchange(&self, exchange_id: Uuid) -> Result<Option<Exchange>, sqlx::Error>;

    /// Compare-and-swap from Requested. Returns `None` when the row was
    /// not in Requested anymore (or never existed); two concurrent
    /// responders cannot both win.
    async fn respond_to_exchange(
        &self,
        exchange_id: Uuid,
        status: ExchangeStatus,
        scheduled_date: Option<DateTime<Utc>>,
    ) -> Result<Option<Exchange>, sqlx::Error>;

    /// CAS from Accepted or Scheduled (re-scheduling allowed).
    async fn schedule_exchange(
        &self,
        exchange_id: Uuid,
        scheduled_date: DateTime<Utc>,
    ) -> Result<Option<Exchange>, sqlx::Error>;

    /// CAS from Accepted or Scheduled; stamps completed_date.
    async fn complete_exchange(
        &self,
        exchange_id: Uuid,
        hours: Option<BigDecimal>,
    ) -> Result<Option<Exchange>, sqlx::Error>;

    /// CAS from any active status.
    async fn cancel_exchange(&self, exchange_id: Uuid) -> Result<Option<Exchange>, sqlx::Error>;

    /// Writes the caller's rating slot, guarded on Completed status and an
    /// empty slot so a party can rate exactly once.
    async fn set_exchange_rating(
        &self,
        exchange_id: Uuid,
        rater_is_provider: bool,
        rating: i32,
        review: Option<String>,
    ) -> Result<Option<Exchange>, sqlx::Error>;

    /// Full rescan of the user's completed exchanges; persists and returns
    /// the new (average_rating, rating_count). Idempotent.
    async fn recompute_user_rating(&self, user_id: Uuid) -> Result<(f64, i32), sqlx::Error>;

    async fn get_pending_exchanges(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Exchange>, sqlx::Error>;

    async fn get_upcoming_exchanges(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Exchange>, sqlx::Error>;

    async fn get_recent_activity(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Exchange>, sqlx::Error>;

    async fn get_user_exchanges(
        &self,
        user_id: Uuid,
        status: Option<ExchangeStatus>,
    ) -> Result<Vec<Exchange>, sqlx::Error>;

    async fn service_has_active_exchanges(&self, service_id: Uuid)
        -> Result<bool, sqlx::Error>;

    async fn get_received_ratings(&self, user_id: Uuid) -> Result<Vec<RatingEntry>, sqlx::Error>;

    async fn get_given_ratings(&self, user_id: Uuid) -> Result<Vec<RatingEntry>, sqlx::Error>;
}

#[async_trait]
impl ExchangeExt for DBClient {
    async fn create_exchange(
        &self,
        provider_id: Uuid,
        requester_id: Uuid,
        provider_service_id: Uuid,
        requester_service_id: Option<Uuid>,
        requested_date: Option<DateTime<Utc>>,
    ) -> Result<Exchange, sqlx::Error> {
        sqlx::query_as::<_, Exchange>(
            r#"
            INSERT INTO exchanges
                (status, provider_id, requester_id, provider_service_id,
                 requester_service_id, requested_date)
            VALUES ('requested'::exchange_status, $1, $2, $3, $4, $5)
            RETURNING id, status, provider_id, requester_id, provider_service_id,
                      requester_service_id, requested_date, scheduled_date,
                      completed_date, hours, provider_rating, requester_rating,
                      provider_review, requester_review, created_at, updated_at
            "#,
        )
        .bind(provider_id)
        .bind(requester_id)
        .bind(provider_service_id)
        .bind(requester_service_id)
        .bind(requested_date)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_exchange(&self, exchange_id: Uuid) -> Result<Option<Exchange>, sqlx::Error> {
        sqlx::query_as::<_, Exchange>(
            r#"
            SELECT id, status, provider_id, requester_id, provider_service_id,
                   requester_service_id, requested_date, scheduled_date,
                   completed_date, hours, provider_rating, requester_rating,
                   provider_review, requester_review, created_at, updated_at
            FROM exchanges
            WHERE id = $1
            "#,
        )
        .bind(exchange_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn respond_to_exchange(
        &self,
        exchange_id: Uuid,
        status: ExchangeStatus,
        scheduled_date: Option<DateTime<Utc>>,
    ) -> Result<Option<Exchange>, sqlx::Error> {
        sqlx::query_as::<_, Exchange>(
            r#"
            UPDATE exchanges
            SET status = $2,
                scheduled_date = COALESCE($3, scheduled_date),
                updated_at = NOW()
            WHERE id = $1 AND status = 'requested'::exchange_status
            RETURNING id, status, provider_id, requester_id, provider_service_id,
                      requester_service_id, requested_date, scheduled_date,
                      completed_date, hours, provider_rating, requester_rating,
                      provider_review, requester_review, created_at, updated_at
            "#,
        )
        .bind(exchange_id)
        .bind(status)
        .bind(scheduled_date)
        .fetch_optional(&self.pool)
        .await
    }

    async fn schedule_exchange(
        &self,
        exchange_id: Uuid,
        scheduled_date: DateTime<Utc>,
    ) -> Result<Option<Exchange>, sqlx::Error> {
        sqlx::query_as::<_, Exchange>(
            r#"
            UPDATE exchanges
            SET status = 'scheduled'::exchange_status,
                scheduled_date = $2,
                updated_at = NOW()
            WHERE id = $1
              AND status = ANY(ARRAY['accepted', 'scheduled']::exchange_status[])
            RETURNING id, status, provider_id, requester_id, provider_service_id,
                      requester_service_id, requested_date, scheduled_date,
                      completed_date, hours, provider_rating, requester_rating,
                      provider_review, requester_review, created_at, updated_at
            "#,
        )
        .bind(exchange_id)
        .bind(scheduled_date)
        .fetch_optional(&self.pool)
        .await
    }

    async fn complete_exchange(
        &self,
        exchange_id: Uuid,
        hours: Option<BigDecimal>,
    ) -> Result<Option<Exchange>, sqlx::Error> {
        sqlx::query_as::<_, Exchange>(
            r#"
            UPDATE exchanges
            SET status = 'completed'::exchange_status,
                completed_date = NOW(),
                hours = COALESCE($2, hours),
                updated_at = NOW()
            WHERE id = $1
              AND status = ANY(ARRAY['accepted', 'scheduled']::exchange_status[])
            RETURNING id, status, provider_id, requester_id, provider_service_id,
                      requester_service_id, requested_date, scheduled_date,
                      completed_date, hours, provider_rating, requester_rating,
                      provider_review, requester_review, created_at, updated_at
            "#,
        )
        .bind(exchange_id)
        .bind(hours)
        .fetch_optional(&self.pool)
        .await
    }

    async fn cancel_exchange(&self, exchange_id: Uuid) -> Result<Option<Exchange>, sqlx::Error> {
        sqlx::query_as::<_, Exchange>(
            r#"
            UPDATE exchanges
            SET status = 'cancelled'::exchange_status,
                updated_at = NOW()
            WHERE id = $1
              AND status = ANY(ARRAY['requested', 'accepted', 'scheduled']::exchange_status[])
            RETURNING id, status, provider_id, requester_id, provider_service_id,
                      requester_service_id, requested_date, scheduled_date,
                      completed_date, hours, provider_rating, requester_rating,
                      provider_review, requester_review, created_at, updated_at
            "#,
        )
        .bind(exchange_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn set_exchange_rating(
        &self,
        exchange_id: Uuid,
        rater_is_provider: bool,
        rating: i32,
        review: Option<String>,
    ) -> Result<Option<Exchange>, sqlx::Error> {
        let query = if rater_is_provider {
            r#"
            UPDATE exchanges
            SET provider_rating = $2,
                provider_review = $3,
                updated_at = NOW()
            WHERE id = $1
              AND status = 'completed'::exchange_status
              AND provider_rating IS NULL
            RETURNING id, status, provider_id, requester_id, provider_service_id,
                      requester_service_id, requested_date, scheduled_date,
                      completed_date, hours, provider_rating, requester_rating,
                      provider_review, requester_review, created_at, updated_at
            "#
        } else {
            r#"
            UPDATE exchanges
            SET requester_rating = $2,
                requester_review = $3,
                updated_at = NOW()
            WHERE id = $1
              AND status = 'completed'::exchange_status
              AND requester_rating IS NULL
            RETURNING id, status, provider_id, requester_id, provider_service_id,
                      requester_service_id, requested_date, scheduled_date,
                      completed_date, hours, provider_rating, requester_rating,
                      provider_review, requester_review, created_at, updated_at
            "#
        };

        sqlx::query_as::<_, Exchange>(query)
            .bind(exchange_id)
            .bind(rating)
            .bind(review)
            .fetch_optional(&self.pool)
            .await
    }

    async fn recompute_user_rating(&self, user_id: Uuid) -> Result<(f64, i32), sqlx::Error> {
        // Ratings received as provider live in requester_rating and vice
        // versa; the aggregate is always rebuilt from scratch.
        let row = sqlx::query(
            r#"
            WITH received AS (
                SELECT requester_rating AS rating
                FROM exchanges
                WHERE provider_id = $1
                  AND status = 'completed'::exchange_status
                  AND requester_rating IS NOT NULL
                UNION ALL
                SELECT provider_rating
                FROM exchanges
                WHERE requester_id = $1
                  AND status = 'completed'::exchange_status
                  AND provider_rating IS NOT NULL
            )
            UPDATE users
            SET average_rating = COALESCE((SELECT AVG(rating)::float8 FROM received), 0),
                rating_count = (SELECT COUNT(*) FROM received)::int4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING average_rating, rating_count
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let average: f64 = row.try_get("average_rating")?;
        let count: i32 = row.try_get("rating_count")?;
        Ok((average, count))
    }

    async fn get_pending_exchanges(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Exchange>, sqlx::Error> {
        // Two meanings of "pending" by role: providers see requests
        // awaiting their answer, requesters see accepted exchanges with an
        // upcoming date still owned by the provider.
        sqlx::query_as::<_, Exchange>(
            r#"
            SELECT id, status, provider_id, requester_id, provider_service_id,
                   requester_service_id, requested_date, scheduled_date,
                   completed_date, hours, provider_rating, requester_rating,
                   provider_review, requester_review, created_at, updated_at
            FROM exchanges
            WHERE (provider_id = $1 AND status = 'requested'::exchange_status)
               OR (requester_id = $1
                   AND status = 'accepted'::exchange_status
                   AND scheduled_date >= NOW())
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_upcoming_exchanges(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Exchange>, sqlx::Error> {
        sqlx::query_as::<_, Exchange>(
            r#"
            SELECT id, status, provider_id, requester_id, provider_service_id,
                   requester_service_id, requested_date, scheduled_date,
                   completed_date, hours, provider_rating, requester_rating,
                   provider_review, requester_review, created_at, updated_at
            FROM exchanges
            WHERE (provider_id = $1 OR requester_id = $1)
              AND status = ANY(ARRAY['accepted', 'scheduled']::exchange_status[])
              AND scheduled_date >= NOW()
            ORDER BY scheduled_date ASC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_recent_activity(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Exchange>, sqlx::Error> {
        sqlx::query_as::<_, Exchange>(
            r#"
            SELECT id, status, provider_id, requester_id, provider_service_id,
                   requester_service_id, requested_date, scheduled_date,
                   completed_date, hours, provider_rating, requester_rating,
                   provider_review, requester_review, created_at, updated_at
            FROM exchanges
            WHERE (provider_id = $1 OR requester_id = $1)
              AND status = ANY(ARRAY['completed', 'cancelled']::exchange_status[])
            ORDER BY updated_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_user_exchanges(
        &self,
        user_id: Uuid,
        status: Option<ExchangeStatus>,
    ) -> Result<Vec<Exchange>, sqlx::Error> {
        sqlx::query_as::<_, Exchange>(
            r#"
            SELECT id, status, provider_id, requester_id, provider_service_id,
                   requester_service_id, requested_date, scheduled_date,
                   completed_date, hours, provider_rating, requester_rating,
                   provider_review, requester_review, created_at, updated_at
            FROM exchanges
            WHERE (provider_id = $1 OR requester_id = $1)
              AND ($2::exchange_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await
    }

    async fn service_has_active_exchanges(
        &self,
        service_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(ACTIVE_EXCHANGE_GUARD_SQL)
            .bind(service_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    async fn get_received_ratings(&self, user_id: Uuid) -> Result<Vec<RatingEntry>, sqlx::Error> {
        sqlx::query_as::<_, RatingEntry>(
            r#"
            SELECT id AS exchange_id, requester_id AS from_user_id,
                   provider_id AS to_user_id, requester_rating AS rating,
                   requester_review AS review, completed_date
            FROM exchanges
            WHERE provider_id = $1
              AND status = 'completed'::exchange_status
              AND requester_rating IS NOT NULL
            UNION ALL
            SELECT id, provider_id, requester_id, provider_rating,
                   provider_review, completed_date
            FROM exchanges
            WHERE requester_id = $1
              AND status = 'completed'::exchange_status
              AND provider_rating IS NOT NULL
            ORDER BY completed_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_given_ratings(&self, user_id: Uuid) -> Result<Vec<RatingEntry>, sqlx::Error> {
        sqlx::query_as::<_, RatingEntry>(
            r#"
            SELECT id AS exchange_id, provider_id AS from_user_id,
                   requester_id AS to_user_id, provider_rating AS rating,
                   provider_review AS review, completed_date
            FROM exchanges
            WHERE provider_id = $1
              AND status = 'completed'::exchange_status
              AND provider_rating IS NOT NULL
            UNION ALL
            SELECT id, requester_id, provider_id, requester_rating,
                   requester_review, completed_date
            FROM exchanges
            WHERE requester_id = $1
              AND status = 'completed'::exchange_status
              AND requester_rating IS NOT NULL
            ORDER BY completed_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deletion_guard_counts_both_service_references() {
        assert!(ACTIVE_EXCHANGE_GUARD_SQL.contains("provider_service_id = $1"));
        assert!(ACTIVE_EXCHANGE_GUARD_SQL.contains("requester_service_id = $1"));
        for status in ExchangeStatus::ACTIVE {
            assert!(ACTIVE_EXCHANGE_GUARD_SQL.contains(status.to_str()));
        }
    }
}
