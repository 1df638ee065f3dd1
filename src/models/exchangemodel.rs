use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "exchange_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExchangeStatus {
    Requested,
    Accepted,
    Declined,
    Scheduled,
    Completed,
    Cancelled,
}

impl ExchangeStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ExchangeStatus::Requested => "requested",
            ExchangeStatus::Accepted => "accepted",
            ExchangeStatus::Declined => "declined",
            ExchangeStatus::Scheduled => "scheduled",
            ExchangeStatus::Completed => "completed",
            ExchangeStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses an exchange can still move out of.
    pub const ACTIVE: [ExchangeStatus; 3] = [
        ExchangeStatus::Requested,
        ExchangeStatus::Accepted,
        ExchangeStatus::Scheduled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExchangeStatus::Declined | ExchangeStatus::Completed | ExchangeStatus::Cancelled
        )
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    /// Chat stays open exactly while the exchange is active.
    pub fn chat_open(&self) -> bool {
        self.is_active()
    }
}

/// Mutating actions on an exchange, each with its own set of
/// statuses it may fire from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeAction {
    Respond,
    Schedule,
    Complete,
    Cancel,
}

impl ExchangeAction {
    pub fn allowed_from(&self) -> &'static [ExchangeStatus] {
        match self {
            ExchangeAction::Respond => &[ExchangeStatus::Requested],
            ExchangeAction::Schedule => &[ExchangeStatus::Accepted, ExchangeStatus::Scheduled],
            // Completion directly from Accepted is legal, no meeting required.
            ExchangeAction::Complete => &[ExchangeStatus::Accepted, ExchangeStatus::Scheduled],
            ExchangeAction::Cancel => &[
                ExchangeStatus::Requested,
                ExchangeStatus::Accepted,
                ExchangeStatus::Scheduled,
            ],
        }
    }

    pub fn permitted_from(&self, status: ExchangeStatus) -> bool {
        self.allowed_from().contains(&status)
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Exchange {
    pub id: Uuid,
    pub status: ExchangeStatus,
    pub provider_id: Uuid,
    pub requester_id: Uuid,
    pub provider_service_id: Uuid,
    pub requester_service_id: Option<Uuid>,
    pub requested_date: Option<DateTime<Utc>>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub hours: Option<BigDecimal>,
    pub provider_rating: Option<i32>,
    pub requester_rating: Option<i32>,
    pub provider_review: Option<String>,
    pub requester_review: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Exchange {
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.provider_id == user_id || self.requester_id == user_id
    }

    pub fn is_provider(&self, user_id: Uuid) -> bool {
        self.provider_id == user_id
    }

    /// The counterpart to notify after `user_id` acts.
    pub fn other_party(&self, user_id: Uuid) -> Uuid {
        if self.provider_id == user_id {
            self.requester_id
        } else {
            self.provider_id
        }
    }

    /// The rating slot owned by `user_id`: providers write
    /// `provider_rating`, requesters write `requester_rating`.
    pub fn own_rating(&self, user_id: Uuid) -> Option<i32> {
        if self.provider_id == user_id {
            self.provider_rating
        } else {
            self.requester_rating
        }
    }
}

/// A rating projected out of a completed exchange. The embedded slots on
/// `exchanges` are the single source of truth for ratings.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct RatingEntry {
    pub exchange_id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub rating: i32,
    pub review: Option<String>,
    pub completed_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_reject_every_action() {
        let terminal = [
            ExchangeStatus::Declined,
            ExchangeStatus::Completed,
            ExchangeStatus::Cancelled,
        ];
        let actions = [
            ExchangeAction::Respond,
            ExchangeAction::Schedule,
            ExchangeAction::Complete,
            ExchangeAction::Cancel,
        ];
        for status in terminal {
            assert!(status.is_terminal());
            for action in actions {
                assert!(
                    !action.permitted_from(status),
                    "{:?} must not fire from {:?}",
                    action,
                    status
                );
            }
        }
    }

    #[test]
    fn respond_only_from_requested() {
        assert!(ExchangeAction::Respond.permitted_from(ExchangeStatus::Requested));
        assert!(!ExchangeAction::Respond.permitted_from(ExchangeStatus::Accepted));
        assert!(!ExchangeAction::Respond.permitted_from(ExchangeStatus::Scheduled));
    }

    #[test]
    fn complete_allowed_straight_from_accepted() {
        assert!(ExchangeAction::Complete.permitted_from(ExchangeStatus::Accepted));
        assert!(ExchangeAction::Complete.permitted_from(ExchangeStatus::Scheduled));
        assert!(!ExchangeAction::Complete.permitted_from(ExchangeStatus::Requested));
    }

    #[test]
    fn schedule_allows_rescheduling() {
        assert!(ExchangeAction::Schedule.permitted_from(ExchangeStatus::Accepted));
        assert!(ExchangeAction::Schedule.permitted_from(ExchangeStatus::Scheduled));
        assert!(!ExchangeAction::Schedule.permitted_from(ExchangeStatus::Requested));
    }

    #[test]
    fn cancel_from_any_active_status() {
        for status in ExchangeStatus::ACTIVE {
            assert!(ExchangeAction::Cancel.permitted_from(status));
            assert!(status.is_active());
            assert!(status.chat_open());
        }
        assert!(!ExchangeStatus::Completed.chat_open());
    }

    #[test]
    fn party_helpers_resolve_roles() {
        let provider = Uuid::new_v4();
        let requester = Uuid::new_v4();
        let exchange = Exchange {
            id: Uuid::new_v4(),
            status: ExchangeStatus::Requested,
            provider_id: provider,
            requester_id: requester,
            provider_service_id: Uuid::new_v4(),
            requester_service_id: None,
            requested_date: None,
            scheduled_date: None,
            completed_date: None,
            hours: None,
            provider_rating: Some(4),
            requester_rating: None,
            provider_review: None,
            requester_review: None,
            created_at: None,
            updated_at: None,
        };

        assert!(exchange.is_party(provider));
        assert!(exchange.is_party(requester));
        assert!(!exchange.is_party(Uuid::new_v4()));
        assert_eq!(exchange.other_party(provider), requester);
        assert_eq!(exchange.other_party(requester), provider);
        assert_eq!(exchange.own_rating(provider), Some(4));
        assert_eq!(exchange.own_rating(requester), None);
    }
}
