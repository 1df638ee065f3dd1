//! Cache-invalidation contract at the RPC boundary: every mutation names
//! the query tags it invalidates, and mutation responses carry that set so
//! the frontend refetches the declared queries instead of everything.

use serde::Serialize;

pub const Q_EXCHANGES: &str = "exchanges";
pub const Q_NOTIFICATIONS: &str = "notifications";
pub const Q_SERVICES: &str = "services";
pub const Q_MESSAGES: &str = "messages";
pub const Q_USER: &str = "user";
pub const Q_RATINGS: &str = "ratings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    RequestExchange,
    RespondToRequest,
    ScheduleExchange,
    CompleteExchange,
    CancelExchange,
    CreateRating,
    CreateService,
    UpdateService,
    DeleteService,
    UpdateProfile,
    UpdateLocation,
    MarkNotificationsRead,
    SendMessage,
}

impl Mutation {
    pub fn invalidates(&self) -> &'static [&'static str] {
        match self {
            // Every lifecycle transition touches the exchange lists and
            // produces a notification for the counterpart.
            Mutation::RequestExchange
            | Mutation::RespondToRequest
            | Mutation::ScheduleExchange
            | Mutation::CancelExchange => &[Q_EXCHANGES, Q_NOTIFICATIONS],
            // Completion additionally unlocks the rating queries.
            Mutation::CompleteExchange => &[Q_EXCHANGES, Q_NOTIFICATIONS, Q_RATINGS],
            // A new rating changes the rated user's aggregate.
            Mutation::CreateRating => &[Q_EXCHANGES, Q_RATINGS, Q_USER],
            Mutation::CreateService | Mutation::UpdateService | Mutation::DeleteService => {
                &[Q_SERVICES]
            }
            Mutation::UpdateProfile => &[Q_USER],
            // Location changes what nearby search returns.
            Mutation::UpdateLocation => &[Q_USER, Q_SERVICES],
            Mutation::MarkNotificationsRead => &[Q_NOTIFICATIONS],
            Mutation::SendMessage => &[Q_MESSAGES, Q_NOTIFICATIONS],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mutation_declares_at_least_one_query() {
        let all = [
            Mutation::RequestExchange,
            Mutation::RespondToRequest,
            Mutation::ScheduleExchange,
            Mutation::CompleteExchange,
            Mutation::CancelExchange,
            Mutation::CreateRating,
            Mutation::CreateService,
            Mutation::UpdateService,
            Mutation::DeleteService,
            Mutation::UpdateProfile,
            Mutation::UpdateLocation,
            Mutation::MarkNotificationsRead,
            Mutation::SendMessage,
        ];
        for m in all {
            assert!(!m.invalidates().is_empty(), "{:?} declares nothing", m);
        }
    }

    #[test]
    fn lifecycle_transitions_invalidate_notifications() {
        for m in [
            Mutation::RequestExchange,
            Mutation::RespondToRequest,
            Mutation::ScheduleExchange,
            Mutation::CompleteExchange,
            Mutation::CancelExchange,
        ] {
            assert!(m.invalidates().contains(&Q_NOTIFICATIONS));
        }
    }

    #[test]
    fn rating_invalidates_the_rated_user() {
        assert!(Mutation::CreateRating.invalidates().contains(&Q_USER));
    }
}
