use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dtos::userdtos::FilterUserDto;
use crate::models::{
    exchangemodel::{Exchange, ExchangeStatus},
    servicemodel::Service,
};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RequestExchangeDto {
    pub provider_service_id: Uuid,
    /// Optional reciprocal offer from the requester's own services.
    pub requester_service_id: Option<Uuid>,
    pub requested_date: Option<DateTime<Utc>>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RespondToRequestDto {
    pub accept: bool,
    pub scheduled_date: Option<DateTime<Utc>>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleExchangeDto {
    pub scheduled_date: DateTime<Utc>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CompleteExchangeDto {
    #[validate(range(min = 0.5, message = "Hours must be at least 0.5"))]
    pub hours: Option<f64>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateRatingDto {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(max = 2000, message = "Review must be at most 2000 characters"))]
    pub review: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeStatusQuery {
    pub status: Option<ExchangeStatus>,
}

#[derive(Validate, Debug, Deserialize)]
pub struct LimitQuery {
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<i64>,
}

/// Exchange together with the referenced service and both parties'
/// public profiles, for the detail page.
#[derive(Debug, Serialize)]
pub struct ExchangeDetailDto {
    pub exchange: Exchange,
    pub provider_service: Service,
    pub provider: FilterUserDto,
    pub requester: FilterUserDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_below_half_are_rejected() {
        let dto = CompleteExchangeDto { hours: Some(0.3) };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn hours_of_one_and_a_half_pass() {
        let dto = CompleteExchangeDto { hours: Some(1.5) };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn omitted_hours_are_fine() {
        let dto = CompleteExchangeDto { hours: None };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn rating_outside_one_to_five_is_rejected() {
        for bad in [0, 6] {
            let dto = CreateRatingDto {
                rating: bad,
                review: None,
            };
            assert!(dto.validate().is_err(), "rating {} should fail", bad);
        }
        let dto = CreateRatingDto {
            rating: 5,
            review: Some("great".to_string()),
        };
        assert!(dto.validate().is_ok());
    }
}
