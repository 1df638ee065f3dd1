use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::servicedb::ServiceUpdateFields;
use crate::models::servicemodel::{LocationType, Service};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceDto {
    #[validate(length(min = 3, max = 120, message = "Title must be between 3-120 characters"))]
    pub title: String,

    #[validate(length(
        min = 10,
        max = 2000,
        message = "Description must be between 10-2000 characters"
    ))]
    pub description: String,

    #[validate(range(min = 0.0, message = "Hourly rate cannot be negative"))]
    pub hourly_rate: f64,

    pub category_id: Option<Uuid>,

    pub location_type: LocationType,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: Option<f64>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateServiceDto {
    #[validate(length(min = 3, max = 120, message = "Title must be between 3-120 characters"))]
    pub title: Option<String>,

    #[validate(length(
        min = 10,
        max = 2000,
        message = "Description must be between 10-2000 characters"
    ))]
    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "Hourly rate cannot be negative"))]
    pub hourly_rate: Option<f64>,

    pub category_id: Option<Uuid>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: Option<f64>,

    pub is_active: Option<bool>,
}

impl UpdateServiceDto {
    pub fn into_fields(self) -> Result<ServiceUpdateFields, String> {
        let hourly_rate = match self.hourly_rate {
            Some(rate) => Some(
                sqlx::types::BigDecimal::try_from(rate)
                    .map_err(|_| "Invalid hourly rate".to_string())?,
            ),
            None => None,
        };

        Ok(ServiceUpdateFields {
            title: self.title,
            description: self.description,
            hourly_rate,
            category_id: self.category_id,
            latitude: self.latitude,
            longitude: self.longitude,
            is_active: self.is_active,
        })
    }
}

#[derive(Validate, Debug, Deserialize)]
pub struct BrowseServicesQuery {
    pub category_id: Option<Uuid>,

    #[validate(range(min = 1))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 50))]
    pub limit: Option<u32>,
}

#[derive(Validate, Debug, Deserialize)]
pub struct NearbyServicesQuery {
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

/// A nearby hit with its computed great-circle distance for display.
#[derive(Debug, Serialize)]
pub struct NearbyServiceDto {
    #[serde(flatten)]
    pub service: Service,
    pub distance_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_update_maps_only_present_fields() {
        let dto = UpdateServiceDto {
            title: Some("Bike repair".to_string()),
            hourly_rate: Some(12.5),
            ..Default::default()
        };

        let fields = dto.into_fields().unwrap();
        assert_eq!(fields.title.as_deref(), Some("Bike repair"));
        assert!(fields.hourly_rate.is_some());
        assert!(fields.description.is_none());
        assert!(fields.is_active.is_none());
    }

    #[test]
    fn out_of_range_coordinates_fail_validation() {
        let dto = CreateServiceDto {
            title: "Garden help".to_string(),
            description: "Weeding, pruning and planting".to_string(),
            hourly_rate: 10.0,
            category_id: None,
            location_type: LocationType::Own,
            latitude: Some(123.0),
            longitude: Some(3.39),
        };
        assert!(dto.validate().is_err());
    }
}
