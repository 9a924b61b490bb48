use serde::{Deserialize, Serialize};

use crate::{ModelError, Resource};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// A customer request for a service.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub service_id: String,
    #[serde(default)]
    pub service_name: String,
    pub customer_name: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// Requested date as entered, e.g. `2024-06-01`.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: BookingStatus,
}

impl Booking {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.service_id.trim().is_empty() {
            return Err(ModelError::required("serviceId"));
        }
        if self.customer_name.trim().is_empty() {
            return Err(ModelError::required("customerName"));
        }
        if self.phone.trim().is_empty() {
            return Err(ModelError::required("phone"));
        }
        Ok(())
    }
}

impl Resource for Booking {
    const COLLECTION: &'static str = "bookings";
}
