use serde::{Deserialize, Serialize};

use crate::{ModelError, Resource};

/// A bookable offering.
///
/// `price` is a display string ("20 ريال", or destination-price pairs for trips),
/// never a number. `category` references a category id but is not enforced.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub price: String,
    #[serde(flatten)]
    pub kind: Option<ServiceKind>,
}

impl Resource for Service {
    const COLLECTION: &'static str = "services";

    fn clearable_fields() -> &'static [&'static str] {
        &["mainImage", "serviceType", "serviceOptions", "destinations", "startLocation", "endLocation"]
    }
}

/// Service-type discriminator with the fields each type carries.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "serviceType", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServiceKind {
    InternalDelivery {
        #[serde(default)]
        service_options: Vec<String>,
    },
    ExternalTrips(TripRoute),
    HomeMaintenance {
        #[serde(default)]
        service_options: Vec<String>,
    },
}

impl ServiceKind {
    pub fn internal_delivery(service_options: Vec<String>) -> Self {
        Self::InternalDelivery { service_options: clean(service_options) }
    }

    pub fn home_maintenance(service_options: Vec<String>) -> Self {
        Self::HomeMaintenance { service_options: clean(service_options) }
    }

    pub fn external_trips(
        destinations: Vec<Destination>,
        start_location: impl Into<String>,
        end_location: impl Into<String>,
    ) -> Result<Self, ModelError> {
        TripRoute::new(destinations, start_location, end_location).map(Self::ExternalTrips)
    }

    /// Wire name of the discriminator.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::InternalDelivery { .. } => "internal_delivery",
            Self::ExternalTrips(_) => "external_trips",
            Self::HomeMaintenance { .. } => "home_maintenance",
        }
    }
}

/// One reachable destination of a trip service and its display price.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Destination {
    pub name: String,
    #[serde(default)]
    pub price: String,
}

/// Route of an `external_trips` service: at least one destination plus both endpoints.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TripRoute {
    #[serde(default)]
    destinations: Vec<Destination>,
    #[serde(default)]
    start_location: String,
    #[serde(default)]
    end_location: String,
}

impl TripRoute {
    pub fn new(
        destinations: Vec<Destination>,
        start_location: impl Into<String>,
        end_location: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let destinations: Vec<Destination> = destinations
            .into_iter()
            .filter(|d| !d.name.trim().is_empty())
            .collect();
        if destinations.is_empty() {
            return Err(ModelError::Validation("external trips need at least one destination".into()));
        }
        let start_location = start_location.into();
        let end_location = end_location.into();
        if start_location.trim().is_empty() {
            return Err(ModelError::required("startLocation"));
        }
        if end_location.trim().is_empty() {
            return Err(ModelError::required("endLocation"));
        }
        Ok(Self { destinations, start_location, end_location })
    }

    pub fn destinations(&self) -> &[Destination] { &self.destinations }
    pub fn start_location(&self) -> &str { &self.start_location }
    pub fn end_location(&self) -> &str { &self.end_location }

    /// Price display built from every destination, e.g. `مكة: 200 ريال | جدة: 150 ريال`.
    pub fn price_summary(&self) -> String {
        self.destinations
            .iter()
            .map(|d| if d.price.trim().is_empty() { d.name.clone() } else { format!("{}: {}", d.name, d.price) })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

fn clean(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

impl Service {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::required("name"));
        }
        if self.category.trim().is_empty() {
            return Err(ModelError::required("category"));
        }
        if let Some(ServiceKind::ExternalTrips(route)) = &self.kind {
            // Re-check, a route read back from the store skips the constructor.
            TripRoute::new(route.destinations.clone(), route.start_location.as_str(), route.end_location.as_str())?;
        }
        Ok(())
    }
}
