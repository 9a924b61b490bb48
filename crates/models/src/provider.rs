use serde::{Deserialize, Serialize};

use crate::{ModelError, Resource};

/// A vendor fulfilling services.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub name: String,
    /// Service-type discriminator, e.g. `internal_delivery`.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destinations: Option<Vec<String>>,
}

fn default_available() -> bool { true }

impl Provider {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::required("name"));
        }
        if self.phone.trim().is_empty() {
            return Err(ModelError::required("phone"));
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(ModelError::Validation("rating must be between 0 and 5".into()));
        }
        Ok(())
    }
}

impl Resource for Provider {
    const COLLECTION: &'static str = "providers";

    fn clearable_fields() -> &'static [&'static str] { &["specialties", "destinations"] }
}
