use serde::{Deserialize, Serialize};

use crate::{ModelError, Resource};

/// A grouping of services shown on the console home page.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    /// Number of services referencing this category; computed on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_count: Option<u32>,
}

impl Category {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::required("name"));
        }
        Ok(())
    }
}

impl Resource for Category {
    const COLLECTION: &'static str = "categories";

    fn derived_fields() -> &'static [&'static str] { &["serviceCount"] }
}
