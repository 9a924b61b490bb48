//! Form state for the service and provider editors.
//!
//! Each form owns one serialisable draft. Opening or closing a form resets it;
//! nothing is shared between forms.

use models::{Destination, ModelError, Provider, Service, ServiceKind, Stored};
use serde::{Deserialize, Serialize};

use crate::errors::ClientError;
use crate::notice::{Notice, Notifier};
use crate::typed::{ProvidersClient, ServicesClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// No type-specific fields.
    #[default]
    General,
    InternalDelivery,
    ExternalTrips,
    HomeMaintenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDraft {
    pub name: String,
    pub category: String,
    pub description: String,
    pub long_description: String,
    pub main_image: Option<String>,
    pub features: Vec<String>,
    pub price: String,
    pub service_type: ServiceType,
    pub service_options: Vec<String>,
    pub destinations: Vec<Destination>,
    pub start_location: String,
    pub end_location: String,
}

impl ServiceDraft {
    pub fn from_service(service: &Service) -> Self {
        let mut draft = Self {
            name: service.name.clone(),
            category: service.category.clone(),
            description: service.description.clone(),
            long_description: service.long_description.clone(),
            main_image: service.main_image.clone(),
            features: service.features.clone(),
            price: service.price.clone(),
            ..Self::default()
        };
        match &service.kind {
            None => {}
            Some(ServiceKind::InternalDelivery { service_options }) => {
                draft.service_type = ServiceType::InternalDelivery;
                draft.service_options = service_options.clone();
            }
            Some(ServiceKind::HomeMaintenance { service_options }) => {
                draft.service_type = ServiceType::HomeMaintenance;
                draft.service_options = service_options.clone();
            }
            Some(ServiceKind::ExternalTrips(route)) => {
                draft.service_type = ServiceType::ExternalTrips;
                draft.destinations = route.destinations().to_vec();
                draft.start_location = route.start_location().to_string();
                draft.end_location = route.end_location().to_string();
            }
        }
        draft
    }

    /// Turn the draft into a record; type-specific requirements are checked by the `ServiceKind` constructors.
    pub fn build(&self) -> Result<Service, ModelError> {
        let kind = match self.service_type {
            ServiceType::General => None,
            ServiceType::InternalDelivery => Some(ServiceKind::internal_delivery(self.service_options.clone())),
            ServiceType::HomeMaintenance => Some(ServiceKind::home_maintenance(self.service_options.clone())),
            ServiceType::ExternalTrips => Some(ServiceKind::external_trips(
                self.destinations.clone(),
                self.start_location.trim(),
                self.end_location.trim(),
            )?),
        };
        let price = match &kind {
            Some(ServiceKind::ExternalTrips(route)) if self.price.trim().is_empty() => route.price_summary(),
            _ => self.price.trim().to_string(),
        };
        let service = Service {
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            description: self.description.trim().to_string(),
            long_description: self.long_description.trim().to_string(),
            main_image: self.main_image.clone().filter(|u| !u.trim().is_empty()),
            features: self
                .features
                .iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            price,
            kind,
        };
        service.validate()?;
        Ok(service)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceForm {
    pub draft: ServiceDraft,
    editing: Option<String>,
    open: bool,
}

impl ServiceForm {
    pub fn open_new(&mut self, category: Option<&str>) {
        self.draft = ServiceDraft { category: category.unwrap_or_default().to_string(), ..ServiceDraft::default() };
        self.editing = None;
        self.open = true;
    }

    pub fn open_edit(&mut self, stored: &Stored<Service>) {
        self.draft = ServiceDraft::from_service(&stored.record);
        self.editing = Some(stored.id.clone());
        self.open = true;
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool { self.open }
    pub fn editing(&self) -> Option<&str> { self.editing.as_deref() }

    /// Attach the URL returned by a successful image upload.
    pub fn set_main_image(&mut self, url: Option<String>) {
        if let Some(url) = url {
            self.draft.main_image = Some(url);
        }
    }

    /// Validate and save. On success the form closes and the record id is returned;
    /// on failure the draft is kept so the user can correct it.
    pub async fn submit(&mut self, client: &ServicesClient, notifier: &dyn Notifier) -> Result<String, ClientError> {
        let service = match self.draft.build() {
            Ok(s) => s,
            Err(e) => {
                notifier.notify(Notice::error(validation_message(&e)));
                return Err(e.into());
            }
        };
        let saved = match self.editing.clone() {
            Some(id) => client.update(&id, &service).await.map(|_| id),
            None => client.create(&service).await,
        };
        match saved {
            Ok(id) => {
                notifier.notify(Notice::success("تم حفظ الخدمة بنجاح"));
                self.close();
                Ok(id)
            }
            Err(e) => {
                notifier.notify(Notice::error(format!("فشل حفظ الخدمة ({})", e.summary())));
                Err(e)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDraft {
    pub name: String,
    pub category: String,
    pub phone: String,
    pub whatsapp: String,
    pub services: Vec<String>,
    pub rating: f64,
    pub available: bool,
    pub specialties: Vec<String>,
    pub destinations: Vec<String>,
}

impl Default for ProviderDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: String::new(),
            phone: String::new(),
            whatsapp: String::new(),
            services: Vec::new(),
            rating: 5.0,
            available: true,
            specialties: Vec::new(),
            destinations: Vec::new(),
        }
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    let cleaned: Vec<String> = values.iter().map(|v| v.trim().to_string()).filter(|v| !v.is_empty()).collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

impl ProviderDraft {
    pub fn from_provider(p: &Provider) -> Self {
        Self {
            name: p.name.clone(),
            category: p.category.clone(),
            phone: p.phone.clone(),
            whatsapp: p.whatsapp.clone(),
            services: p.services.clone(),
            rating: p.rating,
            available: p.available,
            specialties: p.specialties.clone().unwrap_or_default(),
            destinations: p.destinations.clone().unwrap_or_default(),
        }
    }

    pub fn build(&self) -> Result<Provider, ModelError> {
        let phone = self.phone.trim().to_string();
        let whatsapp = match self.whatsapp.trim() {
            "" => phone.clone(),
            w => w.to_string(),
        };
        let provider = Provider {
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            phone,
            whatsapp,
            services: non_empty(&self.services).unwrap_or_default(),
            rating: self.rating,
            available: self.available,
            specialties: non_empty(&self.specialties),
            destinations: non_empty(&self.destinations),
        };
        provider.validate()?;
        Ok(provider)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderForm {
    pub draft: ProviderDraft,
    editing: Option<String>,
    open: bool,
}

impl ProviderForm {
    pub fn open_new(&mut self) {
        self.draft = ProviderDraft::default();
        self.editing = None;
        self.open = true;
    }

    pub fn open_edit(&mut self, stored: &Stored<Provider>) {
        self.draft = ProviderDraft::from_provider(&stored.record);
        self.editing = Some(stored.id.clone());
        self.open = true;
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool { self.open }
    pub fn editing(&self) -> Option<&str> { self.editing.as_deref() }

    pub async fn submit(&mut self, client: &ProvidersClient, notifier: &dyn Notifier) -> Result<String, ClientError> {
        let provider = match self.draft.build() {
            Ok(p) => p,
            Err(e) => {
                notifier.notify(Notice::error(validation_message(&e)));
                return Err(e.into());
            }
        };
        let saved = match self.editing.clone() {
            Some(id) => client.update(&id, &provider).await.map(|_| id),
            None => client.create(&provider).await,
        };
        match saved {
            Ok(id) => {
                notifier.notify(Notice::success("تم حفظ مقدم الخدمة بنجاح"));
                self.close();
                Ok(id)
            }
            Err(e) => {
                notifier.notify(Notice::error(format!("فشل حفظ مقدم الخدمة ({})", e.summary())));
                Err(e)
            }
        }
    }
}

fn validation_message(e: &ModelError) -> String {
    format!("يرجى تعبئة الحقول المطلوبة: {e}")
}
