//! Console-side data access.
//!
//! [`ResilientDataClient`] tries the HTTP API first and, on any primary-path
//! failure, performs the same operation directly against the document store.
//! [`upload::ImageUploadClient`] sends images to the CDN. Forms keep their own
//! drafts and report outcomes through a [`notice::Notifier`].

pub mod errors;
pub mod forms;
pub mod notice;
pub mod primary;
pub mod resilient;
pub mod typed;
pub mod upload;

pub use errors::{Action, ClientError, PrimaryFailure};
pub use primary::PrimaryApi;
pub use resilient::ResilientDataClient;
pub use typed::{BookingsClient, CategoriesClient, ProvidersClient, ServicesClient, TypedClient};
