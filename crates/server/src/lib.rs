//! HTTP API over the document store, plus static hosting of the console frontend.

pub mod errors;
pub mod openapi;
pub mod routes;
pub mod startup;

pub use routes::ServerState;
pub use startup::run;
