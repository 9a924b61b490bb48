use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// Example record body; every resource accepts a free-form JSON object.
#[derive(ToSchema)]
pub struct ProviderDoc {
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub phone: String,
    pub whatsapp: String,
    pub services: Vec<String>,
    pub rating: f64,
    pub available: bool,
}

#[derive(ToSchema)]
pub struct CreatedDoc { pub id: String, pub success: bool }

#[derive(ToSchema)]
pub struct AckDoc { pub success: bool }

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String, pub details: Option<String> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::resources::list,
        crate::routes::resources::create,
        crate::routes::resources::update,
        crate::routes::resources::delete,
    ),
    components(schemas(HealthResponse, ProviderDoc, CreatedDoc, AckDoc, ErrorDoc)),
    tags(
        (name = "health"),
        (name = "resources")
    )
)]
pub struct ApiDoc;
