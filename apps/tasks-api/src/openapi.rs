//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the Tasks API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tasks API",
        version = "0.1.0",
        description = "MongoDB-based REST API for managing tasks",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/tasks", api = domain_tasks::ApiDoc)
    ),
    tags(
        (name = "Tasks", description = "Task management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;
