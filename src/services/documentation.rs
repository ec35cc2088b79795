use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for ping-board.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::status::current_status,
        crate::routes::status::refresh_status,
        crate::routes::targets::list_targets,
        crate::routes::targets::add_target,
        crate::routes::targets::remove_target,
        crate::routes::targets::select_target,
    ),
    components(
        schemas(
            crate::dao::models::Target,
            crate::dto::health::HealthResponse,
            crate::dto::status::StatusResponse,
            crate::dto::targets::AddTargetRequest,
            crate::dto::targets::TargetListResponse,
            crate::dto::targets::TargetActionResponse,
            crate::provider::models::StatusSnapshot,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "status", description = "Current status of the active target"),
        (name = "targets", description = "Tracked target management"),
    )
)]
pub struct ApiDoc;
