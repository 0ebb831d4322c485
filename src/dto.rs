use utoipa::OpenApi;

pub mod task;

/// Aggregates OpenAPI schemas for the DTOs and error envelope used across the API
#[derive(OpenApi)]
#[openapi(components(
    schemas(
        task::NewTask,
        task::UpdateTask,
        task::TaskData,
        task::TaskListResponse,
        task::CreatedTask,
        task::TaskPageMeta,
        task::MyTasksResponse,
        crate::routing_utils::BasicErrorResponse,
        crate::routing_utils::ExtraInfo,
        crate::routing_utils::ValidationErrorSchema,
    ),
    responses(crate::routing_utils::BasicErrorResponse)
))]
pub struct OpenApiSchemas;
