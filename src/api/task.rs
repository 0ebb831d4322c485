use crate::api::auth::AuthenticatedUser;
use crate::domain::task::driving_ports::TaskError;
use crate::dto::task::{CreatedTask, MyTasksResponse, TaskData, TaskListQuery, TaskListResponse};
use crate::external_connections::{ExternalConnectivity, Transactable};
use crate::routing_utils::{
    BasicErrorResponse, GenericErrorResponse, Json, NotFoundErrorResponse,
    ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::get;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(
    list_all_tasks,
    get_task,
    create_task,
    update_task,
    delete_task,
    my_tasks
))]
pub struct TaskApi;

/// Builds a router for all the task routes
pub fn task_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/tasks",
            get(|State(app_state): AppState| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();

                list_all_tasks(&mut ext_cxn, &domain::task::TaskService {}).await
            })
            .post(
                |State(app_state): AppState,
                 user: AuthenticatedUser,
                 Json(new_task): Json<dto::task::NewTask>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();

                    create_task(user.0, new_task, &mut ext_cxn, &domain::task::TaskService {})
                        .await
                },
            ),
        )
        .route(
            "/tasks/mine",
            get(
                |State(app_state): AppState,
                 user: AuthenticatedUser,
                 Query(list_params): Query<TaskListQuery>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();

                    my_tasks(user.0, list_params, &mut ext_cxn, &domain::task::TaskService {})
                        .await
                },
            ),
        )
        .route(
            "/tasks/:task_id",
            get(
                |State(app_state): AppState, Path(task_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();

                    get_task(task_id, &mut ext_cxn, &domain::task::TaskService {}).await
                },
            )
            .patch(
                |State(app_state): AppState,
                 Path(task_id): Path<i32>,
                 Json(update): Json<dto::task::UpdateTask>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();

                    update_task(task_id, update, &mut ext_cxn, &domain::task::TaskService {})
                        .await
                },
            )
            .delete(
                |State(app_state): AppState, Path(task_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();

                    delete_task(task_id, &mut ext_cxn, &domain::task::TaskService {}).await
                },
            ),
        )
}

/// Converts a task domain error into an HTTP error response, using
/// [absent_description] as the message for the "not found" case
fn task_error_into_response(err: TaskError, absent_description: &str) -> ErrorResponse {
    match err {
        TaskError::NotFound => NotFoundErrorResponse(absent_description.to_owned()).into(),
        TaskError::PortError(cause) => GenericErrorResponse(cause).into(),
    }
}

/// Retrieves every registered task, unscoped by owner
#[utoipa::path(
    get,
    path = "/tasks",
    tag = "tasks",
    responses(
        (status = 200, description = "The full set of registered tasks", body = TaskListResponse),
        (status = 404, description = "No tasks are registered at all", body = BasicErrorResponse),
        (status = 500, description = "Task data could not be retrieved", body = BasicErrorResponse),
    ),
)]
async fn list_all_tasks(
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl domain::task::driving_ports::TaskPort,
) -> Result<Json<TaskListResponse>, ErrorResponse> {
    info!("Requested all registered tasks");
    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};

    let tasks = task_service
        .all_tasks(&mut *ext_cxn, &task_reader)
        .await
        .map_err(|err| task_error_into_response(err, "No tasks are registered."))?;

    Ok(Json(TaskListResponse {
        tasks: tasks.into_iter().map(TaskData::from).collect(),
    }))
}

/// Retrieves a single task by its ID
#[utoipa::path(
    get,
    path = "/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = i32, Path, description = "ID of the task to fetch")),
    responses(
        (status = 200, description = "The requested task", body = TaskData),
        (status = 404, description = "No task has the given ID", body = BasicErrorResponse),
        (status = 500, description = "Task data could not be retrieved", body = BasicErrorResponse),
    ),
)]
async fn get_task(
    task_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl domain::task::driving_ports::TaskPort,
) -> Result<Json<TaskData>, ErrorResponse> {
    info!("Requested task {task_id}");
    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};

    let task = task_service
        .task_by_id(task_id, &mut *ext_cxn, &task_reader)
        .await
        .map_err(|err| task_error_into_response(err, "The requested task could not be found."))?;

    Ok(Json(task.into()))
}

/// Creates a new task owned by the signed-in user
#[utoipa::path(
    post,
    path = "/tasks",
    tag = "tasks",
    request_body = dto::task::NewTask,
    responses(
        (status = 201, description = "The created task", body = CreatedTask),
        (status = 400, description = "The task description was missing or empty", body = BasicErrorResponse),
        (status = 401, description = "No signed-in user on the request", body = BasicErrorResponse),
        (status = 500, description = "The task could not be saved", body = BasicErrorResponse),
    ),
)]
async fn create_task(
    user_id: i32,
    new_task: dto::task::NewTask,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl domain::task::driving_ports::TaskPort,
) -> Result<(StatusCode, Json<CreatedTask>), ErrorResponse> {
    info!("User {user_id} creating task: {new_task}");
    new_task.validate().map_err(ValidationErrorResponse::from)?;

    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};
    let domain_new_task = domain::task::NewTask::from(new_task);

    // Creation has no missing-entity case, so every service error is unexpected
    let created_task = task_service
        .create_task_for_user(user_id, &domain_new_task, &mut *ext_cxn, &task_writer)
        .await
        .map_err(|err| GenericErrorResponse(err.into()))?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedTask {
            task: created_task.into(),
        }),
    ))
}

/// Partially updates a task's description and/or completion state
#[utoipa::path(
    patch,
    path = "/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = i32, Path, description = "ID of the task to update")),
    request_body = dto::task::UpdateTask,
    responses(
        (status = 200, description = "The task after the update", body = TaskData),
        (status = 400, description = "The submitted update was invalid", body = BasicErrorResponse),
        (status = 404, description = "No task has the given ID", body = BasicErrorResponse),
        (status = 500, description = "The task could not be updated", body = BasicErrorResponse),
    ),
)]
async fn update_task(
    task_id: i32,
    task_data: dto::task::UpdateTask,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl domain::task::driving_ports::TaskPort,
) -> Result<Json<TaskData>, ErrorResponse> {
    info!("Updating task {task_id}");
    task_data
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};
    let domain_update = domain::task::UpdateTask::from(task_data);

    let updated_task = task_service
        .update_task(task_id, &domain_update, &mut *ext_cxn, &task_writer)
        .await
        .map_err(|err| task_error_into_response(err, "The requested task could not be found."))?;

    Ok(Json(updated_task.into()))
}

/// Deletes a task along with the comments attached to it
#[utoipa::path(
    delete,
    path = "/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = i32, Path, description = "ID of the task to delete")),
    responses(
        (status = 204, description = "The task and its comments were removed"),
        (status = 404, description = "No task has the given ID", body = BasicErrorResponse),
        (status = 500, description = "The task could not be deleted", body = BasicErrorResponse),
    ),
)]
async fn delete_task(
    task_id: i32,
    ext_cxn: &mut (impl ExternalConnectivity + Transactable),
    task_service: &impl domain::task::driving_ports::TaskPort,
) -> Result<StatusCode, ErrorResponse> {
    info!("Deleting task {task_id}");
    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};
    let comment_writer = persistence::db_comment_driven_ports::DbCommentWriter {};

    task_service
        .delete_task(task_id, &mut *ext_cxn, &task_writer, &comment_writer)
        .await
        .map_err(|err| task_error_into_response(err, "The requested task could not be found."))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Retrieves one page of the signed-in user's tasks plus list metadata
#[utoipa::path(
    get,
    path = "/tasks/mine",
    tag = "tasks",
    params(TaskListQuery),
    responses(
        (status = 200, description = "The requested page of the user's tasks", body = MyTasksResponse),
        (status = 401, description = "No signed-in user on the request", body = BasicErrorResponse),
        (status = 404, description = "The retrieved page contained no tasks", body = BasicErrorResponse),
        (status = 500, description = "Task data could not be retrieved", body = BasicErrorResponse),
    ),
)]
async fn my_tasks(
    user_id: i32,
    list_params: TaskListQuery,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl domain::task::driving_ports::TaskPort,
) -> Result<Json<MyTasksResponse>, ErrorResponse> {
    info!("Requested tasks of user {user_id}");
    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};
    let page_request = list_params.page_request();
    let sort_order = list_params.sort_order();

    let task_page = task_service
        .tasks_for_user(user_id, &page_request, sort_order, &mut *ext_cxn, &task_reader)
        .await
        .map_err(|err| task_error_into_response(err, "No tasks are registered."))?;

    Ok(Json(task_page.into()))
}
