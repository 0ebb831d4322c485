use crate::domain;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// DTO for creating a new task via the API
#[derive(Deserialize, Display, Validate, ToSchema)]
#[display("{description}")]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTask {
    #[validate(length(min = 1))]
    #[schema(example = "Walk the dog")]
    pub description: String,
}

impl From<NewTask> for domain::task::NewTask {
    fn from(value: NewTask) -> Self {
        domain::task::NewTask {
            description: value.description,
        }
    }
}

/// DTO for partially updating a task via the API. Absent fields keep their
/// stored value.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateTask {
    #[validate(length(min = 1))]
    #[schema(example = "Walk the cat instead")]
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl From<UpdateTask> for domain::task::UpdateTask {
    fn from(value: UpdateTask) -> Self {
        domain::task::UpdateTask {
            description: value.description,
            completed: value.completed,
        }
    }
}

/// DTO for a returned task on the API
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq, Eq))]
pub struct TaskData {
    #[schema(example = 10)]
    pub id: i32,
    #[schema(example = 4)]
    pub user_id: i32,
    #[schema(example = "Something to do")]
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<domain::task::Task> for TaskData {
    fn from(value: domain::task::Task) -> Self {
        TaskData {
            id: value.id,
            user_id: value.owner_user_id,
            description: value.description,
            completed: value.completed,
            created_at: value.created_at,
        }
    }
}

/// DTO wrapping the full set of registered tasks
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct TaskListResponse {
    pub tasks: Vec<TaskData>,
}

/// DTO wrapping a freshly created task
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct CreatedTask {
    pub task: TaskData,
}

/// List metadata accompanying a page of the signed-in user's tasks
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq, Eq))]
pub struct TaskPageMeta {
    #[schema(example = 0)]
    pub page_index: u32,
    #[schema(example = 5)]
    pub per_page: u32,
    #[schema(example = 12)]
    pub total_count: i64,
    #[schema(example = 3)]
    pub completed_total_count: i64,
}

/// DTO for one page of the signed-in user's tasks
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct MyTasksResponse {
    pub tasks: Vec<TaskData>,
    pub meta: TaskPageMeta,
}

impl From<domain::task::TaskPage> for MyTasksResponse {
    fn from(value: domain::task::TaskPage) -> Self {
        MyTasksResponse {
            tasks: value.tasks.into_iter().map(TaskData::from).collect(),
            meta: TaskPageMeta {
                page_index: value.page_index,
                per_page: value.page_size,
                total_count: value.total_count,
                completed_total_count: value.completed_count,
            },
        }
    }
}

/// Raw query parameters for the "my tasks" listing. Values which are absent or
/// fail to parse as positive integers fall back to their defaults rather than
/// rejecting the request.
#[derive(Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskListQuery {
    /// 1-based page to retrieve (default 1)
    pub page: Option<String>,
    /// Maximum number of tasks per page (default 5)
    pub limit: Option<String>,
    /// "completed" lists completed tasks first; anything else lists
    /// outstanding tasks first
    pub sort: Option<String>,
}

impl TaskListQuery {
    pub fn page_request(&self) -> domain::task::PageRequest {
        domain::task::PageRequest {
            page: parse_positive(self.page.as_deref()).unwrap_or(1),
            limit: parse_positive(self.limit.as_deref()).unwrap_or(5),
        }
    }

    pub fn sort_order(&self) -> domain::task::TaskSort {
        match self.sort.as_deref() {
            Some("completed") => domain::task::TaskSort::CompletedFirst,
            _ => domain::task::TaskSort::ToDoFirst,
        }
    }
}

fn parse_positive(raw_value: Option<&str>) -> Option<u32> {
    raw_value
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|parsed| *parsed > 0)
}
