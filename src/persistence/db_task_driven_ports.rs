use crate::domain;
use crate::domain::task::driven_ports::PagedTasks;
use crate::domain::task::{NewTask, PageRequest, Task, TaskSort, UpdateTask};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub struct DbTaskReader {}

pub struct DbTaskWriter {}

const TASK_COLUMNS: &str = "t.id, t.user_id, t.description, t.completed, t.created_at";

#[derive(FromRow)]
struct TaskRow {
    id: i32,
    user_id: i32,
    description: String,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(value: TaskRow) -> Self {
        Task {
            id: value.id,
            owner_user_id: value.user_id,
            description: value.description,
            completed: value.completed,
            created_at: value.created_at,
        }
    }
}

impl domain::task::driven_ports::TaskReader for DbTaskReader {
    async fn all(&self, ext_cxn: &mut impl ExternalConnectivity) -> Result<Vec<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let tasks: Vec<Task> = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM task t ORDER BY t.id"
        ))
        .fetch_all(cxn.borrow_connection())
        .await
        .context("trying to fetch every task")?
        .into_iter()
        .map(Task::from)
        .collect();

        Ok(tasks)
    }

    async fn by_id(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let task: Option<Task> = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM task t WHERE t.id = $1"
        ))
        .bind(task_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to fetch a task by ID")?
        .map(Task::from);

        Ok(task)
    }

    async fn page_of_user_tasks(
        &self,
        user_id: i32,
        sort: TaskSort,
        page: &PageRequest,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<PagedTasks, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        // The ordering rule is a closed two-way choice, so both variants stay
        // as fixed SQL fragments rather than a general sort-field selector.
        let order_clause = match sort {
            TaskSort::CompletedFirst => "t.completed DESC, t.created_at DESC",
            TaskSort::ToDoFirst => "t.completed ASC, t.created_at DESC",
        };
        // An offset past i64::MAX is past any real table anyway
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let rows: Vec<TaskRow> = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM task t \
             WHERE t.user_id = $1 \
             ORDER BY {order_clause} \
             LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(page.limit as i64)
        .bind(offset)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("trying to fetch a page of a user's tasks")?;

        let total: i64 = sqlx::query_scalar("SELECT count(*) FROM task t WHERE t.user_id = $1")
            .bind(user_id)
            .fetch_one(cxn.borrow_connection())
            .await
            .context("counting a user's tasks")?;

        Ok(PagedTasks {
            rows: rows.into_iter().map(Task::from).collect(),
            total,
        })
    }

    async fn count_completed_for_user(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i64, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let completed_count: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM task t WHERE t.user_id = $1 AND t.completed = TRUE",
        )
        .bind(user_id)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("counting a user's completed tasks")?;

        Ok(completed_count)
    }
}

impl domain::task::driven_ports::TaskWriter for DbTaskWriter {
    async fn create_for_user(
        &self,
        user_id: i32,
        new_task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Task, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let created_row: TaskRow = sqlx::query_as(
            "INSERT INTO task (user_id, description) VALUES ($1, $2) \
             RETURNING id, user_id, description, completed, created_at",
        )
        .bind(user_id)
        .bind(&new_task.description)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("inserting a new task")?;

        Ok(created_row.into())
    }

    async fn update(
        &self,
        task_id: i32,
        update: &UpdateTask,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        // COALESCE leaves a column untouched when its update field is absent
        let updated_row: Option<TaskRow> = sqlx::query_as(
            "UPDATE task SET \
               description = COALESCE($2, description), \
               completed = COALESCE($3, completed) \
             WHERE id = $1 \
             RETURNING id, user_id, description, completed, created_at",
        )
        .bind(task_id)
        .bind(update.description.clone())
        .bind(update.completed)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("updating a task")?;

        Ok(updated_row.map(Task::from))
    }

    async fn delete(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let delete_result = sqlx::query("DELETE FROM task WHERE id = $1")
            .bind(task_id)
            .execute(cxn.borrow_connection())
            .await
            .context("deleting a task")?;

        Ok(delete_result.rows_affected())
    }
}
