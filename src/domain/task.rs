use crate::domain::comment::driven_ports::CommentWriter;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::driving_ports::TaskError;
use crate::external_connections::{ExternalConnectivity, Transactable, TransactionHandle};
use anyhow::Context;
use chrono::{DateTime, Utc};

/// A to-do item owned by a single user
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(test, derive(Clone))]
pub struct Task {
    pub id: i32,
    pub owner_user_id: i32,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(test, derive(Clone))]
pub struct NewTask {
    pub description: String,
}

/// Partial update of a task. Fields left as [None] keep their stored value.
#[cfg_attr(test, derive(Clone, Debug, PartialEq, Eq))]
pub struct UpdateTask {
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// The two orderings a user's task list can be retrieved in. Within either
/// grouping, more recently created tasks come first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskSort {
    /// Completed tasks first (completed DESC, created_at DESC)
    CompletedFirst,
    /// Outstanding tasks first (completed ASC, created_at DESC)
    ToDoFirst,
}

/// One-based page/limit pair selecting a slice of a user's task list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Number of rows skipped before this page begins. `page` is 1-based, so
    /// page 1 skips nothing. The math runs in u64 because both factors come
    /// from query parameters and their product can exceed u32.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest { page: 1, limit: 5 }
    }
}

/// A retrieved page of a user's tasks plus the aggregates reported alongside it
#[derive(Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    /// Zero-based index of the returned page
    pub page_index: u32,
    pub page_size: u32,
    /// The user's total task count, pre-pagination
    pub total_count: i64,
    /// How many of the user's tasks are completed, pre-pagination
    pub completed_count: i64,
}

pub mod driven_ports {
    use super::*;
    use crate::external_connections::ExternalConnectivity;

    /// A page of task rows together with the total matching row count
    pub struct PagedTasks {
        pub rows: Vec<Task>,
        pub total: i64,
    }

    pub trait TaskReader {
        /// Fetches every registered task, unscoped by owner
        async fn all(&self, ext_cxn: &mut impl ExternalConnectivity)
        -> Result<Vec<Task>, anyhow::Error>;

        async fn by_id(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Task>, anyhow::Error>;

        /// Fetches one page of a user's tasks in the requested order, plus the
        /// user's total task count
        async fn page_of_user_tasks(
            &self,
            user_id: i32,
            sort: TaskSort,
            page: &PageRequest,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<PagedTasks, anyhow::Error>;

        async fn count_completed_for_user(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i64, anyhow::Error>;
    }

    pub trait TaskWriter {
        async fn create_for_user(
            &self,
            user_id: i32,
            new_task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Task, anyhow::Error>;

        /// Applies a partial update, returning the updated row or [None] if no
        /// task has the given ID
        async fn update(
            &self,
            task_id: i32,
            update: &UpdateTask,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Task>, anyhow::Error>;

        /// Deletes a task, returning the number of rows removed
        async fn delete(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum TaskError {
        #[error("the requested task data does not exist")]
        NotFound,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[cfg(test)]
    #[allow(clippy::items_after_test_module)]
    mod task_error_clone {
        use super::TaskError;
        use anyhow::anyhow;

        impl Clone for TaskError {
            fn clone(&self) -> Self {
                match self {
                    Self::NotFound => Self::NotFound,
                    Self::PortError(err) => Self::PortError(anyhow!(format!("{}", err))),
                }
            }
        }
    }

    pub trait TaskPort {
        async fn all_tasks(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<Task>, TaskError>;

        async fn task_by_id(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Task, TaskError>;

        async fn create_task_for_user(
            &self,
            user_id: i32,
            task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;

        async fn update_task(
            &self,
            task_id: i32,
            update: &UpdateTask,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;

        async fn delete_task(
            &self,
            task_id: i32,
            ext_cxn: &mut (impl ExternalConnectivity + Transactable),
            task_write: &impl driven_ports::TaskWriter,
            comment_write: &impl CommentWriter,
        ) -> Result<(), TaskError>;

        async fn tasks_for_user(
            &self,
            user_id: i32,
            page: &PageRequest,
            sort: TaskSort,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<TaskPage, TaskError>;
    }
}

pub struct TaskService {}

impl driving_ports::TaskPort for TaskService {
    async fn all_tasks(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<Vec<Task>, TaskError> {
        let tasks = task_read
            .all(&mut *ext_cxn)
            .await
            .context("fetching every registered task")?;
        if tasks.is_empty() {
            return Err(TaskError::NotFound);
        }

        Ok(tasks)
    }

    async fn task_by_id(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<Task, TaskError> {
        let task = task_read
            .by_id(task_id, &mut *ext_cxn)
            .await
            .context("fetching a task by ID")?;

        task.ok_or(TaskError::NotFound)
    }

    async fn create_task_for_user(
        &self,
        user_id: i32,
        task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<Task, TaskError> {
        let created_task = task_write
            .create_for_user(user_id, task, &mut *ext_cxn)
            .await
            .context("creating a task")?;

        Ok(created_task)
    }

    async fn update_task(
        &self,
        task_id: i32,
        update: &UpdateTask,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<Task, TaskError> {
        let updated_task = task_write
            .update(task_id, update, &mut *ext_cxn)
            .await
            .context("updating a task")?;

        updated_task.ok_or(TaskError::NotFound)
    }

    /// Removes a task along with its comments. Comments reference their parent
    /// task, so both deletes happen inside a single transaction which rolls back
    /// if either step fails.
    async fn delete_task(
        &self,
        task_id: i32,
        ext_cxn: &mut (impl ExternalConnectivity + Transactable),
        task_write: &impl TaskWriter,
        comment_write: &impl CommentWriter,
    ) -> Result<(), TaskError> {
        let mut txn = ext_cxn
            .start_transaction()
            .await
            .context("starting the task delete transaction")?;

        comment_write
            .delete_for_task(task_id, &mut txn)
            .await
            .context("removing a task's comments")?;
        let deleted_tasks = task_write
            .delete(task_id, &mut txn)
            .await
            .context("deleting a task")?;
        if deleted_tasks == 0 {
            return Err(TaskError::NotFound);
        }

        txn.commit()
            .await
            .context("committing the task delete transaction")?;
        Ok(())
    }

    /// Retrieves one page of a user's tasks with list metadata. An empty
    /// retrieved page reports [TaskError::NotFound] whether the user has no
    /// tasks at all or the requested page is past the end of their list.
    async fn tasks_for_user(
        &self,
        user_id: i32,
        page: &PageRequest,
        sort: TaskSort,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<TaskPage, TaskError> {
        let paged_tasks = task_read
            .page_of_user_tasks(user_id, sort, page, &mut *ext_cxn)
            .await
            .context("fetching a page of a user's tasks")?;
        if paged_tasks.rows.is_empty() {
            return Err(TaskError::NotFound);
        }

        let completed_count = task_read
            .count_completed_for_user(user_id, &mut *ext_cxn)
            .await
            .context("counting a user's completed tasks")?;

        Ok(TaskPage {
            tasks: paged_tasks.rows,
            page_index: page.page - 1,
            page_size: page.limit,
            total_count: paged_tasks.total,
            completed_count,
        })
    }
}
