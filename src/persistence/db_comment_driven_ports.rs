use crate::domain;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};

pub struct DbCommentWriter {}

impl domain::comment::driven_ports::CommentWriter for DbCommentWriter {
    async fn delete_for_task(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let delete_result = sqlx::query("DELETE FROM task_comment WHERE task_id = $1")
            .bind(task_id)
            .execute(cxn.borrow_connection())
            .await
            .context("deleting a task's comments")?;

        Ok(delete_result.rows_affected())
    }
}
