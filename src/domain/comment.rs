/// A note attached to a task. Comments block deletion of their parent task,
/// so removing a task clears its comments first.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(test, derive(Clone))]
pub struct Comment {
    pub id: i32,
    pub task_id: i32,
    pub content: String,
}

pub mod driven_ports {
    use crate::external_connections::ExternalConnectivity;

    pub trait CommentWriter {
        /// Removes every comment attached to the given task, returning the number
        /// of comments removed
        async fn delete_for_task(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;
    }
}
