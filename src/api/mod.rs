mod client;
mod types;

use std::future::Future;
use std::path::PathBuf;

pub use client::HttpBackend;
pub use types::*;

use crate::error::ClientError;

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub path: PathBuf,
}

impl FileUpload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File name sent as the multipart part name; this is also the task title.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string())
    }
}

/// The summarization backend's HTTP contract.
///
/// Futures are `Send` so calls can run on the tokio runtime while state
/// stays on the UI thread.
pub trait Backend: Send + Sync + 'static {
    fn list_tasks(&self) -> impl Future<Output = Result<Vec<Task>, ClientError>> + Send;

    fn queue_status(&self) -> impl Future<Output = Result<QueueStatus, ClientError>> + Send;

    fn create_url_task(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<CreatedTask, ClientError>> + Send;

    fn create_file_task(
        &self,
        upload: &FileUpload,
    ) -> impl Future<Output = Result<CreatedTask, ClientError>> + Send;

    fn delete_task(&self, id: TaskId) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn fetch_settings(&self) -> impl Future<Output = Result<Settings, ClientError>> + Send;

    fn update_settings(
        &self,
        settings: &Settings,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn manage_model(
        &self,
        action: ModelAction,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn model_status(&self) -> impl Future<Output = Result<ModelStatus, ClientError>> + Send;
}

/// Result of one poll: the task list plus the queue snapshot taken alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSnapshot {
    pub tasks: Vec<Task>,
    pub queue: Option<QueueStatus>,
}

/// Fetch the task list and the queue status concurrently.
///
/// The task list decides success. A failed queue request only loses the
/// queue snapshot.
pub async fn fetch_snapshot<B: Backend>(backend: &B) -> Result<TaskSnapshot, ClientError> {
    let (tasks, queue) =
        futures_util::future::join(backend.list_tasks(), backend.queue_status()).await;
    let tasks = tasks?;
    let queue = match queue {
        Ok(queue) => Some(queue),
        Err(e) => {
            log::warn!("Queue status unavailable: {e}");
            None
        }
    };
    Ok(TaskSnapshot { tasks, queue })
}
