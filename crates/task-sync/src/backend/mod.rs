//! Remote Task Store
//!
//! Defines the abstract interface to the task API.
//! Implementations: HTTP (the real backend) and in-memory (tests, offline demos).

mod http;
mod memory;

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::models::{ChatReply, ChatRequest, NewTask, Task, TaskUpdate};

pub use http::HttpBackend;
pub use memory::{Call, InMemoryBackend, Operation};

/// Remote operations the sync layer depends on
///
/// All operations are async; none of them touches client state.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait TaskBackend: Send + Sync {
    /// Fetch the authoritative task list
    async fn list_tasks(&self) -> SyncResult<Vec<Task>>;

    /// Create a task; the server assigns its id
    async fn create_task(&self, task: &NewTask) -> SyncResult<Task>;

    /// Update an existing task
    async fn update_task(&self, id: u32, update: &TaskUpdate) -> SyncResult<Task>;

    /// Delete task by ID
    async fn delete_task(&self, id: u32) -> SyncResult<()>;

    /// Send a message to the assistant, which may change tasks server-side
    async fn chat(&self, request: &ChatRequest) -> SyncResult<ChatReply>;
}
