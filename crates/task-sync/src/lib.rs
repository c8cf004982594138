//! Task Sync
//!
//! Client-side synchronization between a cached task list and the remote
//! todo API:
//! - store: optimistic mutations with per-operation rollback
//! - poll: periodic full refresh with a cancelable handle (native targets)
//! - chat: assistant conversation that refreshes tasks after each exchange
//! - backend: the remote seam (HTTP and in-memory implementations)

pub mod backend;
mod chat;
mod config;
mod error;
mod models;
#[cfg(not(target_arch = "wasm32"))]
mod poll;
mod store;

pub use backend::{HttpBackend, InMemoryBackend, TaskBackend};
pub use chat::{ChatSession, CHAT_FALLBACK_REPLY};
pub use config::{
    ApiConfig, API_URL_VAR, DEFAULT_API_URL, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT,
    POLL_INTERVAL_VAR, REQUEST_TIMEOUT_VAR,
};
pub use error::{SyncError, SyncResult};
pub use models::{
    ChatMessage, ChatReply, ChatRequest, ChatRole, EditDraft, NewTask, Task, TaskStatus, TaskUpdate,
};
#[cfg(not(target_arch = "wasm32"))]
pub use poll::PollHandle;
pub use store::{newest_first, TaskStore};
