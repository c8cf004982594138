//! In-Memory Backend
//!
//! A local stand-in for the task API. Records every call and can be told to
//! fail or to hold calls open, which is how the rollback paths are exercised.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::TaskBackend;
use crate::error::{SyncError, SyncResult};
use crate::models::{ChatReply, ChatRequest, NewTask, Task, TaskUpdate};

/// Remote operation kinds, used for failure injection and call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
    Chat,
}

/// A recorded remote call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(NewTask),
    Update(u32, TaskUpdate),
    Delete(u32),
    Chat(String),
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Call::List => Operation::List,
            Call::Create(_) => Operation::Create,
            Call::Update(..) => Operation::Update,
            Call::Delete(_) => Operation::Delete,
            Call::Chat(_) => Operation::Chat,
        }
    }
}

#[derive(Default)]
struct State {
    tasks: Vec<Task>,
    last_id: u32,
    calls: Vec<Call>,
    failures: HashMap<Operation, SyncError>,
    chat_reply: Option<String>,
    paused: bool,
}

/// Task store held in process memory
///
/// Clones share the same state.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<State>>,
    resumed: Arc<Notify>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with `tasks`; new ids continue after the largest one
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let backend = Self::new();
        {
            let mut state = backend.lock();
            state.last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
            state.tasks = tasks;
        }
        backend
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not wedge every other caller
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ========================
    // Server-side state
    // ========================

    /// Current server-side task list
    pub fn snapshot(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    /// Insert or replace a task directly, bypassing the call log
    pub fn insert(&self, task: Task) {
        let mut state = self.lock();
        state.last_id = state.last_id.max(task.id);
        match state.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => state.tasks.push(task),
        }
    }

    /// Remove a task directly, bypassing the call log
    pub fn remove(&self, id: u32) {
        self.lock().tasks.retain(|t| t.id != id);
    }

    /// Text the chat endpoint answers with (defaults to an acknowledgement)
    pub fn set_chat_reply(&self, reply: impl Into<String>) {
        self.lock().chat_reply = Some(reply.into());
    }

    // ========================
    // Failure injection
    // ========================

    /// Make every later `op` call fail with `error` until `recover(op)`
    pub fn fail(&self, op: Operation, error: SyncError) {
        self.lock().failures.insert(op, error);
    }

    pub fn recover(&self, op: Operation) {
        self.lock().failures.remove(&op);
    }

    /// Hold every later call open until `resume()`
    pub fn pause(&self) {
        self.lock().paused = true;
    }

    pub fn resume(&self) {
        self.lock().paused = false;
        self.resumed.notify_waiters();
    }

    // ========================
    // Call log
    // ========================

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, op: Operation) -> usize {
        self.lock().calls.iter().filter(|c| c.operation() == op).count()
    }

    /// Record the call, wait out a pause, then apply any injected failure
    async fn begin(&self, call: Call) -> SyncResult<()> {
        let op = call.operation();
        self.lock().calls.push(call);
        loop {
            let resumed = self.resumed.notified();
            if !self.lock().paused {
                break;
            }
            resumed.await;
        }
        match self.lock().failures.get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn not_found(id: u32) -> SyncError {
    SyncError::Server { status: 404, body: format!("Task {id} not found") }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl TaskBackend for InMemoryBackend {
    async fn list_tasks(&self) -> SyncResult<Vec<Task>> {
        self.begin(Call::List).await?;
        Ok(self.snapshot())
    }

    async fn create_task(&self, task: &NewTask) -> SyncResult<Task> {
        self.begin(Call::Create(task.clone())).await?;
        let mut state = self.lock();
        state.last_id += 1;
        let created = Task {
            description: task.description.clone(),
            ..Task::new(state.last_id, task.title.clone())
        };
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, id: u32, update: &TaskUpdate) -> SyncResult<Task> {
        self.begin(Call::Update(id, update.clone())).await?;
        let mut state = self.lock();
        let task = state.tasks.iter_mut().find(|t| t.id == id).ok_or_else(|| not_found(id))?;
        // Absent fields keep their stored value
        if let Some(title) = &update.title {
            task.title = title.clone();
        }
        if update.description.is_some() {
            task.description = update.description.clone();
        }
        task.status = update.status.unwrap_or(task.status);
        Ok(task.clone())
    }

    async fn delete_task(&self, id: u32) -> SyncResult<()> {
        self.begin(Call::Delete(id)).await?;
        let mut state = self.lock();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        if state.tasks.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn chat(&self, request: &ChatRequest) -> SyncResult<ChatReply> {
        self.begin(Call::Chat(request.message.clone())).await?;
        let response = self.lock().chat_reply.clone().unwrap_or_else(|| "OK".to_string());
        Ok(ChatReply { response })
    }
}
