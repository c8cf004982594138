//! Application Context
//!
//! Shared handles to the sync layer, provided via Leptos Context API.
//! Each action spawns the store operation; failures are already logged and
//! reconciled by the store, so results are dropped here.

use std::sync::Arc;

use leptos::task::spawn_local;
use task_sync::{ChatSession, HttpBackend, Task, TaskStore};

pub type SyncStore = TaskStore<HttpBackend>;
pub type SyncChat = ChatSession<HttpBackend>;

#[derive(Clone)]
pub struct AppContext {
    store: Arc<SyncStore>,
    chat: Arc<SyncChat>,
}

impl AppContext {
    pub fn new(store: Arc<SyncStore>, chat: Arc<SyncChat>) -> Self {
        Self { store, chat }
    }

    pub fn store(&self) -> Arc<SyncStore> {
        self.store.clone()
    }

    pub fn chat(&self) -> Arc<SyncChat> {
        self.chat.clone()
    }

    /// Resync with the server
    pub fn refresh(&self) {
        let store = self.store();
        spawn_local(async move {
            let _ = store.refresh().await;
        });
    }

    pub fn toggle(&self, task: Task) {
        let store = self.store();
        spawn_local(async move {
            let _ = store.toggle_complete(&task).await;
        });
    }

    pub fn edit(&self, id: u32, title: String, description: String) {
        let store = self.store();
        spawn_local(async move {
            let _ = store.edit(id, &title, &description).await;
        });
    }

    pub fn delete(&self, id: u32) {
        let store = self.store();
        spawn_local(async move {
            let _ = store.delete(id).await;
        });
    }

    pub fn start_editing(&self, task: &Task) {
        self.store.start_editing(task);
    }

    pub fn update_draft(&self, id: u32, title: &str, description: &str) {
        self.store.update_draft(id, title, description);
    }

    pub fn cancel_editing(&self) {
        self.store.cancel_editing();
    }

    pub fn send_chat(&self, message: String) {
        let chat = self.chat();
        spawn_local(async move {
            let _ = chat.send(&message).await;
        });
    }
}
