//! Todo Sync Frontend App
//!
//! Main application component: task list, new-task form and assistant chat.

use std::sync::Arc;

use leptos::prelude::*;
use reactive_stores::Store;
use task_sync::{ApiConfig, ChatSession, HttpBackend, TaskStore};

use crate::components::{ChatWidget, NewTaskForm, TaskList};
use crate::context::AppContext;
use crate::poll;
use crate::store::{mirror, ViewState, ViewStateStoreFields};

#[component]
pub fn App() -> impl IntoView {
    let config = ApiConfig::from_build_env().unwrap_or_else(|e| {
        log::error!("Invalid API configuration, using defaults: {e}");
        ApiConfig::default()
    });
    let backend = match HttpBackend::new(config.clone()) {
        Ok(backend) => backend,
        Err(e) => {
            log::error!("Failed to create HTTP client: {e}");
            return view! {
                <main class="app-layout">
                    <h1>"Todo"</h1>
                    <p class="app-error">{format!("Could not start: {e}")}</p>
                </main>
            }
            .into_any();
        }
    };

    // Sync layer
    let store = Arc::new(TaskStore::new(backend));
    let chat = Arc::new(ChatSession::new(store.clone()));

    // View state, mirrored from the sync layer
    let view_store = Store::new(ViewState::default());
    mirror(store.subscribe(), move |tasks| *view_store.tasks().write() = tasks);
    mirror(store.subscribe_editing(), move |draft| *view_store.editing().write() = draft);
    mirror(chat.subscribe(), move |messages| *view_store.chat_messages().write() = messages);
    mirror(chat.subscribe_pending(), move |pending| *view_store.chat_pending().write() = pending);

    let ctx = AppContext::new(store.clone(), chat);
    provide_context(view_store);
    provide_context(ctx.clone());

    // Initial load, then poll until the page is torn down
    ctx.refresh();
    let timer = poll::start(store, config.poll_interval);
    on_cleanup(move || timer.stop());

    view! {
        <main class="app-layout">
            <h1>"Todo"</h1>

            <NewTaskForm />

            <TaskList />

            <p class="task-count">{move || format!("{} tasks", view_store.tasks().read().len())}</p>
        </main>

        <ChatWidget />
    }
    .into_any()
}
