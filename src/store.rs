//! View State Store
//!
//! Reactive mirror of the sync layer's observable state.
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;
use task_sync::{ChatMessage, EditDraft, Task};
use tokio::sync::watch;

/// Everything the page renders
#[derive(Clone, Debug, Default, Store)]
pub struct ViewState {
    /// Cached tasks in server order
    pub tasks: Vec<Task>,
    /// Task currently open in the editor
    pub editing: Option<EditDraft>,
    /// Chat transcript
    pub chat_messages: Vec<ChatMessage>,
    /// Waiting on the assistant
    pub chat_pending: bool,
}

/// Type alias for the store
pub type ViewStore = Store<ViewState>;

/// Get the view store from context
pub fn use_view_store() -> ViewStore {
    expect_context::<ViewStore>()
}

/// Apply the current value of `rx`, then every later change, until the sender goes away
pub fn mirror<T, F>(mut rx: watch::Receiver<T>, apply: F)
where
    T: Clone + 'static,
    F: Fn(T) + 'static,
{
    spawn_local(async move {
        let initial = rx.borrow_and_update().clone();
        apply(initial);
        while rx.changed().await.is_ok() {
            let value = rx.borrow_and_update().clone();
            apply(value);
        }
    });
}
