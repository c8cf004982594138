//! Task List Component
//!
//! Renders the cached tasks newest first.

use leptos::prelude::*;
use task_sync::newest_first;

use crate::components::TaskRow;
use crate::store::{use_view_store, ViewStateStoreFields};

#[component]
pub fn TaskList() -> impl IntoView {
    let view_store = use_view_store();

    let sorted = move || newest_first(&view_store.tasks().read());
    let is_empty = move || view_store.tasks().read().is_empty();

    view! {
        <div class="task-list">
            <For
                each=sorted
                key=|task| {
                    // Every displayed field, so an in-place change re-renders the row
                    (task.id, task.title.clone(), task.description.clone(), task.status)
                }
                children=move |task| view! { <TaskRow task=task /> }
            />

            <Show when=is_empty>
                <p class="empty-hint">"No tasks yet. Add one above!"</p>
            </Show>
        </div>
    }
}
