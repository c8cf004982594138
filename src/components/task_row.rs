//! Task Row Component
//!
//! A single task: view mode with toggle/edit/delete, or the inline editor.

use leptos::ev::MouseEvent;
use leptos::prelude::*;
use task_sync::Task;

use crate::components::DeleteConfirmButton;
use crate::context::AppContext;
use crate::store::{use_view_store, ViewStateStoreFields};

#[component]
pub fn TaskRow(task: Task) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let view_store = use_view_store();

    let id = task.id;
    let completed = task.status.is_completed();
    let title = task.title.clone();
    let description = task.description.clone().filter(|d| !d.is_empty());
    let is_editing = move || view_store.editing().with(|draft| matches!(draft, Some(d) if d.id == id));

    // Editor inputs. A poll can rebuild this row mid-edit, so they are seeded
    // from the open draft, which also tracks what has been typed.
    let (seed_title, seed_desc) = view_store
        .editing()
        .get_untracked()
        .filter(|d| d.id == id)
        .map(|d| (d.title, d.description))
        .unwrap_or_default();
    let (edit_title, set_edit_title) = signal(seed_title);
    let (edit_desc, set_edit_desc) = signal(seed_desc);
    let sync_draft = {
        let ctx = ctx.clone();
        move || ctx.update_draft(id, &edit_title.get_untracked(), &edit_desc.get_untracked())
    };

    let start_editing = {
        let ctx = ctx.clone();
        let task = task.clone();
        move |_: MouseEvent| {
            set_edit_title.set(task.title.clone());
            set_edit_desc.set(task.description.clone().unwrap_or_default());
            ctx.start_editing(&task);
        }
    };
    let save = {
        let ctx = ctx.clone();
        move |_: MouseEvent| ctx.edit(id, edit_title.get(), edit_desc.get())
    };
    let cancel = {
        let ctx = ctx.clone();
        move |_: MouseEvent| ctx.cancel_editing()
    };
    let toggle = {
        let ctx = ctx.clone();
        let task = task.clone();
        move |_: MouseEvent| ctx.toggle(task.clone())
    };
    let on_delete = move |_: ()| ctx.delete(id);

    view! {
        <div class=if completed { "task-row completed" } else { "task-row" }>
            {move || if is_editing() {
                view! {
                    <div class="task-edit">
                        <input
                            type="text"
                            class="edit-title"
                            prop:value=move || edit_title.get()
                            on:input={
                                let sync_draft = sync_draft.clone();
                                move |ev| {
                                    set_edit_title.set(event_target_value(&ev));
                                    sync_draft();
                                }
                            }
                        />
                        <input
                            type="text"
                            class="edit-desc"
                            placeholder="Description"
                            prop:value=move || edit_desc.get()
                            on:input={
                                let sync_draft = sync_draft.clone();
                                move |ev| {
                                    set_edit_desc.set(event_target_value(&ev));
                                    sync_draft();
                                }
                            }
                        />
                        <div class="edit-actions">
                            <button class="save-btn" on:click=save.clone()>"Save"</button>
                            <button class="cancel-btn" on:click=cancel.clone()>"Cancel"</button>
                        </div>
                    </div>
                }.into_any()
            } else {
                view! {
                    <div class="task-view">
                        <button
                            class=if completed { "toggle-btn done" } else { "toggle-btn" }
                            on:click=toggle.clone()
                        >
                            {if completed { "✓" } else { "○" }}
                        </button>
                        <div class="task-text">
                            <h3 class="task-title">{title.clone()}</h3>
                            {description.clone().map(|d| view! { <p class="task-desc">{d}</p> })}
                        </div>
                        <button class="edit-btn" aria-label="Edit task" on:click=start_editing.clone()>"✎"</button>
                        <DeleteConfirmButton button_class="delete-btn" on_confirm=on_delete.clone() />
                    </div>
                }.into_any()
            }}
        </div>
    }
}
