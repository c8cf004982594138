//! New Task Form Component
//!
//! Title + optional description. Inputs clear only after a successful create.

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::AppContext;

#[component]
pub fn NewTaskForm() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let (new_title, set_new_title) = signal(String::new());
    let (new_desc, set_new_desc) = signal(String::new());
    let (creating, set_creating) = signal(false);

    let create_task = move |ev: SubmitEvent| {
        ev.prevent_default();
        let title = new_title.get();
        if title.trim().is_empty() {
            return;
        }
        let description = new_desc.get();
        let store = ctx.store();

        set_creating.set(true);
        spawn_local(async move {
            if store.create(&title, &description).await.is_ok() {
                set_new_title.set(String::new());
                set_new_desc.set(String::new());
            }
            set_creating.set(false);
        });
    };

    view! {
        <form class="new-task-form" on:submit=create_task>
            <input
                type="text"
                class="new-task-title"
                placeholder="What needs to be done?"
                prop:value=move || new_title.get()
                on:input=move |ev| set_new_title.set(event_target_value(&ev))
            />
            <div class="new-task-row">
                <input
                    type="text"
                    class="new-task-desc"
                    placeholder="Description (optional)"
                    prop:value=move || new_desc.get()
                    on:input=move |ev| set_new_desc.set(event_target_value(&ev))
                />
                <button type="submit" disabled=move || creating.get()>"Add"</button>
            </div>
        </form>
    }
}
