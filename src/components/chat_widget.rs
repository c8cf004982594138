//! Chat Widget Component
//!
//! Floating assistant chat. Sending goes through `ChatSession`, which
//! refreshes the task list after every exchange.

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use task_sync::{ChatMessage, ChatRole};

use crate::context::AppContext;
use crate::store::{use_view_store, ViewStateStoreFields};

#[component]
pub fn ChatWidget() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let view_store = use_view_store();

    let (open, set_open) = signal(false);
    let (input, set_input) = signal(String::new());

    let pending = move || view_store.chat_pending().get();
    let send = move |ev: SubmitEvent| {
        ev.prevent_default();
        let message = input.get();
        if message.trim().is_empty() || pending() {
            return;
        }
        set_input.set(String::new());
        ctx.send_chat(message);
    };

    view! {
        <button class="chat-toggle" on:click=move |_| set_open.update(|o| *o = !*o)>
            {move || if open.get() { "×" } else { "Chat" }}
        </button>

        <div class="chat-window" class:hidden=move || !open.get()>
            <div class="chat-header">"AI Assistant"</div>

            <div class="chat-messages">
                <Show when=move || view_store.chat_messages().read().is_empty()>
                    <div class="chat-hint">"Hi! Ask me to add or manage your tasks."</div>
                </Show>
                <For
                    each=move || view_store.chat_messages().get().into_iter().enumerate()
                    key=|(idx, _)| *idx
                    children=move |(_, message): (usize, ChatMessage)| {
                        let class = match message.role {
                            ChatRole::User => "chat-msg user",
                            ChatRole::Assistant => "chat-msg assistant",
                        };
                        view! { <div class=class>{message.content}</div> }
                    }
                />
                <Show when=pending>
                    <div class="chat-thinking">"Thinking..."</div>
                </Show>
            </div>

            <form class="chat-input" on:submit=send>
                <input
                    type="text"
                    placeholder="Type a message..."
                    prop:value=move || input.get()
                    on:input=move |ev| set_input.set(event_target_value(&ev))
                />
                <button type="submit" disabled=move || pending() || input.get().trim().is_empty()>
                    "Send"
                </button>
            </form>
        </div>
    }
}
