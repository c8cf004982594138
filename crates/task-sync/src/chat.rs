//! Assistant Chat
//!
//! Sends user messages to the chat endpoint and keeps the transcript. The
//! assistant may change tasks on the server, so every exchange ends with a
//! refresh of the task store. Replies are shown as-is, never parsed.

use std::sync::Arc;

use log::{debug, error};
use tokio::sync::watch;

use crate::backend::TaskBackend;
use crate::error::{SyncError, SyncResult};
use crate::models::{ChatMessage, ChatRequest};
use crate::store::TaskStore;

/// Shown in place of a reply when the chat call fails
pub const CHAT_FALLBACK_REPLY: &str = "Sorry, I couldn't reach the agent. Please check the backend.";

/// One conversation with the assistant
pub struct ChatSession<B> {
    store: Arc<TaskStore<B>>,
    transcript: watch::Sender<Vec<ChatMessage>>,
    pending: watch::Sender<bool>,
}

impl<B: TaskBackend> ChatSession<B> {
    pub fn new(store: Arc<TaskStore<B>>) -> Self {
        Self {
            store,
            transcript: watch::channel(Vec::new()).0,
            pending: watch::channel(false).0,
        }
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<ChatMessage>> {
        self.transcript.subscribe()
    }

    /// Whether a message is waiting on the assistant
    pub fn is_pending(&self) -> bool {
        *self.pending.borrow()
    }

    pub fn subscribe_pending(&self) -> watch::Receiver<bool> {
        self.pending.subscribe()
    }

    /// Send `message` and record the reply.
    ///
    /// Blank input, or a send while another message is pending, is ignored.
    /// A failed call records [`CHAT_FALLBACK_REPLY`] and returns the error.
    /// Either way the task store is refreshed afterwards.
    pub async fn send(&self, message: &str) -> SyncResult<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(SyncError::Validation("chat message must not be empty".into()));
        }
        let claimed = self.pending.send_if_modified(|pending| !std::mem::replace(pending, true));
        if !claimed {
            debug!("Ignoring chat message while a reply is pending");
            return Err(SyncError::Validation("a chat message is already in flight".into()));
        }

        self.transcript.send_modify(|t| t.push(ChatMessage::user(message)));
        let request = ChatRequest { message: message.to_string() };
        let result = self.store.backend().chat(&request).await;

        let reply = match &result {
            Ok(reply) => reply.response.clone(),
            Err(e) => {
                error!("Chat error: {e}");
                CHAT_FALLBACK_REPLY.to_string()
            }
        };
        self.transcript.send_modify(|t| t.push(ChatMessage::assistant(reply)));
        self.pending.send_replace(false);

        let _ = self.store.refresh().await;
        result.map(|reply| reply.response)
    }
}
