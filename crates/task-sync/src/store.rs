//! Task Store
//!
//! Client-held cache of the remote task list. Every mutation is applied
//! locally first, then sent; a failed call is reconciled per operation:
//!
//! - toggle / edit: the touched fields are restored from a snapshot
//! - delete: the whole list is refetched
//! - create: nothing was applied, nothing to undo
//!
//! State is published through `tokio::sync::watch`, so views see the
//! optimistic write before the remote call resolves.

use log::{debug, error, warn};
use tokio::sync::watch;

use crate::backend::TaskBackend;
use crate::error::{SyncError, SyncResult};
use crate::models::{EditDraft, NewTask, Task, TaskUpdate};

/// Observable task cache bound to a remote backend
pub struct TaskStore<B> {
    backend: B,
    tasks: watch::Sender<Vec<Task>>,
    editing: watch::Sender<Option<EditDraft>>,
}

impl<B: TaskBackend> TaskStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            tasks: watch::channel(Vec::new()).0,
            editing: watch::channel(None).0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ========================
    // Reads
    // ========================

    /// Snapshot of the cached list in server order
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    /// Snapshot sorted for display, newest (highest id) first
    pub fn newest_first(&self) -> Vec<Task> {
        newest_first(&self.tasks.borrow())
    }

    pub fn get(&self, id: u32) -> Option<Task> {
        self.tasks.borrow().iter().find(|t| t.id == id).cloned()
    }

    /// Receive every change to the task list, optimistic writes included
    pub fn subscribe(&self) -> watch::Receiver<Vec<Task>> {
        self.tasks.subscribe()
    }

    // ========================
    // Edit interaction state
    // ========================

    pub fn editing(&self) -> Option<EditDraft> {
        self.editing.borrow().clone()
    }

    pub fn subscribe_editing(&self) -> watch::Receiver<Option<EditDraft>> {
        self.editing.subscribe()
    }

    /// Open the editor for `task`, replacing any other open draft
    pub fn start_editing(&self, task: &Task) {
        self.editing.send_replace(Some(EditDraft::from(task)));
    }

    /// Record what is typed in the open editor; ignored when `id` is not the open draft
    pub fn update_draft(&self, id: u32, title: &str, description: &str) {
        self.editing.send_if_modified(|draft| match draft {
            Some(d) if d.id == id && (d.title != title || d.description != description) => {
                d.title = title.to_string();
                d.description = description.to_string();
                true
            }
            _ => false,
        });
    }

    pub fn cancel_editing(&self) {
        self.editing.send_if_modified(|draft| draft.take().is_some());
    }

    // ========================
    // Remote operations
    // ========================

    /// Replace the cache with the server's list.
    ///
    /// In-flight optimistic edits are not merged; a refresh landing first can
    /// briefly show the old value until that edit's own response arrives.
    pub async fn refresh(&self) -> SyncResult<()> {
        match self.backend.list_tasks().await {
            Ok(tasks) => {
                debug!("Refreshed {} tasks", tasks.len());
                self.tasks.send_replace(tasks);
                Ok(())
            }
            Err(e) => {
                error!("Failed to fetch tasks: {e}");
                Err(e)
            }
        }
    }

    /// Create a task, then refresh to pick up the server-assigned record.
    ///
    /// A blank title is rejected without a request. An empty description is
    /// sent as absent.
    pub async fn create(&self, title: &str, description: &str) -> SyncResult<Task> {
        let title = title.trim();
        if title.is_empty() {
            debug!("Skipping create: empty title");
            return Err(SyncError::Validation("task title must not be empty".into()));
        }

        let new_task = NewTask {
            title: title.to_string(),
            description: non_empty(description),
        };
        let created = self.backend.create_task(&new_task).await.map_err(|e| {
            error!("Failed to add task: {e}");
            e
        })?;

        if self.refresh().await.is_err() {
            warn!("Task {} created but the list could not be refreshed", created.id);
        }
        Ok(created)
    }

    /// Flip `task` between pending and completed.
    ///
    /// On failure the task's status goes back to exactly what it was before
    /// the toggle; nothing else in the list is touched.
    pub async fn toggle_complete(&self, task: &Task) -> SyncResult<()> {
        let id = task.id;
        let new_status = task.status.toggled();
        let previous = self.get(id).map(|t| t.status);

        self.modify_task(id, |t| t.status = new_status);

        let mut update = TaskUpdate::from(task);
        update.status = Some(new_status);
        match self.backend.update_task(id, &update).await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Failed to update status of task {id}: {e}");
                if let Some(previous) = previous {
                    self.modify_task(id, |t| t.status = previous);
                }
                Err(e)
            }
        }
    }

    /// Change a task's title and description.
    ///
    /// Ends the edit interaction as soon as the local write is applied. On
    /// failure the title and description are restored from the snapshot.
    ///
    /// The description is sent as typed: the server keeps a field that is
    /// absent, so an empty string is what clears it.
    pub async fn edit(&self, id: u32, title: &str, description: &str) -> SyncResult<()> {
        let title = title.trim();
        if title.is_empty() {
            debug!("Skipping edit of task {id}: empty title");
            return Err(SyncError::Validation("task title must not be empty".into()));
        }
        let Some(original) = self.get(id) else {
            debug!("Skipping edit: task {id} is not loaded");
            return Err(SyncError::NotFound(id));
        };

        let snapshot = (original.title.clone(), original.description.clone());
        let mut edited = original;
        edited.title = title.to_string();
        edited.description = Some(description.to_string());

        self.modify_task(id, |t| {
            t.title = edited.title.clone();
            t.description = edited.description.clone();
        });
        self.cancel_editing();

        match self.backend.update_task(id, &TaskUpdate::from(&edited)).await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Failed to save edit of task {id}: {e}");
                let (title, description) = snapshot;
                self.modify_task(id, |t| {
                    t.title = title;
                    t.description = description;
                });
                Err(e)
            }
        }
    }

    /// Remove a task.
    ///
    /// A failed delete is recovered by a full refresh rather than by
    /// re-inserting the removed record, whose last-known shape may be stale.
    pub async fn delete(&self, id: u32) -> SyncResult<()> {
        self.tasks.send_if_modified(|tasks| {
            let before = tasks.len();
            tasks.retain(|t| t.id != id);
            tasks.len() != before
        });
        self.editing.send_if_modified(|draft| {
            if draft.as_ref().is_some_and(|d| d.id == id) {
                *draft = None;
                true
            } else {
                false
            }
        });

        match self.backend.delete_task(id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("Failed to delete task {id}: {e}");
                let _ = self.refresh().await;
                Err(e)
            }
        }
    }

    /// Apply `f` to the cached task with `id`; returns whether it was found
    fn modify_task(&self, id: u32, f: impl FnOnce(&mut Task)) -> bool {
        self.tasks.send_if_modified(|tasks| match tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                f(task);
                true
            }
            None => false,
        })
    }
}

/// Display order: highest id first. The canonical list is left untouched.
pub fn newest_first(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| b.id.cmp(&a.id));
    sorted
}

fn non_empty(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Call, InMemoryBackend, Operation};
    use crate::models::TaskStatus;
    use std::sync::Arc;

    fn failure() -> SyncError {
        SyncError::Server { status: 500, body: "Internal Server Error".into() }
    }

    async fn loaded_store(tasks: Vec<Task>) -> (Arc<TaskStore<InMemoryBackend>>, InMemoryBackend) {
        let backend = InMemoryBackend::with_tasks(tasks);
        let store = Arc::new(TaskStore::new(backend.clone()));
        store.refresh().await.expect("initial refresh");
        (store, backend)
    }

    /// Wait until the backend has seen `n` calls of `op`
    async fn wait_for_calls(backend: &InMemoryBackend, op: Operation, n: usize) {
        while backend.call_count(op) < n {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_refresh_replaces_state() {
        let backend = InMemoryBackend::with_tasks(vec![Task::new(5, "x")]);
        let store = TaskStore::new(backend);

        store.refresh().await.unwrap();
        assert_eq!(store.tasks(), vec![Task::new(5, "x").with_status(TaskStatus::Pending)]);
    }

    #[tokio::test]
    async fn test_refresh_drops_tasks_gone_from_server() {
        let (store, backend) = loaded_store(vec![Task::new(1, "a"), Task::new(2, "b")]).await;
        backend.remove(1);

        store.refresh().await.unwrap();
        assert_eq!(store.tasks(), vec![Task::new(2, "b")]);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_state() {
        let (store, backend) = loaded_store(vec![Task::new(1, "a")]).await;
        backend.insert(Task::new(2, "b"));
        backend.fail(Operation::List, SyncError::Network("connection refused".into()));

        let result = store.refresh().await;
        assert!(matches!(result, Err(SyncError::Network(_))));
        assert_eq!(store.tasks(), vec![Task::new(1, "a")]);
    }

    #[tokio::test]
    async fn test_create_refreshes_from_server() {
        let (store, backend) = loaded_store(vec![Task::new(1, "a")]).await;

        let created = store.create("  Buy milk ", "2 litres").await.unwrap();
        assert_eq!(created.id, 2);
        assert_eq!(store.get(2).unwrap().title, "Buy milk");
        assert_eq!(store.get(2).unwrap().description.as_deref(), Some("2 litres"));
        assert_eq!(
            backend.calls()[1],
            Call::Create(NewTask { title: "Buy milk".into(), description: Some("2 litres".into()) })
        );
        assert_eq!(backend.call_count(Operation::List), 2);
    }

    #[tokio::test]
    async fn test_create_sends_empty_description_as_absent() {
        let (store, backend) = loaded_store(vec![]).await;
        store.create("Call mom", "").await.unwrap();
        assert_eq!(
            backend.calls()[1],
            Call::Create(NewTask { title: "Call mom".into(), description: None })
        );
    }

    #[tokio::test]
    async fn test_create_empty_title_is_skipped() {
        let (store, backend) = loaded_store(vec![Task::new(1, "a")]).await;
        let calls_before = backend.calls();

        let result = store.create("   ", "desc").await;
        assert!(matches!(result, Err(SyncError::Validation(_))));
        assert_eq!(backend.calls(), calls_before);
        assert_eq!(store.tasks(), vec![Task::new(1, "a")]);
    }

    #[tokio::test]
    async fn test_create_failure_leaves_list_alone() {
        let (store, backend) = loaded_store(vec![Task::new(1, "a")]).await;
        backend.fail(Operation::Create, failure());

        assert!(store.create("New", "").await.is_err());
        assert_eq!(store.tasks(), vec![Task::new(1, "a")]);
        assert_eq!(backend.call_count(Operation::List), 1);
    }

    #[tokio::test]
    async fn test_toggle_success_keeps_optimistic_status() {
        let (store, backend) = loaded_store(vec![Task::new(1, "a")]).await;
        let task = store.get(1).unwrap();

        store.toggle_complete(&task).await.unwrap();
        assert_eq!(store.get(1).unwrap().status, TaskStatus::Completed);
        assert_eq!(backend.snapshot()[0].status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_toggle_sends_full_record() {
        let mut task = Task::new(1, "a").with_description("d");
        task.is_recurring = Some(true);
        let (store, backend) = loaded_store(vec![task.clone()]).await;

        store.toggle_complete(&task).await.unwrap();
        let Call::Update(id, update) = backend.calls()[1].clone() else {
            panic!("expected an update call");
        };
        assert_eq!(id, 1);
        assert_eq!(update.title.as_deref(), Some("a"));
        assert_eq!(update.description.as_deref(), Some("d"));
        assert_eq!(update.status, Some(TaskStatus::Completed));
        assert_eq!(update.is_recurring, Some(true));
    }

    #[tokio::test]
    async fn test_toggle_is_optimistic_then_reverts_on_failure() {
        let (store, backend) = loaded_store(vec![Task::new(1, "a")]).await;
        backend.fail(Operation::Update, failure());
        backend.pause();

        let task = store.get(1).unwrap();
        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.toggle_complete(&task).await }
        });
        wait_for_calls(&backend, Operation::Update, 1).await;
        assert_eq!(store.get(1).unwrap().status, TaskStatus::Completed);

        backend.resume();
        assert!(pending.await.unwrap().is_err());
        assert_eq!(store.get(1).unwrap().status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_toggle_failure_leaves_other_tasks_unchanged() {
        let tasks = vec![
            Task::new(1, "a"),
            Task::new(2, "b").with_status(TaskStatus::Completed),
            Task::new(3, "c").with_description("x"),
        ];
        let (store, backend) = loaded_store(tasks.clone()).await;
        backend.fail(Operation::Update, failure());

        let task = store.get(2).unwrap();
        assert!(store.toggle_complete(&task).await.is_err());
        assert_eq!(store.tasks(), tasks);
    }

    #[tokio::test]
    async fn test_toggle_failure_does_not_refetch() {
        let (store, backend) = loaded_store(vec![Task::new(1, "a")]).await;
        backend.fail(Operation::Update, failure());

        let task = store.get(1).unwrap();
        let _ = store.toggle_complete(&task).await;
        assert_eq!(backend.call_count(Operation::List), 1);
    }

    #[tokio::test]
    async fn test_edit_applies_and_ends_editing() {
        let (store, backend) = loaded_store(vec![Task::new(1, "Old").with_description("old")]).await;
        store.start_editing(&store.get(1).unwrap());
        assert_eq!(store.editing().map(|d| d.id), Some(1));

        store.edit(1, "New", "new").await.unwrap();
        assert_eq!(store.get(1).unwrap().title, "New");
        assert_eq!(store.get(1).unwrap().description.as_deref(), Some("new"));
        assert_eq!(store.editing(), None);
        assert_eq!(backend.snapshot()[0].title, "New");
    }

    #[tokio::test]
    async fn test_edit_failure_restores_snapshot() {
        let original = Task::new(1, "Old").with_description("old").with_status(TaskStatus::Completed);
        let (store, backend) = loaded_store(vec![original.clone(), Task::new(2, "b")]).await;
        backend.fail(Operation::Update, failure());
        backend.pause();
        store.start_editing(&original);

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.edit(1, "New", "").await }
        });
        wait_for_calls(&backend, Operation::Update, 1).await;
        assert_eq!(store.get(1).unwrap().title, "New");
        assert_eq!(store.get(1).unwrap().description.as_deref(), Some(""));
        assert_eq!(store.editing(), None);

        backend.resume();
        assert!(pending.await.unwrap().is_err());
        assert_eq!(store.get(1).unwrap(), original);
        assert_eq!(store.get(2).unwrap(), Task::new(2, "b"));
        // Edit mode stays closed after a failed save
        assert_eq!(store.editing(), None);
    }

    #[tokio::test]
    async fn test_edit_clears_description_on_server() {
        let (store, backend) = loaded_store(vec![Task::new(1, "a").with_description("old")]).await;

        store.edit(1, "a", "").await.unwrap();
        match &backend.calls()[1] {
            Call::Update(1, update) => assert_eq!(update.description.as_deref(), Some("")),
            other => panic!("unexpected call: {other:?}"),
        }

        // The next poll must not bring the old text back
        store.refresh().await.unwrap();
        assert_eq!(store.get(1).unwrap().description.as_deref(), Some(""));
        assert_eq!(backend.snapshot()[0].description.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_edit_empty_title_is_skipped() {
        let (store, backend) = loaded_store(vec![Task::new(1, "Keep")]).await;
        store.start_editing(&store.get(1).unwrap());

        let result = store.edit(1, "", "desc").await;
        assert!(matches!(result, Err(SyncError::Validation(_))));
        assert_eq!(backend.call_count(Operation::Update), 0);
        assert_eq!(store.get(1).unwrap(), Task::new(1, "Keep"));
        assert!(store.editing().is_some());
    }

    #[tokio::test]
    async fn test_edit_unknown_id_is_noop() {
        let (store, backend) = loaded_store(vec![Task::new(1, "a")]).await;

        let result = store.edit(42, "Title", "").await;
        assert_eq!(result, Err(SyncError::NotFound(42)));
        assert_eq!(backend.call_count(Operation::Update), 0);
        assert_eq!(store.tasks(), vec![Task::new(1, "a")]);
    }

    #[tokio::test]
    async fn test_delete_is_optimistic() {
        let (store, backend) = loaded_store(vec![Task::new(1, "a"), Task::new(2, "b")]).await;
        backend.pause();

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.delete(1).await }
        });
        wait_for_calls(&backend, Operation::Delete, 1).await;
        assert_eq!(store.tasks(), vec![Task::new(2, "b")]);

        backend.resume();
        pending.await.unwrap().unwrap();
        assert_eq!(backend.snapshot(), vec![Task::new(2, "b")]);
    }

    #[tokio::test]
    async fn test_delete_failure_resyncs_with_server() {
        let (store, backend) = loaded_store(vec![Task::new(1, "a"), Task::new(2, "b")]).await;
        // The server changed meanwhile; the resync must reflect it, not the pre-delete cache
        backend.insert(Task::new(3, "c"));
        backend.insert(Task::new(2, "b renamed"));
        backend.fail(Operation::Delete, failure());

        assert!(store.delete(1).await.is_err());

        let fresh = TaskStore::new(backend.clone());
        fresh.refresh().await.unwrap();
        assert_eq!(store.tasks(), fresh.tasks());
        assert_eq!(store.tasks().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_closes_editor_for_that_task() {
        let (store, _backend) = loaded_store(vec![Task::new(1, "a"), Task::new(2, "b")]).await;

        store.start_editing(&store.get(2).unwrap());
        store.delete(1).await.unwrap();
        assert_eq!(store.editing().map(|d| d.id), Some(2));

        store.delete(2).await.unwrap();
        assert_eq!(store.editing(), None);
    }

    #[tokio::test]
    async fn test_subscribers_see_optimistic_write() {
        let (store, backend) = loaded_store(vec![Task::new(1, "a")]).await;
        let mut rx = store.subscribe();
        rx.borrow_and_update();
        backend.pause();

        let task = store.get(1).unwrap();
        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.toggle_complete(&task).await }
        });
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update()[0].status, TaskStatus::Completed);

        backend.resume();
        pending.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_draft_survives_refresh() {
        let (store, backend) = loaded_store(vec![Task::new(1, "AI is thinking..")]).await;
        store.start_editing(&store.get(1).unwrap());
        store.update_draft(1, "My title", "typed");

        backend.insert(Task::new(1, "Generated title").with_description("generated"));
        store.refresh().await.unwrap();

        let draft = store.editing().unwrap();
        assert_eq!((draft.id, draft.title.as_str(), draft.description.as_str()), (1, "My title", "typed"));
    }

    #[tokio::test]
    async fn test_update_draft_ignores_other_task() {
        let (store, _backend) = loaded_store(vec![Task::new(1, "a"), Task::new(2, "b")]).await;
        store.start_editing(&store.get(1).unwrap());

        store.update_draft(2, "x", "y");
        assert_eq!(store.editing().map(|d| d.title), Some("a".to_string()));

        store.cancel_editing();
        store.update_draft(1, "x", "y");
        assert_eq!(store.editing(), None);
    }

    #[tokio::test]
    async fn test_start_editing_replaces_draft() {
        let (store, _backend) = loaded_store(vec![Task::new(1, "a"), Task::new(2, "b")]).await;

        store.start_editing(&store.get(1).unwrap());
        store.start_editing(&store.get(2).unwrap());
        assert_eq!(store.editing().unwrap().title, "b");

        store.cancel_editing();
        assert_eq!(store.editing(), None);
    }

    #[test]
    fn test_newest_first_does_not_touch_canonical_order() {
        let tasks = vec![Task::new(2, "b"), Task::new(9, "c"), Task::new(1, "a")];
        let ids: Vec<u32> = newest_first(&tasks).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![9, 2, 1]);
        assert_eq!(tasks[0].id, 2);
    }
}
