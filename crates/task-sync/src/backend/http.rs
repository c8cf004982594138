//! HTTP Backend
//!
//! `TaskBackend` over the JSON task API.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::TaskBackend;
use crate::config::ApiConfig;
use crate::error::{SyncError, SyncResult};
use crate::models::{ChatReply, ChatRequest, NewTask, Task, TaskUpdate};

/// Client for the remote task API
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpBackend {
    pub fn new(config: ApiConfig) -> SyncResult<Self> {
        config.validate()?;

        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.request_timeout);
        let client = builder
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {e}")))?;

        info!("Task API base URL: {}", config.base_url);
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Send a request and turn transport failures and non-2xx statuses into errors
    async fn execute<B>(&self, method: Method, path: &str, body: Option<&B>) -> SyncResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.config.endpoint(path);
        debug!("Starting request: {} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Request failed: {} {}: {}", method, url, e);
            SyncError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Request failed: {} {} -> {} {}", method, url, status.as_u16(), body);
            return Err(SyncError::Server { status: status.as_u16(), body });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> SyncResult<T> {
        response.json::<T>().await.map_err(SyncError::from)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl TaskBackend for HttpBackend {
    async fn list_tasks(&self) -> SyncResult<Vec<Task>> {
        let response = self.execute::<()>(Method::GET, "/tasks/", None).await?;
        Self::decode(response).await
    }

    async fn create_task(&self, task: &NewTask) -> SyncResult<Task> {
        let response = self.execute(Method::POST, "/tasks/", Some(task)).await?;
        Self::decode(response).await
    }

    async fn update_task(&self, id: u32, update: &TaskUpdate) -> SyncResult<Task> {
        let path = format!("/tasks/{id}");
        let response = self.execute(Method::PUT, &path, Some(update)).await?;
        Self::decode(response).await
    }

    async fn delete_task(&self, id: u32) -> SyncResult<()> {
        let path = format!("/tasks/{id}");
        // Body ({"ok": true} on the reference server) carries nothing we need
        self.execute::<()>(Method::DELETE, &path, None).await?;
        Ok(())
    }

    async fn chat(&self, request: &ChatRequest) -> SyncResult<ChatReply> {
        let response = self.execute(Method::POST, "/chat", Some(request)).await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = HttpBackend::new(ApiConfig::new("localhost:8000"));
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[test]
    fn test_new_with_default_config() {
        let backend = HttpBackend::new(ApiConfig::default()).unwrap();
        assert_eq!(backend.config().base_url, "http://localhost:8000/api");
    }
}
