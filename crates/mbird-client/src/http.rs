//! HTTP implementation of the backend collaborator

use std::sync::Arc;

use async_trait::async_trait;
use mbird_core::{
    DirectoryListing, ErrorBody, PathResponse, ProjectRequest, ProjectResponse, SaveResponse,
    SaveStatusResponse, TreeNode,
};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::backend::{Backend, SaveReceipt};
use crate::error::{ClientError, Result};

/// Environment variable naming the backend base URL
pub const BACKEND_URL_ENV: &str = "MBIRD_BACKEND_URL";

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// `$MBIRD_BACKEND_URL`, else the default local address.
    pub fn from_env() -> Self {
        let base_url = std::env::var(BACKEND_URL_ENV).unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        debug!("GET {}", path);
        let response = self.client.get(self.url(path)).query(query).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!("POST {}", path);
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Turn a non-2xx response into [`ClientError::BackendRejected`].
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(rejection(status, &body))
}

fn rejection(status: StatusCode, body: &str) -> ClientError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(error) => error.detail,
        Err(_) => body.trim().to_string(),
    };
    ClientError::BackendRejected {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn create_project(&self, path: &str) -> Result<Arc<TreeNode>> {
        let response: ProjectResponse = self
            .post_json("/api/project/create", &ProjectRequest::new(path))
            .await?;
        Ok(response.tree)
    }

    async fn load_project(&self, path: &str) -> Result<Arc<TreeNode>> {
        let response: ProjectResponse = self
            .post_json("/api/project/load", &ProjectRequest::new(path))
            .await?;
        Ok(response.tree)
    }

    async fn push_tree(&self, tree: &TreeNode) -> Result<()> {
        let _: ProjectResponse = self.post_json("/api/tree", tree).await?;
        Ok(())
    }

    async fn save(&self) -> Result<SaveReceipt> {
        debug!("POST /api/save");
        let response = self.client.post(self.url("/api/save")).send().await?;
        let saved: SaveResponse = check(response).await?.json().await?;
        Ok(SaveReceipt {
            timestamp: saved.timestamp,
        })
    }

    async fn save_status(&self) -> Result<Option<String>> {
        let status: SaveStatusResponse = self.get_json("/api/save/status", &[]).await?;
        Ok(status.last_saved)
    }

    async fn default_directory(&self) -> Result<String> {
        let response: PathResponse = self.get_json("/api/filesystem/default", &[]).await?;
        Ok(response.path)
    }

    async fn browse(&self, path: &str) -> Result<DirectoryListing> {
        self.get_json("/api/filesystem/browse", &[("path", path)]).await
    }

    fn name(&self) -> &str {
        "http"
    }
}
