//! Backend client implementation.

use std::time::Duration;

use helix_core::{ChatRequest, ChatResponse, Config, Sequence, SequenceDraft};
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::error::{Error, ErrorResponse, Result};

/// Health check body.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Health {
    pub status: String,
}

/// Helix backend client.
///
/// ```no_run
/// use helix_api::BackendClient;
///
/// # async fn example() -> helix_api::Result<()> {
/// let client = BackendClient::new("http://localhost:8000")?;
/// let sequences = client.list_user_sequences("user_001").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    /// Per-request timeout; `None` waits indefinitely.
    timeout: Option<Duration>,
}

impl BackendClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("{} cannot be used as a base URL", base_url)));
        }
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let http = reqwest::Client::builder()
            .user_agent(format!("helix/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            timeout: None,
        })
    }

    /// Create a client from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(&config.api_url)?.with_timeout(config.request_timeout))
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chat
    // ─────────────────────────────────────────────────────────────────────────

    /// Send a chat turn (multipart: workspace, messages, ids, optional image).
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.url(request.endpoint.path())?;

        let mut form = Form::new()
            .text("workspace", request.workspace.clone())
            .text("messages", serde_json::to_string(&request.messages)?)
            .text("user_id", request.user_id.clone())
            .text("org_id", request.org_id.clone());

        if let Some(image) = &request.image {
            let mime = mime_guess::from_path(&image.file_name).first_or_octet_stream();
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(mime.essence_str())?;
            form = form.part("image", part);
        }

        tracing::debug!(
            "POST {} ({} messages, image: {})",
            url,
            request.messages.len(),
            request.image.is_some()
        );
        let response = self.send(self.http.post(url).multipart(form)).await?;
        self.handle_response(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sequences
    // ─────────────────────────────────────────────────────────────────────────

    /// List sequences owned by a user.
    pub async fn list_user_sequences(&self, user_id: &str) -> Result<Vec<Sequence>> {
        self.get(&["api", "sequences", "user", user_id]).await
    }

    /// List sequences owned by an organization.
    pub async fn list_org_sequences(&self, org_id: &str) -> Result<Vec<Sequence>> {
        self.get(&["api", "sequences", "org", org_id]).await
    }

    /// Fetch one sequence.
    pub async fn get_sequence(&self, id: &str) -> Result<Sequence> {
        self.get(&["api", "sequences", id]).await
    }

    /// Create or update a sequence; returns the stored record.
    pub async fn save_sequence(&self, draft: &SequenceDraft) -> Result<Sequence> {
        let url = self.url_segments(&["api", "sequences"])?;
        tracing::debug!("POST {} (sequence {})", url, draft.id);
        let response = self.send(self.http.post(url).json(draft)).await?;
        self.handle_response(response).await
    }

    /// Check backend health.
    pub async fn health(&self) -> Result<Health> {
        self.get(&["api", "health"]).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL from a slash-separated API path.
    fn url(&self, path: &str) -> Result<Url> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.url_segments(&segments)
    }

    /// Build a URL from path segments, percent-encoding each.
    fn url_segments(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("{} cannot be used as a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.url_segments(segments)?;
        tracing::debug!("GET {}", url);
        let response = self.send(self.http.get(url)).await?;
        self.handle_response(response).await
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let builder = match self.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        Ok(builder.send().await?)
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(err) if status == 404 => Error::NotFound(err.message()),
            Ok(err) => Error::Api {
                status,
                message: err.message(),
            },
            Err(_) => Error::Api {
                status,
                message: format!("HTTP {}", status),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = BackendClient::new("http://localhost:8000/backend").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/backend/");
    }

    #[test]
    fn paths_are_joined_and_encoded() {
        let client = BackendClient::new("http://localhost:8000").unwrap();
        assert_eq!(
            client.url("api/chat/open-search").unwrap().as_str(),
            "http://localhost:8000/api/chat/open-search"
        );
        assert_eq!(
            client
                .url_segments(&["api", "sequences", "user", "jane doe"])
                .unwrap()
                .as_str(),
            "http://localhost:8000/api/sequences/user/jane%20doe"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(BackendClient::new("mailto:someone@example.com").is_err());
        assert!(BackendClient::new("not a url").is_err());
    }
}
