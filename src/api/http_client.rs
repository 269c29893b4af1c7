use super::client::{ApiError, SnippetApi};
use super::types::{CreatedSnippet, SnippetCreate, SnippetResponse, ViewOutcome, ViewRequest};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// reqwest-backed client for the snippet service
#[derive(Debug, Clone)]
pub struct HttpSnippetClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpSnippetClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        // Ensure the base ends with a slash so relative joins stay below it
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        let base_url = Url::parse(&normalized)
            .map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST <base>/`
    pub fn create_url(&self) -> Url {
        self.base_url.clone()
    }

    /// `POST <base>/<slug>/view_snippet/`
    pub fn view_url(&self, slug: &str) -> Result<Url, ApiError> {
        let invalid = slug.is_empty()
            || slug == "."
            || slug == ".."
            || slug.contains(['/', '\\', '?', '#']);
        if invalid {
            return Err(ApiError::InvalidSlug(slug.to_string()));
        }

        self.base_url
            .join(&format!("{}/view_snippet/", slug))
            .map_err(|_| ApiError::InvalidSlug(slug.to_string()))
    }

    pub async fn create(&self, data: &SnippetCreate) -> Result<CreatedSnippet, ApiError> {
        tracing::debug!(url = %self.create_url(), language = %data.language, "creating snippet");
        self.post_json(self.create_url(), data).await
    }

    /// Fetch the raw view response without interpreting `decrypted`
    pub async fn get_snippet(
        &self,
        slug: &str,
        password: Option<&str>,
    ) -> Result<SnippetResponse, ApiError> {
        let url = self.view_url(slug)?;
        tracing::debug!(%url, with_password = password.is_some(), "requesting snippet");

        let body = ViewRequest {
            password: password.map(str::to_string),
        };
        self.post_json(url, &body).await
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        response.json().await.map_err(ApiError::Decode)
    }
}

#[async_trait]
impl SnippetApi for HttpSnippetClient {
    async fn create_snippet(&self, data: &SnippetCreate) -> Result<CreatedSnippet, ApiError> {
        self.create(data).await
    }

    async fn view_snippet(
        &self,
        slug: &str,
        password: Option<&str>,
    ) -> Result<ViewOutcome, ApiError> {
        let response = self.get_snippet(slug, password).await?;
        let outcome = ViewOutcome::decode(slug, response);
        tracing::debug!(slug, outcome = outcome.kind(), "decoded view response");
        Ok(outcome)
    }
}
