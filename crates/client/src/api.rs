//! REST API client for the Linkshelf server.
//!
//! Wraps every `/api` endpoint using [`reqwest`]. The bearer token, when set,
//! is attached to each request.

use linkshelf_core::types::DbId;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ClientError;
use crate::models::{
    Bookmark, BookmarkInput, BookmarkQuery, Category, CategoryInput, LoginResponse, Me,
    RegisterResponse,
};

/// HTTP client for a single Linkshelf server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Error body produced by the server (`{"error": ..., "code": ...}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    /// Create a client for the server at `base_url`, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    // ---- auth ----

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, ClientError> {
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });
        let request = self.client.post(self.url("/auth/register")).json(&body);
        Self::parse_response(request.send().await?).await
    }

    /// Exchange credentials for a token. Does not store the token; see
    /// [`ApiClient::set_token`].
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let request = self.client.post(self.url("/auth/login")).json(&body);
        Self::parse_response(request.send().await?).await
    }

    pub async fn me(&self) -> Result<Me, ClientError> {
        let response = self.authed(self.client.get(self.url("/auth/me"))).send().await?;
        Self::parse_response(response).await
    }

    // ---- bookmarks ----

    /// List bookmarks, newest first. Empty filter fields are omitted.
    pub async fn list_bookmarks(&self, query: &BookmarkQuery) -> Result<Vec<Bookmark>, ClientError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        let search = query.search.trim();
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }
        if let Some(category_id) = query.category_id {
            params.push(("categoryId", category_id.to_string()));
        }

        let request = self.client.get(self.url("/bookmarks")).query(&params);
        Self::parse_response(self.authed(request).send().await?).await
    }

    pub async fn get_bookmark(&self, id: DbId) -> Result<Bookmark, ClientError> {
        let request = self.client.get(self.url(&format!("/bookmarks/{id}")));
        Self::parse_response(self.authed(request).send().await?).await
    }

    pub async fn create_bookmark(&self, input: &BookmarkInput) -> Result<Bookmark, ClientError> {
        let request = self.client.post(self.url("/bookmarks")).json(input);
        Self::parse_response(self.authed(request).send().await?).await
    }

    pub async fn update_bookmark(
        &self,
        id: DbId,
        input: &BookmarkInput,
    ) -> Result<Bookmark, ClientError> {
        let request = self.client.put(self.url(&format!("/bookmarks/{id}"))).json(input);
        Self::parse_response(self.authed(request).send().await?).await
    }

    pub async fn delete_bookmark(&self, id: DbId) -> Result<(), ClientError> {
        let request = self.client.delete(self.url(&format!("/bookmarks/{id}")));
        Self::check_status(self.authed(request).send().await?).await
    }

    // ---- categories ----

    /// Flat category list; build views locally with `linkshelf_core::category_tree`.
    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        let request = self.client.get(self.url("/categories"));
        Self::parse_response(self.authed(request).send().await?).await
    }

    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ClientError> {
        let request = self.client.post(self.url("/categories")).json(input);
        Self::parse_response(self.authed(request).send().await?).await
    }

    pub async fn update_category(
        &self,
        id: DbId,
        input: &CategoryInput,
    ) -> Result<Category, ClientError> {
        let request = self.client.put(self.url(&format!("/categories/{id}"))).json(input);
        Self::parse_response(self.authed(request).send().await?).await
    }

    /// Delete a category together with its subcategories and their bookmarks.
    pub async fn delete_category(&self, id: DbId) -> Result<(), ClientError> {
        let request = self.client.delete(self.url(&format!("/categories/{id}")));
        Self::check_status(self.authed(request).send().await?).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Return the response unchanged on success, or a [`ClientError::Api`]
    /// carrying the server's error message.
    async fn ensure_success(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: Response) -> Result<(), ClientError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// The server's `error` text, or the status reason when the body has none.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}
