//! HTTP client for the book-catalog service.
//!
//! Wraps reqwest with the suite's base URL, timeout and default headers, and
//! buffers every response so it can be inspected more than once.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::SuiteSettings;
use crate::endpoints;
use crate::error::{Result, SuiteError};
use crate::models::{BookPayload, UserPayload};

/// Header carrying the API key, when one is configured.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Formats a bearer `Authorization` header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Body of an outgoing request.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    None,
    Json(Value),
    /// Sent verbatim, e.g. to exercise malformed JSON handling.
    Raw(String),
}

/// Per-request body and extra headers.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub body: RequestBody,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    pub fn raw(mut self, body: impl Into<String>) -> Self {
        self.body = RequestBody::Raw(body.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds an `Authorization` header when `value` is set.
    pub fn authorization(self, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.header(AUTHORIZATION.as_str(), value),
            None => self,
        }
    }
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    elapsed: Duration,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            elapsed: Duration::ZERO,
        }
    }

    /// A JSON response with the given status, mostly useful in tests.
    pub fn from_json(status: StatusCode, body: &Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self::new(status, headers, body.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Time from sending the request to the end of the body.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Request-issuing client bound to one base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Create a new ApiClient.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the service (e.g., "http://127.0.0.1:8000")
    /// * `timeout` - Applied to every request
    /// * `api_key` - Sent as `x-api-key` on every request when set
    pub fn new(base_url: impl Into<String>, timeout: Duration, api_key: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(key).map_err(|e| SuiteError::InvalidHeader {
                name: API_KEY_HEADER.to_string(),
                reason: e.to_string(),
            })?;
            headers.insert(API_KEY_HEADER, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_settings(settings: &SuiteSettings) -> Result<Self> {
        Self::new(
            settings.base_url.clone(),
            settings.timeout,
            settings.api_key.as_deref(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.send(Method::GET, path, options).await
    }

    pub async fn post(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.send(Method::POST, path, options).await
    }

    pub async fn put(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.send(Method::PUT, path, options).await
    }

    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.send(Method::DELETE, path, options).await
    }

    async fn send(&self, method: Method, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method.clone(), &url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = match options.body {
            RequestBody::None => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Raw(body) => request.body(body),
        };

        let start = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(&method, path, e))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&method, path, e))?;
        let elapsed = start.elapsed();
        debug!("{} {} -> {} in {:?}", method, path, status, elapsed);

        Ok(ApiResponse {
            status,
            headers,
            body: body.to_vec(),
            elapsed,
        })
    }

    fn transport_error(&self, method: &Method, path: &str, error: reqwest::Error) -> SuiteError {
        if error.is_timeout() {
            SuiteError::TimeoutExceeded {
                method: method.to_string(),
                path: path.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            SuiteError::Http(error)
        }
    }

    // ========================================================================
    // Service Endpoints
    // ========================================================================

    /// GET /health
    pub async fn health(&self) -> Result<ApiResponse> {
        self.get(endpoints::HEALTH, RequestOptions::new()).await
    }

    /// POST /signup
    pub async fn signup(&self, user: &UserPayload) -> Result<ApiResponse> {
        let body = serde_json::to_value(user)?;
        self.post(endpoints::SIGNUP, RequestOptions::new().json(body))
            .await
    }

    /// POST /login
    pub async fn login(&self, email: &str, password: &str) -> Result<ApiResponse> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.post(endpoints::LOGIN, RequestOptions::new().json(body))
            .await
    }

    /// GET /books/
    ///
    /// `authorization` is the raw header value, so malformed tokens can be sent too.
    pub async fn list_books(&self, authorization: Option<&str>) -> Result<ApiResponse> {
        self.get(
            endpoints::BOOKS,
            RequestOptions::new().authorization(authorization),
        )
        .await
    }

    /// POST /books/
    pub async fn create_book(
        &self,
        book: &BookPayload,
        authorization: Option<&str>,
    ) -> Result<ApiResponse> {
        let body = serde_json::to_value(book)?;
        self.post(
            endpoints::BOOKS,
            RequestOptions::new().json(body).authorization(authorization),
        )
        .await
    }

    /// GET /books/{id}
    pub async fn get_book(
        &self,
        id: impl std::fmt::Display,
        authorization: Option<&str>,
    ) -> Result<ApiResponse> {
        self.get(
            &endpoints::book(id),
            RequestOptions::new().authorization(authorization),
        )
        .await
    }

    /// PUT /books/{id}
    pub async fn update_book(
        &self,
        id: impl std::fmt::Display,
        book: &BookPayload,
        authorization: Option<&str>,
    ) -> Result<ApiResponse> {
        let body = serde_json::to_value(book)?;
        self.put(
            &endpoints::book(id),
            RequestOptions::new().json(body).authorization(authorization),
        )
        .await
    }

    /// DELETE /books/{id}
    pub async fn delete_book(
        &self,
        id: impl std::fmt::Display,
        authorization: Option<&str>,
    ) -> Result<ApiResponse> {
        self.delete(
            &endpoints::book(id),
            RequestOptions::new().authorization(authorization),
        )
        .await
    }
}
