//! Stub book-catalog service lifecycle
//!
//! Spawns an in-memory implementation of the service contract the suite
//! checks (status codes, error details, token handling) on a random port.
//! Each test gets its own isolated instance.

use super::constants::*;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use book_api_suite::data::{is_strong_password, is_valid_email};
use book_api_suite::models::{Book, BookPayload};
use book_api_suite::{ApiClient, SuiteSettings};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// In-memory state of the stub service
#[derive(Default)]
pub struct StubState {
    /// email -> password
    users: HashMap<String, String>,
    /// token -> email
    tokens: HashMap<String, String>,
    books: BTreeMap<i64, Book>,
    next_book_id: i64,
    /// Last `x-api-key` header seen on any request
    pub last_api_key: Option<String>,
    /// Every DELETE /books/{id} path id, in arrival order
    pub delete_log: Vec<String>,
}

impl StubState {
    pub fn book_ids(&self) -> Vec<i64> {
        self.books.keys().copied().collect()
    }

    pub fn has_user(&self, email: &str) -> bool {
        self.users.contains_key(email)
    }
}

type SharedState = Arc<Mutex<StubState>>;

/// Stub service instance
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Direct access to the stub's state for assertions
    pub state: SharedState,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new stub service on a random port
    ///
    /// # Panics
    ///
    /// Panics if binding fails or the server doesn't become ready in time.
    pub async fn spawn() -> Self {
        let state: SharedState = Arc::new(Mutex::new(StubState {
            next_book_id: 1,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/health", get(health))
            .route("/slow", get(slow))
            .route("/signup", post(signup))
            .route("/login", post(login))
            .route("/books/", get(list_books).post(create_book))
            .route(
                "/books/{id}",
                get(get_book).put(update_book).delete(delete_book),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            state,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    /// Settings pointing the suite at this instance
    pub fn settings(&self) -> SuiteSettings {
        let mut settings = SuiteSettings::for_base_url(self.base_url.clone());
        settings.timeout = Duration::from_secs(REQUEST_TIMEOUT_SECS);
        settings
    }

    /// A suite client bound to this instance
    pub fn client(&self) -> ApiClient {
        ApiClient::from_settings(&self.settings()).expect("Failed to build client")
    }

    /// Inspect the stub's state
    pub fn with_state<T>(&self, f: impl FnOnce(&StubState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }

    /// Waits for the server to become ready by polling /health
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn detail(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn validation_error(kind: &str, loc: Value, msg: &str, input: Value) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "detail": [{ "type": kind, "loc": loc, "msg": msg, "input": input }]
        })),
    )
        .into_response()
}

fn remember_api_key(state: &SharedState, headers: &HeaderMap) {
    if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        state.lock().unwrap().last_api_key = Some(key.to_string());
    }
}

/// Parses a JSON request body the way the real service does
fn parse_body(body: &Bytes) -> Result<Value, Response> {
    if body.is_empty() {
        return Err(validation_error(
            "missing",
            json!(["body"]),
            "Field required",
            Value::Null,
        ));
    }
    serde_json::from_slice(body).map_err(|e| {
        validation_error(
            "json_invalid",
            json!(["body", e.column()]),
            "JSON decode error",
            json!({}),
        )
    })
}

/// Reads `email` and `password` as strings, 422 when either has another type
fn credentials(body: &Value) -> Result<(String, String), Response> {
    let field = |name: &str| match body.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(validation_error(
            "string_type",
            json!(["body", name]),
            "Input should be a valid string",
            other.clone(),
        )),
        None => Err(validation_error(
            "missing",
            json!(["body", name]),
            "Field required",
            body.clone(),
        )),
    };
    Ok((field("email")?, field("password")?))
}

/// Resolves the bearer token to a user, 403 otherwise
fn authenticate(state: &SharedState, headers: &HeaderMap) -> Result<String, Response> {
    let value = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    let token = match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => token.trim(),
        _ => return Err(detail(StatusCode::FORBIDDEN, "Not authenticated")),
    };

    state
        .lock()
        .unwrap()
        .tokens
        .get(token)
        .cloned()
        .ok_or_else(|| detail(StatusCode::FORBIDDEN, "Invalid token or expired token"))
}

/// Parses a book body, 422 for wrong types, blank text or a negative year
fn book_payload(body: &Bytes) -> Result<BookPayload, Response> {
    let value = parse_body(body)?;
    let payload: BookPayload = serde_json::from_value(value.clone()).map_err(|e| {
        validation_error("model_attributes_type", json!(["body"]), &e.to_string(), value)
    })?;

    let mut errors = Vec::new();
    for (field, text) in [
        ("name", &payload.name),
        ("author", &payload.author),
        ("book_summary", &payload.book_summary),
    ] {
        if text.trim().is_empty() {
            errors.push(json!({
                "type": "string_too_short",
                "loc": ["body", field],
                "msg": "String should have at least 1 character",
                "input": text,
            }));
        }
    }
    if payload.published_year < 0 {
        errors.push(json!({
            "type": "greater_than_equal",
            "loc": ["body", "published_year"],
            "msg": "Input should be greater than or equal to 0",
            "input": payload.published_year,
        }));
    }

    if errors.is_empty() {
        Ok(payload)
    } else {
        Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": errors })),
        )
            .into_response())
    }
}

async fn health(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    remember_api_key(&state, &headers);
    Json(json!({ "status": "up" })).into_response()
}

async fn slow() -> Response {
    tokio::time::sleep(Duration::from_millis(SLOW_ROUTE_DELAY_MS)).await;
    Json(json!({ "status": "up" })).into_response()
}

async fn signup(State(state): State<SharedState>, headers: HeaderMap, body: Bytes) -> Response {
    remember_api_key(&state, &headers);
    let value = match parse_body(&body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let (email, password) = match credentials(&value) {
        Ok(creds) => creds,
        Err(response) => return response,
    };

    if !is_valid_email(&email) {
        return detail(StatusCode::BAD_REQUEST, "Invalid email format");
    }
    if !is_strong_password(&password) {
        return detail(
            StatusCode::BAD_REQUEST,
            "Password does not meet complexity requirements",
        );
    }

    let mut state = state.lock().unwrap();
    if state.users.contains_key(&email) {
        return detail(StatusCode::BAD_REQUEST, EMAIL_ALREADY_REGISTERED);
    }
    state.users.insert(email, password);
    Json(json!({ "message": USER_CREATED })).into_response()
}

async fn login(State(state): State<SharedState>, headers: HeaderMap, body: Bytes) -> Response {
    remember_api_key(&state, &headers);
    let value = match parse_body(&body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let (email, password) = match credentials(&value) {
        Ok(creds) => creds,
        Err(response) => return response,
    };

    let mut state = state.lock().unwrap();
    if state.users.get(&email) != Some(&password) || password.is_empty() {
        return detail(StatusCode::BAD_REQUEST, INCORRECT_CREDENTIALS);
    }

    let token = uuid::Uuid::new_v4().to_string();
    state.tokens.insert(token.clone(), email);
    Json(json!({ "access_token": token, "token_type": "bearer" })).into_response()
}

async fn list_books(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Err(response) = authenticate(&state, &headers) {
        return response;
    }
    let state = state.lock().unwrap();
    let books: Vec<&Book> = state.books.values().collect();
    Json(json!(books)).into_response()
}

async fn create_book(State(state): State<SharedState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(response) = authenticate(&state, &headers) {
        return response;
    }
    let payload = match book_payload(&body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    let mut state = state.lock().unwrap();
    let id = state.next_book_id;
    state.next_book_id += 1;
    let book = Book {
        id,
        name: payload.name,
        author: payload.author,
        published_year: payload.published_year,
        book_summary: payload.book_summary,
    };
    state.books.insert(id, book.clone());
    Json(json!(book)).into_response()
}

async fn get_book(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = authenticate(&state, &headers) {
        return response;
    }
    match state.lock().unwrap().books.get(&id) {
        Some(book) => Json(json!(book)).into_response(),
        None => detail(StatusCode::NOT_FOUND, BOOK_NOT_FOUND),
    }
}

async fn update_book(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(response) = authenticate(&state, &headers) {
        return response;
    }
    let payload = match book_payload(&body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    let mut state = state.lock().unwrap();
    match state.books.get_mut(&id) {
        Some(book) => {
            book.name = payload.name;
            book.author = payload.author;
            book.published_year = payload.published_year;
            book.book_summary = payload.book_summary;
            Json(json!(book)).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, BOOK_NOT_FOUND),
    }
}

/// Takes the id as a string so unparsable ids still reach the delete log
async fn delete_book(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.lock().unwrap().delete_log.push(id.clone());
    if let Err(response) = authenticate(&state, &headers) {
        return response;
    }
    let Ok(id) = id.parse::<i64>() else {
        return detail(StatusCode::BAD_REQUEST, "Invalid book id");
    };

    match state.lock().unwrap().books.remove(&id) {
        Some(_) => Json(json!({ "message": BOOK_DELETED })).into_response(),
        None => detail(StatusCode::NOT_FOUND, BOOK_NOT_FOUND),
    }
}
