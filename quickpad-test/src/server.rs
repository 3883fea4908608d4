//! Exposes an in-process stand-in for the Quickpad API, for use in integration tests.
//!
//! ```
//! use quickpad_test::server::TestServer;
//!
//! #[tokio::main]
//! async fn main() {
//!    let server = TestServer::new().await;
//!    let url = server.url("/api/health");
//!    // point the load test at `server.base_url()`, then inspect `server.journal()`...
//! }
//! ```

use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde::Deserialize;
use serde_json::json;

/// How the server points at a newly created note.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoteLocation {
    /// Respond with `{"id": "<id>"}`.
    #[default]
    Id,
    /// Respond with `{"url": "/<id>"}`.
    Url,
}

/// Replaces the response status of every request matching method and path.
///
/// The regular handler still runs, so state changes such as account creation take effect even
/// though the client sees the forced status.
#[derive(Clone, Debug)]
pub struct Override {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
}

impl Override {
    pub fn new(method: Method, path: impl Into<String>, status: StatusCode) -> Self {
        Self {
            method,
            path: path.into(),
            status,
        }
    }
}

/// Behavior of the [`TestServer`].
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub note_location: NoteLocation,
    pub overrides: Vec<Override>,
}

/// One request as observed by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exchange {
    pub method: Method,
    pub path: String,
    /// Value of the `Authorization` header, if any.
    pub authorization: Option<String>,
    pub status: StatusCode,
    /// Id of the note created by this request.
    pub created: Option<String>,
    /// Token handed out by this request.
    pub token: Option<String>,
}

impl Exchange {
    /// Returns `true` if the request was sent with this method to this path.
    pub fn is(&self, method: Method, path: &str) -> bool {
        self.method == method && self.path == path
    }
}

/// Response extension carrying the id of a created note to the journal.
#[derive(Clone, Debug)]
struct CreatedId(String);

/// Response extension carrying an issued token to the journal.
#[derive(Clone, Debug)]
struct IssuedToken(String);

#[derive(Debug)]
struct Account {
    username: String,
    password: String,
}

#[derive(Debug)]
struct Note {
    content: String,
    owner: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
    notes: HashMap<String, Note>,
    journal: Vec<Exchange>,
}

#[derive(Debug)]
struct MockState {
    options: Options,
    inner: Mutex<Inner>,
}

impl MockState {
    fn forced_status(&self, method: &Method, path: &str) -> Option<StatusCode> {
        self.options
            .overrides
            .iter()
            .find(|o| &o.method == method && o.path == path)
            .map(|o| o.status)
    }

    fn issue_token(inner: &mut Inner, email: &str) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        inner.tokens.insert(token.clone(), email.to_owned());
        token
    }

    fn owner(&self, headers: &HeaderMap) -> Option<String> {
        let token = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        self.inner.lock().unwrap().tokens.get(token).cloned()
    }
}

type ServerState = Arc<MockState>;

/// An in-process test server for use in integration tests.
///
/// Users and notes are kept in memory. The server listens on a random available port on
/// localhost and records every request in a journal.
#[derive(Debug)]
pub struct TestServer {
    handle: tokio::task::JoinHandle<()>,
    socket: SocketAddr,
    state: ServerState,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_options(Options::default()).await
    }

    pub async fn with_options(options: Options) -> Self {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = TcpListener::bind(addr).unwrap();
        listener.set_nonblocking(true).unwrap();
        let socket = listener.local_addr().unwrap();

        let state = Arc::new(MockState {
            options,
            inner: Mutex::default(),
        });
        let app = router(Arc::clone(&state));

        let handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            handle,
            socket,
            state,
        }
    }

    /// Returns the base URL of the server, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.socket)
    }

    /// Returns a full URL pointing to the given path.
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url(), path)
    }

    /// All requests received so far, in order of completion.
    pub fn journal(&self) -> Vec<Exchange> {
        self.state.inner.lock().unwrap().journal.clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/health", routing::get(health))
        .route("/api/auth/signup", routing::post(signup))
        .route("/api/auth/login", routing::post(login))
        .route("/api/notes", routing::post(create_note))
        .route("/api/notes/{id}", routing::get(read_note).put(update_note))
        .layer(middleware::from_fn_with_state(Arc::clone(&state), journal))
        .with_state(state)
}

async fn journal(State(state): State<ServerState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let mut response = next.run(request).await;
    let mut created = response.extensions().get::<CreatedId>().map(|c| c.0.clone());
    let mut token = response
        .extensions()
        .get::<IssuedToken>()
        .map(|t| t.0.clone());

    if let Some(status) = state.forced_status(&method, &path) {
        tracing::debug!(%method, %path, %status, "forcing response status");
        response = (status, Json(json!({ "error": "forced by test" }))).into_response();
        created = None;
        token = None;
    }

    state.inner.lock().unwrap().journal.push(Exchange {
        method,
        path,
        authorization,
        status: response.status(),
        created,
        token,
    });

    response
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": "quickpad-backend" }))
}

#[derive(Debug, Deserialize)]
struct SignupBody {
    username: String,
    email: String,
    password: String,
}

async fn signup(State(state): State<ServerState>, Json(body): Json<SignupBody>) -> Response {
    let mut inner = state.inner.lock().unwrap();
    let taken = inner.accounts.contains_key(&body.email)
        || inner.accounts.values().any(|a| a.username == body.username);
    if taken {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "User already exists" })),
        )
            .into_response();
    }

    inner.accounts.insert(
        body.email.clone(),
        Account {
            username: body.username.clone(),
            password: body.password,
        },
    );
    let token = MockState::issue_token(&mut inner, &body.email);

    let mut response = (
        StatusCode::CREATED,
        Json(json!({
            "token": token,
            "user": { "username": body.username, "email": body.email },
        })),
    )
        .into_response();
    response.extensions_mut().insert(IssuedToken(token));
    response
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): State<ServerState>, Json(body): Json<LoginBody>) -> Response {
    let mut inner = state.inner.lock().unwrap();
    let valid = inner
        .accounts
        .get(&body.email)
        .is_some_and(|account| account.password == body.password);
    if !valid {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid credentials" })),
        )
            .into_response();
    }

    let token = MockState::issue_token(&mut inner, &body.email);
    let mut response = Json(json!({ "token": token })).into_response();
    response.extensions_mut().insert(IssuedToken(token));
    response
}

#[derive(Debug, Deserialize)]
struct NoteBody {
    content: String,
}

async fn create_note(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<NoteBody>,
) -> Response {
    if body.content.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Content is required" })),
        )
            .into_response();
    }

    let owner = state.owner(&headers);
    let id = uuid::Uuid::new_v4().simple().to_string()[..10].to_owned();
    state.inner.lock().unwrap().notes.insert(
        id.clone(),
        Note {
            content: body.content,
            owner,
        },
    );

    let body = match state.options.note_location {
        NoteLocation::Id => json!({ "id": id }),
        NoteLocation::Url => json!({ "url": format!("/{id}") }),
    };
    let mut response = (StatusCode::CREATED, Json(body)).into_response();
    response.extensions_mut().insert(CreatedId(id));
    response
}

async fn read_note(State(state): State<ServerState>, Path(id): Path<String>) -> Response {
    let inner = state.inner.lock().unwrap();
    match inner.notes.get(&id) {
        Some(note) => Json(json!({ "id": id, "content": note.content })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Note not found" })),
        )
            .into_response(),
    }
}

async fn update_note(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<NoteBody>,
) -> Response {
    let caller = state.owner(&headers);
    let mut inner = state.inner.lock().unwrap();
    let Some(note) = inner.notes.get_mut(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Note not found" })),
        )
            .into_response();
    };
    if note.owner.is_some() && note.owner != caller {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Not the owner of this note" })),
        )
            .into_response();
    }

    note.content = body.content;
    Json(json!({ "id": id, "content": note.content })).into_response()
}
