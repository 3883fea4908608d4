//! Requests against the Quickpad HTTP API, issued through a simulated user.

use goose::goose::{GooseResponse, TransactionError};
use goose::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Creates an account.
pub const SIGNUP_PATH: &str = "/api/auth/signup";
/// Exchanges credentials for a token.
pub const LOGIN_PATH: &str = "/api/auth/login";
/// Creates notes.
pub const NOTES_PATH: &str = "/api/notes";
/// Liveness of the API.
pub const HEALTH_PATH: &str = "/api/health";
/// Name under which requests for individual notes are aggregated.
pub const NOTE_NAME: &str = "/api/notes/{id}";

/// Path of the note with the given id.
pub fn note_path(id: &str) -> String {
    format!("{NOTES_PATH}/{id}")
}

/// Request result as returned by the load engine.
pub type RequestResult = Result<GooseResponse, Box<TransactionError>>;

/// Body of a signup request.
#[derive(Clone, Debug, Serialize)]
pub struct Signup {
    /// Unique account name.
    pub username: String,
    /// `<username>@<domain>`.
    pub email: String,
    /// Shared password.
    pub password: String,
}

impl Signup {
    /// Derives the email address from the username.
    pub fn new(username: String, email_domain: &str, password: &str) -> Self {
        let email = format!("{username}@{email_domain}");
        Self {
            username,
            email,
            password: password.to_owned(),
        }
    }

    /// Login with the same email and password.
    pub fn login(&self) -> Login<'_> {
        Login {
            email: &self.email,
            password: &self.password,
        }
    }
}

/// Body of a login request.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Login<'a> {
    /// Email of an existing account.
    pub email: &'a str,
    /// Password of that account.
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
struct NoteBody<'a> {
    content: &'a str,
}

/// Response of a successful signup or login.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for later requests.
    pub token: Option<String>,
}

/// Response of a successful note creation.
///
/// The API answers with either an `id` or a `url` pointing at the note.
#[derive(Debug, Deserialize)]
pub struct CreatedNote {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    url: Option<String>,
}

impl CreatedNote {
    /// The `id` field, if present and non-empty. Numeric ids are rendered as strings.
    pub fn id(&self) -> Option<String> {
        let id = match self.id.as_ref()? {
            serde_json::Value::String(id) => id.clone(),
            serde_json::Value::Number(id) => id.to_string(),
            _ => return None,
        };
        (!id.is_empty()).then_some(id)
    }

    /// The `id` field, falling back to the `url` field without its leading slashes.
    pub fn note_id(&self) -> Option<String> {
        if let Some(id) = self.id() {
            return Some(id);
        }
        let id = self.url.as_deref()?.trim_start_matches('/');
        (!id.is_empty()).then(|| id.to_owned())
    }
}

/// Reads and decodes a JSON body. Returns `None` if the body cannot be read or decoded.
pub async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Option<T> {
    match response.bytes().await {
        Ok(body) => parse(&body),
        Err(err) => {
            tracing::debug!(error = &err as &dyn std::error::Error, "failed to read body");
            None
        }
    }
}

/// Decodes a JSON body. Returns `None` if it is not valid JSON of the expected shape.
pub fn parse<T: DeserializeOwned>(body: &[u8]) -> Option<T> {
    match serde_json::from_slice(body) {
        Ok(body) => Some(body),
        Err(err) => {
            tracing::debug!(error = &err as &dyn std::error::Error, "ignoring undecodable body");
            None
        }
    }
}

async fn send<B: Serialize + ?Sized>(
    user: &mut GooseUser,
    method: GooseMethod,
    path: &str,
    name: &str,
    body: Option<&B>,
    token: Option<&str>,
) -> RequestResult {
    let mut builder = user.get_request_builder(&method, path)?;
    if let Some(body) = body {
        builder = builder.json(body);
    }
    if let Some(token) = token {
        builder = builder.bearer_auth(token);
    }

    let request = GooseRequest::builder()
        .method(method)
        .path(path)
        .name(name)
        .set_request_builder(builder)
        .build();

    user.request(request).await
}

/// `POST /api/auth/signup`
pub async fn signup(user: &mut GooseUser, signup: &Signup) -> RequestResult {
    send(
        user,
        GooseMethod::Post,
        SIGNUP_PATH,
        SIGNUP_PATH,
        Some(signup),
        None,
    )
    .await
}

/// `POST /api/auth/login`
pub async fn login(user: &mut GooseUser, login: &Login<'_>) -> RequestResult {
    send(
        user,
        GooseMethod::Post,
        LOGIN_PATH,
        LOGIN_PATH,
        Some(login),
        None,
    )
    .await
}

/// `POST /api/notes`, authenticated if a token is given.
pub async fn create_note(user: &mut GooseUser, content: &str, token: Option<&str>) -> RequestResult {
    let body = NoteBody { content };
    send(
        user,
        GooseMethod::Post,
        NOTES_PATH,
        NOTES_PATH,
        Some(&body),
        token,
    )
    .await
}

/// `GET /api/notes/{id}`
pub async fn read_note(user: &mut GooseUser, id: &str) -> RequestResult {
    let path = note_path(id);
    send(user, GooseMethod::Get, &path, NOTE_NAME, None::<&()>, None).await
}

/// `PUT /api/notes/{id}`, authenticated if a token is given.
pub async fn update_note(
    user: &mut GooseUser,
    id: &str,
    content: &str,
    token: Option<&str>,
) -> RequestResult {
    let path = note_path(id);
    let body = NoteBody { content };
    send(user, GooseMethod::Put, &path, NOTE_NAME, Some(&body), token).await
}

/// `GET /api/health`
pub async fn health(user: &mut GooseUser) -> RequestResult {
    send(
        user,
        GooseMethod::Get,
        HEALTH_PATH,
        HEALTH_PATH,
        None::<&()>,
        None,
    )
    .await
}
