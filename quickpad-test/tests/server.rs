//! Blackbox tests for the in-memory Quickpad stand-in.

use anyhow::Result;
use quickpad_test::server::{NoteLocation, Options, Override, TestServer};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

async fn signup(client: &reqwest::Client, server: &TestServer, name: &str) -> Result<String> {
    let response = client
        .post(server.url("/api/auth/signup"))
        .json(&json!({
            "username": name,
            "email": format!("{name}@test.com"),
            "password": "testpass123",
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    Ok(body["token"].as_str().unwrap().to_owned())
}

#[tokio::test]
async fn test_accounts() -> Result<()> {
    quickpad_test::tracing::init();
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let token = signup(&client, &server, "alice").await?;
    assert!(!token.is_empty());

    // Same account again
    let response = client
        .post(server.url("/api/auth/signup"))
        .json(&json!({
            "username": "alice",
            "email": "alice@test.com",
            "password": "testpass123",
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": "alice@test.com", "password": "testpass123" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert!(body["token"].is_string());

    let response = client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": "alice@test.com", "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_notes() -> Result<()> {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();
    let token = signup(&client, &server, "bob").await?;

    let response = client
        .post(server.url("/api/notes"))
        .bearer_auth(&token)
        .json(&json!({ "content": "hello" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    let id = body["id"].as_str().unwrap().to_owned();

    let response = client
        .get(server.url(&format!("/api/notes/{id}")))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["content"], "hello");

    // Anonymous callers cannot update owned notes
    let response = client
        .put(server.url(&format!("/api/notes/{id}")))
        .json(&json!({ "content": "hijacked" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .put(server.url(&format!("/api/notes/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "content": "updated" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get(server.url("/api/notes/missing")).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .put(server.url("/api/notes/missing"))
        .json(&json!({ "content": "x" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.get(server.url("/api/health")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_url_location() -> Result<()> {
    let server = TestServer::with_options(Options {
        note_location: NoteLocation::Url,
        ..Default::default()
    })
    .await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/api/notes"))
        .json(&json!({ "content": "anonymous" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    let url = body["url"].as_str().unwrap();
    assert!(body.get("id").is_none());

    // the url is relative to the notes collection
    let id = url.trim_start_matches('/');
    let response = client
        .get(server.url(&format!("/api/notes/{id}")))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_overrides_and_journal() -> Result<()> {
    let server = TestServer::with_options(Options {
        overrides: vec![Override::new(
            Method::POST,
            "/api/auth/signup",
            StatusCode::BAD_REQUEST,
        )],
        ..Default::default()
    })
    .await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/api/auth/signup"))
        .json(&json!({
            "username": "carol",
            "email": "carol@test.com",
            "password": "testpass123",
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // the account was created behind the forced status
    let response = client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": "carol@test.com", "password": "testpass123" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    let token = body["token"].as_str().unwrap().to_owned();

    client
        .post(server.url("/api/notes"))
        .bearer_auth(&token)
        .json(&json!({ "content": "journaled" }))
        .send()
        .await?;

    let journal = server.journal();
    assert_eq!(journal.len(), 3);

    assert!(journal[0].is(Method::POST, "/api/auth/signup"));
    assert_eq!(journal[0].status, StatusCode::BAD_REQUEST);
    assert_eq!(journal[0].token, None);

    assert!(journal[1].is(Method::POST, "/api/auth/login"));
    assert_eq!(journal[1].token.as_deref(), Some(token.as_str()));

    assert!(journal[2].is(Method::POST, "/api/notes"));
    assert_eq!(
        journal[2].authorization.as_deref(),
        Some(format!("Bearer {token}").as_str())
    );
    assert!(journal[2].created.is_some());

    Ok(())
}
