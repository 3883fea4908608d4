//! The basic user: mostly anonymous, writes and browses notes at a relaxed pace.
//!
//! At session start a single draw decides whether the user signs up. A signup rejected with
//! `400` is assumed to collide with an existing account and is followed by a login with the
//! same credentials.

use std::sync::Arc;

use goose::goose::GooseResponse;
use goose::prelude::*;

use crate::config::Config;
use crate::http::{self, CreatedNote, TokenResponse};
use crate::outcome::{self, SignupOutcome};
use crate::profiles::{missing_session, record, transport_failure};
use crate::session::BasicSession;

/// Name of the scenario in the engine's reports.
pub const SCENARIO_NAME: &str = "BasicUser";

/// Builds the basic user scenario.
pub fn scenario(config: &Arc<Config>) -> Result<Scenario, GooseError> {
    let profile = &config.basic;
    let start_config = Arc::clone(config);
    let start = Transaction::new(Arc::new(move |user| {
        Box::pin(on_start(user, Arc::clone(&start_config)))
    }))
    .set_name("authenticate")
    .set_on_start();

    Ok(Scenario::new(SCENARIO_NAME)
        .set_weight(profile.weight)?
        .set_wait_time(profile.wait_min, profile.wait_max)?
        .register_transaction(start)
        .register_transaction(
            transaction!(create_note)
                .set_name("create_note")
                .set_weight(profile.create)?,
        )
        .register_transaction(
            transaction!(read_note)
                .set_name("read_note")
                .set_weight(profile.read)?,
        )
        .register_transaction(
            transaction!(update_note)
                .set_name("update_note")
                .set_weight(profile.update)?,
        )
        .register_transaction(
            transaction!(check_health)
                .set_name("check_health")
                .set_weight(profile.health)?,
        ))
}

async fn on_start(user: &mut GooseUser, config: Arc<Config>) -> TransactionResult {
    let mut session = BasicSession::new(config, user.weighted_users_index);
    let wants_auth = session.wants_auth();
    user.set_session_data(session);

    if !wants_auth {
        tracing::trace!(user = user.weighted_users_index, "staying anonymous");
        return Ok(());
    }
    authenticate(user).await
}

/// Signs up, falling back to a login if the account seems to exist.
async fn authenticate(user: &mut GooseUser) -> TransactionResult {
    let Some(session) = user.get_session_data_mut::<BasicSession>() else {
        return missing_session();
    };
    let credentials = session.credentials();

    let GooseResponse {
        mut request,
        response,
    } = http::signup(user, &credentials).await?;
    let response = match response {
        Ok(response) => response,
        Err(err) => return transport_failure(user, &mut request, "Signup failed", &err),
    };

    match outcome::signup(response.status()) {
        SignupOutcome::Authenticated => {
            let body: Option<TokenResponse> = http::decode(response).await;
            store_token(user, body.and_then(|body| body.token));
            user.set_success(&mut request)
        }
        SignupOutcome::Login => {
            tracing::debug!(email = %credentials.email, "signup rejected, logging in");
            user.set_success(&mut request)?;

            let GooseResponse {
                mut request,
                response,
            } = http::login(user, &credentials.login()).await?;
            let response = match response {
                Ok(response) => response,
                Err(err) => return transport_failure(user, &mut request, "Login failed", &err),
            };

            let outcome = outcome::login(response.status());
            if outcome.is_success() {
                let body: Option<TokenResponse> = http::decode(response).await;
                store_token(user, body.and_then(|body| body.token));
            }
            record(user, &mut request, outcome)
        }
        SignupOutcome::Failed => record(user, &mut request, outcome::signup_failed()),
    }
}

fn store_token(user: &mut GooseUser, token: Option<String>) {
    if token.is_none() {
        tracing::debug!("authentication response carried no token");
    }
    if let Some(session) = user.get_session_data_mut::<BasicSession>() {
        session.record_token(token);
    }
}

async fn create_note(user: &mut GooseUser) -> TransactionResult {
    let Some(session) = user.get_session_data_mut::<BasicSession>() else {
        return missing_session();
    };
    let content = session.note_content();
    let token = session.auth_token.clone();

    let GooseResponse {
        mut request,
        response,
    } = http::create_note(user, &content, token.as_deref()).await?;
    let response = match response {
        Ok(response) => response,
        Err(err) => return transport_failure(user, &mut request, "Failed to create note", &err),
    };

    let outcome = outcome::create_note(response.status());
    if outcome.is_success() {
        let note: Option<CreatedNote> = http::decode(response).await;
        if let Some(session) = user.get_session_data_mut::<BasicSession>() {
            session.record_created(note);
            tracing::trace!(note = ?session.last_note_id, "created note");
        }
    }
    record(user, &mut request, outcome)
}

async fn read_note(user: &mut GooseUser) -> TransactionResult {
    let Some(session) = user.get_session_data_mut::<BasicSession>() else {
        return missing_session();
    };
    let id = session.note_to_read();

    let GooseResponse {
        mut request,
        response,
    } = http::read_note(user, &id).await?;
    let outcome = match response {
        Ok(response) => outcome::read_note(response.status()),
        Err(err) => return transport_failure(user, &mut request, "Failed to read note", &err),
    };
    record(user, &mut request, outcome)
}

async fn update_note(user: &mut GooseUser) -> TransactionResult {
    let Some(session) = user.get_session_data_mut::<BasicSession>() else {
        return missing_session();
    };
    let Some(id) = session.last_note_id.clone() else {
        return Ok(());
    };
    let content = session.note_content();
    let token = session.auth_token.clone();

    let GooseResponse {
        mut request,
        response,
    } = http::update_note(user, &id, &content, token.as_deref()).await?;
    let outcome = match response {
        Ok(response) => outcome::update_note(response.status()),
        Err(err) => return transport_failure(user, &mut request, "Failed to update note", &err),
    };
    record(user, &mut request, outcome)
}

async fn check_health(user: &mut GooseUser) -> TransactionResult {
    let GooseResponse {
        mut request,
        response,
    } = http::health(user).await?;
    let outcome = match response {
        Ok(response) => outcome::check_health(response.status()),
        Err(err) => return transport_failure(user, &mut request, "Health check failed", &err),
    };
    record(user, &mut request, outcome)
}
