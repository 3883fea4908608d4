//! The power user: always signed in, creates and updates notes in batches.
//!
//! Power user requests are never judged explicitly, the engine's default status classification
//! is all that ends up in the statistics.

use std::sync::Arc;

use goose::goose::GooseResponse;
use goose::prelude::*;

use crate::config::Config;
use crate::http::{self, CreatedNote, TokenResponse};
use crate::outcome;
use crate::profiles::missing_session;
use crate::session::PowerSession;

/// Name of the scenario in the engine's reports.
pub const SCENARIO_NAME: &str = "PowerUser";

/// Builds the power user scenario.
pub fn scenario(config: &Arc<Config>) -> Result<Scenario, GooseError> {
    let profile = &config.power;
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
            transaction!(create_multiple_notes)
                .set_name("create_multiple_notes")
                .set_weight(profile.create)?,
        )
        .register_transaction(
            transaction!(update_multiple_notes)
                .set_name("update_multiple_notes")
                .set_weight(profile.update)?,
        ))
}

async fn on_start(user: &mut GooseUser, config: Arc<Config>) -> TransactionResult {
    let mut session = PowerSession::new(config, user.weighted_users_index);
    let credentials = session.credentials();
    user.set_session_data(session);

    let GooseResponse { response, .. } = http::signup(user, &credentials).await?;
    let Ok(response) = response else {
        return Ok(());
    };
    if !outcome::power_accepts(response.status()) {
        tracing::debug!(status = %response.status(), "power user signup rejected");
        return Ok(());
    }

    let body: Option<TokenResponse> = http::decode(response).await;
    if let (Some(token), Some(session)) = (
        body.and_then(|body| body.token),
        user.get_session_data_mut::<PowerSession>(),
    ) {
        session.auth_token = Some(token);
    }
    Ok(())
}

async fn create_multiple_notes(user: &mut GooseUser) -> TransactionResult {
    let Some(session) = user.get_session_data::<PowerSession>() else {
        return missing_session();
    };
    let batch_size = session.batch_size();

    for _ in 0..batch_size {
        let Some(session) = user.get_session_data_mut::<PowerSession>() else {
            return missing_session();
        };
        let content = session.create_content();
        let token = session.bearer();

        let GooseResponse { response, .. } =
            http::create_note(user, &content, Some(&token)).await?;
        let Ok(response) = response else {
            continue;
        };
        if !outcome::power_accepts(response.status()) {
            continue;
        }

        let note: Option<CreatedNote> = http::decode(response).await;
        let id = note.and_then(|note| note.id());
        if let (Some(id), Some(session)) = (id, user.get_session_data_mut::<PowerSession>()) {
            session.note_ids.push(id);
        }
    }
    Ok(())
}

async fn update_multiple_notes(user: &mut GooseUser) -> TransactionResult {
    let Some(session) = user.get_session_data::<PowerSession>() else {
        return missing_session();
    };
    let targets = session.update_targets();

    for id in targets {
        let Some(session) = user.get_session_data_mut::<PowerSession>() else {
            return missing_session();
        };
        let content = session.update_content();
        let token = session.bearer();

        http::update_note(user, &id, &content, Some(&token)).await?;
    }
    Ok(())
}
