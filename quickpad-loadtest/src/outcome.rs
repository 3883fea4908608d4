//! How response statuses of the Quickpad API are judged.
//!
//! A request is either marked as a success, marked as a failure with a message, or left to the
//! engine's default classification. The functions here only decide, applying the decision to the
//! engine's request metrics happens in the profiles.

use reqwest::StatusCode;

/// The verdict for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Count the request as passed, whatever its status.
    Success,
    /// Count the request as failed with the given message.
    Failure(String),
}

impl Outcome {
    /// Returns `true` for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// What happens after a signup attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignupOutcome {
    /// The account was created, the body carries the token.
    Authenticated,
    /// The account most likely exists already, log in with the same credentials.
    Login,
    /// Give up on authentication for this session.
    Failed,
}

/// Classifies a signup response.
pub fn signup(status: StatusCode) -> SignupOutcome {
    match status {
        StatusCode::OK | StatusCode::CREATED => SignupOutcome::Authenticated,
        StatusCode::BAD_REQUEST => SignupOutcome::Login,
        _ => SignupOutcome::Failed,
    }
}

/// Classifies a login response.
pub fn login(status: StatusCode) -> Outcome {
    match status {
        StatusCode::OK => Outcome::Success,
        _ => Outcome::Failure("Login failed".to_owned()),
    }
}

/// Message for a signup that neither succeeded nor fell back to a login.
pub fn signup_failed() -> Outcome {
    Outcome::Failure("Signup failed".to_owned())
}

/// Classifies a note creation.
pub fn create_note(status: StatusCode) -> Outcome {
    match status {
        StatusCode::OK | StatusCode::CREATED => Outcome::Success,
        _ => Outcome::Failure(format!("Failed to create note: {}", status.as_u16())),
    }
}

/// Classifies a note read. A missing note is expected when browsing random ids.
pub fn read_note(status: StatusCode) -> Outcome {
    match status {
        StatusCode::OK | StatusCode::NOT_FOUND => Outcome::Success,
        _ => Outcome::Failure(format!("Failed to read note: {}", status.as_u16())),
    }
}

/// Classifies a note update.
pub fn update_note(status: StatusCode) -> Outcome {
    match status {
        StatusCode::OK | StatusCode::NO_CONTENT => Outcome::Success,
        _ => Outcome::Failure(format!("Failed to update note: {}", status.as_u16())),
    }
}

/// Classifies a health check.
pub fn check_health(status: StatusCode) -> Outcome {
    match status {
        StatusCode::OK => Outcome::Success,
        _ => Outcome::Failure(format!("Health check failed: {}", status.as_u16())),
    }
}

/// Returns `true` if the power user profile keeps the body of this response.
pub fn power_accepts(status: StatusCode) -> bool {
    matches!(status, StatusCode::OK | StatusCode::CREATED)
}
