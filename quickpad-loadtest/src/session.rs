//! Private state of one simulated user.
//!
//! Each user owns exactly one session, stored as the user's session data by the load engine.
//! Nothing in here is shared between users.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::content;
use crate::http::{CreatedNote, Signup};

/// Creates the RNG driving all random decisions of one user.
///
/// With a configured seed, user `n` always draws the same sequence.
pub fn session_rng(seed: Option<u64>, user_index: usize) -> SmallRng {
    let seed = match seed {
        Some(seed) => seed.wrapping_add(user_index as u64),
        None => rand::random(),
    };
    SmallRng::seed_from_u64(seed)
}

/// Session of a basic user.
#[derive(Debug)]
pub struct BasicSession {
    config: Arc<Config>,
    rng: SmallRng,
    /// Bearer token, set after a signup or login returned one.
    pub auth_token: Option<String>,
    /// Id of the note created most recently.
    pub last_note_id: Option<String>,
}

impl BasicSession {
    /// Creates an anonymous session for the user with the given index.
    pub fn new(config: Arc<Config>, user_index: usize) -> Self {
        let rng = session_rng(config.seed, user_index);
        Self {
            config,
            rng,
            auth_token: None,
            last_note_id: None,
        }
    }

    /// The single draw deciding whether this session authenticates.
    pub fn wants_auth(&mut self) -> bool {
        let probability = self.config.basic.auth_probability;
        self.rng.random_bool(probability)
    }

    /// Fresh credentials with a random lowercase username.
    pub fn credentials(&mut self) -> Signup {
        let username = content::username(&mut self.rng);
        let credentials = &self.config.credentials;
        Signup::new(username, &credentials.email_domain, &credentials.password)
    }

    /// Keeps the token, if the response carried one.
    pub fn record_token(&mut self, token: Option<String>) {
        if let Some(token) = token {
            self.auth_token = Some(token);
        }
    }

    /// Remembers the id of a newly created note, given the decoded creation response.
    ///
    /// A response without any id clears the remembered note, so later reads browse random notes
    /// again. An undecodable response (`None`) leaves the session untouched.
    pub fn record_created(&mut self, note: Option<CreatedNote>) {
        if let Some(note) = note {
            self.last_note_id = note.note_id();
        }
    }

    /// Note content with a length drawn uniformly from the configured range.
    pub fn note_content(&mut self) -> String {
        let profile = &self.config.basic;
        let len = self
            .rng
            .random_range(profile.content_min..=profile.content_max);
        content::note_content(&mut self.rng, len)
    }

    /// The note to read: the last one created, or a random id.
    pub fn note_to_read(&mut self) -> String {
        match &self.last_note_id {
            Some(id) => id.clone(),
            None => content::note_id(&mut self.rng),
        }
    }
}

/// Session of a power user.
#[derive(Debug)]
pub struct PowerSession {
    config: Arc<Config>,
    rng: SmallRng,
    /// Bearer token, set after the signup returned one.
    pub auth_token: Option<String>,
    /// Ids of all notes created by this user, oldest first.
    pub note_ids: Vec<String>,
}

impl PowerSession {
    /// Creates a session for the user with the given index.
    pub fn new(config: Arc<Config>, user_index: usize) -> Self {
        let rng = session_rng(config.seed, user_index);
        Self {
            config,
            rng,
            auth_token: None,
            note_ids: Vec::new(),
        }
    }

    /// Fresh credentials with a `poweruser_` username.
    pub fn credentials(&mut self) -> Signup {
        let username = content::power_username(&mut self.rng);
        let credentials = &self.config.credentials;
        Signup::new(username, &credentials.email_domain, &credentials.password)
    }

    /// Token sent with every request. Empty if the signup did not produce one.
    pub fn bearer(&self) -> String {
        self.auth_token.clone().unwrap_or_default()
    }

    /// Number of notes created per batch.
    pub fn batch_size(&self) -> usize {
        self.config.power.batch_size
    }

    /// Content for a note created in a batch.
    pub fn create_content(&mut self) -> String {
        content::alphabetic(&mut self.rng, self.config.power.create_content_len)
    }

    /// Content for a batch update.
    pub fn update_content(&mut self) -> String {
        content::alphabetic(&mut self.rng, self.config.power.update_content_len)
    }

    /// The oldest notes, up to one batch, which get updated.
    pub fn update_targets(&self) -> Vec<String> {
        self.note_ids
            .iter()
            .take(self.batch_size())
            .cloned()
            .collect()
    }
}
