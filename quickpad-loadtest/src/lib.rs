//! A load test for the Quickpad notes API.
//!
//! Simulated users come in two [`profiles`]:
//!
//! - *Basic users* make up most of the traffic. A minority of them sign up (or log in) when
//!   their session starts, then all of them create, read and update notes and check the API's
//!   health, pausing a second or two between tasks.
//! - *Power users* always sign up, then create and update notes in batches with short pauses.
//!
//! Spawning users, picking their tasks, pacing them and aggregating statistics is left to the
//! [`goose`] load engine. This crate registers the profiles and the start/stop announcements with
//! it, see [`loadtest::attack`].
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cli;
pub mod config;
pub mod content;
pub mod hooks;
pub mod http;
pub mod loadtest;
pub mod observability;
pub mod outcome;
pub mod profiles;
pub mod session;

pub use crate::config::Config;
pub use crate::loadtest::run;
