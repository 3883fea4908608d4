//! Test utilities for the Quickpad load test.
//!
//! This crate provides an in-memory stand-in for the Quickpad API and logging setup for tests.
//! See the modules for all available utilities.

pub mod server;
pub mod tracing;
