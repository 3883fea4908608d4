//! Runs the Quickpad load test.
//!
//! The target deployment, the number of users and the run time are taken from the command line,
//! a YAML file passed with `-c` and `QP__` environment variables. See
//! [`quickpad_loadtest::config`] for all options.

fn main() -> anyhow::Result<()> {
    quickpad_loadtest::cli::execute()
}
