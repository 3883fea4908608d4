//! Command line entry point of the load test binary.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use argh::FromArgs;

use crate::config::Config;
use crate::{loadtest, observability};

/// Load test for the Quickpad notes API.
#[derive(Debug, FromArgs)]
struct Args {
    /// path to the YAML configuration file
    #[argh(option, short = 'c')]
    pub config: Option<PathBuf>,

    /// base URL of the Quickpad deployment under test
    #[argh(option, short = 'H')]
    pub host: Option<String>,

    /// number of simulated users
    #[argh(option, short = 'u')]
    pub users: Option<usize>,

    /// users launched per second
    #[argh(option, short = 'r')]
    pub hatch_rate: Option<String>,

    /// how long to run, e.g. `30s` or `10m`
    #[argh(option, short = 't', from_str_fn(parse_duration))]
    pub run_time: Option<Duration>,

    /// stop each user after this many scenario iterations
    #[argh(option)]
    pub iterations: Option<usize>,

    /// write a report of the run to this file
    #[argh(option)]
    pub report_file: Option<PathBuf>,

    /// seed for reproducible sessions
    #[argh(option)]
    pub seed: Option<u64>,
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value).map_err(|err| err.to_string())
}

impl Args {
    /// Applies flags on top of the loaded configuration.
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(users) = self.users {
            config.users = Some(users);
        }
        if let Some(hatch_rate) = self.hatch_rate {
            config.hatch_rate = Some(hatch_rate);
        }
        if let Some(run_time) = self.run_time {
            config.run_time = Some(run_time);
        }
        if let Some(iterations) = self.iterations {
            config.iterations = Some(iterations);
        }
        if let Some(report_file) = self.report_file {
            config.report_file = Some(report_file);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
    }
}

/// Bootstrap the runtime and run the load test.
pub fn execute() -> Result<()> {
    let args: Args = argh::from_env();

    let mut config =
        Config::load(args.config.as_deref()).context("failed to load configuration")?;
    args.apply(&mut config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("loadtest-rt")
        .enable_all()
        .build()?;
    let _runtime_guard = runtime.enter();

    observability::initialize_tracing();
    tracing::debug!(?config);

    runtime.block_on(async move {
        loadtest::run(config).await?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::from_args(
            &["quickpad-loadtest"],
            &[
                "-H",
                "http://127.0.0.1:3000",
                "-u",
                "20",
                "-r",
                "4",
                "-t",
                "90s",
                "--seed",
                "7",
            ],
        )
        .unwrap();

        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.host, "http://127.0.0.1:3000");
        assert_eq!(config.users, Some(20));
        assert_eq!(config.hatch_rate.as_deref(), Some("4"));
        assert_eq!(config.run_time, Some(Duration::from_secs(90)));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.iterations, None);
    }

    #[test]
    fn missing_flags_keep_config() {
        let args = Args::from_args(&["quickpad-loadtest"], &[]).unwrap();

        let mut config = Config {
            users: Some(3),
            ..Default::default()
        };
        args.apply(&mut config);

        assert_eq!(config.host, "http://localhost:3000");
        assert_eq!(config.users, Some(3));
    }

    #[test]
    fn rejects_bad_duration() {
        assert!(Args::from_args(&["quickpad-loadtest"], &["-t", "soon"]).is_err());
    }
}
