//! Configuration for the Quickpad load test.
//!
//! Configuration is merged from the following sources, later ones overriding earlier ones:
//!
//! 1. Defaults (see [`Config::default`])
//! 2. YAML configuration file (specified via `-c` or `--config` flag)
//! 3. Environment variables (prefixed with `QP__`)
//!
//! Command line flags such as `--host` or `--users` are applied on top by the CLI.
//!
//! # Environment Variables
//!
//! Environment variables use `QP__` as a prefix and double underscores (`__`) to denote nested
//! configuration structures. For example:
//!
//! - `QP__HOST=https://quickpad.example.com` sets the target deployment
//! - `QP__BASIC__AUTH_PROBABILITY=0.5` makes half of the basic users sign up
//! - `QP__POWER__WAIT_MAX=2s` slows down power users
//!
//! # YAML Configuration File
//!
//! ```yaml
//! host: https://quickpad.example.com
//! users: 50
//! hatch_rate: "5"
//! run_time: 10m
//!
//! basic:
//!   auth_probability: 0.5
//! power:
//!   wait_max: 2s
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, bail};
use figment::providers::{Env, Format, Serialized, Yaml};
use goose::GooseScheduler;
use serde::{Deserialize, Serialize};

/// Environment variable prefix for all configuration options.
const ENV_PREFIX: &str = "QP__";

/// Top-level load test configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the Quickpad deployment under test.
    ///
    /// # Default
    ///
    /// `http://localhost:3000`
    pub host: String,

    /// Number of simulated users to launch. Uses the engine's default when unset.
    pub users: Option<usize>,

    /// How many users are launched per second, e.g. `"5"` or `"0.5"`.
    pub hatch_rate: Option<String>,

    /// Total duration of the test. Runs until stopped (or until `iterations` are exhausted)
    /// when unset.
    #[serde(default, with = "humantime_serde")]
    pub run_time: Option<Duration>,

    /// Stop each user after running its scenario this many times.
    pub iterations: Option<usize>,

    /// Write a report of the run to this file. The format follows the extension (`.html`,
    /// `.json` or `.md`).
    pub report_file: Option<PathBuf>,

    /// How users are assigned to profiles and how tasks are picked within a profile.
    pub scheduler: Scheduler,

    /// Whether the engine's telnet and WebSocket controllers are started.
    pub controllers: bool,

    /// Seed for reproducible runs. User `n` seeds its session with `seed + n`.
    pub seed: Option<u64>,

    /// Credentials used for signups and logins.
    pub credentials: Credentials,

    /// The basic user profile.
    pub basic: BasicProfile,

    /// The power user profile.
    pub power: PowerProfile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "http://localhost:3000".to_owned(),
            users: None,
            hatch_rate: None,
            run_time: None,
            iterations: None,
            report_file: None,
            scheduler: Scheduler::Random,
            controllers: true,
            seed: None,
            credentials: Credentials::default(),
            basic: BasicProfile::default(),
            power: PowerProfile::default(),
        }
    }
}

/// Scheduling strategy, mapped onto [`GooseScheduler`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Scheduler {
    /// Weighted random selection.
    #[default]
    Random,
    /// One of each in turn, honoring weights.
    RoundRobin,
    /// All of the first, then all of the second, and so on.
    Serial,
}

impl From<Scheduler> for GooseScheduler {
    fn from(scheduler: Scheduler) -> Self {
        match scheduler {
            Scheduler::Random => GooseScheduler::Random,
            Scheduler::RoundRobin => GooseScheduler::RoundRobin,
            Scheduler::Serial => GooseScheduler::Serial,
        }
    }
}

/// Credentials shared by all simulated accounts.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Credentials {
    /// Domain appended to generated usernames to form email addresses.
    pub email_domain: String,
    /// Password used for every signup and login.
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email_domain: "test.com".to_owned(),
            password: "testpass123".to_owned(),
        }
    }
}

/// Settings for the basic user profile.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BasicProfile {
    /// Whether the profile is registered at all.
    pub enabled: bool,
    /// Relative share of the simulated users running this profile.
    pub weight: usize,
    /// Probability that a session signs up (or logs in) when it starts.
    pub auth_probability: f64,
    /// Lower bound of the pause between two tasks.
    #[serde(with = "humantime_serde")]
    pub wait_min: Duration,
    /// Upper bound of the pause between two tasks.
    #[serde(with = "humantime_serde")]
    pub wait_max: Duration,
    /// Shortest generated note, in characters.
    pub content_min: usize,
    /// Longest generated note, in characters.
    pub content_max: usize,
    /// Weight of the `create_note` task.
    pub create: usize,
    /// Weight of the `read_note` task.
    pub read: usize,
    /// Weight of the `update_note` task.
    pub update: usize,
    /// Weight of the `check_health` task.
    pub health: usize,
}

impl Default for BasicProfile {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 9,
            auth_probability: 0.3,
            wait_min: Duration::from_secs(1),
            wait_max: Duration::from_secs(3),
            content_min: 50,
            content_max: 500,
            create: 3,
            read: 2,
            update: 1,
            health: 1,
        }
    }
}

/// Settings for the power user profile.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PowerProfile {
    /// Whether the profile is registered at all.
    pub enabled: bool,
    /// Relative share of the simulated users running this profile.
    pub weight: usize,
    /// Lower bound of the pause between two tasks.
    #[serde(with = "humantime_serde")]
    pub wait_min: Duration,
    /// Upper bound of the pause between two tasks.
    #[serde(with = "humantime_serde")]
    pub wait_max: Duration,
    /// Notes created per `create_multiple_notes`, and updated per `update_multiple_notes`.
    pub batch_size: usize,
    /// Length of notes created by power users.
    pub create_content_len: usize,
    /// Length of the content power users write on update.
    pub update_content_len: usize,
    /// Weight of the `create_multiple_notes` task.
    pub create: usize,
    /// Weight of the `update_multiple_notes` task.
    pub update: usize,
}

impl Default for PowerProfile {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 1,
            wait_min: Duration::from_millis(500),
            wait_max: Duration::from_millis(1500),
            batch_size: 3,
            create_content_len: 100,
            update_content_len: 200,
            create: 5,
            update: 3,
        }
    }
}

impl Config {
    /// Loads configuration from the provided arguments.
    ///
    /// Configuration is merged in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. YAML configuration file (if provided)
    /// 3. Environment variables (prefixed with `QP__`)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = figment::Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Checks that the values can be turned into a runnable load test.
    pub fn validate(&self) -> Result<()> {
        if !self.basic.enabled && !self.power.enabled {
            bail!("at least one of the basic and power profiles must be enabled");
        }
        if !(0.0..=1.0).contains(&self.basic.auth_probability) {
            bail!(
                "basic.auth_probability must be within [0, 1], got {}",
                self.basic.auth_probability
            );
        }
        if self.basic.wait_min > self.basic.wait_max {
            bail!("basic.wait_min must not exceed basic.wait_max");
        }
        if self.power.wait_min > self.power.wait_max {
            bail!("power.wait_min must not exceed power.wait_max");
        }
        if self.basic.content_min > self.basic.content_max {
            bail!("basic.content_min must not exceed basic.content_max");
        }
        if self.basic.enabled {
            let basic = &self.basic;
            check_weights(
                "basic",
                basic.weight,
                &[basic.create, basic.read, basic.update, basic.health],
            )?;
        }
        if self.power.enabled {
            let power = &self.power;
            check_weights("power", power.weight, &[power.create, power.update])?;
        }
        Ok(())
    }

    /// Command line arguments understood by the load engine.
    pub fn engine_args(&self) -> Vec<String> {
        let mut args = vec!["--host".to_owned(), self.host.clone()];

        if let Some(users) = self.users {
            args.extend(["--users".to_owned(), users.to_string()]);
        }
        if let Some(hatch_rate) = &self.hatch_rate {
            args.extend(["--hatch-rate".to_owned(), hatch_rate.clone()]);
        }
        if let Some(run_time) = self.run_time {
            // The engine counts whole seconds, round up so short runs still happen.
            let secs = run_time.as_secs() + u64::from(run_time.subsec_nanos() > 0);
            args.extend(["--run-time".to_owned(), secs.to_string()]);
        }
        if let Some(iterations) = self.iterations {
            args.extend(["--iterations".to_owned(), iterations.to_string()]);
        }
        if let Some(report_file) = &self.report_file {
            args.extend([
                "--report-file".to_owned(),
                report_file.display().to_string(),
            ]);
        }
        if !self.controllers {
            args.extend(["--no-telnet".to_owned(), "--no-websocket".to_owned()]);
        }

        args
    }
}

/// Weights of an enabled profile and its tasks must be positive.
fn check_weights(profile: &str, weight: usize, tasks: &[usize]) -> Result<()> {
    if weight == 0 {
        bail!("{profile}.weight must be greater than zero");
    }
    if tasks.contains(&0) {
        bail!("{profile} task weights must be greater than zero");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();

        assert_eq!(config.basic.auth_probability, 0.3);
        assert_eq!(config.basic.wait_min, Duration::from_secs(1));
        assert_eq!(config.power.wait_max, Duration::from_millis(1500));
        assert!(config.basic.weight > config.power.weight);
    }

    #[test]
    fn configurable_via_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("QP__HOST", "http://quickpad.internal:8080");
            jail.set_env("QP__USERS", "25");
            jail.set_env("QP__RUN_TIME", "5m");
            jail.set_env("QP__BASIC__AUTH_PROBABILITY", "0.5");
            jail.set_env("QP__POWER__WAIT_MAX", "2s");
            jail.set_env("QP__SCHEDULER", "round_robin");

            let config = Config::load(None).unwrap();

            assert_eq!(config.host, "http://quickpad.internal:8080");
            assert_eq!(config.users, Some(25));
            assert_eq!(config.run_time, Some(Duration::from_secs(300)));
            assert_eq!(config.basic.auth_probability, 0.5);
            assert_eq!(config.power.wait_max, Duration::from_secs(2));
            assert_eq!(config.scheduler, Scheduler::RoundRobin);

            // untouched values keep their defaults
            assert_eq!(config.basic.content_max, 500);
            assert_eq!(config.credentials.password, "testpass123");

            Ok(())
        });
    }

    #[test]
    fn configurable_via_yaml() {
        let mut tempfile = tempfile::NamedTempFile::new().unwrap();
        tempfile
            .write_all(
                br#"
            host: https://staging.quickpad.dev
            hatch_rate: "0.5"
            credentials:
                email_domain: loadtest.dev
            basic:
                weight: 4
                wait_min: 100ms
                wait_max: 250ms
            power:
                enabled: false
            "#,
            )
            .unwrap();

        figment::Jail::expect_with(|jail| {
            jail.set_env("QP__BASIC__WEIGHT", "6");

            let config = Config::load(Some(tempfile.path())).unwrap();

            assert_eq!(config.host, "https://staging.quickpad.dev");
            assert_eq!(config.hatch_rate.as_deref(), Some("0.5"));
            assert_eq!(config.credentials.email_domain, "loadtest.dev");
            // environment wins over the file
            assert_eq!(config.basic.weight, 6);
            assert_eq!(config.basic.wait_min, Duration::from_millis(100));
            assert_eq!(config.basic.wait_max, Duration::from_millis(250));
            assert!(!config.power.enabled);

            Ok(())
        });
    }

    #[test]
    fn rejects_invalid_values() {
        let mut config = Config::default();
        config.basic.auth_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.power.wait_min = Duration::from_secs(5);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.basic.content_min = 600;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.basic.read = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.basic.enabled = false;
        config.power.enabled = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn disabled_profile_weights_are_ignored() {
        let mut config = Config::default();
        config.power.enabled = false;
        config.power.weight = 0;
        config.power.update = 0;
        config.validate().unwrap();

        let mut config = Config::default();
        config.basic.enabled = false;
        config.basic.health = 0;
        config.validate().unwrap();

        config.power.weight = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn engine_args_follow_config() {
        let config = Config::default();
        assert_eq!(config.engine_args(), ["--host", "http://localhost:3000"]);

        let config = Config {
            host: "http://127.0.0.1:4000".to_owned(),
            users: Some(10),
            hatch_rate: Some("2".to_owned()),
            run_time: Some(Duration::from_millis(1500)),
            iterations: Some(3),
            report_file: Some(PathBuf::from("report.html")),
            controllers: false,
            ..Default::default()
        };
        assert_eq!(
            config.engine_args(),
            [
                "--host",
                "http://127.0.0.1:4000",
                "--users",
                "10",
                "--hatch-rate",
                "2",
                "--run-time",
                "2",
                "--iterations",
                "3",
                "--report-file",
                "report.html",
                "--no-telnet",
                "--no-websocket",
            ]
        );
    }
}
