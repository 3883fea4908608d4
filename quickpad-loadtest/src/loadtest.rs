//! Assemble the user profiles into a load test and run it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use goose::config::GooseConfiguration;
use goose::metrics::GooseMetrics;
use goose::prelude::*;
use gumdrop::Options;
use yansi::Paint;

use crate::config::Config;
use crate::hooks;
use crate::profiles::{basic, power};

/// Builds the load test described by the configuration, without starting it.
pub fn attack(config: Config) -> Result<GooseAttack> {
    config.validate()?;

    let args = config.engine_args();
    tracing::debug!(?args, "configuring load engine");
    let engine = GooseConfiguration::parse_args_default(args.as_slice())
        .map_err(|err| anyhow!("invalid load engine arguments: {err}"))?;

    let config = Arc::new(config);
    let mut attack = GooseAttack::initialize_with_config(engine)?
        .set_scheduler(config.scheduler.into())
        .test_start(hooks::on_test_start(&config.host))
        .test_stop(hooks::on_test_stop());

    if config.basic.enabled {
        attack = attack.register_scenario(basic::scenario(&config)?);
    }
    if config.power.enabled {
        attack = attack.register_scenario(power::scenario(&config)?);
    }

    Ok(attack)
}

/// Runs the load test until its run time or iterations are exhausted.
///
/// Returns the statistics aggregated by the load engine.
pub async fn run(config: Config) -> Result<GooseMetrics> {
    print_profiles(&config);

    let metrics = attack(config)?.execute().await?;
    Ok(metrics)
}

fn print_profiles(config: &Config) {
    let total = [
        (config.basic.enabled, config.basic.weight),
        (config.power.enabled, config.power.weight),
    ]
    .into_iter()
    .filter_map(|(enabled, weight)| enabled.then_some(weight))
    .sum::<usize>()
    .max(1);

    println!();
    if config.basic.enabled {
        let basic = &config.basic;
        println!(
            "{} {} ({}% of users, auth: {}%)",
            "## Profile".bold(),
            basic::SCENARIO_NAME.bold().blue(),
            (basic.weight * 100 / total).bold(),
            (basic.auth_probability * 100.0).round(),
        );
        println!(
            "  tasks create/read/update/health: {}/{}/{}/{}",
            basic.create, basic.read, basic.update, basic.health
        );
        print_wait(basic.wait_min, basic.wait_max);
    }
    if config.power.enabled {
        let power = &config.power;
        println!(
            "{} {} ({}% of users, batches of {})",
            "## Profile".bold(),
            power::SCENARIO_NAME.bold().blue(),
            (power.weight * 100 / total).bold(),
            power.batch_size.bold(),
        );
        println!(
            "  tasks create/update: {}/{}",
            power.create, power.update
        );
        print_wait(power.wait_min, power.wait_max);
    }
    println!();
}

fn print_wait(min: Duration, max: Duration) {
    println!("  wait between tasks: {min:.2?} to {max:.2?}");
}
