//! Announcements printed once when the whole test starts and stops.

use std::sync::Arc;

use goose::prelude::*;
use yansi::Paint;

/// Transaction run once before any user starts.
pub fn on_test_start(host: &str) -> Transaction {
    let host: Arc<str> = Arc::from(host);
    Transaction::new(Arc::new(move |user| {
        Box::pin(announce_start(user, Arc::clone(&host)))
    }))
    .set_name("test_start")
}

/// Transaction run once after all users stopped.
pub fn on_test_stop() -> Transaction {
    transaction!(announce_stop).set_name("test_stop")
}

async fn announce_start(_user: &mut GooseUser, host: Arc<str>) -> TransactionResult {
    tracing::info!(%host, "starting load test");
    println!("{}", "Starting load test for Quickpad".bold());
    println!("Target: {}", host.blue());
    Ok(())
}

async fn announce_stop(_user: &mut GooseUser) -> TransactionResult {
    tracing::info!("load test completed");
    println!("{}", "Load test completed".bold().green());
    Ok(())
}
