//! Implementation of the `actionlock simulate` command.
//!
//! Runs the action items through the lock-gated executor with a handler that
//! only sleeps, so lock contention between actions can be observed offline.

use super::load_input;
use crate::action::{ActionExecutor, ActionItem, ActionLockStore, ActionResult};
use crate::cli::SimulateArgs;
use crate::config::Config;
use crate::error::{ActionLockError, Result};
use crate::locks::ExpirationMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Run every action and return the results in input order.
pub(crate) fn run_simulation(args: &SimulateArgs, config: &Config) -> Result<Vec<ActionResult>> {
    let input = load_input(&args.input)?;

    let mut timings = config.lock_timings();
    if let Some(secs) = args.wait_timeout_secs {
        timings.wait_timeout = Duration::from_secs(secs);
    }

    let lock_map = Arc::new(ExpirationMap::new(config.lock_ttl()));
    let store = ActionLockStore::new(Arc::clone(&lock_map), input.pods).with_timings(timings);
    let executor = ActionExecutor::new(store).with_keep_renew(config.keep_renew);

    let hold = Duration::from_millis(args.hold_ms);
    let handler = |item: &ActionItem| -> Result<()> {
        thread::sleep(hold);
        if args.fail.iter().any(|uuid| uuid == &item.uuid) {
            return Err(ActionLockError::ActionFailed {
                action: item.uuid.clone(),
                reason: "simulated failure".to_string(),
            });
        }
        Ok(())
    };

    let results = executor.execute_all(&input.actions, &handler);

    let leaked = lock_map.list();
    if !leaked.is_empty() {
        tracing::warn!(count = leaked.len(), "locks still held after simulation");
    }
    Ok(results)
}

/// Execute the `actionlock simulate` command.
pub fn cmd_simulate(args: SimulateArgs, config: &Config) -> Result<()> {
    let results = run_simulation(&args, config)?;

    if args.json {
        let json = serde_json::to_string_pretty(&results).map_err(|e| {
            ActionLockError::UserError(format!("failed to serialize results: {}", e))
        })?;
        println!("{}", json);
    } else {
        for result in &results {
            println!(
                "{:<12} {:<10} {:<30} {}",
                result.uuid,
                format!("{:?}", result.state).to_uppercase(),
                result.lock_key.as_deref().unwrap_or("-"),
                result.description
            );
        }
    }

    let failed = results.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        return Err(ActionLockError::ActionFailed {
            action: format!("{} of {}", failed, results.len()),
            reason: "see results above".to_string(),
        });
    }
    Ok(())
}
