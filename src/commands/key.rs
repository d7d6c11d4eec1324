//! Implementation of the `actionlock key` command.
//!
//! Prints the lock key every action item would take, without locking.

use super::load_input;
use crate::action::ActionLockStore;
use crate::cli::KeyArgs;
use crate::config::Config;
use crate::error::Result;
use crate::locks::ExpirationMap;
use std::sync::Arc;

/// Derive the lock key of every action item, in input order.
pub(crate) fn derive_keys(
    args: &KeyArgs,
    config: &Config,
) -> Result<Vec<(String, Result<String>)>> {
    let input = load_input(&args.input)?;
    let lock_map = Arc::new(ExpirationMap::new(config.lock_ttl()));
    let store = ActionLockStore::new(lock_map, input.pods);

    Ok(input
        .actions
        .iter()
        .map(|item| (item.uuid.clone(), store.lock_key(item)))
        .collect())
}

/// Execute the `actionlock key` command.
///
/// Fails with the first derivation error after printing every action.
pub fn cmd_key(args: KeyArgs, config: &Config) -> Result<()> {
    let mut first_error = None;

    for (uuid, key) in derive_keys(&args, config)? {
        match key {
            Ok(key) => println!("{}\t{}", uuid, key),
            Err(e) => {
                println!("{}\tERROR: {}", uuid, e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
