//! Command implementations for actionlock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the input loading shared by those commands.

mod key;
mod simulate;

use crate::action::{ActionItem, PodLookup};
use crate::cli::{Command, InputArgs};
use crate::cluster::ClusterSnapshot;
use crate::config::Config;
use crate::error::{ActionLockError, Result};
use std::sync::Arc;

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. Each command
/// is routed to its handler function.
pub fn dispatch(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Key(args) => key::cmd_key(args, config),
        Command::Simulate(args) => simulate::cmd_simulate(args, config),
        Command::Config => cmd_config(config),
    }
}

fn cmd_config(config: &Config) -> Result<()> {
    print!("{}", config.to_yaml()?);
    Ok(())
}

/// Action items and the pod lookup resolving them.
pub(crate) struct LoadedInput {
    pub actions: Vec<ActionItem>,
    pub pods: Arc<dyn PodLookup>,
}

/// Load the action list and, when given, the cluster snapshot.
///
/// Without a snapshot every action resolves to its target entity id.
pub(crate) fn load_input(input: &InputArgs) -> Result<LoadedInput> {
    let content = std::fs::read_to_string(&input.actions).map_err(|e| {
        ActionLockError::UserError(format!(
            "failed to read action items '{}': {}",
            input.actions.display(),
            e
        ))
    })?;
    let actions = ActionItem::list_from_yaml(&content)?;

    let snapshot = match &input.snapshot {
        Some(path) => ClusterSnapshot::load(path)?,
        None => ClusterSnapshot::default(),
    };

    Ok(LoadedInput {
        actions,
        pods: Arc::new(snapshot),
    })
}

#[cfg(test)]
pub(crate) mod test_support;
