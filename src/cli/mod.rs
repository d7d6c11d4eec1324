//! CLI argument parsing for actionlock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// actionlock: serialize remediation actions against Kubernetes workloads.
///
/// Every action is mapped to a lock key:
/// - the owning controller (`<kind>-<namespace>/<name>`) for controller pods
/// - the pod UID for bare pods
/// - the target entity id for actions that affect no pod
#[derive(Parser, Debug)]
#[command(name = "actionlock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format (text or json). Overrides the config file.
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Enable debug logging for lock handling.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for actionlock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the lock key of each action item.
    ///
    /// Resolves pods and owners against the cluster snapshot without
    /// taking any lock.
    Key(KeyArgs),

    /// Run action items through the lock-gated executor.
    ///
    /// Each action holds its lock for the simulated execution time, then
    /// reports success or failure. Actions run concurrently; actions sharing
    /// a lock key run one at a time.
    Simulate(SimulateArgs),

    /// Print the effective configuration as YAML.
    Config,
}

/// Input files shared by commands that resolve action items.
#[derive(Parser, Debug)]
pub struct InputArgs {
    /// YAML or JSON list of pods (or a Kubernetes `List`).
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,

    /// YAML or JSON list of action items.
    #[arg(short, long)]
    pub actions: PathBuf,
}

/// Arguments for the `key` command.
#[derive(Parser, Debug)]
pub struct KeyArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Arguments for the `simulate` command.
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Milliseconds each action holds its lock.
    #[arg(long, default_value = "100")]
    pub hold_ms: u64,

    /// Action uuids whose execution should fail.
    #[arg(long, value_delimiter = ',')]
    pub fail: Vec<String>,

    /// Override the wait timeout, in seconds.
    #[arg(long)]
    pub wait_timeout_secs: Option<u64>,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
