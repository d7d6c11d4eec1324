//! actionlock: concurrency control for remediation actions executed by a
//! Kubernetes cluster-management agent.
//!
//! Actions arrive from a remote scheduler with no ordering guarantee. Before
//! an action mutates cluster state it takes the lock of its serialization
//! domain from [`action::ActionLockStore`], which guarantees that at most one
//! action runs per pod, per workload controller or per target entity, while
//! bounding how long a crashed holder can block a domain.

pub mod action;
pub mod cli;
pub mod cluster;
pub mod commands;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod locks;
pub mod logging;
