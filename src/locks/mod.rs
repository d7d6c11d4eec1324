//! Locking subsystem for action execution.
//!
//! This module implements the primitive that serializes remediation actions:
//! - [`ExpirationMap`]: the process-wide table of lock entries, one per key
//! - [`LockHelper`]: a per-action handle turning the non-blocking acquire into a
//!   bounded blocking wait, with guaranteed release
//!
//! # Expiry
//!
//! Every entry lives for one TTL after acquisition or its last renewal. An
//! entry whose holder crashed or hung is reclaimed lazily by the next acquire
//! of the same key (or eagerly by [`ExpirationMap::purge_expired`]), so a key
//! can never stay blocked for longer than one TTL.
//!
//! # RAII
//!
//! A held [`LockHelper`] releases its entry when dropped, so early returns and
//! panics in the critical section still free the key.

mod expiration_map;
mod helper;
mod metadata;
mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use expiration_map::ExpirationMap;
pub use helper::{LockHandle, LockHelper};
pub use metadata::LockMetadata;
pub use types::LockInfo;
