//! Action lock policy.
//!
//! Maps an incoming action item to its serialization domain and hands out the
//! lock for it:
//! - [`ActionLockStore::get_lock`] is the single entry point the execution
//!   pipeline calls before mutating cluster state
//! - [`ActionExecutor`] wraps a handler in get-lock, keep-renew, execute and
//!   release, turning every outcome into an [`ActionResult`]
//!
//! Pod lookup and owner resolution are injected through the [`PodLookup`] and
//! [`OwnerResolver`] traits, both implemented for plain closures, so key
//! derivation can be exercised without a cluster.

mod executor;
pub mod key;
mod lock_store;
mod model;
mod owner;


// Re-export public API
pub use executor::{ActionExecutor, ActionHandler, ActionResponseState, ActionResult};
pub use lock_store::{
    ActionLockStore, DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT, LockTimings, PodLookup,
};
pub use model::{ActionItem, ActionType, EntityDto, EntityType};
pub use owner::{
    CREATED_BY_ANNOTATION, ControllerRef, OwnerResolver, PodMetadataOwnerResolver, pod_identifier,
};
