//! Shared reconciliation engine for SONiC RESTCONF configuration modules.
//!
//! This crate provides the common machinery feature modules build on:
//!
//! - [`node`]: the config-tree model (scalars, objects, keyed lists)
//! - [`keys`]: identity-key declarations and key-indexed list views
//! - [`diff`]: the schema-driven tree diff used in both directions
//! - [`state`]: the four reconciliation states, command tagging, and the
//!   entity-level planners for `replaced`/`overridden`
//! - [`request`]: REST request representation
//! - [`module`]: the module/device collaborator traits and the execution
//!   driver (fetch facts, reconcile, apply, re-fetch)
//! - [`intf`]: interface name canonicalization
//! - [`error`]: error types for reconciliation operations
//!
//! # Architecture
//!
//! A feature module follows this pattern:
//!
//! 1. Normalize and validate the raw desired configuration
//! 2. Diff it against the device facts per the requested state
//! 3. Build the ordered REST requests for the resulting commands
//! 4. Hand the batch to the device collaborator for sequential application
//!
//! The engine is synchronous and stateless per call; only the collaborator
//! boundary in [`module`] is async.

pub mod diff;
pub mod error;
pub mod intf;
pub mod keys;
pub mod module;
pub mod node;
pub mod request;
pub mod state;

// Re-export commonly used items at crate root
pub use diff::diff;
pub use error::{RestCfgError, RestCfgResult};
pub use keys::{entity_key, index_by_key, key_fields_for, EntityKey, KeySpec, ROOT_FIELD};
pub use module::{execute, ConfigModule, Device, ModuleResult};
pub use node::{ConfigNode, Fields, Scalar};
pub use request::{Method, Request};
pub use state::{plan_overridden, plan_replaced, update_states, Command, EntityPlan, State};
