//! sFlow configuration module for SONiC RESTCONF devices.
//!
//! Reconciles a desired sFlow configuration (global sampling settings,
//! collectors, per-interface sampling) against device facts and emits the
//! REST requests converging the device to it.

pub mod normalize;
pub mod paths;
pub mod sflow;

pub use sflow::{SflowModule, SFLOW_KEY_SPECS};
