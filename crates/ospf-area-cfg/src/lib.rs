//! OSPFv2 area configuration module for SONiC RESTCONF devices.
//!
//! Reconciles a desired list of OSPF areas (per-VRF, with stub settings,
//! summarization ranges, advertised networks, and virtual links) against
//! device facts and emits the REST requests converging the device to it.

pub mod normalize;
pub mod ospf_area;
pub mod paths;
pub mod requests;

pub use ospf_area::{OspfAreaModule, OSPF_AREA_KEY_SPECS};
