//! REST endpoint paths and field name constants for the sFlow resource.

use sonic_restcfg_common::Scalar;

/// Root of the sFlow sampling configuration subtree.
pub const SFLOW_URI: &str = "data/openconfig-sampling-sflow:sampling/sflow";

/// Wire key wrapping the root PATCH body.
pub const SFLOW_DATA_KEY: &str = "openconfig-sampling-sflow:sflow";

/// Wire key for the enabled-reset PUT body.
pub const SFLOW_ENABLED_DATA_KEY: &str = "openconfig-sampling-sflow:enabled";

/// Path to one global config leaf (wire field name).
pub fn config_field_uri(wire_field: &str) -> String {
    format!("{}/config/{}", SFLOW_URI, wire_field)
}

/// Path to one collector, keyed by address, port, and network instance.
pub fn collector_uri(address: &Scalar, port: &Scalar, network_instance: &Scalar) -> String {
    format!(
        "{}/collectors/collector={},{},{}",
        SFLOW_URI, address, port, network_instance
    )
}

/// Path to one sampled interface.
pub fn interface_uri(name: &str) -> String {
    format!("{}/interfaces/interface={}", SFLOW_URI, name)
}

/// Field names in the config-tree schema.
pub mod fields {
    /// Global sampling enable flag.
    pub const ENABLED: &str = "enabled";

    /// Global polling interval in seconds (0, or 5-300).
    pub const POLLING_INTERVAL: &str = "polling_interval";

    /// Agent interface name.
    pub const AGENT: &str = "agent";

    /// Global sampling rate.
    pub const SAMPLING_RATE: &str = "sampling_rate";

    /// Collector list.
    pub const COLLECTORS: &str = "collectors";

    /// Collector address (identity key).
    pub const ADDRESS: &str = "address";

    /// Collector port (identity key).
    pub const PORT: &str = "port";

    /// Collector network instance (identity key).
    pub const NETWORK_INSTANCE: &str = "network_instance";

    /// Sampled interface list.
    pub const INTERFACES: &str = "interfaces";

    /// Interface name (identity key).
    pub const NAME: &str = "name";
}

/// Field names in the device wire schema, where they differ.
pub mod wire {
    pub const POLLING_INTERVAL: &str = "polling-interval";
    pub const SAMPLING_RATE: &str = "sampling-rate";
    pub const NETWORK_INSTANCE: &str = "network-instance";
}

/// Collector port default when not specified.
pub const DEFAULT_COLLECTOR_PORT: i64 = 6343;

/// Collector network instance default when not specified.
pub const DEFAULT_NETWORK_INSTANCE: &str = "default";
