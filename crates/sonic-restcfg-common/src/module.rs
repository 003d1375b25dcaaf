//! Module execution driver and collaborator boundaries.
//!
//! The engine never talks to the device directly. Facts arrive through
//! [`Device::get_facts`] already normalized into the same shape the engine
//! diffs against, and the ordered request batch leaves through
//! [`Device::apply_requests`]. There is no retry and no rollback here: a
//! transport failure is surfaced as-is, and re-running reconciliation
//! computes the smaller remaining diff.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as Json;
use tracing::{debug, info, instrument};

use crate::error::RestCfgResult;
use crate::node::ConfigNode;
use crate::request::Request;
use crate::state::{Command, State};

/// REST device collaborator.
#[async_trait]
pub trait Device: Send + Sync {
    /// Fetches the current configuration for a resource, pre-normalized
    /// into the resource's config-tree schema.
    async fn get_facts(&self, resource: &str) -> RestCfgResult<ConfigNode>;

    /// Executes requests in the given order. No internal retries; requests
    /// already sent before a failure may have been applied.
    async fn apply_requests(&self, requests: &[Request]) -> RestCfgResult<()>;
}

/// A feature's reconciliation module.
///
/// Implementations own the feature schema (key specs, normalization rules,
/// request builders) and turn a `(desired, current)` pair into the command
/// and request lists for the requested state.
pub trait ConfigModule: Send + Sync {
    /// Resource name used when fetching facts (e.g. "sflow", "ospf_area").
    fn resource_name(&self) -> &str;

    /// Computes the commands and requests converging `have` to `desired`
    /// under the given state. Commands and requests are in lockstep: both
    /// are empty when nothing needs to change.
    fn reconcile(
        &self,
        desired: &Json,
        state: State,
        have: &ConfigNode,
    ) -> RestCfgResult<(Vec<Command>, Vec<Request>)>;
}

/// Result of one module execution.
#[derive(Debug, Serialize)]
pub struct ModuleResult {
    /// Whether any change was (or, in check mode, would be) made.
    pub changed: bool,
    /// Audit-readable command list.
    pub commands: Vec<Command>,
    /// The requests that were (or would be) applied.
    pub requests: Vec<Request>,
    /// Configuration observed before applying.
    pub before: ConfigNode,
    /// Configuration re-fetched after applying; `None` when nothing changed
    /// or in check mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<ConfigNode>,
}

/// Runs one reconciliation pass for a module against a device.
///
/// In check mode the computed requests are reported but not applied.
#[instrument(skip(module, device, desired), fields(resource = module.resource_name()))]
pub async fn execute(
    module: &dyn ConfigModule,
    device: &dyn Device,
    desired: &Json,
    state: State,
    check_mode: bool,
) -> RestCfgResult<ModuleResult> {
    let before = device.get_facts(module.resource_name()).await?;
    let (commands, requests) = module.reconcile(desired, state, &before)?;

    if commands.is_empty() || requests.is_empty() {
        debug!("no changes required");
        return Ok(ModuleResult {
            changed: false,
            commands,
            requests,
            before,
            after: None,
        });
    }

    let mut after = None;
    if !check_mode {
        device.apply_requests(&requests).await?;
        after = Some(device.get_facts(module.resource_name()).await?);
    }
    info!(
        commands = commands.len(),
        requests = requests.len(),
        check_mode,
        "configuration changed"
    );
    Ok(ModuleResult {
        changed: true,
        commands,
        requests,
        before,
        after,
    })
}
