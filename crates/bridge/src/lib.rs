//! Execution bridge: delegates user-supplied JavaScript to an external
//! Node.js process while presenting the run as part of the host's own
//! data model.
//!
//! One invocation is one child process. The bridge resolves static
//! references in the user code against the host, assembles the context
//! bundle, synthesizes a self-contained program, writes everything into
//! a fresh scratch directory, runs the external runtime with an optional
//! wall-clock bound, and maps the outcome back into items or one
//! classified error. The child never calls back into the host; the user
//! code runs unsandboxed with full machine access by design.
//!
//! Invocations share no mutable state, so callers are free to run any
//! number of them concurrently.

pub mod codegen;
pub mod error;
pub mod outcome;
pub mod resolver;
pub mod runner;

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use outboard_core::item::NodeOutputs;
use outboard_core::{ContextBundle, ExecutionMode, Item};

pub use codegen::ScratchPaths;
pub use error::{ExecError, ExpressionError};
pub use runner::RunOutput;

/// Default cap on captured stdout or stderr per stream (10 MiB).
///
/// Output beyond this is truncated so a runaway script cannot exhaust
/// host memory through its diagnostics.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Host-side lookup capabilities the resolver needs before spawn.
///
/// Both lookups are consulted only for literal references found in the
/// user code text; the external process can never reach them.
pub trait HostContext: Send + Sync {
    /// Ordered output items of the named node, or `None` if the node is
    /// unknown or has not executed yet.
    fn node_output(&self, name: &str) -> Option<Vec<Item>>;

    /// Evaluate a literal expression string in the host's expression
    /// engine.
    fn evaluate_expression(&self, expression: &str) -> Result<Value, ExpressionError>;
}

/// Bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// External runtime binary, resolved via the executable search path.
    pub runtime_bin: String,
    /// Extra module search path exported to the child as `NODE_PATH`.
    pub module_path: Option<PathBuf>,
    /// Cap on captured bytes per output stream.
    pub max_output_bytes: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            runtime_bin: "node".to_string(),
            module_path: None,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

/// Everything one invocation consumes from the host.
#[derive(Debug, Clone)]
pub struct ExecRequest {
    /// Raw user code text.
    pub code: String,
    /// Batch or per-record application of the code.
    pub mode: ExecutionMode,
    /// Ordered input items.
    pub items: Vec<Item>,
    /// Host context; [`ContextBundle::default`] when the host supplies
    /// nothing richer.
    pub bundle: ContextBundle,
    /// Wall-clock bound. `None` or zero means unbounded.
    pub timeout: Option<Duration>,
}

/// Success value of one invocation.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Ordered normalized items.
    pub items: Vec<Item>,
    /// Diagnostic text the user code printed to stdout.
    pub stdout: String,
}

/// The execution bridge.
pub struct CodeBridge {
    config: BridgeConfig,
}

impl CodeBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Run one invocation end to end.
    ///
    /// Exactly one terminal outcome per call, never retried. The
    /// scratch directory is removed on every exit path; a removal
    /// failure is logged and ignored so it cannot mask the result.
    pub async fn execute(
        &self,
        req: ExecRequest,
        host: &dyn HostContext,
    ) -> Result<ExecOutput, ExecError> {
        let invocation = Uuid::new_v4();

        let refs = resolver::resolve_static_refs(&req.code, host);
        tracing::debug!(
            %invocation,
            nodes = refs.node_outputs.len(),
            expressions = refs.expressions.len(),
            "Resolved static references"
        );

        let mut bundle = req.bundle.clone();
        bundle.evaluated_expressions.extend(refs.expressions);

        let scratch = tempfile::Builder::new().prefix("outboard-").tempdir()?;
        let paths = ScratchPaths::in_dir(scratch.path());

        let result = self
            .run_invocation(invocation, &paths, &req, &refs.node_outputs, &bundle)
            .await;

        if let Err(e) = scratch.close() {
            tracing::warn!(%invocation, error = %e, "Failed to remove scratch directory");
        }

        result
    }

    /// Write the on-disk protocol artifacts, spawn the runtime, and
    /// interpret what came back.
    async fn run_invocation(
        &self,
        invocation: Uuid,
        paths: &ScratchPaths,
        req: &ExecRequest,
        node_outputs: &NodeOutputs,
        bundle: &ContextBundle,
    ) -> Result<ExecOutput, ExecError> {
        // Attachments never cross the boundary.
        let input: Vec<Item> = req.items.iter().map(Item::without_binary).collect();
        let program = codegen::synthesize(&req.code, req.mode, paths);

        tokio::fs::write(&paths.input, serde_json::to_vec(&input)?).await?;
        tokio::fs::write(&paths.nodes, serde_json::to_vec(node_outputs)?).await?;
        tokio::fs::write(&paths.bundle, serde_json::to_vec(bundle)?).await?;
        tokio::fs::write(&paths.program, program).await?;

        let timeout = req.timeout.filter(|t| !t.is_zero());
        tracing::debug!(
            %invocation,
            runtime = %self.config.runtime_bin,
            mode = %req.mode,
            items = input.len(),
            "Spawning external runtime"
        );

        let run = runner::run_program(&self.config, &paths.program, timeout).await?;
        outcome::interpret(run, timeout, &paths.result).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
