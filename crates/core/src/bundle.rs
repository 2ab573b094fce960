//! The context bundle serialized across the process boundary.
//!
//! Assembled once per invocation, written whole to the scratch
//! directory, and never updated afterwards. The generated program reads
//! it back and projects its fields into the fixed accessor bindings;
//! nothing in the bundle can reach back into the live host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Workflow metadata visible to user code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInfo {
    pub id: String,
    pub name: String,
    pub active: bool,
}

/// Execution metadata visible to user code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionInfo {
    pub id: String,
    pub mode: String,
    pub resume_url: String,
}

/// Metadata of the node the user code runs inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: String,
    pub name: String,
    pub version: u32,
    /// Resolved node parameters, projected as `$parameter`.
    pub parameters: Value,
}

impl Default for NodeInfo {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            version: 1,
            parameters: Value::Object(Default::default()),
        }
    }
}

/// Metadata of the node that fed this one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrevNodeInfo {
    pub name: String,
    pub output_index: usize,
    pub run_index: usize,
}

/// Read-only static-data snapshots, one per scope.
///
/// Snapshots only: the generated program can read them but writes are
/// never carried back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticData {
    pub global: Value,
    pub node: Value,
}

impl Default for StaticData {
    fn default() -> Self {
        Self {
            global: Value::Object(Default::default()),
            node: Value::Object(Default::default()),
        }
    }
}

/// Everything the generated program may need, aggregated once per
/// invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextBundle {
    pub workflow: WorkflowInfo,
    pub execution: ExecutionInfo,
    pub node: NodeInfo,
    pub prev_node: PrevNodeInfo,
    /// Workflow execution mode (e.g. `manual`, `trigger`).
    pub mode: String,
    /// IANA timezone name used for the program's time bindings.
    pub timezone: String,
    pub env: BTreeMap<String, String>,
    pub vars: BTreeMap<String, Value>,
    pub secrets: BTreeMap<String, Value>,
    pub self_data: BTreeMap<String, Value>,
    pub static_data: StaticData,
    /// Pre-evaluated expression results, keyed by the literal expression
    /// text found in the user code. Filled in by the static resolver.
    pub evaluated_expressions: BTreeMap<String, Value>,
}

impl Default for ContextBundle {
    fn default() -> Self {
        Self {
            workflow: WorkflowInfo::default(),
            execution: ExecutionInfo::default(),
            node: NodeInfo::default(),
            prev_node: PrevNodeInfo::default(),
            mode: "manual".to_string(),
            timezone: "UTC".to_string(),
            env: BTreeMap::new(),
            vars: BTreeMap::new(),
            secrets: BTreeMap::new(),
            self_data: BTreeMap::new(),
            static_data: StaticData::default(),
            evaluated_expressions: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
