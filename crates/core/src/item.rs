//! The host's atomic unit of data.
//!
//! An [`Item`] is one record flowing through the pipeline: a primary
//! structured payload, an optional binary attachment, and (on per-record
//! outputs) an origin tag pointing back at the input item it was derived
//! from. Items are values — a new item is always constructed fresh,
//! never mutated in place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered node-name → output-items map, built only for the node names
/// the static resolver actually found in the user code.
pub type NodeOutputs = BTreeMap<String, Vec<Item>>;

/// Origin tag on a per-record output item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    /// Index of the input item this output was derived from.
    pub item: usize,
}

/// One record in the host pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Primary structured payload.
    pub json: Value,

    /// Optional attachment payload. Never forwarded across the bridge;
    /// the runner strips it before serializing input items.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub binary: Option<Value>,

    /// Origin tag, present only on per-record outputs.
    #[serde(
        rename = "pairedItem",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub paired_item: Option<PairedItem>,
}

impl Item {
    /// Create an item with the given primary payload.
    pub fn new(json: Value) -> Self {
        Self {
            json,
            binary: None,
            paired_item: None,
        }
    }

    /// Create an item tagged with the input index it was derived from.
    pub fn with_paired(json: Value, index: usize) -> Self {
        Self {
            json,
            binary: None,
            paired_item: Some(PairedItem { item: index }),
        }
    }

    /// Copy of this item without the attachment payload.
    pub fn without_binary(&self) -> Self {
        Self {
            json: self.json.clone(),
            binary: None,
            paired_item: self.paired_item,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
