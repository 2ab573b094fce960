//! Execution mode selection.

use std::fmt;

/// How the user code is applied to the input sequence.
///
/// Chosen once per invocation and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// User code runs exactly once and receives the whole input
    /// sequence; it returns a sequence.
    Batch,
    /// User code runs once per input item, receives that single item,
    /// and returns at most one item. Every produced item is tagged with
    /// the index of the input item it was derived from.
    PerRecord,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Batch => write!(f, "batch"),
            Self::PerRecord => write!(f, "perRecord"),
        }
    }
}
