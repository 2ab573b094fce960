//! Static reference resolver.
//!
//! The external process has no channel back into the host, so every
//! value the generated program might need has to be pushed in before it
//! starts. This module scans the raw user code for the two accessor
//! call shapes whose sole argument is a quoted literal — a named-node
//! lookup `$('Name')` and an expression pre-evaluation
//! `$evaluateExpression('…')` — and resolves each literal against the
//! host before program synthesis. Pattern matching only; no code is
//! parsed or executed.
//!
//! References built from runtime values cannot be matched and are left
//! for the generated program to fail on. A literal the host cannot
//! resolve is skipped the same way: no entry is written, and the
//! in-program accessor raises "not found" if it is ever used.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use outboard_core::item::NodeOutputs;

use crate::HostContext;

/// Matches a named-node accessor call with a single quoted literal
/// argument: `$('Name')` or `$("Name")`.
static NODE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\$\(\s*(?:'([^']+)'|"([^"]+)")\s*\)"#).expect("valid regex")
});

/// Matches an expression-evaluator call with a single quoted literal
/// argument: `$evaluateExpression('…')` or the double-quoted form.
static EXPR_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\$evaluateExpression\(\s*(?:'([^']+)'|"([^"]+)")\s*\)"#).expect("valid regex")
});

/// Literal references resolved ahead of program synthesis.
#[derive(Debug, Default)]
pub struct ResolvedRefs {
    /// Node name → ordered output items, one entry per distinct literal.
    pub node_outputs: NodeOutputs,
    /// Literal expression text → pre-evaluated value.
    pub expressions: BTreeMap<String, Value>,
}

/// Scan `code` and resolve every literal reference against the host.
///
/// Each distinct literal is resolved at most once. Host misses and
/// evaluation failures skip the literal; resolution itself never fails.
pub fn resolve_static_refs(code: &str, host: &dyn HostContext) -> ResolvedRefs {
    let mut refs = ResolvedRefs::default();

    for caps in NODE_REF_RE.captures_iter(code) {
        let Some(name) = capture_literal(&caps) else {
            continue;
        };
        if refs.node_outputs.contains_key(name) {
            continue;
        }
        match host.node_output(name) {
            Some(items) => {
                refs.node_outputs.insert(name.to_string(), items);
            }
            None => {
                tracing::debug!(node = name, "Named-node reference unresolvable, skipping");
            }
        }
    }

    for caps in EXPR_REF_RE.captures_iter(code) {
        let Some(expr) = capture_literal(&caps) else {
            continue;
        };
        if refs.expressions.contains_key(expr) {
            continue;
        }
        match host.evaluate_expression(expr) {
            Ok(value) => {
                refs.expressions.insert(expr.to_string(), value);
            }
            Err(e) => {
                tracing::debug!(
                    expression = expr,
                    error = %e,
                    "Expression pre-evaluation failed, skipping"
                );
            }
        }
    }

    refs
}

/// Extract the quoted literal from either capture group.
fn capture_literal<'a>(caps: &'a regex::Captures<'_>) -> Option<&'a str> {
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
