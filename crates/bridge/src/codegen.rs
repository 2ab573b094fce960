//! Program synthesizer.
//!
//! Emits the full source text of a standalone JavaScript program around
//! the user's code snippet. The program is self-contained: it loads the
//! context bundle, node-output map, and input items from the scratch
//! directory, defines every accessor binding as a projection of that
//! data, runs the user code (once, or once per record), and writes the
//! normalized item sequence to the result file. Nothing in it can call
//! back into the host — every lookup it performs is against data that
//! was pushed in before the process started.
//!
//! Synthesis is a pure function over text. Scratch paths are embedded
//! as JSON string literals so any path is textually safe, and the user
//! snippet is inserted verbatim inside an async function body, which
//! keeps the surrounding program well-formed for every snippet that is
//! itself a valid statement sequence.

use std::path::{Path, PathBuf};

use outboard_core::ExecutionMode;

/// File names of the on-disk protocol artifacts inside one scratch
/// directory.
#[derive(Debug, Clone)]
pub struct ScratchPaths {
    /// Input items (JSON array of items, attachments stripped).
    pub input: PathBuf,
    /// Named-node output map (JSON object, node name → item array).
    pub nodes: PathBuf,
    /// Context bundle (JSON object).
    pub bundle: PathBuf,
    /// Result items, written by the generated program.
    pub result: PathBuf,
    /// The synthesized program itself.
    pub program: PathBuf,
}

impl ScratchPaths {
    /// Standard artifact layout inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            input: dir.join("input.json"),
            nodes: dir.join("nodes.json"),
            bundle: dir.join("bundle.json"),
            result: dir.join("result.json"),
            program: dir.join("program.js"),
        }
    }
}

/// Emit the complete program text for `user_code` in the given mode.
pub fn synthesize(user_code: &str, mode: ExecutionMode, paths: &ScratchPaths) -> String {
    let body = match mode {
        ExecutionMode::Batch => batch_body(user_code),
        ExecutionMode::PerRecord => per_record_body(user_code),
    };
    format!("{}\n{}", preamble(paths), body)
}

/// Embed a path in the program as a JSON string literal.
fn js_string(path: &Path) -> String {
    serde_json::Value::from(path.to_string_lossy().as_ref()).to_string()
}

/// The mode-independent preamble: artifact loads, accessor bindings,
/// time bindings, and the return-value normalization rule.
fn preamble(paths: &ScratchPaths) -> String {
    format!(
        r#"'use strict';
const fs = require('fs');

const __bundle = JSON.parse(fs.readFileSync({bundle}, 'utf8'));
const __nodeOutputs = JSON.parse(fs.readFileSync({nodes}, 'utf8'));
const __items = JSON.parse(fs.readFileSync({input}, 'utf8'));
const __resultPath = {result};

// Named-node accessor. Backed entirely by the pre-resolved output map;
// a name the resolver could not supply fails here, at use time.
function $(name) {{
  if (!Object.prototype.hasOwnProperty.call(__nodeOutputs, name)) {{
    throw new Error('No data found for node "' + name + '"');
  }}
  const outputs = __nodeOutputs[name];
  return {{
    all: () => outputs,
    first: () => outputs[0],
    last: () => outputs[outputs.length - 1],
    get item() {{ return outputs[0]; }},
    pairedItem: (index) => outputs[index === undefined ? 0 : index],
    itemMatching: (index) => outputs[index === undefined ? 0 : index],
    isExecuted: true,
  }};
}}

function $evaluateExpression(expression) {{
  const table = __bundle.evaluatedExpressions;
  if (!Object.prototype.hasOwnProperty.call(table, expression)) {{
    throw new Error('Expression "' + expression + '" was not resolved before execution');
  }}
  return table[expression];
}}

// Read-only snapshots; writes are never carried back to the host.
function $getWorkflowStaticData(type) {{
  if (type === 'global') return __bundle.staticData.global;
  if (type === 'node') return __bundle.staticData.node;
  throw new Error('Unknown static data type "' + type + '"');
}}

const $workflow = __bundle.workflow;
const $execution = __bundle.execution;
const $prevNode = __bundle.prevNode;
const $mode = __bundle.mode;
const $env = __bundle.env;
const $vars = __bundle.vars;
const $secrets = __bundle.secrets;
const $self = __bundle.selfData;
const $parameter = __bundle.node.parameters;
const $nodeId = __bundle.node.id;
const $nodeVersion = __bundle.node.version;
const $resumeWebhookUrl = __bundle.execution.resumeUrl;

// One instant per invocation; both bindings derive from it.
const __nowMs = Date.now();
let $now;
let $today;
try {{
  const {{ DateTime }} = require('luxon');
  $now = DateTime.fromMillis(__nowMs, {{ zone: __bundle.timezone }});
  $today = $now.startOf('day');
}} catch (e) {{
  $now = new Date(__nowMs);
  $today = new Date(__nowMs);
  $today.setHours(0, 0, 0, 0);
}}

function __normalizeItems(value) {{
  if (value === null || value === undefined) return [];
  if (Array.isArray(value)) {{
    const flattened = [];
    for (const element of value) flattened.push(...__normalizeItems(element));
    return flattened;
  }}
  if (typeof value === 'object') {{
    if ('json' in value) return [value];
    return [{{ json: value }}];
  }}
  return [{{ json: {{ data: value }} }}];
}}
"#,
        bundle = js_string(&paths.bundle),
        nodes = js_string(&paths.nodes),
        input = js_string(&paths.input),
        result = js_string(&paths.result),
    )
}

/// Batch mode: the user code runs exactly once over the whole input
/// sequence and its return value becomes the output sequence.
fn batch_body(user_code: &str) -> String {
    format!(
        r#"const $input = {{
  all: () => __items,
  first: () => __items[0],
  last: () => __items[__items.length - 1],
  get item() {{ return __items[0]; }},
}};

(async () => {{
  const __returned = await (async () => {{
{user_code}
  }})();
  fs.writeFileSync(__resultPath, JSON.stringify(__normalizeItems(__returned)));
}})().catch((err) => {{
  console.error(err && err.stack ? err.stack : String(err));
  process.exit(1);
}});
"#
    )
}

/// Per-record mode: the user code runs once per input item with the
/// input accessor and position bindings rebound each iteration. Output
/// items keep strict input order and carry their source index; a
/// null/undefined return simply contributes nothing.
fn per_record_body(user_code: &str) -> String {
    format!(
        r#"(async () => {{
  const __results = [];
  for (let __index = 0; __index < __items.length; __index++) {{
    const __item = __items[__index];
    const __input = {{ get item() {{ return __item; }} }};
    const __returned = await (async ($input, $json, $itemIndex, $position, $thisItemIndex, $runIndex, $thisRunIndex) => {{
{user_code}
    }})(__input, __item.json, __index, __index, __index, 0, 0);
    if (__returned === null || __returned === undefined) {{
      continue;
    }}
    const __normalized = __normalizeItems(__returned);
    if (__normalized.length === 0) {{
      continue;
    }}
    const __out = __normalized[0];
    __out.pairedItem = {{ item: __index }};
    __results.push(__out);
  }}
  fs.writeFileSync(__resultPath, JSON.stringify(__results));
}})().catch((err) => {{
  console.error(err && err.stack ? err.stack : String(err));
  process.exit(1);
}});
"#
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
