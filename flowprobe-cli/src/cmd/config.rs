use std::path::Path;
use std::time::Duration;

use flowprobe_core::{parse_flow_str, FlowFormat, ParsedFlow};
use flowprobe_exec::EngineConfig;
use serde_json::{Map, Value};
use tracing::debug;

use crate::exit_codes;
use crate::output::print_error;
use crate::{EngineArgs, OutputArgs};

/// Reads and parses a flow file, reporting failures. The error is the exit code to use.
pub fn read_flow(path: &Path, output: &OutputArgs) -> Result<ParsedFlow, i32> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        print_error(
            output.format,
            output.quiet,
            &format!("failed to read {}: {e}", path.display()),
        );
        exit_codes::RUNTIME_ERROR
    })?;
    debug!(path = %path.display(), bytes = content.len(), "loaded flow file");
    parse_flow_str(&content, FlowFormat::Auto).map_err(|e| {
        print_error(output.format, output.quiet, &e.to_string());
        exit_codes::VALIDATION_FAILED
    })
}

pub fn load_inputs(path: Option<&Path>, output: &OutputArgs) -> Option<Map<String, Value>> {
    let path = path?;
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("failed to read inputs: {e}"));
            return None;
        }
    };
    let parsed: Option<Value> = serde_json::from_str(&content)
        .ok()
        .or_else(|| serde_yaml::from_str(&content).ok());
    match parsed {
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            print_error(output.format, output.quiet, "inputs file must contain an object");
            None
        }
        None => {
            print_error(output.format, output.quiet, "inputs file is neither valid JSON nor YAML");
            None
        }
    }
}

/// `--set` values are always strings; entries without `=` are ignored.
pub fn merge_set_inputs(inputs: &mut Map<String, Value>, set_inputs: &[String]) {
    for s in set_inputs {
        if let Some((k, v)) = s.split_once('=') {
            inputs.insert(k.to_string(), Value::String(v.to_string()));
        }
    }
}

pub fn build_engine_config(engine: &EngineArgs) -> EngineConfig {
    EngineConfig::default()
        .with_default_timeout(Duration::from_millis(engine.timeout))
        .with_max_response_bytes(engine.max_response_bytes)
}
