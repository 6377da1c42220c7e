use std::path::Path;

use flowprobe_core::Validate;
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_result, OutputFormat};
use crate::OutputArgs;

#[derive(Serialize)]
struct ValidateResult {
    valid: bool,
    format: String,
    nodes: usize,
    edges: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

pub fn validate_cmd(path: &Path, output: OutputArgs) -> i32 {
    let parsed = match super::config::read_flow(path, &output) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let flow = &parsed.flow;

    let errors: Vec<String> = match flow.validate() {
        Ok(()) => Vec::new(),
        Err(err) => err.violations.iter().map(ToString::to_string).collect(),
    };
    let result = ValidateResult {
        valid: errors.is_empty(),
        format: format!("{:?}", parsed.format),
        nodes: flow.nodes.len(),
        edges: flow.edges.len(),
        errors,
    };

    if output.format == OutputFormat::Text && !output.quiet {
        if result.valid {
            println!(
                "ok: valid flow '{}' ({} nodes, {} edges, {})",
                flow.name, result.nodes, result.edges, result.format
            );
        } else {
            eprintln!("error: validation failed");
            for e in &result.errors {
                eprintln!("- {e}");
            }
        }
    } else {
        print_result(output.format, output.quiet, &result);
    }

    if result.valid {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_FAILED
    }
}
