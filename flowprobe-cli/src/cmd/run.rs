use std::path::Path;

use flowprobe_core::Validate;
use flowprobe_exec::{EngineError, EngineOptions, ExecutionResult, FlowEngine, FlowExecutionResult};
use tracing::debug;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{EngineArgs, InputArgs, OutputArgs};

use super::config::{build_engine_config, load_inputs, merge_set_inputs, read_flow};

pub async fn run_cmd(path: &Path, inputs: InputArgs, engine: EngineArgs, output: OutputArgs) -> i32 {
    let parsed = match read_flow(path, &output) {
        Ok(p) => p,
        Err(code) => return code,
    };

    if let Err(err) = parsed.flow.validate() {
        print_error(output.format, output.quiet, &err.to_string());
        if output.format == OutputFormat::Text && !output.quiet {
            for v in &err.violations {
                eprintln!("- {v}");
            }
        }
        return exit_codes::VALIDATION_FAILED;
    }

    let mut initial = match load_inputs(inputs.inputs.as_deref(), &output) {
        Some(map) => map,
        None if inputs.inputs.is_some() => return exit_codes::RUNTIME_ERROR,
        None => Default::default(),
    };
    merge_set_inputs(&mut initial, &inputs.set_inputs);
    debug!(
        flow = %parsed.flow.name,
        nodes = parsed.flow.nodes.len(),
        inputs = ?initial.keys().collect::<Vec<_>>(),
        "merged run inputs"
    );

    let options = EngineOptions::new().with_config(build_engine_config(&engine));
    let flow_engine = match FlowEngine::with_options(parsed.flow, options) {
        Ok(e) => e,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return match e {
                EngineError::HttpClient(_) => exit_codes::RUNTIME_ERROR,
                _ => exit_codes::VALIDATION_FAILED,
            };
        }
    };

    let result = flow_engine.execute(initial).await;

    if output.format == OutputFormat::Text && !output.quiet {
        print_text(&result);
    } else {
        print_result(output.format, output.quiet, &result);
    }

    if result.success {
        exit_codes::SUCCESS
    } else {
        exit_codes::RUN_FAILED
    }
}

fn print_text(result: &FlowExecutionResult) {
    for id in &result.execution_order {
        let Some(node) = result.result(id) else { continue };
        let status = if node.is_success() { "ok  " } else { "FAIL" };
        println!("{status} {id} ({}){}", node.node_type(), detail(node));
        if let Some(message) = node.error_message() {
            println!("     {message}");
        }
    }

    if !result.final_outputs.is_empty() {
        println!("\noutputs:");
        for (key, value) in &result.final_outputs {
            println!("  {key} = {value}");
        }
    }

    match (&result.error_message, result.success) {
        (_, true) => println!(
            "\nflow '{}' passed: {} nodes in {} ms",
            result.flow,
            result.execution_order.len(),
            result.duration_ms
        ),
        (Some(message), false) => println!("\nflow '{}' failed: {message}", result.flow),
        (None, false) => println!("\nflow '{}' failed", result.flow),
    }
}

fn detail(node: &ExecutionResult) -> String {
    match node {
        ExecutionResult::Request(r) => match r.status_code {
            Some(status) => format!(" {} {} -> {status} in {} ms", r.request_method, r.request_url, r.duration_ms),
            None => format!(" {} {}", r.request_method, r.request_url),
        },
        ExecutionResult::Delay(d) => format!(" waited {} ms", d.delay_ms),
        ExecutionResult::Debug(d) => {
            let rendered: Vec<String> = d
                .items
                .iter()
                .map(|item| match (&item.value, &item.error) {
                    (Some(v), _) => v.as_str().map(String::from).unwrap_or_else(|| v.to_string()),
                    (None, Some(e)) => format!("<{e}>"),
                    (None, None) => String::new(),
                })
                .collect();
            if d.label.is_empty() {
                format!(" {}", rendered.join(" | "))
            } else {
                format!(" [{}] {}", d.label, rendered.join(" | "))
            }
        }
    }
}
