use std::path::Path;

use flowprobe_core::{plan_flow, Flow, Plan};

use crate::exit_codes;
use crate::output::{print_error, OutputFormat};
use crate::OutputArgs;

pub fn plan_cmd(path: &Path, output: OutputArgs) -> i32 {
    let parsed = match super::config::read_flow(path, &output) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let plan = match plan_flow(&parsed.flow) {
        Ok(p) => p,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::VALIDATION_FAILED;
        }
    };

    let code = if plan.levels.stranded.is_empty() {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_FAILED
    };
    if output.quiet {
        return code;
    }

    match output.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&plan) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: failed to serialize plan as JSON: {e}");
                return exit_codes::RUNTIME_ERROR;
            }
        },
        OutputFormat::Text => print_text(&plan),
        OutputFormat::Dot => print_dot(&parsed.flow),
    }
    code
}

fn print_text(plan: &Plan) {
    println!("flow: {}", plan.flow);

    println!("\nexecution levels:");
    for (idx, level) in plan.levels.levels.iter().enumerate() {
        println!("  Level {idx}: {}", level.join(", "));
    }
    if !plan.levels.stranded.is_empty() {
        println!("\nstranded (cycle or unreachable): {}", plan.levels.stranded.join(", "));
    }

    println!("\nper-node intent:");
    for n in &plan.nodes {
        println!("- {} ({})", n.id, n.node_type);
        if !n.depends_on.is_empty() {
            println!("  dependsOn: {}", n.depends_on.join(", "));
        }
        if !n.inputs.is_empty() {
            println!("  inputs: {}", n.inputs.join(", "));
        }
        if !n.outputs.is_empty() {
            println!("  outputs: {}", n.outputs.join(", "));
        }
    }
}

fn print_dot(flow: &Flow) {
    println!("digraph \"{}\" {{", escape(&flow.name));
    for node in &flow.nodes {
        println!(
            "  \"{}\" [label=\"{}\\n({})\"];",
            escape(node.id()),
            escape(node.id()),
            node.node_type()
        );
    }
    for edge in &flow.edges {
        println!(
            "  \"{}\" -> \"{}\" [label=\"{}\"];",
            escape(&edge.source),
            escape(&edge.target),
            escape(&edge.id)
        );
    }
    println!("}}");
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
