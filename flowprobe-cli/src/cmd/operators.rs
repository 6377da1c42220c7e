use flowprobe_core::compatibility_table;

use crate::exit_codes;
use crate::output::{print_result, OutputFormat};
use crate::OutputArgs;

pub fn operators_cmd(output: OutputArgs) -> i32 {
    let table = compatibility_table();
    if output.format == OutputFormat::Text && !output.quiet {
        for entry in &table {
            let ops: Vec<&str> = entry.operators.iter().map(|o| o.as_str()).collect();
            println!("{} -> {}: {}", entry.extractor, entry.output_type, ops.join(", "));
        }
    } else {
        print_result(output.format, output.quiet, &table);
    }
    exit_codes::SUCCESS
}
