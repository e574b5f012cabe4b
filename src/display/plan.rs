//! Text explanation of a load plan.

use crate::plan::{FieldSource, Grouping, LoadOperation, LoadPlan};
use std::fmt::Write;

/// Renders a plan as an indented text tree, one block per operation.
///
/// Rows are summarized by count; the tree shows where every target column
/// comes from.
pub fn explain(plan: &LoadPlan) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "LOAD PLAN for source '{}' from '{}':", plan.source, plan.staging);
    let _ = writeln!(
        output,
        "  extracted from {} at {}, open records end at {}",
        plan.extract, plan.extract_start_timestamp, plan.open_end_timestamp
    );
    let _ = writeln!(output, "--------------------------------------------------");

    if plan.operations.is_empty() {
        let _ = writeln!(output, "(no operations)");
        return output;
    }

    for (i, op) in plan.operations.iter().enumerate() {
        let is_last_op = i == plan.operations.len() - 1;
        explain_operation(&mut output, i + 1, op);
        if !is_last_op {
            let _ = writeln!(output, "|");
        }
    }
    output
}

fn explain_operation(output: &mut String, step: usize, op: &LoadOperation) {
    let _ = writeln!(
        output,
        "[{}] {} ({}) {}, {} row(s) from {}",
        step,
        op.target,
        op.table_kind,
        op.kind,
        op.rows.len(),
        op.staging
    );

    let grouping = match &op.grouping {
        Grouping::Column { column } => column.clone(),
        Grouping::DrivingKey { link, fields } => format!("driving key {}({})", link, fields.join(", ")),
    };
    let _ = writeln!(output, "|   grouped by {}", grouping);

    for (i, mapping) in op.mapping.iter().enumerate() {
        let connector = if i == op.mapping.len() - 1 { "`--" } else { "|--" };
        let _ = writeln!(output, "|   {} {} <- {}", connector, mapping.target, describe(&mapping.source));
    }
}

fn describe(source: &FieldSource) -> String {
    match source {
        FieldSource::HashKey { columns, width } => format!("hash key({}) [{}]", columns.join(", "), width),
        FieldSource::HashDiff { columns, width } => format!("hashdiff({}) [{}]", columns.join(", "), width),
        FieldSource::Staged { column } => format!("staged {}", column),
        FieldSource::RecordTimestamp => "record timestamp".to_string(),
        FieldSource::RecordEndTimestamp => "successor timestamp or open".to_string(),
        FieldSource::RecordSource => "record source".to_string(),
    }
}
