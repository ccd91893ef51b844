//! Inspect command implementation.

use plistedit_core::NodeKind;

use crate::input::{self, DecodeArgs};
use crate::output::{self, NodeRow};

pub fn run(
    input: Option<String>,
    json_output: bool,
    decode: DecodeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_, root) = input::load(input.as_deref(), &decode)?;

    let mut rows = vec![NodeRow {
        id: root.id,
        kind: NodeKind::Dictionary.to_string(),
        path: "root".to_string(),
        preview: format!("{} entries", root.len()),
    }];
    root.walk(|path, node| rows.push(NodeRow::from_node(path, node)));

    if !json_output {
        output::print_table_header();
    }
    for row in &rows {
        if json_output {
            println!("{}", serde_json::to_string(row)?);
        } else {
            println!("{}", output::format_table_row(row));
        }
    }
    Ok(())
}
