//! Check command implementation.

use plistedit_core::{encode_plist, PListRoot};
use serde_json::json;

use crate::input::{self, DecodeArgs};

pub fn run(
    input: Option<String>,
    json_output: bool,
    decode: DecodeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (text, root) = input::load(input.as_deref(), &decode)?;
    let canonical = encode_plist(&root);
    let is_canonical = canonical == text;

    if json_output {
        let report = json!({
            "canonical": is_canonical,
            "entries": root.len(),
            "nodes": node_count(&root),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if is_canonical {
        println!("canonical");
    } else {
        let line = first_difference(&text, &canonical);
        println!("not canonical (first difference at line {})", line);
    }

    if !is_canonical {
        std::process::exit(1);
    }
    Ok(())
}

/// Nodes in the tree, root included.
fn node_count(root: &PListRoot) -> usize {
    let mut count = 1;
    root.walk(|_, _| count += 1);
    count
}

/// 1-based line number of the first line that differs.
fn first_difference(actual: &str, canonical: &str) -> usize {
    let mut actual_lines = actual.split('\n');
    let mut canonical_lines = canonical.split('\n');
    let mut line = 1;
    loop {
        match (actual_lines.next(), canonical_lines.next()) {
            (Some(a), Some(c)) if a == c => line += 1,
            _ => return line,
        }
    }
}
