//! Output formatting utilities.

use plistedit_core::{format_date, format_number, Node, NodeId, NodePath, PListDate, Value};
use serde::Serialize;

/// One line of `inspect` output.
#[derive(Debug, Serialize)]
pub struct NodeRow {
    pub id: NodeId,
    pub kind: String,
    pub path: String,
    pub preview: String,
}

impl NodeRow {
    pub fn from_node(path: &NodePath, node: &Node) -> Self {
        Self {
            id: node.id,
            kind: node.kind().to_string(),
            path: path.to_string(),
            preview: preview(&node.value),
        }
    }
}

/// Short human-readable rendering of a value.
pub fn preview(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.escape_debug()),
        Value::Number(n) => format_number(*n),
        Value::Boolean(b) => b.to_string(),
        Value::Date(PListDate::Invalid) => "(invalid date)".to_string(),
        Value::Date(date) => format_date(date),
        Value::Data(bytes) => format!("{} bytes", bytes.len()),
        Value::Array(items) => format!("{} items", items.len()),
        Value::Dictionary(entries) => format!("{} entries", entries.len()),
    }
}

/// Formats a node as a simple table row.
pub fn format_table_row(row: &NodeRow) -> String {
    format!(
        "{:<6} {:<11} {:<40} {}",
        row.id,
        row.kind,
        truncate(&row.path, 40),
        truncate(&row.preview, 60)
    )
}

/// Prints table header.
#[allow(clippy::print_literal)]
pub fn print_table_header() {
    println!("{:<6} {:<11} {:<40} {}", "ID", "KIND", "PATH", "VALUE");
    println!("{}", "-".repeat(100));
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééé", 6), "ééé...");
    }

    #[test]
    fn previews_are_compact() {
        assert_eq!(preview(&Value::String("a\nb".into())), "\"a\\nb\"");
        assert_eq!(preview(&Value::Number(2.0)), "2");
        assert_eq!(preview(&Value::Data(vec![1, 2, 3])), "3 bytes");
        assert_eq!(preview(&Value::Date(PListDate::Invalid)), "(invalid date)");
    }
}
