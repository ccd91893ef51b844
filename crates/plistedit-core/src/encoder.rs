use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::SecondsFormat;
use log::debug;

use crate::node::{is_integer, Dictionary, Node, PListDate, PListRoot, Value};
use crate::xml::escape_xml;

/// First line of every encoded document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Second line of every encoded document.
pub const PLIST_DOCTYPE: &str = r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#;

/// Encodes a document in canonical form: declaration, doctype, the
/// `<plist version="1.0">` wrapper and a tab-indented body, each line ending
/// in `\n`.
pub fn encode_plist(root: &PListRoot) -> String {
    let mut encoder = Encoder::new();
    encoder.line(0, XML_DECLARATION);
    encoder.line(0, PLIST_DOCTYPE);
    encoder.line(0, r#"<plist version="1.0">"#);
    encoder.dictionary(&root.entries, 0);
    encoder.line(0, "</plist>");
    debug!(
        "encoded property list: {} top-level entries, {} bytes",
        root.len(),
        encoder.out.len()
    );
    encoder.out
}

/// Encodes a single node at `indent` tab stops. Lines are joined with `\n`
/// and the result carries no trailing newline.
pub fn encode_plist_node(node: &Node, indent: usize) -> String {
    let mut encoder = Encoder::new();
    encoder.value(&node.value, indent);
    encoder.out.pop();
    encoder.out
}

/// Formats a number the way `<integer>` / `<real>` text is written.
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Formats a date the way `<date>` text is written; the invalid sentinel
/// yields an empty string.
pub fn format_date(date: &PListDate) -> String {
    match date {
        PListDate::Valid(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        PListDate::Invalid => String::new(),
    }
}

/// Line writer with a per-depth indentation cache.
struct Encoder {
    out: String,
    indents: Vec<String>,
}

impl Encoder {
    fn new() -> Self {
        Self {
            out: String::new(),
            indents: vec![String::new()],
        }
    }

    fn line(&mut self, depth: usize, content: &str) {
        while self.indents.len() <= depth {
            let next = "\t".repeat(self.indents.len());
            self.indents.push(next);
        }
        self.out.push_str(&self.indents[depth]);
        self.out.push_str(content);
        self.out.push('\n');
    }

    fn value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::String(s) => self.line(depth, &format!("<string>{}</string>", escape_xml(s))),
            Value::Number(n) => {
                let tag = if is_integer(*n) { "integer" } else { "real" };
                let text = escape_xml(&format_number(*n));
                self.line(depth, &format!("<{tag}>{text}</{tag}>"));
            }
            Value::Boolean(b) => self.line(depth, if *b { "<true/>" } else { "<false/>" }),
            Value::Date(date) => {
                self.line(depth, &format!("<date>{}</date>", escape_xml(&format_date(date))))
            }
            Value::Data(bytes) => {
                self.line(depth, &format!("<data>{}</data>", STANDARD.encode(bytes)))
            }
            Value::Array(items) => {
                self.line(depth, "<array>");
                for item in items {
                    self.value(&item.value, depth + 1);
                }
                self.line(depth, "</array>");
            }
            Value::Dictionary(entries) => self.dictionary(entries, depth),
        }
    }

    fn dictionary(&mut self, entries: &Dictionary, depth: usize) {
        self.line(depth, "<dict>");
        for (key, child) in entries {
            self.line(depth + 1, &format!("<key>{}</key>", escape_xml(key)));
            self.value(&child.value, depth + 1);
        }
        self.line(depth, "</dict>");
    }
}
