//! Decoder and canonical encoder for Apple XML property lists.
//!
//! Decoding turns `<plist version="1.0">` documents into a typed tree whose
//! nodes each carry a stable identity, so an editor can track individual
//! values across edits. Encoding writes the tree back in one canonical,
//! tab-indented form with dictionary and array order preserved exactly.
//!
//! ```rust
//! use plistedit_core::{encode_plist, parse_plist, Value};
//!
//! let root = parse_plist(
//!     r#"<plist version="1.0"><dict><key>Count</key><integer>3</integer></dict></plist>"#,
//! )?;
//! assert_eq!(root.get("Count").map(|n| &n.value), Some(&Value::Number(3.0)));
//! assert!(encode_plist(&root).contains("\t<integer>3</integer>\n"));
//! # Ok::<(), plistedit_core::PListError>(())
//! ```
#![deny(missing_docs)]

/// Node identity allocation.
pub mod allocator;
/// Recursive-descent decoder.
pub mod decoder;
/// Canonical encoder.
pub mod encoder;
/// Error types for decoding.
pub mod errors;
/// Typed node tree.
pub mod node;
/// Decoder configuration.
pub mod options;
/// Node paths used in diagnostics and lookups.
pub mod path;
/// XML element tree and text escaping.
pub mod xml;

pub use allocator::IdAllocator;
pub use decoder::{parse_plist, parse_plist_with, Decoder};
pub use encoder::{encode_plist, encode_plist_node, format_date, format_number};
pub use errors::PListError;
pub use node::{is_integer, Dictionary, Node, NodeId, NodeKind, PListDate, PListRoot, Value};
pub use options::{DecodeOptions, DuplicateKeys, Leniency};
pub use path::{NodePath, Segment};
pub use xml::{escape_xml, parse_xml, XmlDocument, XmlElement, XmlError, XmlNode};
