use chrono::{DateTime, SubsecRound, Utc};
use indexmap::IndexMap;
use std::fmt;

use crate::allocator::IdAllocator;
use crate::path::{NodePath, Segment};

/// Identity attached to every node. Never serialized.
pub type NodeId = u64;

/// Insertion-ordered key/value mapping backing dictionary nodes.
pub type Dictionary = IndexMap<String, Node>;

/// The seven kinds a property-list value can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Text.
    String,
    /// Integer or real number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Absolute timestamp.
    Date,
    /// Raw bytes.
    Data,
    /// Ordered sequence of nodes.
    Array,
    /// Ordered string-keyed mapping of nodes.
    Dictionary,
}

impl NodeKind {
    /// Stable display name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::String => "String",
            NodeKind::Number => "Number",
            NodeKind::Boolean => "Boolean",
            NodeKind::Date => "Date",
            NodeKind::Data => "Data",
            NodeKind::Array => "Array",
            NodeKind::Dictionary => "Dictionary",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timestamp payload of a date node.
///
/// Timestamps carry millisecond resolution; finer digits are truncated on
/// construction. `Invalid` is the sentinel for date text that could not be
/// read in lenient mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PListDate {
    /// A readable timestamp.
    Valid(DateTime<Utc>),
    /// Unreadable date text.
    Invalid,
}

impl PListDate {
    /// Returns the timestamp if the date is valid.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            PListDate::Valid(dt) => Some(*dt),
            PListDate::Invalid => None,
        }
    }
}

impl From<DateTime<Utc>> for PListDate {
    fn from(value: DateTime<Utc>) -> Self {
        PListDate::Valid(value.trunc_subsecs(3))
    }
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text.
    String(String),
    /// Number; integer-valued numbers re-encode as `<integer>`.
    Number(f64),
    /// Boolean.
    Boolean(bool),
    /// Timestamp.
    Date(PListDate),
    /// Raw bytes (base64 on the wire).
    Data(Vec<u8>),
    /// Ordered children.
    Array(Vec<Node>),
    /// Ordered keyed children.
    Dictionary(Dictionary),
}

impl Value {
    /// Kind tag of this value.
    pub fn kind(&self) -> NodeKind {
        match self {
            Value::String(_) => NodeKind::String,
            Value::Number(_) => NodeKind::Number,
            Value::Boolean(_) => NodeKind::Boolean,
            Value::Date(_) => NodeKind::Date,
            Value::Data(_) => NodeKind::Data,
            Value::Array(_) => NodeKind::Array,
            Value::Dictionary(_) => NodeKind::Dictionary,
        }
    }
}

/// Returns true when `value` has no fractional part.
pub fn is_integer(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}

/// A typed value tagged with its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Identity issued by the document's allocator.
    pub id: NodeId,
    /// Typed payload.
    pub value: Value,
}

impl Node {
    /// Kind tag of this node.
    pub fn kind(&self) -> NodeKind {
        self.value.kind()
    }

    /// Compares kinds, payloads and ordering, ignoring identities.
    pub fn structurally_eq(&self, other: &Node) -> bool {
        match (&self.value, &other.value) {
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structurally_eq(y))
            }
            (Value::Dictionary(a), Value::Dictionary(b)) => dictionaries_structurally_eq(a, b),
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b).is_eq(),
            (a, b) => a == b,
        }
    }

    /// Child reached by a single path segment.
    pub fn child(&self, segment: &Segment) -> Option<&Node> {
        match (&self.value, segment) {
            (Value::Dictionary(entries), Segment::Key(key)) => entries.get(key),
            (Value::Array(items), Segment::Index(idx)) => items.get(*idx),
            _ => None,
        }
    }

    fn walk<'a, F>(&'a self, path: &NodePath, visit: &mut F)
    where
        F: FnMut(&NodePath, &'a Node),
    {
        visit(path, self);
        match &self.value {
            Value::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    item.walk(&path.push_index(idx), visit);
                }
            }
            Value::Dictionary(entries) => walk_entries(entries, path, visit),
            _ => {}
        }
    }
}

fn walk_entries<'a, F>(entries: &'a Dictionary, path: &NodePath, visit: &mut F)
where
    F: FnMut(&NodePath, &'a Node),
{
    for (key, child) in entries {
        child.walk(&path.push_key(key), visit);
    }
}

fn dictionaries_structurally_eq(a: &Dictionary, b: &Dictionary) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|((ka, va), (kb, vb))| ka == kb && va.structurally_eq(vb))
}

/// Top-level dictionary of a decoded document.
///
/// Owns the allocator that produced every identity in the tree so callers can
/// keep minting fresh, non-colliding identities for nodes they add.
#[derive(Debug)]
pub struct PListRoot {
    /// Identity of the root dictionary itself.
    pub id: NodeId,
    /// Top-level entries in document order.
    pub entries: Dictionary,
    /// Allocator used for this document.
    pub allocator: IdAllocator,
}

impl PListRoot {
    /// Creates an empty document with a fresh allocator.
    pub fn new() -> Self {
        let mut allocator = IdAllocator::new();
        let id = allocator.next_value();
        Self {
            id,
            entries: Dictionary::new(),
            allocator,
        }
    }

    /// Builds a node whose identity comes from this document's allocator.
    pub fn new_node(&mut self, value: Value) -> Node {
        self.allocator.new_item(value)
    }

    /// Top-level entry for `key`.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    /// Inserts or replaces a top-level entry. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, node: Node) -> Option<Node> {
        self.entries.insert(key.into(), node)
    }

    /// Removes a top-level entry, preserving the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.entries.shift_remove(key)
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the root dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a non-empty path below the root.
    pub fn resolve(&self, path: &NodePath) -> Option<&Node> {
        let (first, rest) = path.segments().split_first()?;
        let mut node = match first {
            Segment::Key(key) => self.entries.get(key)?,
            Segment::Index(_) => return None,
        };
        for segment in rest {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Visits every node below the root depth-first, in document order.
    pub fn walk<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&NodePath, &'a Node),
    {
        walk_entries(&self.entries, &NodePath::root(), &mut visit);
    }

    /// Compares two documents ignoring identities.
    pub fn structurally_eq(&self, other: &PListRoot) -> bool {
        dictionaries_structurally_eq(&self.entries, &other.entries)
    }
}

impl Default for PListRoot {
    fn default() -> Self {
        Self::new()
    }
}
