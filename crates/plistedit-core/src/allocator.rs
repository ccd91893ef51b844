use crate::node::{Node, NodeId, Value};

/// Issues unique, strictly increasing node identities for one document.
///
/// The counter starts at 0 and the first issued id is 1. An allocator is
/// created by each decode pass and then owned by the resulting root, so nodes
/// added later by an editor never collide with decoded ones. It is
/// intentionally not `Clone`.
#[derive(Debug, Default)]
pub struct IdAllocator {
    prev_value: NodeId,
}

impl IdAllocator {
    /// Creates an allocator that has issued nothing yet.
    pub fn new() -> Self {
        Self { prev_value: 0 }
    }

    /// Increments the counter and returns the new identity.
    pub fn next_value(&mut self) -> NodeId {
        self.prev_value += 1;
        self.prev_value
    }

    /// Wraps `value` in a node carrying a freshly issued identity.
    pub fn new_item(&mut self, value: Value) -> Node {
        Node {
            id: self.next_value(),
            value,
        }
    }

    /// The most recently issued identity, or 0 when none was issued.
    pub fn last_issued(&self) -> NodeId {
        self.prev_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_value_is_one_and_values_ascend() {
        let mut allocator = IdAllocator::new();
        assert_eq!(allocator.last_issued(), 0);
        assert_eq!(allocator.next_value(), 1);
        assert_eq!(allocator.next_value(), 2);
        assert_eq!(allocator.next_value(), 3);
        assert_eq!(allocator.last_issued(), 3);
    }

    #[test]
    fn new_item_consumes_an_identity() {
        let mut allocator = IdAllocator::new();
        let a = allocator.new_item(Value::Boolean(true));
        let b = allocator.new_item(Value::String("x".into()));
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(b.value, Value::String("x".into()));
    }
}
