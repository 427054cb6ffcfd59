use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Identifier of a spawned execution context.
///
/// Arena-index style: the value is an index into the set of contexts ever
/// spawned by the controller, never a reference to the context itself. A
/// message from a torn-down context therefore carries an id that no longer
/// matches the live one and can be rejected by comparison alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(u64);

impl ContextId {
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    pub fn index(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_indices_are_distinct_ids() {
        assert_ne!(ContextId::new(0), ContextId::new(1));
        assert_eq!(ContextId::new(3), ContextId::new(3));
    }

    #[test]
    fn display_format() {
        assert_eq!(ContextId::new(42).to_string(), "ctx-42");
    }
}
