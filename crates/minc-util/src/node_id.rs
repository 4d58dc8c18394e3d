//! NodeId - the stable handle of an AST node.
//!
//! Nodes live in a central arena owned by the compile session; every
//! reference between nodes (expression children, a scope entity's variable,
//! a datatype's defining struct) is a `NodeId` into that arena. The arena is
//! dropped wholesale when the session ends, so none of these references are
//! owning.

use crate::index_vec::Idx;

/// Index of a node in the AST arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

static_assertions::assert_eq_size!(NodeId, u32);

impl Idx for NodeId {
    fn from_usize(idx: usize) -> Self {
        assert!(idx <= u32::MAX as usize);
        NodeId(idx as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index_vec::IndexVec;

    #[test]
    fn test_node_id_round_trip() {
        assert_eq!(NodeId::from_usize(5).index(), 5);
    }

    #[test]
    fn test_node_id_in_index_vec() {
        let mut arena: IndexVec<NodeId, &str> = IndexVec::new();
        let id = arena.push("node");
        assert_eq!(id, NodeId(0));
        assert_eq!(arena[id], "node");
    }
}
