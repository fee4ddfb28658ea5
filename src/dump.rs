//! ## Structural dump and restore
//!
//! A `TreeDump` is a plain, serializable mirror of the internal node tree: no trait
//! objects, no borrowed data. It round-trips through `serde` (and, by extension,
//! `bincode`) without requiring `T` to implement anything beyond `Serialize`/`Deserialize`.
//! Building one does not re-run any packing or split logic; restoring one does not either,
//! so a dump always reproduces the exact tree shape it was taken from.

use crate::bbox::BBox;
use crate::node::{Entry, Node, NodeChildren};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A serializable snapshot of a single stored item.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct EntryDump<T> {
    pub bbox: BBox,
    pub payload: T,
}

/// A serializable snapshot of one node, leaf or internal.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub enum NodeDump<T> {
    Leaf {
        mbr: BBox,
        entries: Vec<EntryDump<T>>,
    },
    Internal {
        mbr: BBox,
        height: usize,
        children: Vec<NodeDump<T>>,
    },
}

/// A full structural snapshot of an [`RTree`](crate::rtree::RTree), suitable for
/// serialization with `serde` (and `bincode`, with the `serde` feature enabled).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct TreeDump<T> {
    pub max_entries: usize,
    pub min_entries: usize,
    pub root: NodeDump<T>,
}

impl<T: Clone> From<&Node<T>> for NodeDump<T> {
    fn from(node: &Node<T>) -> Self {
        match &node.children {
            NodeChildren::Leaf(entries) => NodeDump::Leaf {
                mbr: node.mbr,
                entries: entries
                    .iter()
                    .map(|e| EntryDump {
                        bbox: e.bbox,
                        payload: e.payload.clone(),
                    })
                    .collect(),
            },
            NodeChildren::Internal(children) => NodeDump::Internal {
                mbr: node.mbr,
                height: node.height,
                children: children.iter().map(NodeDump::from).collect(),
            },
        }
    }
}

impl<T> From<NodeDump<T>> for Node<T> {
    fn from(dump: NodeDump<T>) -> Self {
        match dump {
            NodeDump::Leaf { mbr, entries } => Node {
                mbr,
                height: 0,
                children: NodeChildren::Leaf(
                    entries
                        .into_iter()
                        .map(|e| Entry {
                            bbox: e.bbox,
                            payload: e.payload,
                        })
                        .collect(),
                ),
            },
            NodeDump::Internal {
                mbr,
                height,
                children,
            } => Node {
                mbr,
                height,
                children: NodeChildren::Internal(children.into_iter().map(Node::from).collect()),
            },
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use crate::node::{insert_entry, Node};

    #[test]
    fn test_dump_restore_round_trip_preserves_shape() {
        let mut root = Node::empty_leaf();
        for i in 0..9 {
            insert_entry(
                &mut root,
                Entry {
                    bbox: BBox::from_point(i as f64, i as f64),
                    payload: i,
                },
                4,
                2,
            );
        }
        let dump = NodeDump::from(&root);
        let encoded = bincode::serialize(&dump).unwrap();
        let decoded: NodeDump<i32> = bincode::deserialize(&encoded).unwrap();
        let restored: Node<i32> = decoded.into();
        assert_eq!(restored.height, root.height);
        assert_eq!(restored.len(), root.len());
    }
}
