//! ## The public facade
//!
//! `RTree<T>` ties the bounding-box arithmetic, node store, and traversal algorithms
//! together behind the small operation set described by the design: insert, load, remove,
//! search, collides, all, clear, dump, restore.

use tracing::{debug, info};

use crate::bbox::BBox;
use crate::dump::{NodeDump, TreeDump};
use crate::error::IndexError;
use crate::node::{self, Entry, Node, NodeChildren};
use crate::spatial::Spatial;

/// Default fan-out used by [`RTree::default`], matching the value this codebase's other
/// tree modules use for their own default branching factor.
const DEFAULT_MAX_ENTRIES: usize = 9;
const MIN_MAX_ENTRIES: usize = 4;

/// A height-balanced spatial index over axis-aligned bounding boxes.
///
/// `T` supplies its own bounding box through [`Spatial`]; the tree never inspects a
/// payload beyond that single method (and, for `remove`, an optional equality predicate).
#[derive(Debug, Clone)]
pub struct RTree<T> {
    root: Node<T>,
    max_entries: usize,
    min_entries: usize,
}

impl<T> RTree<T> {
    /// Builds an empty tree with the given node capacity.
    ///
    /// `max_entries` must be at least 4; `min_entries` is derived as
    /// `max(2, ceil(0.4 * max_entries))`.
    pub fn new(max_entries: usize) -> Result<Self, IndexError> {
        if max_entries < MIN_MAX_ENTRIES {
            return Err(IndexError::InvalidCapacity {
                capacity: max_entries,
                minimum: MIN_MAX_ENTRIES,
            });
        }
        let min_entries = (2usize).max(((max_entries as f64) * 0.4).ceil() as usize);
        info!(max_entries, min_entries, "created new r-tree");
        Ok(RTree {
            root: Node::empty_leaf(),
            max_entries,
            min_entries,
        })
    }

    /// The height of the tree: `0` for an empty or single-leaf tree, growing by one with
    /// every root split.
    pub fn height(&self) -> usize {
        self.root.height
    }

    /// Number of items currently stored.
    pub fn len(&self) -> usize {
        count_entries(&self.root)
    }

    /// True iff the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the root with a fresh empty leaf.
    pub fn clear(&mut self) -> &mut Self {
        info!("clearing tree");
        self.root = Node::empty_leaf();
        self
    }

    /// All stored payloads; equivalent to `search` over the universal bounding box.
    pub fn all(&self) -> Vec<&T> {
        let mut out = Vec::new();
        node::search_node(&self.root, &BBox::universe(), &mut out);
        out
    }

    /// Every payload whose box intersects `bbox`, in unspecified order.
    pub fn search(&self, bbox: &BBox) -> Vec<&T> {
        debug!(?bbox, "search");
        let mut out = Vec::new();
        node::search_node(&self.root, bbox, &mut out);
        out
    }

    /// True iff at least one stored box intersects `bbox`.
    pub fn collides(&self, bbox: &BBox) -> bool {
        debug!(?bbox, "collides");
        node::collides_node(&self.root, bbox)
    }

    /// Emits a structural snapshot of the tree, suitable for `serde` serialization.
    pub fn dump(&self) -> TreeDump<T>
    where
        T: Clone,
    {
        TreeDump {
            max_entries: self.max_entries,
            min_entries: self.min_entries,
            root: NodeDump::from(&self.root),
        }
    }

    /// Rebuilds a tree from a structural snapshot, trusting its shape verbatim.
    pub fn restore(dump: TreeDump<T>) -> Self {
        RTree {
            root: dump.root.into(),
            max_entries: dump.max_entries,
            min_entries: dump.min_entries,
        }
    }
}

impl<T: Spatial> RTree<T> {
    /// Inserts a single item, splitting nodes on overflow and growing the tree's height
    /// when the root itself splits.
    pub fn insert(&mut self, item: T) -> &mut Self {
        info!("insert");
        let entry = Entry {
            bbox: item.bbox(),
            payload: item,
        };
        if let Some(sibling) = node::insert_entry(&mut self.root, entry, self.max_entries, self.min_entries)
        {
            self.grow_root(sibling);
        }
        self
    }

    /// Batched insertion: builds a balanced subtree from `items` and merges it into the
    /// existing tree, falling back to one-by-one insertion for small batches. Empty input
    /// is a no-op.
    pub fn load(&mut self, items: Vec<T>) -> &mut Self {
        if items.is_empty() {
            return self;
        }
        info!(count = items.len(), "load");
        if items.len() < self.min_entries {
            for item in items {
                self.insert(item);
            }
            return self;
        }

        let entries: Vec<Entry<T>> = items
            .into_iter()
            .map(|item| Entry {
                bbox: item.bbox(),
                payload: item,
            })
            .collect();
        let built = node::pack(entries, self.max_entries);
        self.merge_built_tree(built);
        self
    }

    /// Removes the first stored item structurally equal (`PartialEq`) to `item`.
    pub fn remove(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.remove_with(item, |a, b| a == b)
    }

    /// Removes the first stored item for which `equals(stored, item)` holds, condensing
    /// the path back to the root. Returns whether anything was removed.
    pub fn remove_with(&mut self, item: &T, equals: impl Fn(&T, &T) -> bool) -> bool {
        info!("remove");
        let bbox = item.bbox();
        let removed = node::remove_entry(&mut self.root, item, &bbox, &equals);
        if removed {
            self.condense_root();
        }
        removed
    }

    fn grow_root(&mut self, sibling: Node<T>) {
        debug!("root split, growing tree height");
        let old_root = std::mem::replace(&mut self.root, Node::empty_leaf());
        let mbr = old_root.mbr.union(&sibling.mbr);
        let height = old_root.height + 1;
        self.root = Node {
            mbr,
            height,
            children: NodeChildren::Internal(vec![old_root, sibling]),
        };
    }

    /// If the root is internal with a single child, replaces it with that child
    /// (lowering the tree's height by one), per the remove-path promotion rule.
    fn condense_root(&mut self) {
        if let NodeChildren::Internal(children) = &mut self.root.children {
            if children.len() == 1 {
                self.root = children.pop().unwrap();
            }
        }
    }

    fn merge_built_tree(&mut self, built: Node<T>) {
        let host = std::mem::replace(&mut self.root, Node::empty_leaf());
        self.root = merge_trees(host, built, self.max_entries, self.min_entries);
    }
}

impl<T: Spatial> Default for RTree<T> {
    fn default() -> Self {
        RTree::new(DEFAULT_MAX_ENTRIES).expect("default max_entries is always valid")
    }
}

fn count_entries<T>(node: &Node<T>) -> usize {
    match &node.children {
        NodeChildren::Leaf(entries) => entries.len(),
        NodeChildren::Internal(children) => children.iter().map(count_entries).sum(),
    }
}

/// Merges a freshly packed subtree into the existing host tree (section 4.4): same height
/// grows a new root, a shorter built tree is inserted at the matching level, and a taller
/// one swaps roles with the host.
fn merge_trees<T>(host: Node<T>, built: Node<T>, max_entries: usize, min_entries: usize) -> Node<T> {
    if host.is_empty() && host.is_leaf() {
        return built;
    }
    if built.height == host.height {
        let mbr = host.mbr.union(&built.mbr);
        let height = host.height + 1;
        return Node {
            mbr,
            height,
            children: NodeChildren::Internal(vec![host, built]),
        };
    }
    if built.height < host.height {
        let mut host = host;
        if let Some(sibling) = node::insert_subtree(&mut host, built, max_entries, min_entries) {
            let mbr = host.mbr.union(&sibling.mbr);
            let height = host.height + 1;
            return Node {
                mbr,
                height,
                children: NodeChildren::Internal(vec![host, sibling]),
            };
        }
        return host;
    }
    merge_trees(built, host, max_entries, min_entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: f64,
        y: f64,
    }

    impl Spatial for Point {
        fn bbox(&self) -> BBox {
            BBox::from_point(self.x, self.y)
        }
    }

    fn point(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    #[test]
    fn test_new_rejects_small_capacity() {
        let err = RTree::<Point>::new(2).unwrap_err();
        assert_eq!(
            err,
            IndexError::InvalidCapacity {
                capacity: 2,
                minimum: 4,
            }
        );
    }

    #[test]
    fn test_default_capacity_is_nine() {
        let tree: RTree<Point> = RTree::default();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_insert_then_search() {
        let mut tree = RTree::new(4).unwrap();
        for i in 0..10 {
            tree.insert(point(i as f64, i as f64));
        }
        let found = tree.search(&BBox::new(2.0, 2.0, 5.0, 5.0).unwrap());
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn test_insert_four_then_five_grows_height() {
        let mut tree = RTree::new(4).unwrap();
        for (x, y) in [(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)] {
            tree.insert(point(x, y));
        }
        assert_eq!(tree.height(), 0);
        tree.insert(point(1.0, 1.0));
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.all().len(), 5);
    }

    #[test]
    fn test_load_nine_points_single_leaf_default_capacity() {
        let mut tree: RTree<Point> = RTree::default();
        let items: Vec<Point> = (0..9).map(|i| point(i as f64, i as f64)).collect();
        tree.load(items);
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_load_ten_points_grows_one_level_default_capacity() {
        let mut tree: RTree<Point> = RTree::default();
        let items: Vec<Point> = (0..10).map(|i| point(i as f64, i as f64)).collect();
        tree.load(items);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_load_same_batch_twice_preserves_duplicates() {
        let mut tree = RTree::new(4).unwrap();
        let items: Vec<Point> = (0..48).map(|i| point(i as f64, i as f64)).collect();
        tree.load(items.clone());
        tree.load(items);
        assert_eq!(tree.all().len(), 96);
    }

    #[test]
    fn test_collides_matches_search_emptiness() {
        let mut tree = RTree::new(4).unwrap();
        for i in 0..20 {
            tree.insert(point(i as f64, i as f64));
        }
        let q = BBox::new(200.0, 200.0, 210.0, 210.0).unwrap();
        assert!(tree.search(&q).is_empty());
        assert!(!tree.collides(&q));
    }

    #[test]
    fn test_remove_then_all_excludes_removed() {
        let mut tree = RTree::new(4).unwrap();
        let items: Vec<Point> = (0..48).map(|i| point(i as f64, i as f64)).collect();
        for item in items.iter().cloned() {
            tree.insert(item);
        }
        for item in items.iter().take(3) {
            assert!(tree.remove(item));
        }
        for item in items.iter().rev().take(3) {
            assert!(tree.remove(item));
        }
        assert_eq!(tree.all().len(), 42);
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let mut tree = RTree::new(4).unwrap();
        tree.insert(point(1.0, 1.0));
        assert!(!tree.remove(&point(99.0, 99.0)));
        assert_eq!(tree.all().len(), 1);
    }

    #[test]
    fn test_remove_with_custom_equality() {
        #[derive(Debug, Clone)]
        struct Tagged {
            id: u32,
            x: f64,
            y: f64,
        }
        impl Spatial for Tagged {
            fn bbox(&self) -> BBox {
                BBox::from_point(self.x, self.y)
            }
        }
        let mut tree = RTree::new(4).unwrap();
        tree.insert(Tagged { id: 1, x: 0.0, y: 0.0 });
        tree.insert(Tagged { id: 2, x: 1.0, y: 1.0 });
        let removed = tree.remove_with(&Tagged { id: 1, x: 999.0, y: 999.0 }, |a, b| a.id == b.id);
        assert!(removed);
        assert_eq!(tree.all().len(), 1);
    }

    #[test]
    fn test_clear_empties_tree() {
        let mut tree = RTree::new(4).unwrap();
        tree.insert(point(1.0, 1.0));
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_dump_restore_preserves_contents() {
        let mut tree = RTree::new(4).unwrap();
        for i in 0..20 {
            tree.insert(point(i as f64, i as f64));
        }
        let dump = tree.dump();
        let restored: RTree<Point> = RTree::restore(dump);
        assert_eq!(restored.len(), tree.len());
        assert_eq!(restored.height(), tree.height());
    }

    #[test]
    fn test_load_empty_is_noop() {
        let mut tree = RTree::new(4).unwrap();
        tree.insert(point(0.0, 0.0));
        tree.load(Vec::new());
        assert_eq!(tree.all().len(), 1);
    }

    #[test]
    fn test_load_small_batch_falls_back_to_insert() {
        let mut tree = RTree::new(9).unwrap();
        let items: Vec<Point> = (0..3).map(|i| point(i as f64, i as f64)).collect();
        tree.load(items);
        assert_eq!(tree.all().len(), 3);
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_insert_vs_load_height_differs_by_at_most_one() {
        let items: Vec<Point> = (0..48).map(|i| point(i as f64, i as f64)).collect();

        let mut inserted = RTree::new(4).unwrap();
        for item in items.iter().cloned() {
            inserted.insert(item);
        }

        let mut loaded = RTree::new(4).unwrap();
        loaded.load(items);

        let diff = (inserted.height() as i64 - loaded.height() as i64).abs();
        assert!(diff <= 1);
        assert_eq!(inserted.all().len(), loaded.all().len());
    }
}
