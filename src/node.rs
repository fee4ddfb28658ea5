//! ## Node store and core tree algorithms
//!
//! This module owns the node/entry representation and every algorithm that walks it:
//! choose-subtree descent, quadratic-ish split, STR/OMT bulk packing, remove-and-condense,
//! and the search/collides traversal. The public facade in `rtree.rs` is a thin wrapper
//! around the functions here.

use crate::bbox::BBox;
use tracing::debug;

/// A leaf entry: a payload together with the box it occupies.
#[derive(Debug, Clone)]
pub struct Entry<T> {
    pub bbox: BBox,
    pub payload: T,
}

/// The two shapes a node can take. Modeled as an enum rather than two structs so that
/// `is_leaf` is derivable from the variant instead of tracked separately (and so it can't
/// drift out of sync with the actual child kind).
#[derive(Debug, Clone)]
pub enum NodeChildren<T> {
    Leaf(Vec<Entry<T>>),
    Internal(Vec<Node<T>>),
}

/// A node in the tree: its tight bounding box, its height (0 at leaves), and its children.
#[derive(Debug, Clone)]
pub struct Node<T> {
    pub mbr: BBox,
    pub height: usize,
    pub children: NodeChildren<T>,
}

/// Implemented by both `Entry<T>` and `Node<T>` so the split/packing algorithms below can
/// be written once and reused for leaf children and internal children alike.
trait Boxed {
    fn boxed(&self) -> &BBox;
}

impl<T> Boxed for Entry<T> {
    fn boxed(&self) -> &BBox {
        &self.bbox
    }
}

impl<T> Boxed for Node<T> {
    fn boxed(&self) -> &BBox {
        &self.mbr
    }
}

fn union_of<C: Boxed>(items: &[C]) -> BBox {
    items
        .iter()
        .fold(BBox::empty(), |acc, item| acc.union(item.boxed()))
}

impl<T> Node<T> {
    pub fn empty_leaf() -> Self {
        Node {
            mbr: BBox::empty(),
            height: 0,
            children: NodeChildren::Leaf(Vec::new()),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.height == 0
    }

    pub fn len(&self) -> usize {
        match &self.children {
            NodeChildren::Leaf(v) => v.len(),
            NodeChildren::Internal(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Chooses the child minimizing enlargement (ties broken by smaller area, first-found
/// wins further ties), per the choose-subtree descent shared by single-item insertion and
/// subtree insertion during a bulk-load merge.
fn choose_subtree_index<T>(children: &[Node<T>], bbox: &BBox) -> usize {
    let mut best_index = 0;
    let mut best_enlargement = f64::INFINITY;
    let mut best_area = f64::INFINITY;
    for (i, child) in children.iter().enumerate() {
        let enlargement = child.mbr.enlarged_area_by(bbox);
        let area = child.mbr.area();
        if enlargement < best_enlargement || (enlargement == best_enlargement && area < best_area)
        {
            best_enlargement = enlargement;
            best_area = area;
            best_index = i;
        }
    }
    best_index
}

/// Sums the split margin across every admissible split point of `children`, sorted along
/// the given axis. Leaves `children` sorted by that axis as a side effect.
fn margin_sum<C: Boxed>(children: &mut [C], min_entries: usize, by_x: bool) -> f64 {
    if by_x {
        children.sort_by(|a, b| a.boxed().min_x.partial_cmp(&b.boxed().min_x).unwrap());
    } else {
        children.sort_by(|a, b| a.boxed().min_y.partial_cmp(&b.boxed().min_y).unwrap());
    }
    let count = children.len();
    let mut margin = 0.0;
    for i in min_entries..=(count - min_entries) {
        let left = union_of(&children[..i]);
        let right = union_of(&children[i..]);
        margin += left.margin() + right.margin();
    }
    margin
}

/// Picks the split index minimizing overlap between the two resulting groups, tie-broken
/// by smaller combined area.
fn choose_split_index<C: Boxed>(children: &[C], min_entries: usize) -> usize {
    let count = children.len();
    let mut best_index = min_entries;
    let mut best_overlap = f64::INFINITY;
    let mut best_area = f64::INFINITY;
    for i in min_entries..=(count - min_entries) {
        let left = union_of(&children[..i]);
        let right = union_of(&children[i..]);
        let overlap = left.intersection_area(&right);
        let area = left.area() + right.area();
        if overlap < best_overlap || (overlap == best_overlap && area < best_area) {
            best_overlap = overlap;
            best_area = area;
            best_index = i;
        }
    }
    best_index
}

/// Splits an overflowing group of children into two groups of `[min_entries,
/// count-min_entries]` size, choosing the axis and index per section 4.3.1.
fn split_children<C: Boxed>(mut children: Vec<C>, min_entries: usize) -> (Vec<C>, Vec<C>) {
    let x_margin = margin_sum(&mut children, min_entries, true);
    let y_margin = margin_sum(&mut children, min_entries, false);
    if x_margin <= y_margin {
        children.sort_by(|a, b| a.boxed().min_x.partial_cmp(&b.boxed().min_x).unwrap());
    }
    // else: `margin_sum`'s last pass already left `children` sorted by min_y.
    let idx = choose_split_index(&children, min_entries);
    let right = children.split_off(idx);
    (children, right)
}

/// Splits an overflowing node in place, returning its new sibling. `node` is left holding
/// the first group; the sibling holds the second, at the same height as `node`.
fn split_node<T>(node: &mut Node<T>, min_entries: usize) -> Node<T> {
    match &mut node.children {
        NodeChildren::Leaf(entries) => {
            let taken = std::mem::take(entries);
            let (left, right) = split_children(taken, min_entries);
            debug!(
                left_count = left.len(),
                right_count = right.len(),
                "split leaf node"
            );
            let right_mbr = union_of(&right);
            *entries = left;
            node.mbr = union_of(entries);
            Node {
                mbr: right_mbr,
                height: 0,
                children: NodeChildren::Leaf(right),
            }
        }
        NodeChildren::Internal(children) => {
            let taken = std::mem::take(children);
            let (left, right) = split_children(taken, min_entries);
            debug!(
                left_count = left.len(),
                right_count = right.len(),
                "split internal node"
            );
            let right_mbr = union_of(&right);
            let height = node.height;
            *children = left;
            node.mbr = union_of(children);
            Node {
                mbr: right_mbr,
                height,
                children: NodeChildren::Internal(right),
            }
        }
    }
}

/// Inserts a single leaf entry, descending to height 0. Returns the sibling produced if
/// the node this entry lands in (or one of its ancestors) overflows.
pub fn insert_entry<T>(
    node: &mut Node<T>,
    entry: Entry<T>,
    max_entries: usize,
    min_entries: usize,
) -> Option<Node<T>> {
    node.mbr.extend(&entry.bbox);
    match &mut node.children {
        NodeChildren::Leaf(entries) => {
            entries.push(entry);
            (entries.len() > max_entries).then(|| split_node(node, min_entries))
        }
        NodeChildren::Internal(children) => {
            let idx = choose_subtree_index(children, &entry.bbox);
            let overflow = insert_entry(&mut children[idx], entry, max_entries, min_entries);
            if let Some(sibling) = overflow {
                children.push(sibling);
                if children.len() > max_entries {
                    return Some(split_node(node, min_entries));
                }
            }
            None
        }
    }
}

/// Inserts a whole subtree produced by bulk-load packing, descending only until the
/// current node's children sit at the subtree's level (section 4.3.2).
pub fn insert_subtree<T>(
    node: &mut Node<T>,
    subtree: Node<T>,
    max_entries: usize,
    min_entries: usize,
) -> Option<Node<T>> {
    node.mbr.extend(&subtree.mbr);
    if node.height == subtree.height + 1 {
        match &mut node.children {
            NodeChildren::Internal(children) => {
                children.push(subtree);
                (children.len() > max_entries).then(|| split_node(node, min_entries))
            }
            NodeChildren::Leaf(_) => unreachable!("leaf node cannot host a subtree"),
        }
    } else {
        match &mut node.children {
            NodeChildren::Internal(children) => {
                let idx = choose_subtree_index(children, &subtree.mbr);
                let overflow =
                    insert_subtree(&mut children[idx], subtree, max_entries, min_entries);
                if let Some(sibling) = overflow {
                    children.push(sibling);
                    if children.len() > max_entries {
                        return Some(split_node(node, min_entries));
                    }
                }
                None
            }
            NodeChildren::Leaf(_) => {
                unreachable!("cannot descend below leaf level to place a subtree")
            }
        }
    }
}

/// Explicit-stack quickselect-based tiling used by the OMT packer: partitions `items` so
/// that every contiguous run of `n` elements (after sorting within each such run) forms a
/// tile, without fully sorting the slice.
fn multi_select<T>(items: &mut [Entry<T>], n: usize, by_x: bool) {
    if items.is_empty() {
        return;
    }
    let mut stack = vec![(0usize, items.len() - 1)];
    while let Some((l, r)) = stack.pop() {
        if r <= l || r - l <= n {
            continue;
        }
        let mid = l + (((r - l) as f64 / n as f64 / 2.0).ceil() as usize) * n;
        let target_idx = mid - l;
        let slice = &mut items[l..=r];
        if by_x {
            slice.select_nth_unstable_by(target_idx, |a, b| {
                a.bbox.min_x.partial_cmp(&b.bbox.min_x).unwrap()
            });
        } else {
            slice.select_nth_unstable_by(target_idx, |a, b| {
                a.bbox.min_y.partial_cmp(&b.bbox.min_y).unwrap()
            });
        }
        stack.push((l, mid));
        stack.push((mid, r));
    }
}

/// Builds a standalone, height-balanced subtree from a batch of entries (section 4.4).
pub fn pack<T>(items: Vec<Entry<T>>, max_entries: usize) -> Node<T> {
    pack_level(items, max_entries, None)
}

/// `target_height` is `None` for the top-level call (the height and root fan-out are
/// computed from `items.len()`); recursive calls pass `Some` to keep every level of a
/// single packing pass consistent with that computed height.
fn pack_level<T>(items: Vec<Entry<T>>, max_entries: usize, target_height: Option<usize>) -> Node<T> {
    let n = items.len();
    if n <= max_entries {
        let mbr = union_of(&items);
        return Node {
            mbr,
            height: 0,
            children: NodeChildren::Leaf(items),
        };
    }

    // `height` here is 0-based (leaves are height 0, matching `Node::height`). The
    // classic STR formula `ceil(log_M(n))` computes a 1-based level count, so the
    // 0-based height is one less; the root fan-out still uses the 1-based exponent.
    let (height, root_fanout) = match target_height {
        Some(h) => (h, max_entries),
        None => {
            let levels = (n as f64).log(max_entries as f64).ceil() as usize;
            let height = levels.saturating_sub(1);
            let fanout = (n as f64 / (max_entries as f64).powi(height as i32)).ceil() as usize;
            (height, fanout)
        }
    };

    let n2 = (n as f64 / root_fanout as f64).ceil() as usize;
    let n1 = n2 * (root_fanout as f64).sqrt().ceil() as usize;

    let mut remaining = items;
    multi_select(&mut remaining, n1, true);

    let mut children = Vec::new();
    while !remaining.is_empty() {
        let take1 = n1.min(remaining.len());
        let mut group: Vec<Entry<T>> = remaining.drain(0..take1).collect();
        multi_select(&mut group, n2, false);

        let mut remaining2 = group;
        while !remaining2.is_empty() {
            let take2 = n2.min(remaining2.len());
            let chunk: Vec<Entry<T>> = remaining2.drain(0..take2).collect();
            children.push(pack_level(chunk, max_entries, Some(height - 1)));
        }
    }

    let mbr = union_of(&children);
    Node {
        mbr,
        height,
        children: NodeChildren::Internal(children),
    }
}

/// Recursive depth-first search collecting every entry whose box intersects `query`.
pub fn search_node<'a, T>(node: &'a Node<T>, query: &BBox, out: &mut Vec<&'a T>) {
    if !node.mbr.intersects(query) {
        return;
    }
    match &node.children {
        NodeChildren::Leaf(entries) => {
            for entry in entries {
                if entry.bbox.intersects(query) {
                    out.push(&entry.payload);
                }
            }
        }
        NodeChildren::Internal(children) => {
            for child in children {
                search_node(child, query, out);
            }
        }
    }
}

/// Depth-first search that stops at the first intersecting leaf entry.
pub fn collides_node<T>(node: &Node<T>, query: &BBox) -> bool {
    if !node.mbr.intersects(query) {
        return false;
    }
    match &node.children {
        NodeChildren::Leaf(entries) => entries.iter().any(|entry| entry.bbox.intersects(query)),
        NodeChildren::Internal(children) => children.iter().any(|child| collides_node(child, query)),
    }
}

/// Removes the first entry matching `equals`, condensing the path back to the root.
/// Returns `true` iff an entry was removed. Underflowed (but non-empty) nodes are left
/// as-is: this variant never re-packs by reinsertion on removal (see DESIGN.md).
pub fn remove_entry<T>(
    node: &mut Node<T>,
    item: &T,
    bbox: &BBox,
    equals: &dyn Fn(&T, &T) -> bool,
) -> bool {
    match &mut node.children {
        NodeChildren::Leaf(entries) => {
            if let Some(pos) = entries.iter().position(|e| equals(&e.payload, item)) {
                entries.remove(pos);
                node.mbr = union_of(entries);
                true
            } else {
                false
            }
        }
        NodeChildren::Internal(children) => {
            let mut removed = false;
            let mut drop_index = None;
            for (i, child) in children.iter_mut().enumerate() {
                if !child.mbr.contains(bbox) {
                    continue;
                }
                if remove_entry(child, item, bbox, equals) {
                    removed = true;
                    if child.is_empty() {
                        drop_index = Some(i);
                    }
                    break;
                }
            }
            if let Some(idx) = drop_index {
                children.remove(idx);
            }
            if removed {
                node.mbr = union_of(children);
            }
            removed
        }
    }
}
