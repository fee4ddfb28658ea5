#![cfg(feature = "serde")]

use shared::*;

use anyhow::Result;
use boxtree::RTree;

#[test]
fn test_dump_restore_round_trips_through_bincode() -> Result<()> {
    let mut tree = RTree::new(4).unwrap();
    for p in fixture_48_points() {
        tree.insert(p);
    }

    let dump = tree.dump();
    let encoded: Vec<u8> = bincode::serialize(&dump)?;
    let decoded = bincode::deserialize(&encoded[..])?;
    let restored: RTree<Point> = RTree::restore(decoded);

    assert_eq!(restored.height(), tree.height());
    assert_eq!(restored.all().len(), tree.all().len());
    Ok(())
}

#[test]
fn test_dump_of_fresh_tree_equals_dump_after_clear() -> Result<()> {
    let mut tree = RTree::new(4).unwrap();
    let fresh_dump = tree.dump();
    let fresh_encoded = bincode::serialize(&fresh_dump)?;

    for p in fixture_48_points() {
        tree.insert(p);
    }
    tree.clear();
    let cleared_encoded = bincode::serialize(&tree.dump())?;

    assert_eq!(fresh_encoded, cleared_encoded);
    Ok(())
}

#[test]
fn test_restore_preserves_search_results() -> Result<()> {
    let mut tree = RTree::new(4).unwrap();
    for p in fixture_48_points() {
        tree.insert(p);
    }

    let query = boxtree::BBox::new(10.0, 10.0, 60.0, 60.0).unwrap();
    let before = tree.search(&query).len();

    let encoded = bincode::serialize(&tree.dump())?;
    let decoded = bincode::deserialize(&encoded[..])?;
    let restored: RTree<Point> = RTree::restore(decoded);
    let after = restored.search(&query).len();

    assert_eq!(before, after);
    Ok(())
}
