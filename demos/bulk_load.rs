use boxtree::{BBox, RTree, Spatial};

#[derive(Debug, Clone, Copy)]
struct Point {
    x: f64,
    y: f64,
}

impl Spatial for Point {
    fn bbox(&self) -> BBox {
        BBox::from_point(self.x, self.y)
    }
}

fn main() {
    let grid: Vec<Point> = (0..48)
        .map(|i| Point {
            x: (i % 8) as f64 * 10.0,
            y: (i / 8) as f64 * 10.0,
        })
        .collect();

    let mut bulk_loaded = RTree::new(4).unwrap();
    bulk_loaded.load(grid.clone());
    println!("Bulk-loaded tree height: {}", bulk_loaded.height());

    let mut inserted_one_by_one = RTree::new(4).unwrap();
    for point in &grid {
        inserted_one_by_one.insert(*point);
    }
    println!("One-by-one tree height: {}", inserted_one_by_one.height());

    let dump = bulk_loaded.dump();
    let encoded = bincode::serialize(&dump).expect("dump should serialize");
    println!("Serialized dump is {} bytes", encoded.len());

    let decoded = bincode::deserialize(&encoded).expect("dump should deserialize");
    let restored: RTree<Point> = RTree::restore(decoded);
    println!("Restored tree holds {} points", restored.all().len());
}
