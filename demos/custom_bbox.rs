use boxtree::{BBox, RTree, Spatial};

/// A payload whose coordinate fields don't follow the `min_x`/`min_y` naming the tree
/// uses internally; `Spatial` is the hook that bridges the two.
struct GeoFence {
    min_lng: f64,
    min_lat: f64,
    max_lng: f64,
    max_lat: f64,
}

impl Spatial for GeoFence {
    fn bbox(&self) -> BBox {
        BBox::new(self.min_lng, self.min_lat, self.max_lng, self.max_lat)
            .expect("geofence bounds should already be ordered")
    }
}

fn main() {
    let mut tree: RTree<GeoFence> = RTree::new(4).unwrap();

    tree.load(vec![
        GeoFence { min_lng: -115.0, min_lat: -55.0, max_lng: -110.0, max_lat: -50.0 },
        GeoFence { min_lng: -116.0, min_lat: 40.0, max_lng: -111.0, max_lat: 45.0 },
        GeoFence { min_lng: 10.0, min_lat: 10.0, max_lng: 15.0, max_lat: 15.0 },
        GeoFence { min_lng: 100.0, min_lat: -10.0, max_lng: 105.0, max_lat: -5.0 },
    ]);

    let western_hemisphere = BBox::new(-180.0, -90.0, 0.0, 90.0).unwrap();
    let found = tree.search(&western_hemisphere);
    println!("Fences in the western hemisphere: {}", found.len());
    for fence in found {
        println!("  ({}, {}) - ({}, {})", fence.min_lng, fence.min_lat, fence.max_lng, fence.max_lat);
    }
}
