use boxtree::{BBox, RTree, Spatial};

#[derive(Debug, Clone)]
struct City {
    name: &'static str,
    x: f64,
    y: f64,
}

impl Spatial for City {
    fn bbox(&self) -> BBox {
        BBox::from_point(self.x, self.y)
    }
}

fn main() {
    let mut tree: RTree<City> = RTree::new(4).unwrap();

    tree.insert(City { name: "Porto", x: 10.0, y: 20.0 });
    tree.insert(City { name: "Faro", x: 80.0, y: 30.0 });
    tree.insert(City { name: "Braga", x: 45.0, y: 70.0 });
    tree.insert(City { name: "Coimbra", x: 30.0, y: 40.0 });

    println!("Tree height after four inserts: {}", tree.height());

    let region = BBox::new(0.0, 0.0, 50.0, 50.0).unwrap();
    let found = tree.search(&region);
    println!("Cities inside {:?}:", region);
    for city in found {
        println!("  {}", city.name);
    }

    println!("Collides with (200,200)-(210,210)? {}", tree.collides(&BBox::new(200.0, 200.0, 210.0, 210.0).unwrap()));
    println!("Total cities stored: {}", tree.all().len());
}
