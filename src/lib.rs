pub mod bbox;
pub mod dump;
pub mod error;
mod logging;
mod node;
pub mod rtree;
pub mod spatial;

pub use bbox::BBox;
pub use dump::TreeDump;
pub use error::IndexError;
pub use rtree::RTree;
pub use spatial::Spatial;
