//! The payload-to-bounding-box customization hook.

use crate::bbox::BBox;

/// Implemented by any payload type stored in an [`RTree`](crate::rtree::RTree).
///
/// This is the index's single extensibility point (component 4.8 of the design): the tree
/// never inspects a payload except through this method and, optionally, a user-supplied
/// equality predicate passed to `remove_with`. Types that don't naturally carry
/// `min_x`/`min_y`/`max_x`/`max_y` fields can wrap themselves in a newtype and implement
/// `Spatial` with whatever field mapping makes sense (e.g. `min_lng`/`min_lat`).
pub trait Spatial {
    /// Returns the bounding box this payload occupies.
    fn bbox(&self) -> BBox;
}
