//! ## Errors for Boxtree
//!
//! This module defines the error type returned by the fallible operations of the index.

use std::error::Error;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents errors specific to invalid operations or parameters in Boxtree.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum IndexError {
    /// Occurs when an invalid `max_entries` capacity is provided at construction time.
    InvalidCapacity {
        /// The capacity value that was provided.
        capacity: usize,
        /// The minimum capacity accepted by the index.
        minimum: usize,
    },
    /// Occurs when a bounding box has `min > max` on some axis.
    InvalidBBox {
        /// The axis on which the box was malformed (`"x"` or `"y"`).
        axis: &'static str,
        min: f64,
        max: f64,
    },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::InvalidCapacity { capacity, minimum } => {
                write!(
                    f,
                    "invalid capacity: {capacity}, max_entries must be at least {minimum}"
                )
            }
            IndexError::InvalidBBox { axis, min, max } => {
                write!(f, "invalid bbox: {axis} axis has min {min} > max {max}")
            }
        }
    }
}

impl Error for IndexError {}
