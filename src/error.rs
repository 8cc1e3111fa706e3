//! Error types for list operations

use thiserror::Error;

pub use crate::alloc::AllocError;
use crate::storage::Tag;

/// Error type for ilist
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ListError {
    /// An index fell outside `[0, len)` after negative wraparound
    #[error("list index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The index as supplied by the caller
        index: isize,
        /// The length of the list at the time of the access
        len: usize,
    },
    /// A value could not be stored in the list's current representation
    #[error("expected {expected:?} entry but found {found:?}")]
    TypeMismatch {
        /// The representation of the list
        expected: Tag,
        /// The representation of the value
        found: Tag,
    },
    /// Extended slice assignment with a replacement of the wrong length
    #[error("attempt to assign sequence of size {found} to extended slice of size {expected}")]
    LengthMismatch {
        /// Number of positions selected by the slice
        expected: usize,
        /// Number of values supplied
        found: usize,
    },
    /// A comparison, truth test or key function failed
    #[error("comparison failed: {0}")]
    Comparison(String),
    /// Generic addition failed
    #[error("arithmetic failed: {0}")]
    Arithmetic(String),
    /// The searched value is not in the list
    #[error("value not in list")]
    NotFound,
    /// A slice was given a step of zero
    #[error("slice step cannot be zero")]
    ZeroStep,
    /// A comparison callback changed the list while it was being sorted
    #[error("list modified during sort")]
    ModifiedDuringSort,
    /// Memory allocation failed
    #[error("memory allocation failed")]
    Alloc(#[from] AllocError),
}
