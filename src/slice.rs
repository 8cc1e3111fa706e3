//! Index normalisation and slice arithmetic

use crate::error::ListError;

/// A `start:stop:step` slice, with any component omitted.
///
/// Negative bounds count from the end of the list and out of range bounds are
/// clamped, so every slice is valid for every list except one with a step of zero.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Slice {
    /// First position, default `0` (or the last position for a negative step)
    pub start: Option<isize>,
    /// One past the last position, default `len` (or before the first position
    /// for a negative step)
    pub stop: Option<isize>,
    /// Distance between selected positions, default `1`
    pub step: Option<isize>,
}

impl Slice {
    /// Constructs a slice from its three optional components.
    #[must_use]
    pub fn new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Self {
        Self { start, stop, step }
    }

    /// The slice `[:]` selecting every position.
    #[must_use]
    pub fn full() -> Self {
        Self::default()
    }

    /// The slice `[start:stop]`.
    #[must_use]
    pub fn range(start: isize, stop: isize) -> Self {
        Self::new(Some(start), Some(stop), None)
    }

    /// Resolves this slice against a list of length `len`.
    pub(crate) fn indices(&self, len: usize) -> Result<SliceIndices, ListError> {
        let step = match self.step.unwrap_or(1) {
            0 => return Err(ListError::ZeroStep),
            // keep `-step` representable
            isize::MIN => -isize::MAX,
            step => step,
        };
        let len = len as isize;
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |bound: Option<isize>, default: isize| match bound {
            None => default,
            Some(b) if b < 0 => (b + len).max(lower),
            Some(b) => b.min(upper),
        };
        let start = clamp(self.start, if step < 0 { upper } else { lower });
        let stop = clamp(self.stop, if step < 0 { lower } else { upper });

        let count = if step < 0 {
            if stop < start {
                (start - stop - 1) / -step + 1
            } else {
                0
            }
        } else if start < stop {
            (stop - start - 1) / step + 1
        } else {
            0
        };

        Ok(SliceIndices {
            start,
            step,
            len: count as usize,
        })
    }
}

/// A slice resolved against a concrete length: `len` positions starting at
/// `start`, `step` apart. Every position is in bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SliceIndices {
    pub start: isize,
    pub step: isize,
    pub len: usize,
}

impl SliceIndices {
    /// First position as an offset. For an empty unit-step slice this is where
    /// an assignment inserts.
    pub fn first(&self) -> usize {
        self.start.max(0) as usize
    }

    /// Selected positions in slice order.
    pub fn positions(&self) -> impl Iterator<Item = usize> {
        let Self { start, step, len } = *self;
        (0..len).map(move |i| (start + i as isize * step) as usize)
    }

    /// The same positions expressed with a positive step, in ascending order.
    pub fn ascending(&self) -> Self {
        if self.step > 0 || self.len == 0 {
            *self
        } else {
            Self {
                start: self.start + self.step * (self.len as isize - 1),
                step: -self.step,
                len: self.len,
            }
        }
    }
}

/// Applies negative wraparound and bounds checks an index.
pub(crate) fn normalize_index(index: isize, len: usize) -> Result<usize, ListError> {
    let adjusted = if index < 0 {
        index + len as isize
    } else {
        index
    };
    if adjusted < 0 || adjusted as usize >= len {
        Err(ListError::IndexOutOfRange { index, len })
    } else {
        Ok(adjusted as usize)
    }
}

/// Applies negative wraparound and clamps an index into `[0, len]`.
pub(crate) fn clamp_index(index: isize, len: usize) -> usize {
    let len_i = len as isize;
    let adjusted = if index < 0 { index + len_i } else { index };
    adjusted.clamp(0, len_i) as usize
}
