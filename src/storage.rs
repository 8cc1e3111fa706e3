//! Tagged storage: one backing buffer whose tag decides how every entry is read.
//!
//! `Entries` knows nothing about sharing or re-entrancy; it is the plain
//! representation engine that [`IList`](crate::IList) drives while holding a
//! borrow. Nothing in here calls back into generic comparison or arithmetic:
//! only the boxing constructors and exact-type checks of [`Element`], which are
//! not allowed to touch any list.
//!
//! Operations that displace boxed values hand them back as an `Entries` (or an
//! `Option<V>`) so the caller decides when they are released.

use std::mem;

use crate::alloc::{reserve, vec_with_capacity, AllocError};
use crate::element::Element;
use crate::error::ListError;
use crate::number::total_cmp_f64;
use crate::slice::SliceIndices;

/// Representation currently used by a list
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Tag {
    /// Empty list with no committed representation
    #[default]
    Unset = 0,
    /// List of reference counted generic values
    Boxed = 1,
    /// List of unboxed 64-bit signed integers
    Int64 = 2,
    /// List of unboxed doubles
    Float64 = 3,
}

impl Tag {
    /// Whether entries under this tag are stored unboxed.
    #[must_use]
    pub fn is_primitive(self) -> bool {
        matches!(self, Tag::Int64 | Tag::Float64)
    }
}

/// A single entry, in whichever form the list's tag calls for.
#[derive(Debug)]
pub(crate) enum Entry<V> {
    Int(i64),
    Float(f64),
    Boxed(V),
}

impl<V: Element> Entry<V> {
    /// Classifies a value by its natural representation.
    pub fn classify(value: V) -> Self {
        if let Some(i) = value.as_i64() {
            Entry::Int(i)
        } else if let Some(f) = value.as_f64() {
            Entry::Float(f)
        } else {
            Entry::Boxed(value)
        }
    }

    pub fn tag(&self) -> Tag {
        match self {
            Entry::Int(_) => Tag::Int64,
            Entry::Float(_) => Tag::Float64,
            Entry::Boxed(_) => Tag::Boxed,
        }
    }

    pub fn into_boxed(self) -> Result<V, ListError> {
        match self {
            Entry::Int(i) => V::from_i64(i),
            Entry::Float(f) => V::from_f64(f),
            Entry::Boxed(v) => Ok(v),
        }
    }
}

/// The backing buffer of a list, tagged by representation.
#[derive(Debug)]
pub(crate) enum Entries<V> {
    Unset,
    Boxed(Vec<V>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
}

impl<V> Default for Entries<V> {
    fn default() -> Self {
        Entries::Unset
    }
}

/// Evaluates `$body` against whichever vector backs the entries.
macro_rules! on_vec {
    ($entries:expr, unset => $unset:expr, $vec:ident => $body:expr) => {
        match $entries {
            Entries::Unset => $unset,
            Entries::Boxed($vec) => $body,
            Entries::Int64($vec) => $body,
            Entries::Float64($vec) => $body,
        }
    };
}

/// Maps the backing vector to a new vector under the same tag.
macro_rules! map_vec {
    ($entries:expr, $vec:ident => $body:expr) => {
        match $entries {
            Entries::Unset => Entries::Unset,
            Entries::Boxed($vec) => Entries::Boxed($body),
            Entries::Int64($vec) => Entries::Int64($body),
            Entries::Float64($vec) => Entries::Float64($body),
        }
    };
}

/// Pairs two entries that have already been brought to the same tag. `$wrap`
/// is bound to the matching variant's constructor.
macro_rules! on_pair {
    ($a:expr, $b:expr, ($x:ident, $y:ident, $wrap:ident) => $body:expr) => {
        match ($a, $b) {
            (Entries::Boxed($x), Entries::Boxed($y)) => {
                let $wrap = Self::Boxed;
                $body
            }
            (Entries::Int64($x), Entries::Int64($y)) => {
                let $wrap = Self::Int64;
                $body
            }
            (Entries::Float64($x), Entries::Float64($y)) => {
                let $wrap = Self::Float64;
                $body
            }
            (_, Entries::Unset) => Default::default(),
            (a, b) => {
                return Err(ListError::TypeMismatch {
                    expected: a.tag(),
                    found: b.tag(),
                })
            }
        }
    };
}

fn box_each<T: Copy, V>(
    raw: &[T],
    f: impl Fn(T) -> Result<V, ListError>,
) -> Result<Vec<V>, ListError> {
    // Converted values live in a side buffer until every conversion succeeded;
    // on failure the buffer is dropped and the originals were never touched.
    let mut boxed = vec_with_capacity(raw.len())?;
    for &x in raw {
        boxed.push(f(x)?);
    }
    Ok(boxed)
}

fn copy_vec<T: Clone>(vec: &[T]) -> Result<Vec<T>, AllocError> {
    let mut res = vec_with_capacity(vec.len())?;
    res.extend_from_slice(vec);
    Ok(res)
}

fn take_positions<T: Clone>(vec: &[T], idx: &SliceIndices) -> Result<Vec<T>, AllocError> {
    let mut res = vec_with_capacity(idx.len)?;
    res.extend(idx.positions().map(|i| vec[i].clone()));
    Ok(res)
}

fn delete_positions<T>(vec: &mut Vec<T>, idx: &SliceIndices) -> Vec<T> {
    let idx = idx.ascending();
    if idx.len == 0 {
        return Vec::new();
    }
    let first = idx.first();
    if idx.step == 1 {
        return vec.drain(first..first + idx.len).collect();
    }
    let step = idx.step as usize;
    let last = first + (idx.len - 1) * step;
    // Survivors slide down in order, doomed entries collect at the tail
    let mut write = first;
    for read in first..vec.len() {
        let doomed = read <= last && (read - first) % step == 0;
        if !doomed {
            vec.swap(write, read);
            write += 1;
        }
    }
    vec.split_off(write)
}

fn assign_positions<T>(vec: &mut Vec<T>, idx: &SliceIndices, other: Vec<T>) -> Result<Vec<T>, AllocError> {
    if idx.step == 1 {
        let first = idx.first();
        if other.len() > idx.len {
            reserve(vec, other.len() - idx.len)?;
        }
        Ok(vec.splice(first..first + idx.len, other).collect())
    } else {
        let mut displaced = vec_with_capacity(idx.len)?;
        for (pos, value) in idx.positions().zip(other) {
            displaced.push(mem::replace(&mut vec[pos], value));
        }
        Ok(displaced)
    }
}

fn repeat_vec<T: Clone>(vec: &[T], n: usize) -> Result<Vec<T>, AllocError> {
    let total = vec.len().checked_mul(n).ok_or(AllocError)?;
    let mut res = vec_with_capacity(total)?;
    // One clone per logical copy of every entry
    for _ in 0..n {
        res.extend_from_slice(vec);
    }
    Ok(res)
}

fn repeat_vec_in_place<T: Clone>(vec: &mut Vec<T>, n: usize) -> Result<(), AllocError> {
    let len = vec.len();
    let total = len.checked_mul(n).ok_or(AllocError)?;
    reserve(vec, total - len)?;
    for _ in 1..n {
        vec.extend_from_within(..len);
    }
    Ok(())
}

impl<V: Element> Entries<V> {
    pub fn empty(tag: Tag) -> Self {
        match tag {
            Tag::Unset => Entries::Unset,
            Tag::Boxed => Entries::Boxed(Vec::new()),
            Tag::Int64 => Entries::Int64(Vec::new()),
            Tag::Float64 => Entries::Float64(Vec::new()),
        }
    }

    pub fn tag(&self) -> Tag {
        match self {
            Entries::Unset => Tag::Unset,
            Entries::Boxed(_) => Tag::Boxed,
            Entries::Int64(_) => Tag::Int64,
            Entries::Float64(_) => Tag::Float64,
        }
    }

    pub fn len(&self) -> usize {
        on_vec!(self, unset => 0, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        on_vec!(self, unset => 0, v => v.capacity())
    }

    pub fn reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        on_vec!(self, unset => Ok(()), v => reserve(v, additional))
    }

    pub fn reverse(&mut self) {
        on_vec!(self, unset => (), v => v.reverse())
    }

    /// An independent copy sharing boxed values with the original.
    pub fn try_clone(&self) -> Result<Self, AllocError> {
        Ok(map_vec!(self, v => copy_vec(v)?))
    }

    /// Empties the list, keeping its tag, and returns the old contents.
    pub fn clear(&mut self) -> Self {
        let tag = self.tag();
        mem::replace(self, Self::empty(tag))
    }

    /// Reads an entry without boxing it.
    pub fn entry(&self, ix: usize) -> Option<Entry<V>> {
        match self {
            Entries::Unset => None,
            Entries::Boxed(v) => v.get(ix).cloned().map(Entry::Boxed),
            Entries::Int64(v) => v.get(ix).copied().map(Entry::Int),
            Entries::Float64(v) => v.get(ix).copied().map(Entry::Float),
        }
    }

    /// Reads an entry as a boxed value.
    pub fn get(&self, ix: usize) -> Result<V, ListError> {
        self.entry(ix)
            .ok_or(ListError::IndexOutOfRange {
                index: ix as isize,
                len: self.len(),
            })?
            .into_boxed()
    }

    /// Converts every entry to a boxed value. Either every entry is converted
    /// or the list is left exactly as it was.
    pub fn box_all(&mut self) -> Result<(), ListError> {
        let boxed = match self {
            Entries::Boxed(_) => return Ok(()),
            Entries::Unset => Vec::new(),
            Entries::Int64(v) => box_each(v, V::from_i64)?,
            Entries::Float64(v) => box_each(v, V::from_f64)?,
        };
        *self = Entries::Boxed(boxed);
        Ok(())
    }

    /// Consumes the entries and returns them as boxed values.
    pub fn into_boxed(self) -> Result<Vec<V>, ListError> {
        match self {
            Entries::Unset => Ok(Vec::new()),
            Entries::Boxed(v) => Ok(v),
            Entries::Int64(v) => box_each(&v, V::from_i64),
            Entries::Float64(v) => box_each(&v, V::from_f64),
        }
    }

    /// Decides how `value` will be stored, committing or boxing the list first
    /// when its current representation cannot hold it.
    pub fn dispatch(&mut self, value: V) -> Result<Entry<V>, ListError> {
        match self {
            Entries::Unset => {
                let entry = Entry::classify(value);
                *self = Self::empty(entry.tag());
                Ok(entry)
            }
            Entries::Boxed(_) => Ok(Entry::Boxed(value)),
            Entries::Int64(_) => match value.as_i64() {
                Some(i) => Ok(Entry::Int(i)),
                None => {
                    self.box_all()?;
                    Ok(Entry::Boxed(value))
                }
            },
            Entries::Float64(_) => match value.as_f64() {
                Some(f) => Ok(Entry::Float(f)),
                None => {
                    self.box_all()?;
                    Ok(Entry::Boxed(value))
                }
            },
        }
    }

    /// Overwrites an in-bounds position. Returns the displaced boxed value.
    pub fn set(&mut self, ix: usize, value: V) -> Result<Option<V>, ListError> {
        let entry = self.dispatch(value)?;
        let expected = self.tag();
        match (&mut *self, entry) {
            (Entries::Boxed(v), Entry::Boxed(x)) => Ok(Some(mem::replace(&mut v[ix], x))),
            (Entries::Int64(v), Entry::Int(x)) => {
                v[ix] = x;
                Ok(None)
            }
            (Entries::Float64(v), Entry::Float(x)) => {
                v[ix] = x;
                Ok(None)
            }
            (_, entry) => Err(ListError::TypeMismatch {
                expected,
                found: entry.tag(),
            }),
        }
    }

    /// Inserts at a position in `[0, len]`.
    pub fn insert(&mut self, ix: usize, value: V) -> Result<(), ListError> {
        let entry = self.dispatch(value)?;
        let expected = self.tag();
        match (&mut *self, entry) {
            (Entries::Boxed(v), Entry::Boxed(x)) => {
                reserve(v, 1)?;
                v.insert(ix, x);
            }
            (Entries::Int64(v), Entry::Int(x)) => {
                reserve(v, 1)?;
                v.insert(ix, x);
            }
            (Entries::Float64(v), Entry::Float(x)) => {
                reserve(v, 1)?;
                v.insert(ix, x);
            }
            (_, entry) => {
                return Err(ListError::TypeMismatch {
                    expected,
                    found: entry.tag(),
                })
            }
        }
        Ok(())
    }

    pub fn push(&mut self, value: V) -> Result<(), ListError> {
        self.insert(self.len(), value)
    }

    /// Removes an in-bounds position, returning the displaced boxed value.
    pub fn remove(&mut self, ix: usize) -> Option<V> {
        match self {
            Entries::Unset => None,
            Entries::Boxed(v) => Some(v.remove(ix)),
            Entries::Int64(v) => {
                v.remove(ix);
                None
            }
            Entries::Float64(v) => {
                v.remove(ix);
                None
            }
        }
    }

    /// Removes an in-bounds position and returns it boxed. The entry is boxed
    /// before it is removed, so a failed boxing leaves the list unchanged.
    pub fn pop(&mut self, ix: usize) -> Result<V, ListError> {
        let value = self.get(ix)?;
        self.remove(ix);
        Ok(value)
    }

    /// Brings `other` to a representation that can be appended to `self`,
    /// boxing one or both sides when their tags disagree. Only `Unset` adopts
    /// another tag; a committed tag is never replaced by a different primitive.
    pub fn conform(&mut self, other: Self) -> Result<Self, ListError> {
        if other.is_empty() {
            return Ok(Self::empty(self.tag()));
        }
        match (self.tag(), other.tag()) {
            (Tag::Unset, tag) => {
                *self = Self::empty(tag);
                Ok(other)
            }
            (a, b) if a == b => Ok(other),
            _ => {
                let other = Entries::Boxed(other.into_boxed()?);
                self.box_all()?;
                Ok(other)
            }
        }
    }

    pub fn append(&mut self, other: Self) -> Result<(), ListError> {
        let other = self.conform(other)?;
        on_pair!(&mut *self, other, (a, b, _wrap) => {
            reserve(a, b.len())?;
            a.extend(b);
        });
        Ok(())
    }

    pub fn slice(&self, idx: &SliceIndices) -> Result<Self, AllocError> {
        Ok(map_vec!(self, v => take_positions(v, idx)?))
    }

    /// Deletes the selected positions, keeping survivors in order. Returns the
    /// removed entries.
    pub fn delete_slice(&mut self, idx: &SliceIndices) -> Self {
        map_vec!(self, v => delete_positions(v, idx))
    }

    /// Replaces the selected positions with `other`. A unit step replaces the
    /// run with however many values `other` holds; any other step requires
    /// exactly one value per position. Returns the displaced entries.
    pub fn assign_slice(&mut self, idx: &SliceIndices, other: Self) -> Result<Self, ListError> {
        if idx.step != 1 && other.len() != idx.len {
            return Err(ListError::LengthMismatch {
                expected: idx.len,
                found: other.len(),
            });
        }
        if idx.len == 0 && other.is_empty() {
            return Ok(Self::empty(self.tag()));
        }
        let other = self.conform(other)?;
        Ok(on_pair!(&mut *self, other, (a, b, wrap) => {
            wrap(assign_positions(a, idx, b)?)
        }))
    }

    pub fn repeat(&self, n: usize) -> Result<Self, AllocError> {
        Ok(map_vec!(self, v => repeat_vec(v, n)?))
    }

    /// Repeats in place. Repeating zero times clears the list and returns the
    /// removed entries.
    pub fn repeat_in_place(&mut self, n: usize) -> Result<Self, AllocError> {
        if n == 0 {
            return Ok(self.clear());
        }
        on_vec!(self, unset => Ok(()), v => repeat_vec_in_place(v, n))?;
        Ok(Self::empty(self.tag()))
    }

    /// Sorts unboxed entries by raw numeric order. Returns `false` for boxed
    /// entries, which need generic comparisons.
    pub fn sort_primitive(&mut self) -> bool {
        match self {
            Entries::Unset => true,
            Entries::Boxed(_) => false,
            Entries::Int64(v) => {
                v.sort_unstable();
                true
            }
            Entries::Float64(v) => {
                v.sort_unstable_by(total_cmp_f64);
                true
            }
        }
    }
}
