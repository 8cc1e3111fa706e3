//! Functionality specific to the shared list handle

use std::cell::{Ref, RefCell};
use std::fmt::{self, Debug, Display, Formatter};
use std::rc::Rc;

use hashbrown::HashSet;

use crate::alloc::{vec_with_capacity, AllocError};
use crate::element::Element;
use crate::error::ListError;
use crate::number::format_f64;
use crate::slice::{clamp_index, normalize_index, Slice};
use crate::storage::{Entries, Entry, Tag};

/// The `IList` type is a mutable, ordered sequence of generic values that stores
/// runs of integers or floats unboxed.
///
/// A list starts out `Unset` and commits to a representation ([`Tag`]) when the
/// first value arrives: `Int64` for integers, `Float64` for floats and `Boxed`
/// for anything else. Storing a value that the current representation cannot
/// hold boxes every entry first. Boxing is all-or-nothing, and a list never
/// unboxes on its own.
///
/// `IList` is a shared handle: cloning it gives another handle to the same list,
/// like taking a new reference. Use [`IList::copy`] for an independent list.
/// Every method takes `&self`, and the comparison, truth and addition callbacks
/// of [`Element`] are always invoked without the list borrowed, so those
/// callbacks are free to mutate the list they are being called from.
pub struct IList<V>(Rc<RefCell<Entries<V>>>);

impl<V> Clone for IList<V> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

thread_local! {
    static VISITING: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

/// Marks a list as being walked (rendered or serialized) on this thread until
/// dropped.
pub(crate) struct VisitGuard(usize);

impl Drop for VisitGuard {
    fn drop(&mut self) {
        VISITING.with(|active| {
            let mut active = active.borrow_mut();
            active.remove(&self.0);
            if active.is_empty() {
                *active = HashSet::new();
            }
        });
    }
}

impl<V: Element> IList<V> {
    /// Constructs a new empty `IList`. Does not allocate.
    #[must_use]
    pub fn new() -> Self {
        Self::from_entries(Entries::Unset)
    }

    pub(crate) fn from_entries(entries: Entries<V>) -> Self {
        Self(Rc::new(RefCell::new(entries)))
    }

    /// Constructs a list from a sequence of values, committing to the narrowest
    /// representation that holds all of them.
    pub fn try_from_iter<I: IntoIterator<Item = V>>(iter: I) -> Result<Self, ListError> {
        Ok(Self::from_entries(stage(iter)?))
    }

    /// Constructs an `Int64` list holding `start`, `start + step`, ... up to but
    /// excluding `stop`.
    pub fn range(start: i64, stop: i64, step: i64) -> Result<Self, ListError> {
        if step == 0 {
            return Err(ListError::ZeroStep);
        }
        let (start, stop, step) = (i128::from(start), i128::from(stop), i128::from(step));
        let count = if step > 0 && start < stop {
            (stop - start - 1) / step + 1
        } else if step < 0 && stop < start {
            (start - stop - 1) / -step + 1
        } else {
            0
        };
        let count = usize::try_from(count).map_err(|_| AllocError)?;
        let mut values = vec_with_capacity(count)?;
        values.extend((0..count as i128).map(|i| (start + i * step) as i64));
        Ok(Self::from_entries(Entries::Int64(values)))
    }

    /// Constructs an `Int64` list of `len` zeros.
    pub fn zeros(len: usize) -> Result<Self, ListError> {
        let mut values = vec_with_capacity(len)?;
        values.resize(len, 0);
        Ok(Self::from_entries(Entries::Int64(values)))
    }

    /// Marks the list as being walked. Returns `None` if it already is, which
    /// means the list contains itself.
    pub(crate) fn visit(&self) -> Option<VisitGuard> {
        let addr = Rc::as_ptr(&self.0) as usize;
        VISITING
            .with(|active| active.borrow_mut().insert(addr))
            .then(|| VisitGuard(addr))
    }

    pub(crate) fn entries(&self) -> Ref<'_, Entries<V>> {
        self.0.borrow()
    }

    /// Runs `f` with the entries mutably borrowed. `f` must not call back into
    /// any generic protocol other than boxing and the unboxing checks.
    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut Entries<V>) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    /// Returns the number of values in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns `true` if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the representation currently used by the list.
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.entries().tag()
    }

    /// Returns the capacity of the backing buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries().capacity()
    }

    /// Reserves space for at least `additional` more values. An `Unset` list
    /// has no buffer to grow yet and ignores the request.
    pub fn reserve(&self, additional: usize) -> Result<(), ListError> {
        Ok(self.with_mut(|e| e.reserve(additional))?)
    }

    /// Returns `true` if both handles refer to the same list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Returns the value at `index`, boxed. Negative indices count from the end.
    pub fn get(&self, index: isize) -> Result<V, ListError> {
        let entries = self.entries();
        entries.get(normalize_index(index, entries.len())?)
    }

    /// Overwrites the value at `index`, boxing the list if the new value does
    /// not fit its representation.
    pub fn set(&self, index: isize, value: V) -> Result<(), ListError> {
        let displaced = self.with_mut(|e| {
            let ix = normalize_index(index, e.len())?;
            e.set(ix, value)
        })?;
        drop(displaced);
        Ok(())
    }

    /// Removes the value at `index`.
    pub fn delete(&self, index: isize) -> Result<(), ListError> {
        let displaced = self.with_mut(|e| {
            let ix = normalize_index(index, e.len())?;
            Ok::<_, ListError>(e.remove(ix))
        })?;
        drop(displaced);
        Ok(())
    }

    /// Appends a value to the end of the list.
    pub fn push(&self, value: V) -> Result<(), ListError> {
        self.with_mut(|e| e.push(value))
    }

    /// Inserts a value before `index`. Out of range indices are clamped, so this
    /// never fails on the index.
    pub fn insert(&self, index: isize, value: V) -> Result<(), ListError> {
        self.with_mut(|e| {
            let ix = clamp_index(index, e.len());
            e.insert(ix, value)
        })
    }

    /// Removes and returns the value at `index`, or the last value when no index
    /// is given.
    pub fn pop(&self, index: Option<isize>) -> Result<V, ListError> {
        self.with_mut(|e| {
            let ix = normalize_index(index.unwrap_or(-1), e.len())?;
            e.pop(ix)
        })
    }

    /// Appends every value yielded by `iter`. The values are gathered first, so
    /// if any of them cannot be stored the list is left unchanged.
    pub fn extend<I: IntoIterator<Item = V>>(&self, iter: I) -> Result<(), ListError> {
        let staged = stage(iter)?;
        self.with_mut(|e| e.append(staged))
    }

    /// Appends every value of `other`, which may be this same list.
    pub fn extend_from_list(&self, other: &Self) -> Result<(), ListError> {
        let snapshot = other.entries().try_clone()?;
        self.with_mut(|e| e.append(snapshot))
    }

    /// Returns a new list holding the values selected by `slice`.
    pub fn get_slice(&self, slice: Slice) -> Result<Self, ListError> {
        let entries = self.entries();
        let idx = slice.indices(entries.len())?;
        Ok(Self::from_entries(entries.slice(&idx)?))
    }

    /// Replaces the values selected by `slice` with the values from `iter`.
    ///
    /// With a step of one the selected run may be replaced by any number of
    /// values. Otherwise exactly one value per selected position is required.
    pub fn set_slice<I: IntoIterator<Item = V>>(&self, slice: Slice, iter: I) -> Result<(), ListError> {
        let staged = stage(iter)?;
        self.assign_slice(slice, staged)
    }

    /// Replaces the values selected by `slice` with the values of `other`, which
    /// may be this same list.
    pub fn set_slice_from_list(&self, slice: Slice, other: &Self) -> Result<(), ListError> {
        let snapshot = other.entries().try_clone()?;
        self.assign_slice(slice, snapshot)
    }

    fn assign_slice(&self, slice: Slice, other: Entries<V>) -> Result<(), ListError> {
        let displaced = self.with_mut(|e| {
            let idx = slice.indices(e.len())?;
            e.assign_slice(&idx, other)
        })?;
        drop(displaced);
        Ok(())
    }

    /// Removes the values selected by `slice`.
    pub fn delete_slice(&self, slice: Slice) -> Result<(), ListError> {
        let displaced = self.with_mut(|e| {
            let idx = slice.indices(e.len())?;
            Ok::<_, ListError>(e.delete_slice(&idx))
        })?;
        drop(displaced);
        Ok(())
    }

    /// Returns a new list holding the values of `self` followed by those of `other`.
    pub fn concat(&self, other: &Self) -> Result<Self, ListError> {
        let res = self.copy()?;
        res.extend_from_list(other)?;
        Ok(res)
    }

    /// Returns a new list holding `n` back to back copies of this one. A
    /// non-positive `n` gives an empty list with the same representation.
    pub fn repeat(&self, n: isize) -> Result<Self, ListError> {
        let repeated = self.entries().repeat(n.max(0) as usize)?;
        Ok(Self::from_entries(repeated))
    }

    /// Appends every value of `other` in place.
    pub fn concat_in_place(&self, other: &Self) -> Result<(), ListError> {
        self.extend_from_list(other)
    }

    /// Repeats the contents `n` times in place. A non-positive `n` clears the list.
    pub fn repeat_in_place(&self, n: isize) -> Result<(), ListError> {
        let displaced = self.with_mut(|e| e.repeat_in_place(n.max(0) as usize))?;
        drop(displaced);
        Ok(())
    }

    /// Removes every value, keeping the representation.
    pub fn clear(&self) {
        let displaced = self.with_mut(Entries::clear);
        drop(displaced);
    }

    /// Reverses the list in place.
    pub fn reverse(&self) {
        self.with_mut(Entries::reverse);
    }

    /// Returns an independent copy. Boxed values are shared with this list.
    pub fn copy(&self) -> Result<Self, ListError> {
        let entries = self.entries().try_clone()?;
        Ok(Self::from_entries(entries))
    }

    /// Returns every value, boxed.
    pub fn to_vec(&self) -> Result<Vec<V>, ListError> {
        let snapshot = self.entries().try_clone()?;
        snapshot.into_boxed()
    }

    /// Renders the list as `[a, b, c]`. A list that contains itself renders the
    /// inner occurrence as `[...]`.
    pub fn render(&self) -> String {
        let guard = match self.visit() {
            Some(guard) => guard,
            None => return "[...]".into(),
        };
        let mut res = String::from("[");
        let mut ix = 0;
        // The list may change while boxed values render, so re-read every step
        loop {
            let entry = match self.entries().entry(ix) {
                Some(entry) => entry,
                None => break,
            };
            if ix > 0 {
                res.push_str(", ");
            }
            match entry {
                Entry::Int(i) => res.push_str(&i.to_string()),
                Entry::Float(f) => res.push_str(&format_f64(f)),
                Entry::Boxed(v) => res.push_str(&v.render()),
            }
            ix += 1;
        }
        res.push(']');
        drop(guard);
        res
    }
}

/// Gathers values into private entries, committing to a representation the same
/// way a list does.
fn stage<V: Element, I: IntoIterator<Item = V>>(iter: I) -> Result<Entries<V>, ListError> {
    let mut iter = iter.into_iter();
    let mut staged = Entries::Unset;
    if let Some(first) = iter.next() {
        staged.push(first)?;
        staged.reserve(iter.size_hint().0)?;
        for value in iter {
            staged.push(value)?;
        }
    }
    Ok(staged)
}

impl<V: Element> Default for IList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Element> Display for IList<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<V: Element> Debug for IList<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "IList({})", self.render())
    }
}

macro_rules! from_vec_impl {
    ($(($ty:ty, $variant:ident)),*) => {
        $(impl<V: Element> From<Vec<$ty>> for IList<V> {
            fn from(other: Vec<$ty>) -> Self {
                Self::from_entries(Entries::$variant(other))
            }
        }

        impl<V: Element> From<&[$ty]> for IList<V> {
            fn from(other: &[$ty]) -> Self {
                Self::from_entries(Entries::$variant(other.to_vec()))
            }
        })*
    };
}

from_vec_impl!((i64, Int64), (f64, Float64));
