//! Equality, ordering, search and sort
//!
//! Generic comparisons may run arbitrary code that mutates the lists involved,
//! so the loops here fetch one entry at a time and re-check the live length on
//! every step instead of holding a borrow across the call.

use std::cell::Cell;
use std::mem;

use crate::alloc::vec_with_capacity;
use crate::element::Element;
use crate::error::ListError;
use crate::list::IList;
use crate::slice::clamp_index;
use crate::storage::{Entries, Entry};

type Less<'a, T> = dyn FnMut(&T, &T) -> Result<bool, ListError> + 'a;

/// Compares two lists of the same tag without boxing. Returns `None` when the
/// entries need generic comparisons.
fn primitive_eq<V: Element>(a: &Entries<V>, b: &Entries<V>) -> Option<bool> {
    match (a, b) {
        (Entries::Int64(a), Entries::Int64(b)) => Some(a == b),
        (Entries::Float64(a), Entries::Float64(b)) => Some(a == b),
        (Entries::Unset, _) | (_, Entries::Unset) => Some(a.len() == b.len()),
        _ => None,
    }
}

fn entries_equal<V: Element>(a: Entry<V>, b: Entry<V>) -> Result<bool, ListError> {
    match (a, b) {
        (Entry::Int(a), Entry::Int(b)) => Ok(a == b),
        (Entry::Float(a), Entry::Float(b)) => Ok(a == b),
        // Mixed entries are boxed one at a time, only for the comparison
        (a, b) => a.into_boxed()?.equals(&b.into_boxed()?),
    }
}

/// Stable merge sort driven by a fallible strict ordering. The sort works on a
/// permutation of positions and only moves the items once every comparison has
/// succeeded, so on failure the items are left in their original order.
fn merge_sort<T>(items: &mut [T], less: &mut Less<'_, T>) -> Result<(), ListError> {
    let n = items.len();
    if n <= 1 {
        return Ok(());
    }
    let mut order: Vec<usize> = vec_with_capacity(n)?;
    order.extend(0..n);
    let mut scratch: Vec<usize> = vec_with_capacity(n)?;
    scratch.resize(n, 0);
    let mut width = 1;
    while width < n {
        let mut lo = 0;
        while lo < n {
            let mid = (lo + width).min(n);
            let hi = (lo + 2 * width).min(n);
            let (mut i, mut j, mut k) = (lo, mid, lo);
            while i < mid && j < hi {
                // Ties keep the left item first
                if less(&items[order[j]], &items[order[i]])? {
                    scratch[k] = order[j];
                    j += 1;
                } else {
                    scratch[k] = order[i];
                    i += 1;
                }
                k += 1;
            }
            scratch[k..k + mid - i].copy_from_slice(&order[i..mid]);
            k += mid - i;
            scratch[k..hi].copy_from_slice(&order[j..hi]);
            lo = hi;
        }
        mem::swap(&mut order, &mut scratch);
        width *= 2;
    }
    permute(items, &mut order);
    Ok(())
}

/// Rearranges `items` so that position `k` holds what was at `order[k]`.
/// Consumes `order` as scratch space.
fn permute<T>(items: &mut [T], order: &mut [usize]) {
    for start in 0..items.len() {
        let mut pos = start;
        loop {
            let from = order[pos];
            order[pos] = pos;
            if from == start || from == pos {
                break;
            }
            items.swap(pos, from);
            pos = from;
        }
    }
}

thread_local! {
    static COMPARE_DEPTH: Cell<usize> = Cell::new(0);
}

/// Nesting limit for list comparisons, reached by lists that contain
/// themselves.
const MAX_COMPARE_DEPTH: usize = 200;

/// Counts one level of nested list comparison on this thread until dropped.
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Result<Self, ListError> {
        COMPARE_DEPTH.with(|depth| {
            if depth.get() >= MAX_COMPARE_DEPTH {
                return Err(ListError::Comparison(
                    "maximum recursion depth exceeded in comparison".into(),
                ));
            }
            depth.set(depth.get() + 1);
            Ok(DepthGuard)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        COMPARE_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

impl<V: Element> IList<V> {
    fn entry_pair(&self, other: &Self, ix: usize) -> (Option<Entry<V>>, Option<Entry<V>>) {
        (self.entries().entry(ix), other.entries().entry(ix))
    }

    /// Returns `true` if both lists have the same length and their values are
    /// pairwise equal. A list always equals itself.
    pub fn equals(&self, other: &Self) -> Result<bool, ListError> {
        if self.ptr_eq(other) {
            return Ok(true);
        }
        if let Some(eq) = primitive_eq(&self.entries(), &other.entries()) {
            return Ok(eq);
        }
        if self.len() != other.len() {
            return Ok(false);
        }
        let _depth = DepthGuard::enter()?;
        let mut ix = 0;
        loop {
            let (a, b) = match self.entry_pair(other, ix) {
                (Some(a), Some(b)) => (a, b),
                (None, None) => return Ok(true),
                _ => return Ok(false),
            };
            if !entries_equal(a, b)? {
                return Ok(false);
            }
            ix += 1;
        }
    }

    /// Orders lists lexicographically: the first unequal pair decides, and a
    /// proper prefix orders before the longer list.
    pub fn less_than(&self, other: &Self) -> Result<bool, ListError> {
        let _depth = DepthGuard::enter()?;
        let mut ix = 0;
        loop {
            let (a, b) = match self.entry_pair(other, ix) {
                (Some(a), Some(b)) => (a.into_boxed()?, b.into_boxed()?),
                (None, Some(_)) => return Ok(true),
                _ => return Ok(false),
            };
            if !a.equals(&b)? {
                return a.less_than(&b);
            }
            ix += 1;
        }
    }

    /// Finds the first position in `[start, stop)` holding a value equal to
    /// `value`.
    fn find(&self, value: &V, start: usize, stop: usize) -> Result<Option<usize>, ListError> {
        {
            let entries = self.entries();
            let stop = stop.min(entries.len());
            let start = start.min(stop);
            match &*entries {
                Entries::Int64(v) => {
                    if let Some(i) = value.as_i64() {
                        return Ok(v[start..stop].iter().position(|&x| x == i).map(|p| p + start));
                    }
                }
                Entries::Float64(v) => {
                    if let Some(f) = value.as_f64() {
                        return Ok(v[start..stop].iter().position(|&x| x == f).map(|p| p + start));
                    }
                }
                _ => {}
            }
        }
        let mut ix = start;
        while ix < stop {
            let item = match self.entries().entry(ix) {
                Some(item) => item.into_boxed()?,
                None => break,
            };
            if item.equals(value)? {
                return Ok(Some(ix));
            }
            ix += 1;
        }
        Ok(None)
    }

    /// Returns the position of the first value equal to `value` within
    /// `[start, stop)`. Bounds wrap when negative and are clamped to the list.
    /// Without a `stop` the search runs to the live end of the list.
    pub fn index_of(&self, value: &V, start: Option<isize>, stop: Option<isize>) -> Result<usize, ListError> {
        let len = self.len();
        let start = start.map_or(0, |s| clamp_index(s, len));
        let stop = stop.map_or(usize::MAX, |s| clamp_index(s, len));
        self.find(value, start, stop)?.ok_or(ListError::NotFound)
    }

    /// Returns `true` if any value equals `value`.
    pub fn contains(&self, value: &V) -> Result<bool, ListError> {
        Ok(self.find(value, 0, usize::MAX)?.is_some())
    }

    /// Counts the values equal to `value`.
    pub fn count(&self, value: &V) -> Result<usize, ListError> {
        match &*self.entries() {
            Entries::Unset => return Ok(0),
            Entries::Int64(v) => {
                if let Some(i) = value.as_i64() {
                    return Ok(v.iter().filter(|&&x| x == i).count());
                }
            }
            Entries::Float64(v) => {
                if let Some(f) = value.as_f64() {
                    return Ok(v.iter().filter(|&&x| x == f).count());
                }
            }
            Entries::Boxed(_) => {}
        }
        let mut count = 0;
        let mut ix = 0;
        loop {
            let item = match self.entries().entry(ix) {
                Some(item) => item.into_boxed()?,
                None => return Ok(count),
            };
            if item.equals(value)? {
                count += 1;
            }
            ix += 1;
        }
    }

    /// Removes the first value equal to `value`.
    pub fn remove(&self, value: &V) -> Result<(), ListError> {
        let ix = self.find(value, 0, usize::MAX)?.ok_or(ListError::NotFound)?;
        let displaced = self.with_mut(|e| (ix < e.len()).then(|| e.remove(ix)));
        match displaced {
            Some(displaced) => {
                drop(displaced);
                Ok(())
            }
            // The last comparison shrank the list past the match
            None => Err(ListError::NotFound),
        }
    }

    /// Sorts the list in place.
    ///
    /// Unboxed entries sort by raw numeric order, with NaNs last. Boxed entries
    /// use a stable sort over [`Element::less_than`].
    pub fn sort(&self) -> Result<(), ListError> {
        if self.with_mut(Entries::sort_primitive) {
            return Ok(());
        }
        self.sort_with(&mut |a: &V, b: &V| a.less_than(b))
    }

    /// Stable sort by the ordering of `key(value)`. The key function is called
    /// for both operands of every comparison.
    ///
    /// If the key function or a comparison fails, the list is left in its
    /// original order.
    pub fn sort_by_key<F>(&self, mut key: F) -> Result<(), ListError>
    where
        F: FnMut(&V) -> Result<V, ListError>,
    {
        self.sort_with(&mut |a: &V, b: &V| key(a)?.less_than(&key(b)?))
    }

    /// Sorts with the entries moved out of the list, so callbacks see it empty.
    fn sort_with(&self, less: &mut Less<'_, V>) -> Result<(), ListError> {
        let taken = self.with_mut(Entries::clear);
        let tag = taken.tag();
        let (sorted, res) = match taken {
            Entries::Unset => (Entries::Unset, Ok(())),
            Entries::Boxed(mut v) => {
                let res = merge_sort(&mut v, less);
                (Entries::Boxed(v), res)
            }
            Entries::Int64(mut v) => {
                let mut less = |a: &i64, b: &i64| less(&V::from_i64(*a)?, &V::from_i64(*b)?);
                let res = merge_sort(&mut v, &mut less);
                (Entries::Int64(v), res)
            }
            Entries::Float64(mut v) => {
                let mut less = |a: &f64, b: &f64| less(&V::from_f64(*a)?, &V::from_f64(*b)?);
                let res = merge_sort(&mut v, &mut less);
                (Entries::Float64(v), res)
            }
        };
        let interlopers = self.with_mut(|e| std::mem::replace(e, sorted));
        let modified = !interlopers.is_empty() || interlopers.tag() != tag;
        drop(interlopers);
        res?;
        if modified {
            return Err(ListError::ModifiedDuringSort);
        }
        Ok(())
    }
}
