//! Reductions over a list: `sum`, `any` and `all`

use crate::element::Element;
use crate::error::ListError;
use crate::list::IList;
use crate::storage::{Entries, Entry};

/// Running total of a sum. Stays unboxed while every step is exact, and becomes
/// generic for good as soon as one is not.
enum Accumulator<V> {
    Int(i64),
    Float(f64),
    Generic(V),
}

impl<V: Element> Accumulator<V> {
    fn new(start: Option<V>) -> Self {
        match start {
            None => Accumulator::Int(0),
            Some(v) => match Entry::classify(v) {
                Entry::Int(i) => Accumulator::Int(i),
                Entry::Float(f) => Accumulator::Float(f),
                Entry::Boxed(v) => Accumulator::Generic(v),
            },
        }
    }

    fn into_value(self) -> Result<V, ListError> {
        match self {
            Accumulator::Int(i) => V::from_i64(i),
            Accumulator::Float(f) => V::from_f64(f),
            Accumulator::Generic(v) => Ok(v),
        }
    }

    fn add(self, entry: Entry<V>) -> Result<Self, ListError> {
        match (self, entry) {
            (Accumulator::Int(total), Entry::Int(x)) => match total.checked_add(x) {
                Some(total) => Ok(Accumulator::Int(total)),
                // Carry on with the exact value so far; the generic addition widens it
                None => Ok(Accumulator::Generic(
                    V::from_i64(total)?.try_add(&V::from_i64(x)?)?,
                )),
            },
            (Accumulator::Float(total), Entry::Float(x)) => Ok(Accumulator::Float(total + x)),
            (acc, entry) => Ok(Accumulator::Generic(
                acc.into_value()?.try_add(&entry.into_boxed()?)?,
            )),
        }
    }
}

impl<V: Element> IList<V> {
    /// Adds up the values, starting from `start` (integer zero by default).
    ///
    /// Integer runs are summed natively until a step would overflow, after which
    /// the sum continues through [`Element::try_add`] from the exact running
    /// total, so the result is never wrapped or truncated.
    pub fn sum(&self, start: Option<V>) -> Result<V, ListError> {
        let acc = Accumulator::new(start);
        let (mut acc, mut ix) = {
            let entries = self.entries();
            match (&*entries, acc) {
                (Entries::Int64(v), Accumulator::Int(mut total)) => {
                    let mut ix = 0;
                    for &x in v {
                        match total.checked_add(x) {
                            Some(t) => total = t,
                            None => break,
                        }
                        ix += 1;
                    }
                    (Accumulator::Int(total), ix)
                }
                // An integral start turns into a double as soon as there is a double to add
                (Entries::Float64(v), Accumulator::Int(total)) if !v.is_empty() => (
                    Accumulator::Float(v.iter().fold(total as f64, |a, &x| a + x)),
                    v.len(),
                ),
                (Entries::Float64(v), Accumulator::Float(total)) => (
                    Accumulator::Float(v.iter().fold(total, |a, &x| a + x)),
                    v.len(),
                ),
                (_, acc) => (acc, 0),
            }
        };
        loop {
            let entry = match self.entries().entry(ix) {
                Some(entry) => entry,
                None => break,
            };
            acc = acc.add(entry)?;
            ix += 1;
        }
        acc.into_value()
    }

    /// Returns `true` if any value is truthy.
    pub fn any(&self) -> Result<bool, ListError> {
        match &*self.entries() {
            Entries::Unset => return Ok(false),
            Entries::Int64(v) => return Ok(v.iter().any(|&x| x != 0)),
            Entries::Float64(v) => return Ok(v.iter().any(|&x| x != 0.0)),
            Entries::Boxed(_) => {}
        }
        let mut ix = 0;
        loop {
            let item = match self.entries().entry(ix) {
                Some(item) => item.into_boxed()?,
                None => return Ok(false),
            };
            if item.is_truthy()? {
                return Ok(true);
            }
            ix += 1;
        }
    }

    /// Returns `true` if every value is truthy.
    pub fn all(&self) -> Result<bool, ListError> {
        match &*self.entries() {
            Entries::Unset => return Ok(true),
            Entries::Int64(v) => return Ok(v.iter().all(|&x| x != 0)),
            Entries::Float64(v) => return Ok(v.iter().all(|&x| x != 0.0)),
            Entries::Boxed(_) => {}
        }
        let mut ix = 0;
        loop {
            let item = match self.entries().entry(ix) {
                Some(item) => item.into_boxed()?,
                None => return Ok(true),
            };
            if !item.is_truthy()? {
                return Ok(false);
            }
            ix += 1;
        }
    }
}
