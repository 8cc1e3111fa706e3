//! Instrumented element for unit tests

use std::cell::Cell;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use crate::alloc::AllocError;
use crate::element::Element;
use crate::error::ListError;
use crate::number::format_f64;

thread_local! {
    static ACQUIRED: Cell<usize> = Cell::new(0);
    static RELEASED: Cell<usize> = Cell::new(0);
    static BOX_BUDGET: Cell<Option<usize>> = Cell::new(None);
}

/// Number of `Tracked` values currently alive on this thread.
pub(crate) fn live() -> isize {
    ACQUIRED.with(Cell::get) as isize - RELEASED.with(Cell::get) as isize
}

#[derive(Clone, Debug, PartialEq)]
enum Kind {
    Int(i128),
    Float(f64),
    Text(Rc<str>),
}

/// Counts every acquire (construction or clone) and release (drop), and can be
/// made to fail boxing after a number of successful conversions.
pub(crate) struct Tracked(Kind);

impl Tracked {
    fn new(kind: Kind) -> Self {
        ACQUIRED.with(|c| c.set(c.get() + 1));
        Tracked(kind)
    }

    pub fn int(value: i128) -> Self {
        Self::new(Kind::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::new(Kind::Float(value))
    }

    pub fn text(value: &str) -> Self {
        Self::new(Kind::Text(value.into()))
    }

    /// Runs `f` with boxing limited to `budget` successful conversions.
    pub fn with_box_budget<R>(budget: usize, f: impl FnOnce() -> R) -> R {
        BOX_BUDGET.with(|b| b.set(Some(budget)));
        let res = f();
        BOX_BUDGET.with(|b| b.set(None));
        res
    }

    fn spend_budget() -> Result<(), ListError> {
        BOX_BUDGET.with(|b| match b.get() {
            Some(0) => Err(ListError::Alloc(AllocError)),
            Some(n) => {
                b.set(Some(n - 1));
                Ok(())
            }
            None => Ok(()),
        })
    }

    fn number(&self) -> Option<f64> {
        match self.0 {
            Kind::Int(i) => Some(i as f64),
            Kind::Float(f) => Some(f),
            Kind::Text(_) => None,
        }
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        Self::new(self.0.clone())
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        RELEASED.with(|c| c.set(c.get() + 1));
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Debug for Tracked {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Element for Tracked {
    fn from_i64(value: i64) -> Result<Self, ListError> {
        Self::spend_budget()?;
        Ok(Self::int(value.into()))
    }

    fn from_f64(value: f64) -> Result<Self, ListError> {
        Self::spend_budget()?;
        Ok(Self::float(value))
    }

    fn as_i64(&self) -> Option<i64> {
        match self.0 {
            Kind::Int(i) => i64::try_from(i).ok(),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self.0 {
            Kind::Float(f) => Some(f),
            _ => None,
        }
    }

    fn equals(&self, other: &Self) -> Result<bool, ListError> {
        Ok(match (&self.0, &other.0) {
            (Kind::Int(a), Kind::Int(b)) => a == b,
            (Kind::Text(a), Kind::Text(b)) => a == b,
            _ => match (self.number(), other.number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        })
    }

    fn less_than(&self, other: &Self) -> Result<bool, ListError> {
        match (&self.0, &other.0) {
            (Kind::Int(a), Kind::Int(b)) => Ok(a < b),
            (Kind::Text(a), Kind::Text(b)) => Ok(a < b),
            _ => match (self.number(), other.number()) {
                (Some(a), Some(b)) => Ok(a < b),
                _ => Err(ListError::Comparison(format!(
                    "cannot order {} and {}",
                    self.render(),
                    other.render()
                ))),
            },
        }
    }

    fn is_truthy(&self) -> Result<bool, ListError> {
        Ok(match &self.0 {
            Kind::Int(i) => *i != 0,
            Kind::Float(f) => *f != 0.0,
            Kind::Text(s) => !s.is_empty(),
        })
    }

    fn try_add(&self, other: &Self) -> Result<Self, ListError> {
        match (&self.0, &other.0) {
            (Kind::Int(a), Kind::Int(b)) => a
                .checked_add(*b)
                .map(Self::int)
                .ok_or_else(|| ListError::Arithmetic("integer overflow".into())),
            (Kind::Text(a), Kind::Text(b)) => Ok(Self::text(&format!("{}{}", a, b))),
            _ => match (self.number(), other.number()) {
                (Some(a), Some(b)) => Ok(Self::float(a + b)),
                _ => Err(ListError::Arithmetic(format!(
                    "cannot add {} and {}",
                    self.render(),
                    other.render()
                ))),
            },
        }
    }

    fn render(&self) -> String {
        match &self.0 {
            Kind::Int(i) => i.to_string(),
            Kind::Float(f) => format_f64(*f),
            Kind::Text(s) => format!("'{}'", s),
        }
    }
}
