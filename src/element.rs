//! The protocol a generic value must speak to be stored in an [`IList`](crate::IList)

use crate::error::ListError;

/// A reference counted generic value that an [`IList`](crate::IList) can box.
///
/// Acquiring a reference is `Clone` and releasing one is `Drop`. Those two, the
/// boxing constructors and the unboxing checks must be cheap and must not touch
/// any list. Every other method may run arbitrary code, including code that
/// mutates the very list currently calling it; lists never hold an internal
/// borrow while calling them.
///
/// The unboxing checks are exact-type: `as_i64` succeeds only for values whose
/// dynamic type is precisely the integer type (and whose magnitude fits in 64
/// bits), never for look-alikes such as booleans or integral floats.
pub trait Element: Clone {
    /// Boxes a raw integer.
    fn from_i64(value: i64) -> Result<Self, ListError>;
    /// Boxes a raw double.
    fn from_f64(value: f64) -> Result<Self, ListError>;
    /// Returns the raw integer if this value is exactly a 64-bit integer.
    fn as_i64(&self) -> Option<i64>;
    /// Returns the raw double if this value is exactly a float.
    fn as_f64(&self) -> Option<f64>;
    /// Generic equality.
    fn equals(&self, other: &Self) -> Result<bool, ListError>;
    /// Generic strict ordering.
    fn less_than(&self, other: &Self) -> Result<bool, ListError>;
    /// Generic boolean conversion.
    fn is_truthy(&self) -> Result<bool, ListError>;
    /// Generic addition, `self + other`.
    fn try_add(&self, other: &Self) -> Result<Self, ListError>;
    /// Diagnostic text for this value.
    fn render(&self) -> String;
}
