//! This crate offers a replacement for a plain `Vec` of dynamic values that
//! stores homogeneous runs of numbers unboxed.
//!
//! An [`IList`] holding only integers keeps them as a `Vec<i64>`, one holding only
//! floats keeps a `Vec<f64>`, and anything else is kept as boxed values. Storing
//! a value the current representation cannot hold boxes the whole list, all at
//! once and all-or-nothing.
//!
//! The element type is pluggable through the [`Element`] trait. Comparisons,
//! truth tests and additions on elements may re-enter and mutate the list that
//! invoked them; the list stays consistent when that happens. [`Value`] is a
//! ready-made element type covering the usual dynamic values.
//!
//! ```
//! use ilist::{IList, Tag, Value};
//!
//! let list = IList::<Value>::from(vec![1_i64, 2, 3]);
//! assert_eq!(list.tag(), Tag::Int64);
//!
//! list.push(Value::from("four")).unwrap();
//! assert_eq!(list.tag(), Tag::Boxed);
//! assert_eq!(list.render(), "[1, 2, 3, 'four']");
//! ```
#![deny(missing_docs, missing_debug_implementations)]

mod aggregate;
mod alloc;
mod compare;
mod de;
mod element;
mod error;
mod iter;
mod list;
mod number;
mod ser;
mod slice;
mod storage;
#[cfg(test)]
mod testing;
mod value;

pub use element::Element;
pub use error::{AllocError, ListError};
pub use iter::ListIter;
pub use list::IList;
pub use number::{cmp_bigint_to_f64, cmp_i64_to_f64, eq_i64_f64, format_f64};
pub use slice::Slice;
pub use storage::Tag;
pub use value::Value;

#[cfg(test)]
#[global_allocator]
static ALLOCATOR: mockalloc::Mockalloc<std::alloc::System> = mockalloc::Mockalloc(std::alloc::System);
