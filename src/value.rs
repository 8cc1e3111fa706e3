//! A ready-made dynamic value type that can be stored in an [`IList`]

use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::element::Element;
use crate::error::ListError;
use crate::list::IList;
use crate::number::{cmp_bigint_to_f64, cmp_i64_to_f64, format_f64};

/// A dynamically typed, reference counted value.
///
/// Cloning a `Value` shares its payload. Integers that fit in 64 bits are always
/// stored as [`Value::Int`]; [`Value::Long`] only ever holds integers outside that
/// range, which is what makes `as_i64` an exact check.
///
/// Booleans take part in arithmetic and comparisons as `0` and `1`, but are never
/// stored unboxed.
#[derive(Clone, Default)]
pub enum Value {
    /// The absent value
    #[default]
    None,
    /// A boolean
    Bool(bool),
    /// An integer that fits in 64 bits
    Int(i64),
    /// An integer too large for 64 bits
    Long(Rc<BigInt>),
    /// A double
    Float(f64),
    /// A string
    Str(Rc<str>),
    /// An immutable sequence
    Tuple(Rc<[Value]>),
    /// A mutable list, shared by reference
    List(IList<Value>),
}

/// Numeric view of a value.
#[derive(Copy, Clone)]
enum Num<'a> {
    Int(i64),
    Big(&'a BigInt),
    Float(f64),
}

fn num_cmp(a: Num<'_>, b: Num<'_>) -> Option<Ordering> {
    match (a, b) {
        (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
        (Num::Int(a), Num::Big(b)) => Some(BigInt::from(a).cmp(b)),
        (Num::Big(a), Num::Int(b)) => Some(a.cmp(&BigInt::from(b))),
        (Num::Big(a), Num::Big(b)) => Some(a.cmp(b)),
        (Num::Int(a), Num::Float(b)) => cmp_i64_to_f64(a, b),
        (Num::Float(a), Num::Int(b)) => cmp_i64_to_f64(b, a).map(Ordering::reverse),
        (Num::Big(a), Num::Float(b)) => cmp_bigint_to_f64(a, b),
        (Num::Float(a), Num::Big(b)) => cmp_bigint_to_f64(b, a).map(Ordering::reverse),
        (Num::Float(a), Num::Float(b)) => a.partial_cmp(&b),
    }
}

fn big_to_f64(value: &BigInt) -> Result<f64, ListError> {
    value
        .to_f64()
        .filter(|f| f.is_finite())
        .ok_or_else(|| ListError::Arithmetic("int too large to convert to float".into()))
}

fn num_add(a: Num<'_>, b: Num<'_>) -> Result<Value, ListError> {
    Ok(match (a, b) {
        (Num::Int(a), Num::Int(b)) => match a.checked_add(b) {
            Some(sum) => Value::Int(sum),
            None => Value::long(BigInt::from(a) + BigInt::from(b)),
        },
        (Num::Int(a), Num::Big(b)) | (Num::Big(b), Num::Int(a)) => Value::long(b + BigInt::from(a)),
        (Num::Big(a), Num::Big(b)) => Value::long(a + b),
        (Num::Float(a), Num::Float(b)) => Value::Float(a + b),
        (Num::Float(a), Num::Int(b)) | (Num::Int(b), Num::Float(a)) => Value::Float(a + b as f64),
        (Num::Float(a), Num::Big(b)) | (Num::Big(b), Num::Float(a)) => Value::Float(a + big_to_f64(b)?),
    })
}

fn render_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut res = String::with_capacity(s.len() + 2);
    res.push(quote);
    for c in s.chars() {
        match c {
            '\\' => res.push_str("\\\\"),
            '\n' => res.push_str("\\n"),
            '\r' => res.push_str("\\r"),
            '\t' => res.push_str("\\t"),
            c if c == quote => {
                res.push('\\');
                res.push(c);
            }
            c => res.push(c),
        }
    }
    res.push(quote);
    res
}

fn tuples_equal(a: &[Value], b: &[Value]) -> Result<bool, ListError> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (x, y) in a.iter().zip(b) {
        if !x.equals(y)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn tuple_less_than(a: &[Value], b: &[Value]) -> Result<bool, ListError> {
    for (x, y) in a.iter().zip(b) {
        if !x.equals(y)? {
            return x.less_than(y);
        }
    }
    Ok(a.len() < b.len())
}

impl Value {
    /// Wraps an arbitrary precision integer, demoting it to [`Value::Int`] when it
    /// fits in 64 bits.
    #[must_use]
    pub fn long(value: BigInt) -> Self {
        match value.to_i64() {
            Some(i) => Value::Int(i),
            None => Value::Long(Rc::new(value)),
        }
    }

    /// Builds a tuple from a sequence of values.
    pub fn tuple<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    /// Builds a list value from a sequence of values.
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Result<Self, ListError> {
        Ok(Value::List(IList::try_from_iter(items)?))
    }

    /// Name of the value's dynamic type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::Long(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
        }
    }

    fn as_num(&self) -> Option<Num<'_>> {
        match self {
            Value::Bool(b) => Some(Num::Int(i64::from(*b))),
            Value::Int(i) => Some(Num::Int(*i)),
            Value::Long(b) => Some(Num::Big(b)),
            Value::Float(f) => Some(Num::Float(*f)),
            _ => None,
        }
    }

    fn unsupported(&self, op: &str, other: &Self) -> String {
        format!(
            "'{}' not supported between instances of '{}' and '{}'",
            op,
            self.type_name(),
            other.type_name()
        )
    }
}

impl Element for Value {
    fn from_i64(value: i64) -> Result<Self, ListError> {
        Ok(Value::Int(value))
    }

    fn from_f64(value: f64) -> Result<Self, ListError> {
        Ok(Value::Float(value))
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn equals(&self, other: &Self) -> Result<bool, ListError> {
        if let (Some(a), Some(b)) = (self.as_num(), other.as_num()) {
            return Ok(num_cmp(a, b) == Some(Ordering::Equal));
        }
        match (self, other) {
            (Value::None, Value::None) => Ok(true),
            (Value::Str(a), Value::Str(b)) => Ok(a == b),
            (Value::Tuple(a), Value::Tuple(b)) => {
                if Rc::ptr_eq(a, b) {
                    Ok(true)
                } else {
                    tuples_equal(a, b)
                }
            }
            (Value::List(a), Value::List(b)) => a.equals(b),
            _ => Ok(false),
        }
    }

    fn less_than(&self, other: &Self) -> Result<bool, ListError> {
        if let (Some(a), Some(b)) = (self.as_num(), other.as_num()) {
            return Ok(num_cmp(a, b) == Some(Ordering::Less));
        }
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(a < b),
            (Value::Tuple(a), Value::Tuple(b)) => tuple_less_than(a, b),
            (Value::List(a), Value::List(b)) => a.less_than(b),
            _ => Err(ListError::Comparison(self.unsupported("<", other))),
        }
    }

    fn is_truthy(&self) -> Result<bool, ListError> {
        Ok(match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Long(b) => !b.is_zero(),
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Tuple(t) => !t.is_empty(),
            Value::List(l) => !l.is_empty(),
        })
    }

    fn try_add(&self, other: &Self) -> Result<Self, ListError> {
        if let (Some(a), Some(b)) = (self.as_num(), other.as_num()) {
            return num_add(a, b);
        }
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b).into())),
            (Value::Tuple(a), Value::Tuple(b)) => {
                Ok(Value::tuple(a.iter().chain(b.iter()).cloned()))
            }
            (Value::List(a), Value::List(b)) => Ok(Value::List(a.concat(b)?)),
            _ => Err(ListError::Arithmetic(format!(
                "unsupported operand type(s) for +: '{}' and '{}'",
                self.type_name(),
                other.type_name()
            ))),
        }
    }

    fn render(&self) -> String {
        match self {
            Value::None => "None".into(),
            Value::Bool(true) => "True".into(),
            Value::Bool(false) => "False".into(),
            Value::Int(i) => i.to_string(),
            Value::Long(b) => b.to_string(),
            Value::Float(f) => format_f64(*f),
            Value::Str(s) => render_str(s),
            Value::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(Element::render).collect();
                if parts.len() == 1 {
                    format!("({},)", parts[0])
                } else {
                    format!("({})", parts.join(", "))
                }
            }
            Value::List(list) => list.render(),
        }
    }
}

/// Structural equality through [`Element::equals`]; a failed comparison counts
/// as unequal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other).unwrap_or(false)
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

macro_rules! from_int_impl {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::Int(v.into())
            }
        })*
    };
}

from_int_impl!(i8, u8, i16, u16, i32, u32, i64);

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::long(BigInt::from(v))
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v.into())
    }
}

impl From<IList<Value>> for Value {
    fn from(v: IList<Value>) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}
