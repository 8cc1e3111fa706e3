//! Deserialization of lists and values

use std::fmt::{self, Formatter};
use std::marker::PhantomData;

use num_bigint::BigInt;
use serde::de::{Error as _, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::element::Element;
use crate::list::IList;
use crate::storage::Entries;
use crate::value::Value;

// Upper bound on trusting a sequence's declared length
const MAX_PREALLOCATE: usize = 4096;

fn collect_seq<'de, V, A>(mut seq: A) -> Result<IList<V>, A::Error>
where
    V: Element + Deserialize<'de>,
    A: SeqAccess<'de>,
{
    let mut staged = Entries::Unset;
    if let Some(first) = seq.next_element::<V>()? {
        staged.push(first).map_err(A::Error::custom)?;
        let hint = seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATE);
        staged.reserve(hint).map_err(A::Error::custom)?;
        while let Some(value) = seq.next_element::<V>()? {
            staged.push(value).map_err(A::Error::custom)?;
        }
    }
    Ok(IList::from_entries(staged))
}

struct ListVisitor<V>(PhantomData<V>);

impl<'de, V: Element + Deserialize<'de>> Visitor<'de> for ListVisitor<V> {
    type Value = IList<V>;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        collect_seq(seq)
    }
}

impl<'de, V: Element + Deserialize<'de>> Deserialize<'de> for IList<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(ListVisitor(PhantomData))
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("null, a boolean, a number, a string or a sequence")
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::None)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_i128<E>(self, v: i128) -> Result<Value, E> {
        Ok(Value::long(BigInt::from(v)))
    }

    fn visit_u128<E>(self, v: u128) -> Result<Value, E> {
        Ok(Value::long(BigInt::from(v)))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Value, A::Error> {
        collect_seq(seq).map(Value::List)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Tag;

    #[mockalloc::test]
    fn deserializes_homogeneous_lists_unboxed() {
        let x: IList<Value> = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(x.tag(), Tag::Int64);
        assert_eq!(x.render(), "[1, 2, 3]");

        let x: IList<Value> = serde_json::from_str("[0.5, 1.5]").unwrap();
        assert_eq!(x.tag(), Tag::Float64);

        let x: IList<Value> = serde_json::from_str("[]").unwrap();
        assert_eq!(x.tag(), Tag::Unset);
    }

    #[mockalloc::test]
    fn deserializes_mixed_lists_boxed() {
        let x: IList<Value> = serde_json::from_str("[1, 2.5]").unwrap();
        assert_eq!(x.tag(), Tag::Boxed);

        let x: IList<Value> =
            serde_json::from_str(r#"[null, true, "s", [1, [2]], 18446744073709551615]"#).unwrap();
        assert_eq!(x.tag(), Tag::Boxed);
        assert_eq!(x.render(), "[None, True, 's', [1, [2]], 18446744073709551615]");
        match x.get(3).unwrap() {
            Value::List(inner) => assert_eq!(inner.tag(), Tag::Boxed),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[mockalloc::test]
    fn rejects_non_sequences() {
        assert!(serde_json::from_str::<IList<Value>>("1").is_err());
        assert!(serde_json::from_str::<IList<Value>>(r#"{"a": 1}"#).is_err());
        assert!(serde_json::from_str::<Value>(r#"[{"a": 1}]"#).is_err());
    }

    #[mockalloc::test]
    fn round_trips_through_json() {
        let text = r#"[1,[2.5,"x"],null]"#;
        let x: IList<Value> = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string(&x).unwrap(), text);
    }
}
