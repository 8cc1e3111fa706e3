//! Serialization of lists and values

use serde::ser::{Error as _, SerializeSeq, SerializeTuple};
use serde::{Serialize, Serializer};

use crate::element::Element;
use crate::list::IList;
use crate::storage::Entries;
use crate::value::Value;

fn serialize_vec<T: Serialize, S: Serializer>(values: &[T], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for value in values {
        seq.serialize_element(value)?;
    }
    seq.end()
}

impl<V: Element + Serialize> Serialize for IList<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let _guard = self
            .visit()
            .ok_or_else(|| S::Error::custom("list contains itself"))?;
        // Serialize a snapshot so elements can't observe the list borrowed
        let snapshot = self.entries().try_clone().map_err(S::Error::custom)?;
        match &snapshot {
            Entries::Unset => serializer.serialize_seq(Some(0))?.end(),
            Entries::Boxed(v) => serialize_vec(v, serializer),
            Entries::Int64(v) => serialize_vec(v, serializer),
            Entries::Float64(v) => serialize_vec(v, serializer),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::None => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Long(b) => serializer.collect_str(b),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Tuple(items) => {
                let mut tup = serializer.serialize_tuple(items.len())?;
                for item in items.iter() {
                    tup.serialize_element(item)?;
                }
                tup.end()
            }
            Value::List(list) => list.serialize(serializer),
        }
    }
}
