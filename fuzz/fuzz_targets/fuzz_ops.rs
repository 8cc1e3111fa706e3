#![no_main]

use arbitrary::Arbitrary;
use ilist::{IList, Slice, Tag, Value};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug, Clone)]
enum Item {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Pair(i8, i8),
}

impl Item {
    fn to_value(&self) -> Value {
        match self {
            Item::None => Value::None,
            Item::Bool(b) => Value::Bool(*b),
            Item::Int(i) => Value::Int(*i),
            Item::Float(f) => Value::Float(*f),
            Item::Str(s) => Value::from(s.as_str()),
            Item::Pair(a, b) => Value::tuple([Value::from(*a), Value::from(*b)]),
        }
    }
}

#[derive(Arbitrary, Debug)]
enum Op {
    Push(Item),
    Insert(i8, Item),
    Set(i8, Item),
    Delete(i8),
    Pop(Option<i8>),
    Extend(Vec<Item>),
    SetSlice(Option<i8>, Option<i8>, Option<i8>, Vec<Item>),
    DeleteSlice(Option<i8>, Option<i8>, Option<i8>),
    GetSlice(Option<i8>, Option<i8>, Option<i8>),
    ConcatSelf,
    Repeat(i8),
    Remove(Item),
    Contains(Item),
    Count(Item),
    IndexOf(Item, Option<i8>, Option<i8>),
    Reverse,
    Sort,
    Sum,
    Any,
    Clear,
}

fn slice(start: Option<i8>, stop: Option<i8>, step: Option<i8>) -> Slice {
    Slice::new(start.map(isize::from), stop.map(isize::from), step.map(isize::from))
}

fn check_representation(list: &IList<Value>) {
    for value in list.iter() {
        let value = value.unwrap();
        match list.tag() {
            Tag::Int64 => assert!(matches!(value, Value::Int(_))),
            Tag::Float64 => assert!(matches!(value, Value::Float(_))),
            Tag::Unset => panic!("unset list yielded {:?}", value),
            Tag::Boxed => {}
        }
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let list = IList::<Value>::new();
    for op in ops {
        // Every operation either succeeds or reports an error; none may panic
        let _ = match op {
            Op::Push(v) => list.push(v.to_value()),
            Op::Insert(i, v) => list.insert(i.into(), v.to_value()),
            Op::Set(i, v) => list.set(i.into(), v.to_value()),
            Op::Delete(i) => list.delete(i.into()),
            Op::Pop(i) => list.pop(i.map(isize::from)).map(drop),
            Op::Extend(vs) => list.extend(vs.iter().map(Item::to_value)),
            Op::SetSlice(a, b, s, vs) => list.set_slice(slice(a, b, s), vs.iter().map(Item::to_value)),
            Op::DeleteSlice(a, b, s) => list.delete_slice(slice(a, b, s)),
            Op::GetSlice(a, b, s) => list.get_slice(slice(a, b, s)).map(drop),
            Op::ConcatSelf => list.concat_in_place(&list),
            Op::Repeat(n) if list.len() <= 64 => list.repeat_in_place(isize::from(n % 4)),
            Op::Repeat(_) => Ok(()),
            Op::Remove(v) => list.remove(&v.to_value()),
            Op::Contains(v) => list.contains(&v.to_value()).map(drop),
            Op::Count(v) => list.count(&v.to_value()).map(drop),
            Op::IndexOf(v, a, b) => list
                .index_of(&v.to_value(), a.map(isize::from), b.map(isize::from))
                .map(drop),
            Op::Reverse => {
                list.reverse();
                Ok(())
            }
            Op::Sort => list.sort(),
            Op::Sum => list.sum(None).map(drop),
            Op::Any => list.any().map(drop),
            Op::Clear => {
                list.clear();
                Ok(())
            }
        };
        check_representation(&list);
    }
    let _ = list.render();
});
