#![no_main]

use ilist::{IList, Value};
use libfuzzer_sys::fuzz_target;
use serde::Deserialize;

fuzz_target!(|data: &str| {
    if data.is_empty() {
        return;
    }
    let mut deserializer = serde_json::Deserializer::from_str(data);
    if let Ok(list) = IList::<Value>::deserialize(&mut deserializer) {
        let text = serde_json::to_string(&list).unwrap();
        let again: IList<Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(list.len(), again.len());
        assert_eq!(list.tag(), again.tag());
    }
});
