#![no_main]

use libfuzzer_sys::fuzz_target;
use saber_di::AppendMap;
use std::collections::HashMap;

fuzz_target!(|data: &[u8]| {
    let mut map = AppendMap::new();
    let mut model = HashMap::new();

    for (i, &byte) in data.iter().enumerate() {
        let inserted = map.insert(byte, i).is_ok();
        assert_eq!(inserted, !model.contains_key(&byte));
        model.entry(byte).or_insert(i);
    }

    assert_eq!(map.len(), model.len());
    for (key, value) in &model {
        assert_eq!(map.get(key), Some(value));
    }
});
