#![no_main]

//! Arbitrary paths and leaf values through the store: edits, reads,
//! pushes, and pulls must never panic, and a leaf edit must read back.

use libfuzzer_sys::fuzz_target;
use serde_json::json;
use vellum_state::{Store, Value};

fuzz_target!(|input: (Vec<(String, i64)>, String)| {
    let (writes, probe) = input;
    let mut store = Store::new();
    for (path, n) in &writes {
        store.edit(path, json!(n));
        let _ = store.get(path);
    }
    let _ = store.get(&probe);
    store.push(&probe, "1");
    store.pull(&probe, 1);
    store.edit(&probe, Value::Null);
    let _ = store.snapshot();
});
