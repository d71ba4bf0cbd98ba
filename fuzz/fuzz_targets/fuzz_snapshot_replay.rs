#![no_main]

//! Snapshot replay never panics on arbitrary text, and a store that did
//! accept a snapshot round-trips it.

use libfuzzer_sys::fuzz_target;
use vellum_state::Store;

fuzz_target!(|text: String| {
    let mut store = Store::new();
    if store.load_snapshot(&text).is_ok() {
        let again = store.snapshot();
        let mut second = Store::new();
        second
            .load_snapshot(&again)
            .expect("own snapshot must replay");
    }
});
