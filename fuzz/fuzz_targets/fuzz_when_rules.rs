#![no_main]

//! Rule parsing is total: any attribute name/value pair either parses or
//! is skipped, without panicking.

use libfuzzer_sys::fuzz_target;
use vellum_runtime::rules::parse_when;

fuzz_target!(|input: (String, String)| {
    let (name, value) = input;
    if let Some(rule) = parse_when(&name, &value) {
        // Re-parsing the same name is stable.
        assert_eq!(parse_when(&name, &value), Some(rule));
    }
});
