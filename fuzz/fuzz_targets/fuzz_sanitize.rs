#![no_main]

use ctos_engine::sanitize;
use libfuzzer_sys::fuzz_target;

// The sanitizer's contract: total over arbitrary input, output always
// strict-parseable, and idempotent.
fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let out = sanitize(text);
        assert!(roxmltree::Document::parse(&out).is_ok());
        assert_eq!(sanitize(&out), out);
    }
});
