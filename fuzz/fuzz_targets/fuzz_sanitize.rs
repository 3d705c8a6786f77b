#![no_main]

use http::HeaderValue;
use libfuzzer_sys::fuzz_target;
use rest_errors::{sanitize_header_value, MAX_HEADER_VALUE_LEN};

fuzz_target!(|input: &str| {
    let sanitized = sanitize_header_value(input);
    assert!(sanitized.len() <= MAX_HEADER_VALUE_LEN);
    assert!(HeaderValue::from_bytes(sanitized.as_bytes()).is_ok());
});
