#![no_main]

use http::{HeaderMap, HeaderValue, StatusCode};
use libfuzzer_sys::fuzz_target;
use rest_errors::{ErrorAttributes, ErrorField, ResponseException};

// Split the input on NUL into one value per error header.
fuzz_target!(|data: &[u8]| {
    let mut headers = HeaderMap::new();
    for (field, value) in ErrorField::ALL.into_iter().zip(data.split(|b| *b == 0)) {
        if let Ok(value) = HeaderValue::from_bytes(value) {
            headers.insert(field.header(), value);
        }
    }

    if let Ok(Some(attributes)) = ErrorAttributes::from_header_map(&headers) {
        let _ = attributes.to_header_map();
    }

    let _ = ResponseException::from_parts(StatusCode::BAD_GATEWAY, headers).into_api_exception();
});
