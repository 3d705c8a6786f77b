//! Pre-defined generic error codes.
//!
//! Services define their own domain codes with
//! [`define_error_codes!`](crate::define_error_codes). The codes here cover the
//! cases where nothing more specific is known, most importantly errors that
//! carry no code at all and only resolve to an HTTP status.
//!
//! [`for_status`] picks the generic code for a status. Statuses without a
//! dedicated code fall back to their class (`client_error`, `server_error`),
//! and anything outside 4xx/5xx is `unclassified`.

use crate::{define_error_codes, ErrorCode};
use http::StatusCode;

// -----------------------------------------------------------------------------
// 4xx - Client errors
// -----------------------------------------------------------------------------
define_error_codes! {
    /// 400
    BAD_REQUEST = "bad_request",
    /// 401
    UNAUTHORIZED = "unauthorized",
    /// 403
    FORBIDDEN = "forbidden",
    /// 404
    NOT_FOUND = "not_found",
    /// 405
    METHOD_NOT_ALLOWED = "method_not_allowed",
    /// 409
    CONFLICT = "conflict",
    /// 410
    GONE = "gone",
    /// 415
    UNSUPPORTED_MEDIA_TYPE = "unsupported_media_type",
    /// 422
    UNPROCESSABLE_ENTITY = "unprocessable_entity",
    /// 429
    TOO_MANY_REQUESTS = "too_many_requests",
    /// Any other 4xx.
    CLIENT_ERROR = "client_error",
}

// -----------------------------------------------------------------------------
// 5xx - Server errors
// -----------------------------------------------------------------------------
define_error_codes! {
    /// 500
    INTERNAL_ERROR = "internal_error",
    /// 501
    NOT_IMPLEMENTED = "not_implemented",
    /// 502
    BAD_GATEWAY = "bad_gateway",
    /// 503
    SERVICE_UNAVAILABLE = "service_unavailable",
    /// 504
    GATEWAY_TIMEOUT = "gateway_timeout",
    /// Any other 5xx.
    SERVER_ERROR = "server_error",
}

define_error_codes! {
    /// A status outside the 4xx/5xx ranges was reported as an error.
    UNCLASSIFIED = "unclassified",
}

/// Generic error code for an HTTP status.
pub fn for_status(status: StatusCode) -> ErrorCode {
    match status.as_u16() {
        400 => BAD_REQUEST,
        401 => UNAUTHORIZED,
        403 => FORBIDDEN,
        404 => NOT_FOUND,
        405 => METHOD_NOT_ALLOWED,
        409 => CONFLICT,
        410 => GONE,
        415 => UNSUPPORTED_MEDIA_TYPE,
        422 => UNPROCESSABLE_ENTITY,
        429 => TOO_MANY_REQUESTS,
        500 => INTERNAL_ERROR,
        501 => NOT_IMPLEMENTED,
        502 => BAD_GATEWAY,
        503 => SERVICE_UNAVAILABLE,
        504 => GATEWAY_TIMEOUT,
        400..=499 => CLIENT_ERROR,
        500..=599 => SERVER_ERROR,
        _ => UNCLASSIFIED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedicated_statuses_have_dedicated_codes() {
        assert_eq!(for_status(StatusCode::CONFLICT), CONFLICT);
        assert_eq!(for_status(StatusCode::NOT_FOUND).as_str(), "not_found");
        assert_eq!(for_status(StatusCode::INTERNAL_SERVER_ERROR).as_str(), "internal_error");
    }

    #[test]
    fn other_statuses_fall_back_to_class() {
        assert_eq!(for_status(StatusCode::IM_A_TEAPOT), CLIENT_ERROR);
        assert_eq!(for_status(StatusCode::INSUFFICIENT_STORAGE), SERVER_ERROR);
        assert_eq!(for_status(StatusCode::OK), UNCLASSIFIED);
        assert_eq!(for_status(StatusCode::FOUND), UNCLASSIFIED);
    }
}
