//! Errors reconstructed from received HTTP responses.
//!
//! A client that receives an error response hands its status and headers to
//! [`ResponseException::from_parts`]. The `X-ERROR-*` headers are decoded into
//! [`ErrorAttributes`] when present; responses from services that do not
//! speak this protocol still produce a usable exception carrying the status.
//!
//! Construction never fails. Malformed error headers are logged at `debug`
//! and treated as absent, while the raw headers stay available through
//! [`ResponseException::headers`].

use crate::logging::ErrorLog;
use crate::status::{StatusAware, StatusSource};
use crate::{definitions, ErrorAttributes, ErrorCode, RestApiException};
use http::{HeaderMap, Response, StatusCode};
use std::error::Error;
use std::fmt;

/// Error built from a received HTTP response.
#[must_use = "errors should be handled or mapped"]
#[derive(Debug, Clone)]
pub struct ResponseException {
    status: StatusCode,
    headers: HeaderMap,
    attributes: Option<ErrorAttributes>,
}

impl ResponseException {
    /// Reconstruct from a response status line and headers.
    pub fn from_parts(status: StatusCode, headers: HeaderMap) -> Self {
        let attributes = match ErrorAttributes::from_header_map(&headers) {
            Ok(attributes) => attributes,
            Err(err) => {
                tracing::debug!(
                    status = status.as_u16(),
                    field = %err.field(),
                    "ignoring malformed error headers: {}",
                    err
                );
                None
            }
        };

        Self {
            status,
            headers,
            attributes,
        }
    }

    /// Reconstruct from a received response. The body is not inspected.
    pub fn from_response<B>(response: &Response<B>) -> Self {
        Self::from_parts(response.status(), response.headers().clone())
    }

    /// Status of the received response.
    #[inline]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// All headers of the received response.
    #[inline]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Decoded error attributes, when the response carried them.
    #[inline]
    pub const fn attributes(&self) -> Option<&ErrorAttributes> {
        self.attributes.as_ref()
    }

    /// Error code sent by the remote service, or the generic code for the
    /// response status.
    pub fn code(&self) -> ErrorCode {
        match &self.attributes {
            Some(attributes) => attributes.code.clone(),
            None => definitions::for_status(self.status),
        }
    }

    /// Message sent by the remote service, or the canonical reason phrase.
    pub fn message(&self) -> &str {
        match &self.attributes {
            Some(attributes) => attributes.message.as_str(),
            None => self.status.canonical_reason().unwrap_or(""),
        }
    }

    /// Structured log view, available when attributes were decoded.
    pub fn error_log(&self) -> Option<ErrorLog<'_>> {
        self.attributes
            .as_ref()
            .map(|attributes| ErrorLog::from_attributes(self.status, attributes))
    }

    /// Convert into an application exception that re-raises this failure.
    ///
    /// The transport status becomes the application status. A code sent by
    /// the remote service is kept and marked inherited; the remote id,
    /// application and path are kept as internal metadata.
    pub fn into_api_exception(self) -> RestApiException {
        let status = self.status;
        let Some(attributes) = self.attributes else {
            let reason = status.canonical_reason().unwrap_or("");
            return RestApiException::new(status, definitions::for_status(status), reason);
        };

        let ErrorAttributes {
            id,
            code,
            message,
            exception,
            application,
            path,
            ..
        } = attributes;

        let mut err = RestApiException::new(status, code, message)
            .inherited()
            .with_metadata("upstream_id", id);
        if let Some(exception) = exception {
            err = err.with_exception_name(exception);
        }
        if let Some(application) = application {
            err = err.with_metadata("upstream_application", application);
        }
        if let Some(path) = path {
            err = err.with_metadata("upstream_path", path);
        }
        err
    }
}

impl StatusAware for ResponseException {
    fn status_source(&self) -> StatusSource {
        StatusSource::Transport(self.status)
    }
}

impl fmt::Display for ResponseException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remote service responded {}", self.status)?;
        if let Some(attributes) = &self.attributes {
            write!(f, ": {} ({})", attributes.message, attributes.code)?;
        }
        Ok(())
    }
}

impl Error for ResponseException {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::*;
    use http::HeaderValue;

    fn remote_headers() -> HeaderMap {
        ErrorAttributes::new(definitions::CONFLICT, "order already shipped")
            .with_exception("OrderStateError")
            .with_application("orders")
            .with_path("/orders/42")
            .to_header_map()
    }

    #[test]
    fn decodes_remote_attributes() {
        let err = ResponseException::from_parts(StatusCode::CONFLICT, remote_headers());

        let attributes = err.attributes().unwrap();
        assert_eq!(attributes.code, definitions::CONFLICT);
        assert_eq!(attributes.application.as_deref(), Some("orders"));
        assert_eq!(err.message(), "order already shipped");
        assert_eq!(
            err.to_string(),
            "remote service responded 409 Conflict: order already shipped (conflict)"
        );
    }

    #[test]
    fn plain_response_still_carries_status() {
        let err = ResponseException::from_parts(StatusCode::BAD_GATEWAY, HeaderMap::new());

        assert!(err.attributes().is_none());
        assert_eq!(err.code(), definitions::BAD_GATEWAY);
        assert_eq!(err.message(), "Bad Gateway");
        assert!(err.error_log().is_none());
        assert_eq!(err.status_source(), StatusSource::Transport(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn malformed_headers_are_ignored_but_kept() {
        let mut headers = remote_headers();
        headers.insert(X_ERROR_TIMESTAMP, HeaderValue::from_static("not a date"));

        let err = ResponseException::from_parts(StatusCode::CONFLICT, headers);
        assert!(err.attributes().is_none());
        assert_eq!(err.headers()[X_ERROR_TIMESTAMP], "not a date");
        assert_eq!(err.code(), definitions::CONFLICT);
    }

    #[test]
    fn from_response_reads_status_and_headers() {
        let mut response = Response::new(());
        *response.status_mut() = StatusCode::CONFLICT;
        *response.headers_mut() = remote_headers();

        let err = ResponseException::from_response(&response);
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert!(err.attributes().is_some());
    }

    #[test]
    fn into_api_exception_inherits_code() {
        let api = ResponseException::from_parts(StatusCode::CONFLICT, remote_headers())
            .into_api_exception();

        assert_eq!(api.status(), StatusCode::CONFLICT);
        assert_eq!(api.code(), &definitions::CONFLICT);
        assert!(api.is_code_inherited());
        assert_eq!(api.message(), "order already shipped");
        assert_eq!(api.exception_name(), "OrderStateError");

        let log = api.error_log();
        let keys: Vec<_> = log.metadata.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, ["upstream_id", "upstream_application", "upstream_path"]);
    }

    #[test]
    fn into_api_exception_without_attributes_uses_generic_code() {
        let api = ResponseException::from_parts(StatusCode::SERVICE_UNAVAILABLE, HeaderMap::new())
            .into_api_exception();

        assert_eq!(api.code(), &definitions::SERVICE_UNAVAILABLE);
        assert!(!api.is_code_inherited());
        assert_eq!(api.message(), "Service Unavailable");
    }
}
