//! Error → REST response mapping.
//!
//! [`ErrorMapper`] turns any [`RestError`] into the status, `X-ERROR-*`
//! headers and attribute set of the response that should be sent for it.
//!
//! | Shape      | Code                         | Inherited          | Message                          |
//! |------------|------------------------------|--------------------|----------------------------------|
//! | `Response` | remote code, else generic    | if remote sent one | remote message, else reason      |
//! | `Api`      | its own code                 | its own flag       | its public message               |
//! | `Other`    | generic code for the status  | no                 | reason phrase, unless exposed    |
//!
//! Every mapping gets a fresh id and timestamp. Exception names are only
//! sent when [`MapperConfig::expose_exception_names`] is set; they are always
//! logged.
//!
//! The mapper holds no mutable state and can be shared freely between
//! request handlers.

use crate::logging::ErrorLog;
use crate::status::detect_http_status;
use crate::{definitions, ErrorAttributes, RestError};
use http::{HeaderMap, Response, StatusCode};
use std::borrow::Cow;
use std::error::Error;

/// Runtime configuration of an [`ErrorMapper`].
///
/// The default sends no application name, uses no default status, and
/// hides messages of unclassified errors as well as exception names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapperConfig {
    /// Sent in `X-ERROR-APPLICATION`.
    pub application: Option<String>,
    /// Status for errors that carry none; `500` when unset.
    pub default_status: Option<StatusCode>,
    /// Send the `Display` text of unclassified errors instead of the
    /// canonical reason phrase.
    pub expose_messages: bool,
    /// Send `X-ERROR-EXCEPTION`.
    pub expose_exception_names: bool,
}

impl MapperConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application name.
    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = Some(application.into());
        self
    }

    /// Set the status used for errors that carry none.
    pub fn with_default_status(mut self, status: StatusCode) -> Self {
        self.default_status = Some(status);
        self
    }

    /// Choose whether unclassified error messages are sent.
    pub fn expose_messages(mut self, expose: bool) -> Self {
        self.expose_messages = expose;
        self
    }

    /// Choose whether exception names are sent.
    pub fn expose_exception_names(mut self, expose: bool) -> Self {
        self.expose_exception_names = expose;
        self
    }
}

/// The response-side view of a mapped error.
#[derive(Debug, Clone)]
pub struct MappedError {
    /// Response status.
    pub status: StatusCode,
    /// `X-ERROR-*` headers.
    pub headers: HeaderMap,
    /// The attributes the headers were encoded from.
    pub attributes: ErrorAttributes,
}

impl MappedError {
    /// Build a response with this status and headers around `body`.
    pub fn into_response<B>(self, body: B) -> Response<B> {
        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Stateless mapper from errors to REST error responses.
#[derive(Debug, Clone, Default)]
pub struct ErrorMapper {
    config: MapperConfig,
}

impl ErrorMapper {
    /// Create a mapper.
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    #[inline]
    pub const fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Status to report for `error` under this configuration.
    #[inline]
    pub fn status(&self, error: &RestError) -> StatusCode {
        detect_http_status(error, self.config.default_status)
    }

    /// Map an error raised while serving `path`.
    pub fn map(&self, error: &RestError, path: Option<&str>) -> MappedError {
        let status = self.status(error);

        let (mut attributes, exception): (ErrorAttributes, Option<Cow<'_, str>>) = match error {
            RestError::Response(err) => {
                let remote = err.attributes();
                let attributes = ErrorAttributes::new(err.code(), err.message())
                    .inherited(remote.is_some());
                let exception = remote
                    .and_then(|remote| remote.exception.as_deref())
                    .unwrap_or("ResponseException");
                (attributes, Some(Cow::Borrowed(exception)))
            }
            RestError::Api(err) => {
                let attributes = ErrorAttributes::new(err.code().clone(), err.message())
                    .inherited(err.is_code_inherited());
                (attributes, Some(Cow::Borrowed(err.exception_name())))
            }
            RestError::Other(err) => {
                let message: Cow<'_, str> = if self.config.expose_messages {
                    Cow::Owned(err.to_string())
                } else {
                    Cow::Borrowed(status.canonical_reason().unwrap_or(""))
                };
                let attributes = ErrorAttributes::new(definitions::for_status(status), message);
                (attributes, err.type_name().map(Cow::Borrowed))
            }
        };

        if self.config.expose_exception_names {
            attributes.exception = exception.as_ref().map(|name| name.to_string());
        }
        attributes.application = self.config.application.clone();
        attributes.path = path.map(str::to_owned);

        let mut log = ErrorLog::from_attributes(status, &attributes);
        log.exception = exception.as_deref();
        match error {
            RestError::Api(err) => {
                let internal = err.error_log();
                log = log
                    .with_details(internal.details)
                    .with_source(internal.source)
                    .with_metadata(internal.metadata);
            }
            RestError::Other(err) => {
                log = log.with_source(Some(err.inner() as &(dyn Error + 'static)));
            }
            RestError::Response(_) => {}
        }
        log.emit();

        MappedError {
            status,
            headers: attributes.to_header_map(),
            attributes,
        }
    }
}
