//! Error code type - stable, machine-readable identifiers for REST errors.
//!
//! Codes travel in the `X-ERROR-CODE` header, so their alphabet is kept to
//! characters that survive every HTTP stack untouched:
//!
//! - ASCII letters and digits
//! - `.`, `_` and `-`
//! - 1 to [`MAX_CODE_LEN`] bytes
//!
//! # Construction
//!
//! - **Compile time**: [`ErrorCode::new`] validates in const context, so a bad
//!   literal fails the build.
//! - **Runtime**: [`ErrorCode::parse`] returns [`ErrorCodeError`] for codes that
//!   arrive from configuration or from a downstream response.
//!
//! # Example
//!
//! ```rust
//! use rest_errors::{ErrorCode, define_error_codes};
//!
//! define_error_codes! {
//!     ORDER_NOT_FOUND = "order.not_found",
//!     ORDER_LOCKED = "order.locked",
//! }
//!
//! assert_eq!(ORDER_NOT_FOUND.as_str(), "order.not_found");
//! assert!(ErrorCode::parse("bad code!").is_err());
//! ```

use std::borrow::Cow;
use std::fmt;

/// Maximum length of an error code in bytes.
pub const MAX_CODE_LEN: usize = 64;

#[inline]
const fn is_code_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-')
}

const fn validate(code: &str) -> Result<(), ErrorCodeError> {
    let bytes = code.as_bytes();
    if bytes.is_empty() {
        return Err(ErrorCodeError::Empty);
    }
    if bytes.len() > MAX_CODE_LEN {
        return Err(ErrorCodeError::TooLong { len: bytes.len() });
    }
    let mut i = 0;
    while i < bytes.len() {
        if !is_code_byte(bytes[i]) {
            return Err(ErrorCodeError::InvalidCharacter { position: i });
        }
        i += 1;
    }
    Ok(())
}

/// Validated REST error code.
///
/// Codes defined in this crate or by callers as constants borrow their text;
/// codes parsed from the wire own it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorCode(Cow<'static, str>);

impl ErrorCode {
    /// Create an error code from a literal.
    ///
    /// # Panics
    ///
    /// Panics at compile time (in const contexts) or at runtime if the code is
    /// empty, longer than [`MAX_CODE_LEN`], or contains a character outside
    /// the allowed alphabet.
    #[inline]
    pub const fn new(code: &'static str) -> Self {
        assert!(validate(code).is_ok(), "Invalid error code literal");
        Self(Cow::Borrowed(code))
    }

    /// Validate a code received at runtime.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCodeError`] describing the first violation found.
    pub fn parse(code: &str) -> Result<Self, ErrorCodeError> {
        let code = code.trim();
        validate(code)?;
        Ok(Self(Cow::Owned(code.to_owned())))
    }

    /// The code text.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ErrorCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Error type for error code validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCodeError {
    /// The code is empty (or only whitespace).
    Empty,
    /// The code exceeds [`MAX_CODE_LEN`] bytes.
    TooLong {
        /// Actual length in bytes.
        len: usize,
    },
    /// The code contains a byte outside the allowed alphabet.
    InvalidCharacter {
        /// Byte offset of the offending character.
        position: usize,
    },
}

impl fmt::Display for ErrorCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("error code must not be empty"),
            Self::TooLong { len } => {
                write!(f, "error code length {} exceeds maximum ({})", len, MAX_CODE_LEN)
            }
            Self::InvalidCharacter { position } => {
                write!(f, "error code has an invalid character at byte {}", position)
            }
        }
    }
}

impl std::error::Error for ErrorCodeError {}

/// Define error codes as `pub const` items with compile-time validation.
#[macro_export]
macro_rules! define_error_codes {
    ($( $(#[$meta:meta])* $name:ident = $code:literal ),+ $(,)?) => {
        $(
            $(#[$meta])*
            pub const $name: $crate::ErrorCode = $crate::ErrorCode::new($code);
        )+
    };
}
