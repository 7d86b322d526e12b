//! Unified error interface for edgeperm.
//!
//! Every error type surfaced to a request handler implements [`ErrorCode`]
//! so handlers can map failures without matching on concrete variants.
//!
//! # Example
//!
//! ```
//! use edgeperm_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum LookupError {
//!     NotFound,
//!     Busy,
//! }
//!
//! impl ErrorCode for LookupError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::NotFound => "LOOKUP_NOT_FOUND",
//!             Self::Busy => "LOOKUP_BUSY",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Busy)
//!     }
//! }
//!
//! assert_eq!(LookupError::Busy.code(), "LOOKUP_BUSY");
//! assert!(!LookupError::NotFound.is_recoverable());
//! ```

/// Machine-readable error codes.
///
/// # Code Format
///
/// - **UPPER_SNAKE_CASE**: e.g. `"AUTHZ_UNAUTHORIZED"`
/// - **Prefixed by domain**: `"AUTHZ_"`, `"CONFIG_"`
/// - **Stable**: codes are part of the API contract
///
/// # Recoverability
///
/// Authorization and validation failures are never recoverable: the same
/// request with the same grants fails the same way.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying (or a user-side fix) can succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code is non-empty, prefixed and UPPER_SNAKE_CASE.
///
/// # Panics
///
/// Panics with a descriptive message if validation fails.
///
/// # Example
///
/// ```
/// use edgeperm_types::{ErrorCode, assert_error_code};
///
/// struct Denied;
///
/// impl ErrorCode for Denied {
///     fn code(&self) -> &'static str { "AUTHZ_DENIED" }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_code(&Denied, "AUTHZ_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Validates every error in `errors`; use it to cover all variants of an enum.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
