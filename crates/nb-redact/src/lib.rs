//! Secret redaction for nimbus CLI log output.
//!
//! Log records must never carry access tokens, refresh tokens, session ids,
//! client secrets, or auth URLs. This crate provides the rewrite pass the
//! logger runs over every argument before a record reaches a file or ring
//! buffer: a fixed, ordered key table compiled into case-insensitive
//! patterns, plus two fixed rewrites for the platform client's token-refresh
//! log line and trailing `sid=` assignments.
//!
//! Filtering is pure and infallible. Values that cannot be coerced to text
//! pass through unchanged rather than failing the log call, and running the
//! filter over already-filtered text leaves it untouched: the placeholders
//! do not match any of the patterns.
//!
//! # Example
//!
//! ```
//! use nb_redact::redact_text;
//!
//! let masked = redact_text(r#"{"access_token":"00Dxx0000001gPL"}"#);
//! assert_eq!(masked, "{<access_token - HIDDEN>}");
//! ```

pub mod filter;
pub mod keys;

pub use filter::{redact_text, redact_value};
pub use keys::{FilteredKey, Fragment, FILTERED_KEYS};
