//! Firewall: abort on fatal errors with a message naming the failing operation.
//!
//! Library code returns [`StgError`]; the driver decides where a failure is
//! unrecoverable and converts it into an abort with [`Firewall::firewall`].

use crate::stg_error::StgError;

/// Converts a fatal result into a logged abort.
pub trait Firewall<T> {
    /// Unwrap `self`, or log the error against `operation` and panic.
    ///
    /// Builds with `panic = "abort"` terminate the rank immediately. Every rank
    /// given the same configuration fails identically; no collective shutdown
    /// is attempted.
    fn firewall(self, operation: &str) -> T;
}

impl<T> Firewall<T> for Result<T, StgError> {
    #[track_caller]
    fn firewall(self, operation: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                log::error!("[firewall] {operation} failed: {err}");
                panic!("[firewall] {operation} failed: {err}");
            }
        }
    }
}
