//! Error type for size-field construction.

use thiserror::Error;

/// Errors surfaced when building a [`SizeField`](crate::SizeField).
///
/// Everything past construction keeps a deliberately narrow error surface:
/// out-of-domain mutators return silently and range queries report the
/// no-constraint sentinel instead of failing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SizeFieldError {
    /// The domain box has no extent along an active axis.
    #[error("degenerate domain box: axis {axis} spans {min}..{max}")]
    DegenerateBounds { axis: usize, min: f64, max: f64 },
    /// A domain corner holds a NaN or infinite coordinate.
    #[error("domain box coordinates must be finite")]
    NonFiniteBounds,
}
