use thiserror::Error;

/// Errors raised when building the coverage geometry.
#[derive(Debug, Error)]
pub enum CoverageError {
    /// The coverage radius must be strictly positive.
    #[error("coverage radius must be strictly positive, got {0}m")]
    InvalidRadius(f64),
}
