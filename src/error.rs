//! Error types for curve and simulation configuration.
//!
//! Only configuration can fail. Numeric non-convergence and degenerate
//! geometry inside a tick are reported as "no contact", never as errors.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Errors raised while configuring curves or loading simulation settings.
#[derive(Debug, Error)]
pub enum CurveError {
    /// Parameter domain is reversed.
    #[error("invalid domain: min_t ({min_t}) > max_t ({max_t})")]
    InvalidDomain { min_t: f64, max_t: f64 },

    /// Sampling step is zero or negative.
    #[error("invalid step: {0} (must be > 0)")]
    InvalidStep(f64),

    /// A configuration value is NaN or infinite.
    #[error("non-finite value for {0}")]
    NonFinite(&'static str),

    /// Any other rejected configuration value.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Reading a config file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Config JSON could not be parsed or written.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CurveError {
    /// Create an invalid domain error.
    #[must_use]
    pub const fn invalid_domain(min_t: f64, max_t: f64) -> Self {
        Self::InvalidDomain { min_t, max_t }
    }

    /// Create an invalid step error.
    #[must_use]
    pub const fn invalid_step(step: f64) -> Self {
        Self::InvalidStep(step)
    }

    /// Create an invalid config error.
    #[must_use]
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }
}

/// Reject NaN/infinite values, naming the offending field.
pub(crate) fn ensure_finite(value: f64, field: &'static str) -> CurveResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CurveError::NonFinite(field))
    }
}
