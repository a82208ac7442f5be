//! Result type alias for Mercator

use super::errors::MercatorError;

/// Result type alias for Mercator operations
///
/// # Examples
///
/// ```
/// use mercator::domain::result::Result;
/// use mercator::domain::errors::MercatorError;
///
/// fn failing_function() -> Result<()> {
///     Err(MercatorError::validation("entity is required"))
/// }
/// ```
pub type Result<T> = std::result::Result<T, MercatorError>;
