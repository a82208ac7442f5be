//! Page-scoped queries

use crate::domain::{InterpretedQuery, MercatorError, Result};

/// Derive a query returning one page of `query`'s rows
///
/// Pages are 1-based. An existing row cap on `query` is respected: pages past
/// the cap come back with `LIMIT 0`.
///
/// # Errors
///
/// Returns a validation error if `page` or `page_size` is zero.
///
/// # Example
///
/// ```
/// use mercator::core::executor::paginate;
/// use mercator::core::interpreter::QueryInterpreter;
/// use mercator::domain::ExportRequest;
///
/// let query = QueryInterpreter::default()
///     .interpret(&ExportRequest::new("lead"))
///     .unwrap();
/// let page = paginate(&query, 3, 100).unwrap();
/// assert!(page.query_text.ends_with("LIMIT 100 OFFSET 200"));
/// ```
pub fn paginate(query: &InterpretedQuery, page: u64, page_size: u64) -> Result<InterpretedQuery> {
    if page == 0 {
        return Err(MercatorError::validation("page numbers start at 1"));
    }
    if page_size == 0 {
        return Err(MercatorError::validation("page size must be positive"));
    }

    let offset = (page - 1)
        .checked_mul(page_size)
        .ok_or_else(|| MercatorError::validation("page offset overflows"))?;

    let limit = match query.parts().limit {
        Some(cap) => cap.saturating_sub(offset).min(page_size),
        None => page_size,
    };
    let base_offset = query.parts().offset.unwrap_or(0);

    Ok(query.with_window(Some(limit), Some(base_offset.saturating_add(offset))))
}
