use super::ApiError;
use crate::config::PaginationConfig;

pub fn validate_id(kind: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {kind} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Largest row count or offset the SQL layer can bind (`i64::MAX`).
const MAX_SQL_ROWS: u64 = i64::MAX.unsigned_abs();

/// Resolves `limit`/`offset` query parameters against the configured bounds.
pub fn validate_page(
    limit: Option<u64>,
    offset: Option<u64>,
    pagination: &PaginationConfig,
) -> Result<(u64, u64), ApiError> {
    let limit = limit.unwrap_or(pagination.default_limit);

    let max_limit = pagination.max_limit.min(MAX_SQL_ROWS);

    if !(1..=max_limit).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between 1 and {max_limit}"
        )));
    }

    let offset = offset.unwrap_or(0);
    if offset > MAX_SQL_ROWS {
        return Err(ApiError::validation(format!(
            "Invalid offset: {offset}. Offset must be at most {MAX_SQL_ROWS}"
        )));
    }

    Ok((limit, offset))
}

/// Blank search terms mean "no filter".
pub fn normalize_search(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("title", 1).is_ok());
        assert!(validate_id("title", 0).is_err());
        assert!(validate_id("review", -3).is_err());
    }

    #[test]
    fn test_validate_page_defaults() {
        let cfg = PaginationConfig::default();
        assert_eq!(validate_page(None, None, &cfg).unwrap(), (10, 0));
        assert_eq!(validate_page(Some(100), Some(20), &cfg).unwrap(), (100, 20));
    }

    #[test]
    fn test_validate_page_bounds() {
        let cfg = PaginationConfig::default();
        assert!(validate_page(Some(0), None, &cfg).is_err());
        assert!(validate_page(Some(101), None, &cfg).is_err());
    }

    #[test]
    fn test_validate_page_rejects_unbindable_values() {
        let cfg = PaginationConfig::default();
        assert!(validate_page(None, Some(u64::MAX), &cfg).is_err());
        assert!(validate_page(None, Some(MAX_SQL_ROWS + 1), &cfg).is_err());
        assert_eq!(
            validate_page(None, Some(MAX_SQL_ROWS), &cfg).unwrap(),
            (10, MAX_SQL_ROWS)
        );

        let wide = PaginationConfig {
            default_limit: 10,
            max_limit: u64::MAX,
        };
        assert!(validate_page(Some(u64::MAX), None, &wide).is_err());
        assert!(validate_page(Some(MAX_SQL_ROWS), None, &wide).is_ok());
    }

    #[test]
    fn test_normalize_search() {
        assert_eq!(normalize_search(Some("  dune ")), Some("dune"));
        assert_eq!(normalize_search(Some("   ")), None);
        assert_eq!(normalize_search(None), None);
    }
}
