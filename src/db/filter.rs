//! Query filter utilities for building parameterized SQL queries.

use chrono::NaiveDateTime;
use duckdb::ToSql;

/// Timestamp format used when passing timestamps to and from DuckDB.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Inclusive timestamp range filter on `sessions.ts`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampFilter {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl TimestampFilter {
    /// Create a new timestamp filter.
    pub const fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }

    /// Filter with both bounds set.
    pub const fn between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self::new(Some(start), Some(end))
    }

    /// Append filter clauses to a query string.
    pub fn apply(&self, query: &mut String, params: &mut Vec<String>) {
        if let Some(start) = self.start {
            query.push_str(" AND s.ts >= CAST(? AS TIMESTAMP)");
            params.push(start.format(TIMESTAMP_FORMAT).to_string());
        }
        if let Some(end) = self.end {
            query.push_str(" AND s.ts <= CAST(? AS TIMESTAMP)");
            params.push(end.format(TIMESTAMP_FORMAT).to_string());
        }
    }

    /// Borrow string params as DuckDB parameters.
    pub fn params_as_refs(params: &[String]) -> Vec<&dyn ToSql> {
        params.iter().map(|s| s as &dyn ToSql).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 21)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_filter_none() {
        let filter = TimestampFilter::default();
        let mut query = "SELECT * FROM sessions s WHERE 1=1".to_string();
        let mut params = Vec::new();
        filter.apply(&mut query, &mut params);

        assert_eq!(query, "SELECT * FROM sessions s WHERE 1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn test_filter_start_only() {
        let filter = TimestampFilter::new(Some(ts(0)), None);
        let mut query = "SELECT * FROM sessions s WHERE 1=1".to_string();
        let mut params = Vec::new();
        filter.apply(&mut query, &mut params);

        assert_eq!(
            query,
            "SELECT * FROM sessions s WHERE 1=1 AND s.ts >= CAST(? AS TIMESTAMP)"
        );
        assert_eq!(params, vec!["2024-03-21 00:00:00"]);
    }

    #[test]
    fn test_filter_both() {
        let filter = TimestampFilter::between(ts(0), ts(23));
        let mut query = String::new();
        let mut params = Vec::new();
        filter.apply(&mut query, &mut params);

        assert_eq!(
            query,
            " AND s.ts >= CAST(? AS TIMESTAMP) AND s.ts <= CAST(? AS TIMESTAMP)"
        );
        assert_eq!(params, vec!["2024-03-21 00:00:00", "2024-03-21 23:00:00"]);
        assert_eq!(TimestampFilter::params_as_refs(&params).len(), 2);
    }
}
