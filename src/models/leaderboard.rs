//! Leaderboard query parameters and the derived (never persisted) result rows.

use serde::{Deserialize, Serialize};

/// Default page size used by the website's leaderboard table.
pub const DEFAULT_LIMIT: usize = 10;

/// Maximum page size.
pub const MAX_LIMIT: usize = 100;

/// Field a leaderboard page is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Score,
    Name,
    Department,
}

impl SortField {
    /// Parse a `sortBy` value. `points` is the stored-field alias of `score`;
    /// anything unrecognized falls back to score.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => SortField::Name,
            "department" => SortField::Department,
            _ => SortField::Score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

/// Row filter. Both parts are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderboardFilter {
    /// Case-insensitive substring of the entry name.
    pub name_contains: Option<String>,
    /// Exact department label.
    pub department: Option<String>,
}

/// Raw query string of `GET /api/leaderboard`.
///
/// Every field is kept as text so malformed numbers are defaulted instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

/// A normalized leaderboard query: page is at least 1, limit is within `1..=100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardQuery {
    pub filter: LeaderboardFilter,
    pub sort_by: SortField,
    pub order: SortOrder,
    pub page: usize,
    pub limit: usize,
}

impl Default for LeaderboardQuery {
    fn default() -> Self {
        Self {
            filter: LeaderboardFilter::default(),
            sort_by: SortField::Score,
            order: SortOrder::Desc,
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl LeaderboardQuery {
    /// Build a query with page and limit clamped into range.
    pub fn new(filter: LeaderboardFilter, sort_by: SortField, order: SortOrder, page: i64, limit: i64) -> Self {
        Self {
            filter,
            sort_by,
            order,
            page: page.max(1) as usize,
            limit: limit.clamp(1, MAX_LIMIT as i64) as usize,
        }
    }

    /// Number of rows skipped before the requested page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl From<LeaderboardParams> for LeaderboardQuery {
    fn from(params: LeaderboardParams) -> Self {
        let page = parse_number(params.page.as_deref()).unwrap_or(1);
        let limit = parse_number(params.limit.as_deref()).unwrap_or(DEFAULT_LIMIT as i64);
        let sort_by = params
            .sort_by
            .as_deref()
            .map(SortField::parse)
            .unwrap_or_default();
        let order = params
            .order
            .as_deref()
            .map(SortOrder::parse)
            .unwrap_or_default();

        let filter = LeaderboardFilter {
            name_contains: non_blank(params.q),
            department: non_blank(params.department),
        };

        LeaderboardQuery::new(filter, sort_by, order, page, limit)
    }
}

fn parse_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// One row of a leaderboard page. `rank` is the position in the full,
/// unfiltered population ordered by score then name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub id: String,
    pub name: String,
    pub department: String,
    pub score: i64,
    pub rank: usize,
}

/// Response body of `GET /api/leaderboard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardPage {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub data: Vec<LeaderboardRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: &str, limit: &str) -> LeaderboardParams {
        LeaderboardParams {
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let query = LeaderboardQuery::from(LeaderboardParams::default());
        assert_eq!(query, LeaderboardQuery::default());
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_clamps_limit_and_page() {
        let query = LeaderboardQuery::from(params("0", "500"));
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 100);

        let query = LeaderboardQuery::from(params("-3", "0"));
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 1);
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let query = LeaderboardQuery::from(params("abc", "ten"));
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_offset() {
        let query = LeaderboardQuery::from(params("3", "25"));
        assert_eq!(query.offset(), 50);
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!(SortField::parse("points"), SortField::Score);
        assert_eq!(SortField::parse("score"), SortField::Score);
        assert_eq!(SortField::parse("Name"), SortField::Name);
        assert_eq!(SortField::parse("department"), SortField::Department);
        assert_eq!(SortField::parse("rank"), SortField::Score);
        assert_eq!(SortOrder::parse("ASC"), SortOrder::Asc);
        assert_eq!(SortOrder::parse("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("sideways"), SortOrder::Desc);
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let query = LeaderboardQuery::from(LeaderboardParams {
            q: Some("   ".to_string()),
            department: Some(" Design ".to_string()),
            ..Default::default()
        });
        assert_eq!(query.filter.name_contains, None);
        assert_eq!(query.filter.department.as_deref(), Some("Design"));
    }
}
