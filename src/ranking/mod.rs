//! Leaderboard ranking.
//!
//! Ranks are computed on every read from one snapshot of the full population
//! and are never stored, so a score update can't leave stale ranks behind.
//! A single sort assigns every global rank; filtering and paging only decide
//! which rows are returned, never the rank a row reports.

use std::cmp::Ordering;

use crate::models::{
    LeaderboardEntry, LeaderboardFilter, LeaderboardPage, LeaderboardQuery, LeaderboardRow,
    SortField, SortOrder,
};

/// Global standing order: score descending, then name ascending.
///
/// The id only separates entries whose score and name are both equal, which
/// keeps ranks a strict permutation of `1..=N`.
pub fn compare_standing(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Answer a leaderboard query against a snapshot of every entry.
pub fn rank(entries: &[LeaderboardEntry], query: &LeaderboardQuery) -> LeaderboardPage {
    let mut standings: Vec<&LeaderboardEntry> = entries.iter().collect();
    standings.sort_by(|a, b| compare_standing(a, b));

    let matcher = Matcher::new(&query.filter);
    let mut candidates: Vec<(usize, &LeaderboardEntry)> = standings
        .into_iter()
        .enumerate()
        .map(|(index, entry)| (index + 1, entry))
        .filter(|(_, entry)| matcher.matches(entry))
        .collect();

    let total = candidates.len();

    // Candidates are in standing order, so the stable sort leaves ties there.
    match (query.sort_by, query.order) {
        (SortField::Score, SortOrder::Desc) => {}
        (SortField::Score, SortOrder::Asc) => candidates.sort_by(|(_, a), (_, b)| {
            a.score
                .cmp(&b.score)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        }),
        (SortField::Name, order) => {
            candidates.sort_by(|(_, a), (_, b)| directed(a.name.cmp(&b.name), order))
        }
        (SortField::Department, order) => candidates
            .sort_by(|(_, a), (_, b)| directed(a.department.cmp(&b.department), order)),
    }

    let data = candidates
        .into_iter()
        .skip(query.offset())
        .take(query.limit)
        .map(|(rank, entry)| LeaderboardRow {
            id: entry.id.clone(),
            name: entry.name.clone(),
            department: entry.department.clone(),
            score: entry.score,
            rank,
        })
        .collect();

    LeaderboardPage {
        total,
        page: query.page,
        limit: query.limit,
        data,
    }
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

struct Matcher<'a> {
    needle: Option<String>,
    department: Option<&'a str>,
}

impl<'a> Matcher<'a> {
    fn new(filter: &'a LeaderboardFilter) -> Self {
        Self {
            needle: filter.name_contains.as_ref().map(|s| s.to_lowercase()),
            department: filter.department.as_deref(),
        }
    }

    fn matches(&self, entry: &LeaderboardEntry) -> bool {
        if let Some(department) = self.department {
            if entry.department != department {
                return false;
            }
        }
        match &self.needle {
            Some(needle) => entry.name.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn entry(id: &str, name: &str, department: &str, score: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            id: id.to_string(),
            name: name.to_string(),
            department: department.to_string(),
            batch: None,
            score,
            updated_at: "2025-01-01T00:00:00Z".to_string(),
            version: 1,
        }
    }

    fn query(page: i64, limit: i64) -> LeaderboardQuery {
        LeaderboardQuery::new(
            LeaderboardFilter::default(),
            SortField::Score,
            SortOrder::Desc,
            page,
            limit,
        )
    }

    fn population() -> Vec<LeaderboardEntry> {
        vec![
            entry("1", "Maya Singh", "Development", 724),
            entry("2", "Priya Verma", "Design", 289),
            entry("3", "Liu Wei", "AIML", 724),
            entry("4", "Carlos Diaz", "Robotics", 12),
            entry("5", "Nina Patel", "Design", 900),
            entry("6", "Omar Khalid", "Quality Assurance", 289),
            entry("7", "Zara Ali", "Data", 0),
        ]
    }

    fn names(page: &LeaderboardPage) -> Vec<&str> {
        page.data.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_tie_broken_by_name() {
        let entries = vec![
            entry("a", "Amy", "Web", 50),
            entry("z", "Zoe", "Web", 50),
            entry("b", "Bo", "Web", 90),
        ];
        let page = rank(&entries, &query(1, 10));

        let ranks: Vec<(&str, usize)> = page.data.iter().map(|r| (r.name.as_str(), r.rank)).collect();
        assert_eq!(ranks, vec![("Bo", 1), ("Amy", 2), ("Zoe", 3)]);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_ranks_form_permutation() {
        let mut entries = population();
        // same name and score twice still gets two distinct ranks
        entries.push(entry("8", "Liu Wei", "Web", 724));

        let page = rank(&entries, &query(1, 100));
        let ranks: HashSet<usize> = page.data.iter().map(|r| r.rank).collect();

        assert_eq!(page.data.len(), entries.len());
        assert_eq!(ranks, (1..=entries.len()).collect::<HashSet<_>>());
    }

    #[test]
    fn test_equal_scores_smaller_name_ranks_better() {
        let page = rank(&population(), &query(1, 100));
        let rank_of = |name: &str| page.data.iter().find(|r| r.name == name).unwrap().rank;

        assert!(rank_of("Liu Wei") < rank_of("Maya Singh"));
        assert!(rank_of("Omar Khalid") < rank_of("Priya Verma"));
    }

    #[test]
    fn test_department_filter_keeps_global_rank() {
        let entries = vec![
            entry("1", "Ana", "Design", 10),
            entry("2", "Ben", "Web", 90),
            entry("3", "Cal", "Design", 70),
            entry("4", "Dee", "AIML", 80),
            entry("5", "Eve", "Robotics", 5),
        ];
        let mut q = query(1, 10);
        q.filter.department = Some("Design".to_string());

        let page = rank(&entries, &q);

        assert_eq!(page.total, 2);
        let ranks: Vec<(&str, usize)> = page.data.iter().map(|r| (r.name.as_str(), r.rank)).collect();
        assert_eq!(ranks, vec![("Cal", 3), ("Ana", 4)]);
    }

    #[test]
    fn test_name_filter_is_case_insensitive_substring() {
        let mut q = query(1, 10);
        q.filter.name_contains = Some("PaTeL".to_string());
        let page = rank(&population(), &q);
        assert_eq!(names(&page), vec!["Nina Patel"]);
        assert_eq!(page.data[0].rank, 1);

        q.filter.name_contains = Some("a".to_string());
        q.filter.department = Some("Design".to_string());
        let page = rank(&population(), &q);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let mut q = query(1, 10);
        q.filter.department = Some("Marketing".to_string());
        let page = rank(&population(), &q);
        assert_eq!(page.total, 0);
        assert!(page.data.is_empty());

        let page = rank(&[], &query(1, 10));
        assert_eq!(page.total, 0);
        assert!(page.data.is_empty());
    }

    #[test]
    fn test_page_past_end_keeps_total() {
        let page = rank(&population(), &query(5, 3));
        assert_eq!(page.total, 7);
        assert_eq!(page.page, 5);
        assert!(page.data.is_empty());
    }

    #[test]
    fn test_clamped_limit_reported() {
        let q = query(0, 500);
        let page = rank(&population(), &q);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 100);
    }

    #[test]
    fn test_pages_concatenate_to_full_order() {
        let entries = population();
        let limit = 3;
        let full = rank(&entries, &query(1, 100));

        let pages = full.total.div_ceil(limit);
        let mut stitched = Vec::new();
        for p in 1..=pages {
            stitched.extend(rank(&entries, &query(p as i64, limit as i64)).data);
        }

        assert_eq!(stitched, full.data);
    }

    #[test]
    fn test_idempotent() {
        let entries = population();
        let mut q = query(2, 2);
        q.sort_by = SortField::Name;
        assert_eq!(rank(&entries, &q), rank(&entries, &q));
    }

    #[test]
    fn test_score_ascending_uses_name_then() {
        let mut q = query(1, 100);
        q.order = SortOrder::Asc;
        let page = rank(&population(), &q);
        assert_eq!(
            names(&page),
            vec![
                "Zara Ali",
                "Carlos Diaz",
                "Omar Khalid",
                "Priya Verma",
                "Liu Wei",
                "Maya Singh",
                "Nina Patel"
            ]
        );
        // sort direction never changes the reported rank
        assert_eq!(page.data[0].rank, 7);
        assert_eq!(page.data[6].rank, 1);
    }

    #[test]
    fn test_sort_by_name_desc() {
        let mut q = query(1, 3);
        q.sort_by = SortField::Name;
        q.order = SortOrder::Desc;
        let page = rank(&population(), &q);
        assert_eq!(names(&page), vec!["Zara Ali", "Priya Verma", "Omar Khalid"]);
    }

    #[test]
    fn test_sort_by_department_ties_follow_standing() {
        let mut q = query(1, 100);
        q.sort_by = SortField::Department;
        q.order = SortOrder::Asc;
        let page = rank(&population(), &q);

        let departments: Vec<&str> = page.data.iter().map(|r| r.department.as_str()).collect();
        assert_eq!(
            departments,
            vec!["AIML", "Data", "Design", "Design", "Development", "Quality Assurance", "Robotics"]
        );
        // Nina (900) before Priya (289) inside Design
        assert_eq!(page.data[2].name, "Nina Patel");
        assert_eq!(page.data[3].name, "Priya Verma");
    }

    #[test]
    fn test_compare_standing() {
        let high = entry("1", "Zed", "Web", 10);
        let low = entry("2", "Abe", "Web", 5);
        assert_eq!(compare_standing(&high, &low), Ordering::Less);
        let tie = entry("3", "Abe", "Web", 10);
        assert_eq!(compare_standing(&tie, &high), Ordering::Less);
    }
}
