//! Filter queries over the catalog.
//!
//! A query carries four independent, each-optional predicates: author
//! substring, year-range lower and upper bounds, and the acquired flag.
//! The result is the ordered subsequence of the catalog satisfying all
//! supplied predicates; catalog storage order is preserved.

use serde::{Deserialize, Serialize};

use crate::domain::Book;

/// Lower bound used when `from` is absent; also stands in for an unknown
/// publication year during range checks.
const YEAR_FLOOR: &str = "0";

/// Upper bound used when `to` is absent
const YEAR_CEILING: &str = "9999";

/// A filter query over the catalog.
///
/// An absent field and an empty string are the same signal: no filter on
/// that dimension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookFilter {
    /// Case-insensitive substring matched against any author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Inclusive lower bound on the publication year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Inclusive upper bound on the publication year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// `"true"` or `"false"`, matched against the acquired flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquired: Option<String>,
}

impl BookFilter {
    /// True when no predicate is supplied on any dimension
    pub fn is_empty(&self) -> bool {
        active(&self.author).is_none()
            && active(&self.from).is_none()
            && active(&self.to).is_none()
            && active(&self.acquired).is_none()
    }

    /// Evaluate the query against an ordered set of records
    pub fn apply<'a>(&self, books: &'a [Book]) -> Vec<&'a Book> {
        let by_author: Vec<&Book> = match active(&self.author) {
            None => books.iter().collect(),
            Some(term) => {
                let needle = term.to_lowercase();
                books
                    .iter()
                    .filter(|book| {
                        // A record with no known authors never passes an
                        // active author filter
                        book.authors
                            .as_deref()
                            .unwrap_or_default()
                            .iter()
                            .any(|author| author.to_lowercase().contains(&needle))
                    })
                    .collect()
            }
        };

        let from = active(&self.from).unwrap_or(YEAR_FLOOR);
        let to = active(&self.to).unwrap_or(YEAR_CEILING);

        by_author
            .into_iter()
            .filter(|book| {
                let year = book.published_year.as_deref().unwrap_or(YEAR_FLOOR);
                // Plain string comparison, meaningful only for fixed-width
                // 4-digit years
                from <= year && year <= to
            })
            .filter(|book| match active(&self.acquired) {
                None => true,
                Some(flag) => flag.to_lowercase() == book.acquired.to_string(),
            })
            .collect()
    }
}

/// An absent value and an empty string are the same "no filter" signal
fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Book> {
        vec![
            Book {
                id: 1,
                external_id: Some("a".to_string()),
                title: "First".to_string(),
                authors: Some(vec!["Jane Doe".to_string()]),
                published_year: Some("1999".to_string()),
                acquired: true,
                thumbnail: None,
            },
            Book {
                id: 2,
                external_id: Some("b".to_string()),
                title: "Second".to_string(),
                authors: Some(vec!["Ann Lee".to_string()]),
                published_year: Some("2005".to_string()),
                acquired: false,
                thumbnail: None,
            },
            Book {
                id: 3,
                external_id: Some("c".to_string()),
                title: "Third".to_string(),
                authors: Some(vec![]),
                published_year: None,
                acquired: false,
                thumbnail: None,
            },
        ]
    }

    fn ids(books: &[&Book]) -> Vec<u64> {
        books.iter().map(|b| b.id).collect()
    }

    #[test]
    fn test_author_substring_is_case_insensitive() {
        let books = catalog();
        let filter = BookFilter {
            author: Some("doe".to_string()),
            ..Default::default()
        };

        assert_eq!(ids(&filter.apply(&books)), vec![1]);
    }

    #[test]
    fn test_year_range_excludes_unknown_years() {
        let books = catalog();
        let filter = BookFilter {
            from: Some("2000".to_string()),
            to: Some("2010".to_string()),
            ..Default::default()
        };

        // id 1 is 1999, id 3 has no year and compares as "0"
        assert_eq!(ids(&filter.apply(&books)), vec![2]);
    }

    #[test]
    fn test_acquired_flag_matches_lowercase_text() {
        let books = catalog();
        let filter = BookFilter {
            acquired: Some("true".to_string()),
            ..Default::default()
        };

        assert_eq!(ids(&filter.apply(&books)), vec![1]);

        let filter = BookFilter {
            acquired: Some("FALSE".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&books)), vec![2, 3]);
    }

    #[test]
    fn test_empty_query_returns_all_in_order() {
        let books = catalog();

        assert_eq!(ids(&BookFilter::default().apply(&books)), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_string_means_no_filter() {
        let books = catalog();
        let filter = BookFilter {
            author: Some(String::new()),
            from: Some(String::new()),
            to: Some(String::new()),
            acquired: Some(String::new()),
        };

        assert!(filter.is_empty());
        assert_eq!(ids(&filter.apply(&books)), vec![1, 2, 3]);
    }

    #[test]
    fn test_unknown_year_excluded_by_any_lower_bound() {
        let books = catalog();
        let filter = BookFilter {
            from: Some("1".to_string()),
            ..Default::default()
        };

        // An unknown year compares as "0": in range only while both
        // bounds sit at their defaults
        assert_eq!(ids(&filter.apply(&books)), vec![1, 2]);
    }

    #[test]
    fn test_predicates_combine() {
        let books = catalog();
        let filter = BookFilter {
            author: Some("e".to_string()),
            from: Some("1990".to_string()),
            to: Some("2010".to_string()),
            acquired: Some("false".to_string()),
        };

        // "e" matches both Jane Doe and Ann Lee; year range keeps both;
        // acquired=false keeps only id 2
        assert_eq!(ids(&filter.apply(&books)), vec![2]);
    }
}
