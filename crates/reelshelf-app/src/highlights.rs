// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::{Identity, Movie};

pub const FEATURED_COUNT: usize = 5;
pub const TOP_RATED_COUNT: usize = 5;
pub const RECENT_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeHighlights {
    pub total: usize,
    pub featured: Vec<Movie>,
    pub top_rated: Vec<Movie>,
    pub recently_added: Vec<Movie>,
}

impl HomeHighlights {
    pub fn from_catalog(catalog: &[Movie]) -> Self {
        Self {
            total: catalog.len(),
            featured: catalog.iter().take(FEATURED_COUNT).cloned().collect(),
            top_rated: top_rated(catalog, TOP_RATED_COUNT),
            recently_added: recently_added(catalog, RECENT_COUNT),
        }
    }
}

/// Highest ratings first; unrated movies sort last. Ties keep catalog order.
pub fn top_rated(catalog: &[Movie], limit: usize) -> Vec<Movie> {
    let mut ranked: Vec<&Movie> = catalog.iter().collect();
    ranked.sort_by(|left, right| {
        match (left.numeric_rating(), right.numeric_rating()) {
            (Some(left), Some(right)) => right.total_cmp(&left),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    ranked.into_iter().take(limit).cloned().collect()
}

/// Newest object-id timestamp first; ids without a timestamp sort last.
pub fn recently_added(catalog: &[Movie], limit: usize) -> Vec<Movie> {
    let mut ranked: Vec<&Movie> = catalog.iter().collect();
    ranked.sort_by(|left, right| match (left.created_at(), right.created_at()) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ranked.into_iter().take(limit).cloned().collect()
}

pub fn owned_by(catalog: &[Movie], identity: &Identity) -> Vec<Movie> {
    catalog
        .iter()
        .filter(|movie| movie.is_owned_by(Some(identity)))
        .cloned()
        .collect()
}

pub fn watchlist_for(catalog: &[Movie], identity: &Identity) -> Vec<Movie> {
    catalog
        .iter()
        .filter(|movie| movie.is_owned_by(Some(identity)) && movie.is_in_watchlist())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{HomeHighlights, owned_by, recently_added, top_rated, watchlist_for};
    use crate::{FieldValue, Identity, Movie, UserEmail};

    fn movie(id: &str, rating: &str) -> Movie {
        Movie::new(id, id, "Drama", FieldValue::text(rating))
    }

    fn ids(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|movie| movie.id.as_str()).collect()
    }

    #[test]
    fn top_rated_orders_descending_with_unrated_last() {
        let catalog = vec![
            movie("low", "3"),
            movie("none", "N/A"),
            movie("high", "9.5"),
            movie("mid", "7"),
            movie("mid2", "7"),
        ];
        let ranked = top_rated(&catalog, 10);
        assert_eq!(ids(&ranked), vec!["high", "mid", "mid2", "low", "none"]);
        assert_eq!(top_rated(&catalog, 2).len(), 2);
    }

    #[test]
    fn recently_added_uses_object_id_timestamp() {
        let catalog = vec![
            movie("650000000000000000000000", "5"),
            movie("plain-id", "5"),
            movie("660000000000000000000000", "5"),
        ];
        let ranked = recently_added(&catalog, 6);
        assert_eq!(
            ids(&ranked),
            vec![
                "660000000000000000000000",
                "650000000000000000000000",
                "plain-id"
            ]
        );
    }

    #[test]
    fn home_highlights_cap_each_section() {
        let catalog: Vec<Movie> = (0..12).map(|index| movie(&format!("m{index}"), "6")).collect();
        let highlights = HomeHighlights::from_catalog(&catalog);
        assert_eq!(highlights.total, 12);
        assert_eq!(highlights.featured.len(), 5);
        assert_eq!(highlights.featured[0].id.as_str(), "m0");
        assert_eq!(highlights.top_rated.len(), 5);
        assert_eq!(highlights.recently_added.len(), 6);
    }

    #[test]
    fn collection_and_watchlist_follow_ownership() {
        let neil = Identity::new("neil@example.com");
        let mut mine = movie("mine", "8");
        mine.added_by = Some(UserEmail::new("neil@example.com"));
        let mut queued = movie("queued", "6");
        queued.added_by = Some(UserEmail::new("neil@example.com"));
        queued.in_watchlist = Some(true);
        let mut theirs = movie("theirs", "9");
        theirs.added_by = Some(UserEmail::new("vincent@example.com"));
        theirs.in_watchlist = Some(true);

        let catalog = vec![mine, queued, theirs];
        assert_eq!(ids(&owned_by(&catalog, &neil)), vec!["mine", "queued"]);
        assert_eq!(ids(&watchlist_for(&catalog, &neil)), vec!["queued"]);
    }
}
