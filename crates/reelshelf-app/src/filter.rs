// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::HashSet;

use crate::Movie;

pub const ALL_GENRES_LABEL: &str = "All";
pub const RATING_FLOOR: f64 = 0.0;
pub const RATING_CEILING: f64 = 10.0;

/// Comparison key for a genre label: trimmed and lowercased.
pub fn normalize_genre(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Display label for a genre: the normalized key with its first character
/// upper-cased.
pub fn genre_label(raw: &str) -> String {
    let key = normalize_genre(raw);
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GenreSelector {
    #[default]
    All,
    Genre(String),
}

impl GenreSelector {
    /// Accepts a display label, a raw catalog value or the `All` sentinel.
    pub fn parse(label: &str) -> Self {
        let key = normalize_genre(label);
        if key.is_empty() || key == ALL_GENRES_LABEL.to_lowercase() {
            Self::All
        } else {
            Self::Genre(key)
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::All => ALL_GENRES_LABEL.to_owned(),
            Self::Genre(key) => genre_label(key),
        }
    }

    pub fn matches(&self, movie: &Movie) -> bool {
        match self {
            Self::All => true,
            Self::Genre(key) => normalize_genre(&movie.genre) == normalize_genre(key),
        }
    }
}

/// Inclusive rating bounds. `min <= max` always holds: each setter clamps the
/// incoming value against the other bound and the `[0, 10]` scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingRange {
    min: f64,
    max: f64,
}

impl Default for RatingRange {
    fn default() -> Self {
        Self {
            min: RATING_FLOOR,
            max: RATING_CEILING,
        }
    }
}

impl RatingRange {
    pub fn new(min: f64, max: f64) -> Self {
        let mut range = Self::default();
        range.set_max(max);
        range.set_min(min);
        range
    }

    pub const fn min(&self) -> f64 {
        self.min
    }

    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Returns false and leaves the range untouched for non-finite input.
    pub fn set_min(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.min = value.clamp(RATING_FLOOR, self.max);
        true
    }

    pub fn set_max(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.max = value.clamp(self.min, RATING_CEILING);
        true
    }

    /// A missing rating fails every bound.
    pub fn contains(&self, rating: Option<f64>) -> bool {
        match rating {
            Some(value) => self.min <= value && value <= self.max,
            None => false,
        }
    }

    pub fn is_full_scale(&self) -> bool {
        self.min == RATING_FLOOR && self.max == RATING_CEILING
    }
}

/// Visible subset of `catalog` for the given genre and rating bounds.
///
/// Two passes, genre then rating; catalog order is preserved.
pub fn filter_movies(catalog: &[Movie], genre: &GenreSelector, range: &RatingRange) -> Vec<Movie> {
    let by_genre: Vec<&Movie> = catalog
        .iter()
        .filter(|movie| genre.matches(movie))
        .collect();

    by_genre
        .into_iter()
        .filter(|movie| range.contains(movie.numeric_rating()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreOption {
    pub selector: GenreSelector,
    pub label: String,
}

/// `All` followed by each distinct normalized genre in first-seen order.
pub fn genre_options(catalog: &[Movie]) -> Vec<GenreOption> {
    let mut seen = HashSet::new();
    let mut options = vec![GenreOption {
        selector: GenreSelector::All,
        label: ALL_GENRES_LABEL.to_owned(),
    }];

    for movie in catalog {
        let selector = GenreSelector::parse(&movie.genre);
        if selector == GenreSelector::All || !seen.insert(selector.clone()) {
            continue;
        }
        options.push(GenreOption {
            label: selector.label(),
            selector,
        });
    }
    options
}

#[cfg(test)]
mod tests {
    use super::{
        GenreOption, GenreSelector, RatingRange, filter_movies, genre_label, genre_options,
        normalize_genre,
    };
    use crate::{FieldValue, Movie};

    fn movie(id: &str, genre: &str, rating: &str) -> Movie {
        Movie::new(id, id, genre, FieldValue::text(rating))
    }

    fn ids(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|movie| movie.id.as_str()).collect()
    }

    fn mixed_catalog() -> Vec<Movie> {
        vec![
            movie("a", "Action", "7"),
            movie("b", " action ", "9"),
            movie("c", "Drama", "3"),
            movie("d", "drama", "N/A"),
            movie("e", "Comedy", "5.5"),
            movie("f", "ACTION", "2"),
        ]
    }

    #[test]
    fn normalization_trims_and_case_folds() {
        assert_eq!(normalize_genre("  Sci-Fi "), "sci-fi");
        assert_eq!(genre_label("  sCI-fI "), "Sci-fi");
        assert_eq!(genre_label("science fiction"), "Science fiction");
        assert_eq!(genre_label("   "), "");
    }

    #[test]
    fn selector_parse_maps_sentinel_and_blank_to_all() {
        assert_eq!(GenreSelector::parse("All"), GenreSelector::All);
        assert_eq!(GenreSelector::parse(" all "), GenreSelector::All);
        assert_eq!(GenreSelector::parse(""), GenreSelector::All);
        assert_eq!(
            GenreSelector::parse(" Drama"),
            GenreSelector::Genre("drama".to_owned())
        );
        assert_eq!(GenreSelector::parse("drama").label(), "Drama");
    }

    #[test]
    fn action_scenario_keeps_both_normalized_entries() {
        let catalog = vec![
            movie("1", "Action", "7"),
            movie("2", " action ", "9"),
            movie("3", "Drama", "3"),
        ];
        let visible = filter_movies(
            &catalog,
            &GenreSelector::parse("Action"),
            &RatingRange::new(5.0, 10.0),
        );
        assert_eq!(ids(&visible), vec!["1", "2"]);
    }

    #[test]
    fn non_numeric_rating_is_excluded_from_full_range() {
        let catalog = vec![movie("1", "Drama", "8"), movie("2", "Drama", "N/A")];
        let visible = filter_movies(&catalog, &GenreSelector::All, &RatingRange::default());
        assert_eq!(ids(&visible), vec!["1"]);
    }

    #[test]
    fn all_with_full_range_returns_numeric_catalog_in_order() {
        let catalog: Vec<Movie> = mixed_catalog()
            .into_iter()
            .filter(|movie| movie.numeric_rating().is_some())
            .collect();
        let visible = filter_movies(&catalog, &GenreSelector::All, &RatingRange::default());
        assert_eq!(visible, catalog);
    }

    #[test]
    fn genre_filter_keeps_only_matching_genre_in_catalog_order() {
        let catalog = mixed_catalog();
        let selector = GenreSelector::parse("action");
        let visible = filter_movies(&catalog, &selector, &RatingRange::default());
        assert_eq!(ids(&visible), vec!["a", "b", "f"]);
        assert!(
            visible
                .iter()
                .all(|movie| normalize_genre(&movie.genre) == "action")
        );
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        let catalog = mixed_catalog();
        let visible = filter_movies(&catalog, &GenreSelector::All, &RatingRange::new(5.5, 7.0));
        assert_eq!(ids(&visible), vec!["a", "e"]);
        for movie in &visible {
            let rating = movie.numeric_rating().expect("visible rows are numeric");
            assert!((5.5..=7.0).contains(&rating));
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let catalog = mixed_catalog();
        let selector = GenreSelector::parse("Action");
        let range = RatingRange::new(3.0, 8.0);
        let once = filter_movies(&catalog, &selector, &range);
        let twice = filter_movies(&once, &selector, &range);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_catalog_yields_empty_result() {
        let visible = filter_movies(&[], &GenreSelector::All, &RatingRange::default());
        assert!(visible.is_empty());
    }

    #[test]
    fn unknown_genre_yields_empty_result() {
        let visible = filter_movies(
            &mixed_catalog(),
            &GenreSelector::parse("Western"),
            &RatingRange::default(),
        );
        assert!(visible.is_empty());
    }

    #[test]
    fn range_setters_clamp_against_each_other() {
        let mut range = RatingRange::default();
        assert!(range.set_max(6.0));
        assert!(range.set_min(8.0));
        assert_eq!(range.min(), 6.0);

        assert!(range.set_max(2.0));
        assert_eq!(range.max(), 6.0);

        assert!(range.set_min(-3.0));
        assert_eq!(range.min(), 0.0);
        assert!(range.set_max(42.0));
        assert_eq!(range.max(), 10.0);
        assert!(range.is_full_scale());
    }

    #[test]
    fn range_rejects_non_finite_input() {
        let mut range = RatingRange::new(2.0, 9.0);
        assert!(!range.set_min(f64::NAN));
        assert!(!range.set_max(f64::INFINITY));
        assert_eq!(range, RatingRange::new(2.0, 9.0));
    }

    #[test]
    fn new_range_clamps_inverted_bounds() {
        let range = RatingRange::new(9.0, 4.0);
        assert!(range.min() <= range.max());
        assert_eq!(range.max(), 4.0);
        assert_eq!(range.min(), 4.0);
    }

    #[test]
    fn genre_options_start_with_all_and_dedupe() {
        let options = genre_options(&mixed_catalog());
        let labels: Vec<&str> = options.iter().map(|option| option.label.as_str()).collect();
        assert_eq!(labels, vec!["All", "Action", "Drama", "Comedy"]);
        assert_eq!(
            options[1],
            GenreOption {
                selector: GenreSelector::Genre("action".to_owned()),
                label: "Action".to_owned(),
            }
        );
    }

    #[test]
    fn genre_options_skip_blank_genres() {
        let catalog = vec![movie("1", "  ", "5"), movie("2", "Noir", "5")];
        let labels: Vec<String> = genre_options(&catalog)
            .into_iter()
            .map(|option| option.label)
            .collect();
        assert_eq!(labels, vec!["All".to_owned(), "Noir".to_owned()]);
    }
}
