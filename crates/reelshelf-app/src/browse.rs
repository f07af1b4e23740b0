// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    FetchError, GenreOption, GenreSelector, Movie, MovieId, RatingRange, filter_movies,
    genre_options,
};

pub const RATING_STEP: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Min,
    Max,
}

/// What the browse body should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrowseBody<'a> {
    Loading,
    Failed(&'a str),
    NoMatches,
    Rows(&'a [Movie]),
}

/// Working state of the browse view: the loaded catalog, its genre options,
/// the user's filter choices and the derived visible rows.
///
/// `visible` is recomputed from scratch after every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseView {
    load: LoadState,
    catalog: Vec<Movie>,
    genres: Vec<GenreOption>,
    selected_genre: GenreSelector,
    rating_range: RatingRange,
    visible: Vec<Movie>,
}

impl Default for BrowseView {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowseView {
    pub fn new() -> Self {
        Self {
            load: LoadState::Loading,
            catalog: Vec::new(),
            genres: genre_options(&[]),
            selected_genre: GenreSelector::All,
            rating_range: RatingRange::default(),
            visible: Vec::new(),
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn catalog(&self) -> &[Movie] {
        &self.catalog
    }

    pub fn genres(&self) -> &[GenreOption] {
        &self.genres
    }

    pub fn selected_genre(&self) -> &GenreSelector {
        &self.selected_genre
    }

    pub fn rating_range(&self) -> RatingRange {
        self.rating_range
    }

    pub fn visible(&self) -> &[Movie] {
        &self.visible
    }

    pub fn begin_load(&mut self) {
        self.load = LoadState::Loading;
    }

    /// Installs a load result. A failure leaves an empty catalog until the
    /// caller loads again; filter choices carry over either way.
    pub fn finish_load(&mut self, result: Result<Vec<Movie>, FetchError>) {
        match result {
            Ok(movies) => {
                self.catalog = movies;
                self.load = LoadState::Loaded;
            }
            Err(error) => {
                self.catalog.clear();
                self.load = LoadState::Failed {
                    message: error.to_string(),
                };
            }
        }
        self.genres = genre_options(&self.catalog);
        self.recompute();
    }

    pub fn select_genre(&mut self, selector: GenreSelector) {
        self.selected_genre = selector;
        self.recompute();
    }

    /// Steps through the genre options, wrapping at either end. A selection
    /// that is no longer offered restarts from `All`.
    pub fn cycle_genre(&mut self, delta: isize) {
        let len = self.genres.len();
        if len == 0 {
            return;
        }
        let current = self
            .genres
            .iter()
            .position(|option| option.selector == self.selected_genre)
            .unwrap_or(0);
        let next = (current as isize + delta).rem_euclid(len as isize) as usize;
        self.selected_genre = self.genres[next].selector.clone();
        self.recompute();
    }

    pub fn set_min_rating(&mut self, value: f64) -> bool {
        let changed = self.rating_range.set_min(value);
        self.recompute();
        changed
    }

    pub fn set_max_rating(&mut self, value: f64) -> bool {
        let changed = self.rating_range.set_max(value);
        self.recompute();
        changed
    }

    /// Moves one bound by `steps` increments of [`RATING_STEP`], clamped.
    pub fn nudge(&mut self, bound: RangeBound, steps: i32) {
        let delta = f64::from(steps) * RATING_STEP;
        match bound {
            RangeBound::Min => {
                self.rating_range.set_min(self.rating_range.min() + delta);
            }
            RangeBound::Max => {
                self.rating_range.set_max(self.rating_range.max() + delta);
            }
        }
        self.recompute();
    }

    pub fn reset_filters(&mut self) {
        self.selected_genre = GenreSelector::All;
        self.rating_range = RatingRange::default();
        self.recompute();
    }

    /// Drops a movie after the server confirmed its deletion. The genre
    /// options stay as loaded.
    pub fn remove_movie(&mut self, id: &MovieId) -> Option<Movie> {
        let index = self.catalog.iter().position(|movie| &movie.id == id)?;
        let removed = self.catalog.remove(index);
        self.recompute();
        Some(removed)
    }

    /// Swaps in an edited record, keeping its catalog position.
    pub fn replace_movie(&mut self, movie: Movie) -> bool {
        let Some(slot) = self.catalog.iter_mut().find(|slot| slot.id == movie.id) else {
            return false;
        };
        *slot = movie;
        self.genres = genre_options(&self.catalog);
        self.recompute();
        true
    }

    pub fn body(&self) -> BrowseBody<'_> {
        match &self.load {
            LoadState::Loading => BrowseBody::Loading,
            LoadState::Failed { message } => BrowseBody::Failed(message),
            LoadState::Loaded if self.visible.is_empty() => BrowseBody::NoMatches,
            LoadState::Loaded => BrowseBody::Rows(&self.visible),
        }
    }

    fn recompute(&mut self) {
        self.visible = filter_movies(&self.catalog, &self.selected_genre, &self.rating_range);
    }
}

#[cfg(test)]
mod tests {
    use super::{BrowseBody, BrowseView, LoadState, RangeBound};
    use crate::{FetchError, FieldValue, GenreSelector, Movie, MovieId};

    fn movie(id: &str, genre: &str, rating: &str) -> Movie {
        Movie::new(id, id, genre, FieldValue::text(rating))
    }

    fn loaded() -> BrowseView {
        let mut view = BrowseView::new();
        view.finish_load(Ok(vec![
            movie("a", "Action", "7"),
            movie("b", " action ", "9"),
            movie("c", "Drama", "3"),
            movie("d", "Comedy", "N/A"),
        ]));
        view
    }

    fn visible_ids(view: &BrowseView) -> Vec<&str> {
        view.visible().iter().map(|movie| movie.id.as_str()).collect()
    }

    #[test]
    fn starts_loading_with_only_all_genre() {
        let view = BrowseView::new();
        assert_eq!(view.body(), BrowseBody::Loading);
        assert_eq!(view.genres().len(), 1);
        assert_eq!(view.selected_genre(), &GenreSelector::All);
    }

    #[test]
    fn load_derives_genres_and_default_view() {
        let view = loaded();
        assert_eq!(view.load_state(), &LoadState::Loaded);
        let labels: Vec<&str> = view.genres().iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["All", "Action", "Drama", "Comedy"]);
        assert_eq!(visible_ids(&view), vec!["a", "b", "c"]);
    }

    #[test]
    fn failed_load_shows_failure_and_empty_catalog() {
        let mut view = loaded();
        view.begin_load();
        view.finish_load(Err(FetchError::status(500, "boom")));
        assert!(view.catalog().is_empty());
        assert_eq!(view.genres().len(), 1);
        match view.body() {
            BrowseBody::Failed(message) => assert!(message.contains("500")),
            other => panic!("expected failure body, got {other:?}"),
        }
    }

    #[test]
    fn every_filter_change_recomputes() {
        let mut view = loaded();
        view.select_genre(GenreSelector::parse("ACTION"));
        assert_eq!(visible_ids(&view), vec!["a", "b"]);

        assert!(view.set_min_rating(8.0));
        assert_eq!(visible_ids(&view), vec!["b"]);

        view.reset_filters();
        assert_eq!(visible_ids(&view), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_result_reports_no_matches() {
        let mut view = loaded();
        view.select_genre(GenreSelector::parse("Drama"));
        view.set_min_rating(5.0);
        assert_eq!(view.body(), BrowseBody::NoMatches);
    }

    #[test]
    fn cycle_genre_wraps_both_ways() {
        let mut view = loaded();
        view.cycle_genre(1);
        assert_eq!(view.selected_genre().label(), "Action");
        view.cycle_genre(-2);
        assert_eq!(view.selected_genre().label(), "Comedy");
        view.cycle_genre(1);
        assert_eq!(view.selected_genre(), &GenreSelector::All);
    }

    #[test]
    fn nudge_keeps_bounds_ordered() {
        let mut view = loaded();
        view.nudge(RangeBound::Max, -8);
        assert_eq!(view.rating_range().max(), 6.0);
        view.nudge(RangeBound::Min, 20);
        assert_eq!(view.rating_range().min(), 6.0);
        view.nudge(RangeBound::Max, -4);
        assert_eq!(view.rating_range().max(), 6.0);
        assert!(view.rating_range().min() <= view.rating_range().max());
    }

    #[test]
    fn remove_movie_updates_visible_rows_but_not_genres() {
        let mut view = loaded();
        view.select_genre(GenreSelector::parse("Drama"));
        let removed = view.remove_movie(&MovieId::new("c"));
        assert_eq!(removed.map(|movie| movie.title), Some("c".to_owned()));
        assert_eq!(view.body(), BrowseBody::NoMatches);
        assert_eq!(view.genres().len(), 4);
        assert!(view.remove_movie(&MovieId::new("missing")).is_none());
    }

    #[test]
    fn replace_movie_keeps_position() {
        let mut view = loaded();
        let mut edited = movie("c", "Thriller", "8");
        edited.title = "Cure".to_owned();
        assert!(view.replace_movie(edited));
        let titles: Vec<&str> = view.visible().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "Cure"]);
        assert!(view.genres().iter().any(|g| g.label == "Thriller"));
        assert!(!view.replace_movie(movie("zz", "Drama", "1")));
    }
}
