// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Debounced search-as-you-type.
//!
//! The machine owns no timer. Callers pass the current `Instant` to every
//! transition and call [`IncrementalSearch::poll`] when
//! [`IncrementalSearch::next_deadline`] has passed, so tests can drive it
//! with a simulated clock.

use std::time::{Duration, Instant};

use crate::{FetchError, Movie, Route};

pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(500);
pub const DEFAULT_MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub quiet_window: Duration,
    pub min_query_chars: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            quiet_window: DEFAULT_QUIET_WINDOW,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Pending { deadline: Instant },
    Fetching { request_id: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub request_id: u64,
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    Applied,
    Stale,
}

#[derive(Debug, Clone)]
pub struct IncrementalSearch {
    settings: SearchSettings,
    query: String,
    phase: SearchPhase,
    latest_request: u64,
    suggestions: Vec<Movie>,
}

impl Default for IncrementalSearch {
    fn default() -> Self {
        Self::new(SearchSettings::default())
    }
}

impl IncrementalSearch {
    pub fn new(settings: SearchSettings) -> Self {
        Self {
            settings,
            query: String::new(),
            phase: SearchPhase::Idle,
            latest_request: 0,
            suggestions: Vec::new(),
        }
    }

    pub fn settings(&self) -> SearchSettings {
        self.settings
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn suggestions(&self) -> &[Movie] {
        &self.suggestions
    }

    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            SearchPhase::Pending { deadline } => Some(deadline),
            SearchPhase::Idle | SearchPhase::Fetching { .. } => None,
        }
    }

    /// Records an edit and (re)arms the quiet window. Any deadline armed by
    /// an earlier edit is replaced, so at most one is ever live.
    pub fn on_query_change(&mut self, query: impl Into<String>, now: Instant) {
        self.query = query.into();
        self.phase = SearchPhase::Pending {
            deadline: now + self.settings.quiet_window,
        };
    }

    pub fn push_char(&mut self, ch: char, now: Instant) {
        let mut query = std::mem::take(&mut self.query);
        query.push(ch);
        self.on_query_change(query, now);
    }

    pub fn pop_char(&mut self, now: Instant) {
        let mut query = std::mem::take(&mut self.query);
        query.pop();
        self.on_query_change(query, now);
    }

    /// Fires the debounce timer if its deadline has passed.
    ///
    /// Returns the request to send, or `None` when nothing is due or the
    /// settled query is shorter than the minimum (suggestions are cleared).
    pub fn poll(&mut self, now: Instant) -> Option<SearchRequest> {
        let SearchPhase::Pending { deadline } = self.phase else {
            return None;
        };
        if now < deadline {
            return None;
        }

        let trimmed = self.query.trim();
        if trimmed.chars().count() < self.settings.min_query_chars {
            self.supersede();
            return None;
        }

        let query = trimmed.to_owned();
        self.latest_request += 1;
        self.phase = SearchPhase::Fetching {
            request_id: self.latest_request,
        };
        Some(SearchRequest {
            request_id: self.latest_request,
            query,
        })
    }

    /// Applies a search reply unless a newer request has been issued since.
    /// A failed reply clears the suggestions without surfacing an error.
    pub fn on_response(
        &mut self,
        request_id: u64,
        result: Result<Vec<Movie>, FetchError>,
    ) -> ResponseOutcome {
        if request_id != self.latest_request {
            return ResponseOutcome::Stale;
        }

        match result {
            Ok(movies) => self.suggestions = movies,
            Err(_) => self.suggestions.clear(),
        }
        if self.phase == (SearchPhase::Fetching { request_id }) {
            self.phase = SearchPhase::Idle;
        }
        ResponseOutcome::Applied
    }

    /// Form submit: skips the debounce and routes to full results. The query
    /// text is kept; suggestions and any pending or in-flight lookup are
    /// dropped.
    pub fn submit(&mut self) -> Route {
        let trimmed = self.query.trim().to_owned();
        self.supersede();
        if trimmed.is_empty() {
            Route::AllMovies
        } else {
            Route::SearchResults(trimmed)
        }
    }

    /// Picks a suggestion: clears query and suggestions and routes to the
    /// movie's detail view.
    pub fn select(&mut self, index: usize) -> Option<Route> {
        let movie = self.suggestions.get(index)?;
        let route = Route::MovieDetails(movie.id.clone());
        self.query.clear();
        self.supersede();
        Some(route)
    }

    pub fn reset(&mut self) {
        self.query.clear();
        self.supersede();
    }

    /// Drops suggestions and returns to idle. The request counter advances so
    /// a reply still in flight can no longer be applied.
    fn supersede(&mut self) {
        self.latest_request += 1;
        self.suggestions.clear();
        self.phase = SearchPhase::Idle;
    }
}
