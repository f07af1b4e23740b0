// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use time::Date;

use crate::{FieldValue, Identity, Movie, NewMovie, RATING_CEILING, RATING_FLOOR};

/// Year of the earliest surviving motion picture.
pub const EARLIEST_RELEASE_YEAR: i32 = 1888;
/// How far ahead of today an announced release may be dated.
pub const RELEASE_YEAR_LOOKAHEAD: i32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieFormInput {
    pub title: String,
    pub genre: String,
    pub rating: String,
    pub release_year: String,
    pub poster_url: String,
}

impl MovieFormInput {
    /// Prefills the form from an existing record.
    pub fn from_movie(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            genre: movie.genre.clone(),
            rating: movie.rating_label(),
            release_year: movie.release_year_label(),
            poster_url: movie.poster_url.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self, today: Date) -> Result<()> {
        if self.title.trim().is_empty() {
            bail!("title is required");
        }
        if self.genre.trim().is_empty() {
            bail!("genre is required");
        }

        let rating = self.rating.trim();
        let value: f64 = rating
            .parse()
            .map_err(|_| anyhow!("rating {rating:?} is not a number"))?;
        if !value.is_finite() || !(RATING_FLOOR..=RATING_CEILING).contains(&value) {
            bail!("rating must be between {RATING_FLOOR} and {RATING_CEILING}, got {rating}");
        }

        let year_text = self.release_year.trim();
        let year: i32 = year_text
            .parse()
            .map_err(|_| anyhow!("release year {year_text:?} is not a whole number"))?;
        let latest = today.year() + RELEASE_YEAR_LOOKAHEAD;
        if !(EARLIEST_RELEASE_YEAR..=latest).contains(&year) {
            bail!("release year must be between {EARLIEST_RELEASE_YEAR} and {latest}, got {year}");
        }

        let poster = self.poster_url.trim();
        if !poster.is_empty() && !(poster.starts_with("http://") || poster.starts_with("https://"))
        {
            bail!("poster URL must start with http:// or https://");
        }
        Ok(())
    }

    /// Builds the create body. Call [`Self::validate`] first.
    pub fn into_new_movie(self, owner: &Identity) -> NewMovie {
        NewMovie {
            title: self.title.trim().to_owned(),
            genre: self.genre.trim().to_owned(),
            rating: FieldValue::text(self.rating.trim()),
            release_year: FieldValue::text(self.release_year.trim()),
            poster_url: self.poster_url.trim().to_owned(),
            added_by: owner.email.clone(),
        }
    }

    /// Applies the edited fields onto `movie`; owner, watchlist flag and any
    /// unknown server fields are carried over.
    pub fn apply_to(&self, movie: &Movie) -> Movie {
        let poster = self.poster_url.trim();
        Movie {
            title: self.title.trim().to_owned(),
            genre: self.genre.trim().to_owned(),
            rating: Some(FieldValue::text(self.rating.trim())),
            release_year: Some(FieldValue::text(self.release_year.trim())),
            poster_url: (!poster.is_empty()).then(|| poster.to_owned()),
            ..movie.clone()
        }
    }
}
