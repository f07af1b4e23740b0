// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use reelshelf_api::Client;
use reelshelf_app::{FetchError, Movie, MovieId, NewMovie, SearchRequest, UserEmail};
use reelshelf_testkit::MovieFaker;
use reelshelf_tui::{CatalogRuntime, InternalEvent};
use std::sync::mpsc::Sender;
use std::thread;
use tracing::debug;

/// Talks to the movie server. Suggestion lookups run on their own thread so
/// typing never waits on the network.
pub struct ApiRuntime {
    client: Client,
}

impl ApiRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl CatalogRuntime for ApiRuntime {
    fn load_catalog(&mut self) -> Result<Vec<Movie>, FetchError> {
        self.client.list_movies()
    }

    fn load_owned(&mut self, owner: &UserEmail) -> Result<Vec<Movie>, FetchError> {
        self.client.list_owned(owner)
    }

    fn search(&mut self, query: &str) -> Result<Vec<Movie>, FetchError> {
        self.client.search_movies(query)
    }

    fn get_movie(&mut self, id: &MovieId) -> Result<Movie, FetchError> {
        self.client.get_movie(id)
    }

    fn add_to_collection(&mut self, movie: &NewMovie) -> Result<Option<MovieId>, FetchError> {
        self.client.create_movie(movie)
    }

    fn set_watchlist(
        &mut self,
        id: &MovieId,
        in_watchlist: bool,
        owner: &UserEmail,
    ) -> Result<(), FetchError> {
        self.client.set_watchlist(id, in_watchlist, owner)
    }

    fn update_movie(&mut self, id: &MovieId, movie: &Movie) -> Result<(), FetchError> {
        self.client.update_movie(id, movie)
    }

    fn delete_movie(&mut self, id: &MovieId) -> Result<(), FetchError> {
        self.client.delete_movie(id)
    }

    fn spawn_search(&mut self, request: SearchRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name(format!("search-{}", request.request_id))
            .spawn(move || {
                let result = client.search_movies(&request.query);
                if tx
                    .send(InternalEvent::SearchCompleted {
                        request_id: request.request_id,
                        result,
                    })
                    .is_err()
                {
                    debug!(
                        request_id = request.request_id,
                        "search finished after the UI exited"
                    );
                }
            })
            .map_err(|error| anyhow!("spawn search thread: {error}"))?;
        Ok(())
    }
}

/// In-memory catalog seeded from the faker, for `--demo`.
pub struct DemoRuntime {
    movies: Vec<Movie>,
    next_id: u64,
}

pub const DEMO_CATALOG_LEN: usize = 40;

impl DemoRuntime {
    pub fn new(seed: u64) -> Self {
        let mut faker = MovieFaker::new(seed);
        Self {
            movies: faker.catalog(DEMO_CATALOG_LEN),
            next_id: 1,
        }
    }

    #[cfg(test)]
    pub fn with_movies(movies: Vec<Movie>) -> Self {
        Self { movies, next_id: 1 }
    }

    #[cfg(test)]
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    fn find_mut(&mut self, id: &MovieId) -> Result<&mut Movie, FetchError> {
        self.movies
            .iter_mut()
            .find(|movie| &movie.id == id)
            .ok_or_else(|| FetchError::status(404, format!("movie {id} not found")))
    }
}

impl CatalogRuntime for DemoRuntime {
    fn load_catalog(&mut self) -> Result<Vec<Movie>, FetchError> {
        Ok(self.movies.clone())
    }

    fn load_owned(&mut self, owner: &UserEmail) -> Result<Vec<Movie>, FetchError> {
        Ok(self
            .movies
            .iter()
            .filter(|movie| movie.added_by.as_ref() == Some(owner))
            .cloned()
            .collect())
    }

    /// Case-insensitive title substring match, like the server's `search`.
    fn search(&mut self, query: &str) -> Result<Vec<Movie>, FetchError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .movies
            .iter()
            .filter(|movie| movie.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn get_movie(&mut self, id: &MovieId) -> Result<Movie, FetchError> {
        self.find_mut(id).map(|movie| movie.clone())
    }

    fn add_to_collection(&mut self, movie: &NewMovie) -> Result<Option<MovieId>, FetchError> {
        let id = MovieId::new(format!("demo-{}", self.next_id));
        self.next_id += 1;

        let mut record = Movie::new(
            id.clone(),
            &movie.title,
            &movie.genre,
            movie.rating.clone(),
        );
        record.release_year = Some(movie.release_year.clone());
        record.poster_url = Some(movie.poster_url.clone()).filter(|url| !url.is_empty());
        record.added_by = Some(movie.added_by.clone());
        self.movies.push(record);
        Ok(Some(id))
    }

    fn set_watchlist(
        &mut self,
        id: &MovieId,
        in_watchlist: bool,
        owner: &UserEmail,
    ) -> Result<(), FetchError> {
        let movie = self.find_mut(id)?;
        movie.in_watchlist = Some(in_watchlist);
        movie.added_by = Some(owner.clone());
        Ok(())
    }

    fn update_movie(&mut self, id: &MovieId, movie: &Movie) -> Result<(), FetchError> {
        let slot = self.find_mut(id)?;
        let mut record = movie.clone();
        record.id = id.clone();
        *slot = record;
        Ok(())
    }

    fn delete_movie(&mut self, id: &MovieId) -> Result<(), FetchError> {
        let before = self.movies.len();
        self.movies.retain(|movie| &movie.id != id);
        if self.movies.len() == before {
            return Err(FetchError::status(404, format!("movie {id} not found")));
        }
        Ok(())
    }
}
