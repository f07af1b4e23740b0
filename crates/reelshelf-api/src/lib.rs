// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reelshelf_app::{FetchError, Movie, MovieId, NewMovie, UserEmail};
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://movie-master-server-ashy.vercel.app";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const ERROR_EXCERPT_LEN: usize = 200;

/// Blocking client for the movie collection endpoint.
///
/// Cloning is cheap; the underlying connection pool is shared, so background
/// search threads take their own clone.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        if timeout.is_zero() {
            bail!("api.timeout must be positive");
        }
        let base_url = Url::parse(&format!("{trimmed}/"))
            .with_context(|| format!("api.base_url {trimmed:?} is not a valid URL"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?}",
                base_url.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `GET /movies`: the whole catalog.
    pub fn list_movies(&self) -> Result<Vec<Movie>, FetchError> {
        let url = self.movies_url(&[])?;
        self.fetch_json(self.http.get(url.clone()), &url)
    }

    /// `GET /movies?search=<q>`: title matches.
    pub fn search_movies(&self, query: &str) -> Result<Vec<Movie>, FetchError> {
        let url = self.movies_url(&[])?;
        let url = with_query(url, "search", query.trim());
        self.fetch_json(self.http.get(url.clone()), &url)
    }

    /// `GET /movies?addedBy=<email>`: one user's collection.
    pub fn list_owned(&self, email: &UserEmail) -> Result<Vec<Movie>, FetchError> {
        let url = self.movies_url(&[])?;
        let url = with_query(url, "addedBy", email.as_str());
        self.fetch_json(self.http.get(url.clone()), &url)
    }

    pub fn get_movie(&self, id: &MovieId) -> Result<Movie, FetchError> {
        let url = self.movies_url(&[id.as_str()])?;
        self.fetch_json(self.http.get(url.clone()), &url)
    }

    /// `POST /movies`. Returns the server-assigned id when the reply has one.
    pub fn create_movie(&self, movie: &NewMovie) -> Result<Option<MovieId>, FetchError> {
        let url = self.movies_url(&[])?;
        let reply: InsertReply = self.fetch_json(self.http.post(url.clone()).json(movie), &url)?;
        Ok(reply.inserted_id)
    }

    /// `PATCH /movies/<id>` with every field except `_id`.
    pub fn update_movie(&self, id: &MovieId, movie: &Movie) -> Result<(), FetchError> {
        let url = self.movies_url(&[id.as_str()])?;
        self.send(self.http.patch(url.clone()).json(&movie.update_body()), &url)
    }

    pub fn set_watchlist(
        &self,
        id: &MovieId,
        in_watchlist: bool,
        added_by: &UserEmail,
    ) -> Result<(), FetchError> {
        let url = self.movies_url(&[id.as_str()])?;
        let body = serde_json::json!({
            "inWatchlist": in_watchlist,
            "addedBy": added_by,
        });
        self.send(self.http.patch(url.clone()).json(&body), &url)
    }

    pub fn delete_movie(&self, id: &MovieId) -> Result<(), FetchError> {
        let url = self.movies_url(&[id.as_str()])?;
        self.send(self.http.delete(url.clone()), &url)
    }

    /// Reads the catalog once, for `--check`.
    pub fn ping(&self) -> Result<usize> {
        let movies = self.list_movies().with_context(|| {
            format!(
                "cannot load movies from {} -- check [api].base_url",
                self.base_url()
            )
        })?;
        Ok(movies.len())
    }

    fn movies_url(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                FetchError::transport(self.base_url.as_str(), "base URL cannot hold a path")
            })?;
            path.pop_if_empty().push("movies");
            path.extend(segments);
        }
        Ok(url)
    }

    fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, FetchError> {
        let response = self.execute(request, url)?;
        response
            .json()
            .map_err(|error| FetchError::decode(error.to_string()))
    }

    fn send(&self, request: RequestBuilder, url: &Url) -> Result<(), FetchError> {
        self.execute(request, url).map(drop)
    }

    fn execute(&self, request: RequestBuilder, url: &Url) -> Result<Response, FetchError> {
        debug!(%url, "movie server request");
        let response = request.send().map_err(|error| {
            warn!(%url, %error, "movie server unreachable");
            FetchError::transport(self.base_url(), error.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(%url, status = status.as_u16(), "movie server rejected request");
            return Err(FetchError::status(status.as_u16(), excerpt(&body)));
        }
        Ok(response)
    }
}

fn with_query(mut url: Url, key: &str, value: &str) -> Url {
    url.query_pairs_mut().append_pair(key, value);
    url
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(ERROR_EXCERPT_LEN) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_owned(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertReply {
    #[serde(default)]
    inserted_id: Option<MovieId>,
}
