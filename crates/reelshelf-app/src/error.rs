// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

/// Failure to read from or write to the movie collection endpoint.
///
/// Catalog and search loads recover locally (empty list, cleared
/// suggestions); nothing here is fatal to the application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("cannot reach movie server at {url}: {message}")]
    Transport { url: String, message: String },

    #[error("movie server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("decode movie server response: {message}")]
    Decode { message: String },
}

impl FetchError {
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}
