// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use time::OffsetDateTime;

use crate::ids::*;

/// A scalar the server may store either as a JSON number or as text.
/// Whichever representation arrived is the one sent back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(Number),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Numeric coercion. Blank text, unparseable text and non-finite values
    /// yield `None`.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Self::Number(number) => number.as_f64()?,
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()?
            }
        };
        value.is_finite().then_some(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// A catalog record as the server stores it.
///
/// Explicit `null`s and absent `title`/`genre` keys are remembered, so a
/// decoded record encodes back to the same object unless a field was edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub genre: String,
    pub rating: Option<FieldValue>,
    pub release_year: Option<FieldValue>,
    pub poster_url: Option<String>,
    pub added_by: Option<UserEmail>,
    pub in_watchlist: Option<bool>,
    pub extra: Map<String, Value>,
    pub(crate) shape: WireShape,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovieRecord {
    #[serde(rename = "_id")]
    id: MovieId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rating: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    release_year: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    added_by: Option<UserEmail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    in_watchlist: Option<bool>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Known keys the server may send as `null` or leave out.
const NULLABLE_KEYS: [&str; 7] = [
    "title",
    "genre",
    "rating",
    "releaseYear",
    "posterUrl",
    "addedBy",
    "inWatchlist",
];

/// Keys that decode to an empty string when absent.
const TEXT_KEYS: [&str; 2] = ["title", "genre"];

/// How the known keys were encoded on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct WireShape {
    nulls: Vec<&'static str>,
    missing: Vec<&'static str>,
}

impl WireShape {
    /// Records and strips explicit nulls so the typed decode sees defaults.
    fn capture(map: &mut Map<String, Value>) -> Self {
        let mut shape = Self::default();
        for key in NULLABLE_KEYS {
            match map.get(key) {
                Some(Value::Null) => {
                    map.remove(key);
                    shape.nulls.push(key);
                }
                None if TEXT_KEYS.contains(&key) => shape.missing.push(key),
                _ => {}
            }
        }
        shape
    }

    /// Puts nulls and absences back for fields still holding their default.
    fn restore(&self, map: &mut Map<String, Value>) {
        for key in &self.nulls {
            if map.get(*key).is_none_or(is_empty_text) {
                map.insert((*key).to_owned(), Value::Null);
            }
        }
        for key in &self.missing {
            if map.get(*key).is_some_and(is_empty_text) {
                map.remove(*key);
            }
        }
    }
}

fn is_empty_text(value: &Value) -> bool {
    value.as_str().is_some_and(str::is_empty)
}

impl TryFrom<Map<String, Value>> for Movie {
    type Error = serde_json::Error;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        let shape = WireShape::capture(&mut map);
        let record: MovieRecord = serde_json::from_value(Value::Object(map))?;
        Ok(Self {
            id: record.id,
            title: record.title,
            genre: record.genre,
            rating: record.rating,
            release_year: record.release_year,
            poster_url: record.poster_url,
            added_by: record.added_by,
            in_watchlist: record.in_watchlist,
            extra: record.extra,
            shape,
        })
    }
}

impl From<Movie> for Map<String, Value> {
    fn from(movie: Movie) -> Self {
        let Movie {
            id,
            title,
            genre,
            rating,
            release_year,
            poster_url,
            added_by,
            in_watchlist,
            extra,
            shape,
        } = movie;
        let record = MovieRecord {
            id,
            title,
            genre,
            rating,
            release_year,
            poster_url,
            added_by,
            in_watchlist,
            extra,
        };
        let mut map = match serde_json::to_value(record) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        shape.restore(&mut map);
        map
    }
}

impl Movie {
    pub fn new(id: impl Into<MovieId>, title: &str, genre: &str, rating: FieldValue) -> Self {
        Self {
            id: id.into(),
            title: title.to_owned(),
            genre: genre.to_owned(),
            rating: Some(rating),
            release_year: None,
            poster_url: None,
            added_by: None,
            in_watchlist: None,
            extra: Map::new(),
            shape: WireShape::default(),
        }
    }

    pub fn numeric_rating(&self) -> Option<f64> {
        self.rating.as_ref().and_then(FieldValue::as_number)
    }

    pub fn rating_label(&self) -> String {
        self.rating
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    pub fn release_year_label(&self) -> String {
        self.release_year
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    pub fn is_owned_by(&self, identity: Option<&Identity>) -> bool {
        match (identity, &self.added_by) {
            (Some(identity), Some(owner)) => !owner.is_blank() && owner == &identity.email,
            _ => false,
        }
    }

    pub fn is_in_watchlist(&self) -> bool {
        self.in_watchlist.unwrap_or(false)
    }

    pub fn created_at(&self) -> Option<OffsetDateTime> {
        self.id.created_at()
    }

    /// Copy of this record owned by `owner`, for adding to their collection.
    pub fn copy_for(&self, owner: &Identity) -> NewMovie {
        NewMovie {
            title: self.title.clone(),
            genre: self.genre.clone(),
            rating: self.rating.clone().unwrap_or_else(|| FieldValue::text("")),
            release_year: self
                .release_year
                .clone()
                .unwrap_or_else(|| FieldValue::text("")),
            poster_url: self.poster_url.clone().unwrap_or_default(),
            added_by: owner.email.clone(),
        }
    }

    /// Owner recorded when flagging for the watchlist: the existing owner,
    /// or `identity` for unowned records.
    pub fn watchlist_owner(&self, identity: &Identity) -> UserEmail {
        match &self.added_by {
            Some(owner) if !owner.is_blank() => owner.clone(),
            _ => identity.email.clone(),
        }
    }

    /// Body for a full-record update: everything except the id.
    pub fn update_body(&self) -> Value {
        let mut body = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        body.remove("_id");
        Value::Object(body)
    }
}

/// POST body for a movie added by the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
    pub title: String,
    pub genre: String,
    pub rating: FieldValue,
    pub release_year: FieldValue,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub poster_url: String,
    pub added_by: UserEmail,
}

/// Current user as reported by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: UserEmail,
    pub display_name: String,
    pub photo_url: Option<String>,
}

impl Identity {
    pub fn new(email: &str) -> Self {
        Self {
            email: UserEmail::new(email),
            display_name: String::new(),
            photo_url: None,
        }
    }

    pub fn label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            self.email.as_str()
        } else {
            &self.display_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldValue, Identity, Movie, NewMovie};
    use crate::{MovieId, UserEmail};
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn text_ratings_coerce_to_numbers() {
        assert_eq!(FieldValue::text("7").as_number(), Some(7.0));
        assert_eq!(FieldValue::text(" 8.5 ").as_number(), Some(8.5));
        assert_eq!(FieldValue::text("N/A").as_number(), None);
        assert_eq!(FieldValue::text("").as_number(), None);
        assert_eq!(FieldValue::text("   ").as_number(), None);
        assert_eq!(FieldValue::text("inf").as_number(), None);
        assert_eq!(FieldValue::text("NaN").as_number(), None);
    }

    #[test]
    fn numeric_ratings_pass_through() -> Result<()> {
        let value: FieldValue = serde_json::from_value(json!(9.1))?;
        assert_eq!(value.as_number(), Some(9.1));
        let value: FieldValue = serde_json::from_value(json!(6))?;
        assert_eq!(value.as_number(), Some(6.0));
        Ok(())
    }

    #[test]
    fn movie_decodes_wire_shape() -> Result<()> {
        let movie: Movie = serde_json::from_value(json!({
            "_id": "65a1b2c3d4e5f60718293a4b",
            "title": "Heat",
            "genre": " Action ",
            "rating": "8.3",
            "releaseYear": 1995,
            "posterUrl": "https://img.example/heat.jpg",
            "addedBy": "neil@example.com",
            "inWatchlist": true,
            "duration": "170"
        }))?;
        assert_eq!(movie.id, MovieId::new("65a1b2c3d4e5f60718293a4b"));
        assert_eq!(movie.numeric_rating(), Some(8.3));
        assert_eq!(movie.release_year_label(), "1995");
        assert_eq!(movie.added_by, Some(UserEmail::new("neil@example.com")));
        assert!(movie.is_in_watchlist());
        assert_eq!(movie.extra.get("duration"), Some(&json!("170")));
        Ok(())
    }

    #[test]
    fn movie_round_trips_unchanged() -> Result<()> {
        let wire = json!({
            "_id": "m1",
            "title": "Alien",
            "genre": "Horror",
            "rating": "8.5",
            "releaseYear": "1979",
            "addedBy": "ripley@example.com",
            "duration": 117
        });
        let movie: Movie = serde_json::from_value(wire.clone())?;
        assert_eq!(serde_json::to_value(&movie)?, wire);
        Ok(())
    }

    #[test]
    fn nulls_and_missing_text_fields_round_trip_unchanged() -> Result<()> {
        let wire = json!({
            "_id": "m1",
            "title": "Alien",
            "genre": "Horror",
            "rating": null,
            "inWatchlist": null,
            "posterUrl": null
        });
        let movie: Movie = serde_json::from_value(wire.clone())?;
        assert_eq!(movie.rating, None);
        assert_eq!(serde_json::to_value(&movie)?, wire);

        let bare = json!({"_id": "m2", "title": null, "rating": "7"});
        let movie: Movie = serde_json::from_value(bare.clone())?;
        assert_eq!(movie.title, "");
        assert_eq!(movie.genre, "");
        assert_eq!(serde_json::to_value(&movie)?, bare);
        Ok(())
    }

    #[test]
    fn edited_fields_replace_remembered_nulls() -> Result<()> {
        let mut movie: Movie = serde_json::from_value(json!({
            "_id": "m1",
            "rating": null,
            "posterUrl": null
        }))?;
        movie.title = "Alien".to_owned();
        movie.rating = Some(FieldValue::text("8.5"));

        let body = movie.update_body();
        assert_eq!(
            body,
            json!({
                "title": "Alien",
                "rating": "8.5",
                "posterUrl": null
            })
        );
        Ok(())
    }

    #[test]
    fn missing_and_null_ratings_are_non_numeric() -> Result<()> {
        let missing: Movie = serde_json::from_value(json!({"_id": "a", "title": "x"}))?;
        assert_eq!(missing.numeric_rating(), None);
        assert_eq!(missing.genre, "");

        let null: Movie = serde_json::from_value(json!({"_id": "b", "rating": null}))?;
        assert_eq!(null.numeric_rating(), None);
        assert_eq!(null.rating_label(), "");
        Ok(())
    }

    #[test]
    fn update_body_omits_id() -> Result<()> {
        let mut movie = Movie::new("m9", "Up", "Animation", FieldValue::text("8"));
        movie.extra.insert("duration".to_owned(), json!("96"));
        let body = movie.update_body();
        assert!(body.get("_id").is_none());
        assert_eq!(body.get("title"), Some(&json!("Up")));
        assert_eq!(body.get("duration"), Some(&json!("96")));
        Ok(())
    }

    #[test]
    fn ownership_requires_matching_email() {
        let mut movie = Movie::new("m1", "Heat", "Action", FieldValue::text("8"));
        let neil = Identity::new("neil@example.com");
        assert!(!movie.is_owned_by(Some(&neil)));

        movie.added_by = Some(UserEmail::new("neil@example.com"));
        assert!(movie.is_owned_by(Some(&neil)));
        assert!(!movie.is_owned_by(None));
        assert!(!movie.is_owned_by(Some(&Identity::new("vincent@example.com"))));
    }

    #[test]
    fn new_movie_serializes_camel_case() -> Result<()> {
        let body = serde_json::to_value(NewMovie {
            title: "Heat".to_owned(),
            genre: "Action".to_owned(),
            rating: FieldValue::text("8.3"),
            release_year: FieldValue::text("1995"),
            poster_url: String::new(),
            added_by: UserEmail::new("neil@example.com"),
        })?;
        assert_eq!(
            body,
            json!({
                "title": "Heat",
                "genre": "Action",
                "rating": "8.3",
                "releaseYear": "1995",
                "addedBy": "neil@example.com"
            })
        );
        Ok(())
    }

    #[test]
    fn copy_for_reassigns_owner() {
        let mut movie = Movie::new("m1", "Heat", "Action", FieldValue::text("8.3"));
        movie.added_by = Some(UserEmail::new("vincent@example.com"));
        movie.poster_url = Some("https://img.example/heat.jpg".to_owned());

        let copy = movie.copy_for(&Identity::new("neil@example.com"));
        assert_eq!(copy.added_by, UserEmail::new("neil@example.com"));
        assert_eq!(copy.title, "Heat");
        assert_eq!(copy.poster_url, "https://img.example/heat.jpg");
    }

    #[test]
    fn watchlist_owner_keeps_existing_owner() {
        let neil = Identity::new("neil@example.com");
        let mut movie = Movie::new("m1", "Heat", "Action", FieldValue::text("8"));
        assert_eq!(movie.watchlist_owner(&neil), neil.email);

        movie.added_by = Some(UserEmail::new("vincent@example.com"));
        assert_eq!(
            movie.watchlist_owner(&neil),
            UserEmail::new("vincent@example.com")
        );
    }

    #[test]
    fn identity_label_prefers_display_name() {
        let mut identity = Identity::new("neil@example.com");
        assert_eq!(identity.label(), "neil@example.com");
        identity.display_name = "Neil".to_owned();
        assert_eq!(identity.label(), "Neil");
    }
}
