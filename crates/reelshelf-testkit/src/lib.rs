// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use reelshelf_app::{FieldValue, Identity, Movie, MovieId, UserEmail};
use serde_json::json;
use time::{Date, Month, OffsetDateTime, Time};

const GENRES: [&str; 10] = [
    "Action",
    "Drama",
    "Comedy",
    "Horror",
    "Sci-Fi",
    "Thriller",
    "Romance",
    "Animation",
    "Documentary",
    "Crime",
];

const TITLE_OPENERS: [&str; 16] = [
    "The", "Last", "Silent", "Midnight", "Broken", "Golden", "Hidden", "Crimson", "Distant",
    "Electric", "Lonely", "Savage", "Winter", "Burning", "Paper", "Iron",
];
const TITLE_NOUNS: [&str; 18] = [
    "Harbor", "Signal", "Kingdom", "Runner", "Garden", "Mirror", "Horizon", "Witness", "Orchard",
    "Engine", "Lantern", "Frontier", "Voyage", "Archive", "Canyon", "Empire", "Verdict", "Tide",
];

const USERS: [&str; 5] = [
    "neil@example.com",
    "vincent@example.com",
    "ellen@example.com",
    "sarah@example.com",
    "marty@example.com",
];

const REFERENCE_YEAR: i32 = 2025;

struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    /// True roughly once in `n` draws.
    fn one_in(&mut self, n: usize) -> bool {
        self.int_n(n) == 0
    }
}

/// Seeded generator of catalog records with the quirks real data has:
/// inconsistently cased and padded genres, ratings stored as text, the odd
/// non-numeric rating.
pub struct MovieFaker {
    rng: DeterministicRng,
    sequence: u32,
}

impl MovieFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            sequence: 0,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn movie(&mut self) -> Movie {
        self.sequence += 1;
        let id = object_id(
            reference_epoch() + i64::from(self.sequence) * 3_600,
            self.rng.next_u64(),
        );
        let title = format!(
            "{} {}",
            self.pick(&TITLE_OPENERS),
            self.pick(&TITLE_NOUNS)
        );
        let genre = self.messy_genre();
        let rating = self.rating();

        let mut movie = Movie::new(id, &title, &genre, rating);
        let year = 1950 + self.rng.int_n(76) as i32;
        movie.release_year = Some(if self.rng.one_in(2) {
            FieldValue::Number(year.into())
        } else {
            FieldValue::text(year.to_string())
        });
        movie.poster_url = Some(format!(
            "https://posters.example/{}.jpg",
            movie.id.as_str()
        ));
        movie.added_by = Some(UserEmail::new(self.pick(&USERS)));
        movie.in_watchlist = Some(self.rng.one_in(3));
        let minutes = 80 + self.rng.int_n(100);
        movie
            .extra
            .insert("duration".to_owned(), json!(minutes.to_string()));
        movie
    }

    pub fn catalog(&mut self, len: usize) -> Vec<Movie> {
        (0..len).map(|_| self.movie()).collect()
    }

    pub fn identity(&mut self) -> Identity {
        let email = self.pick(&USERS);
        let mut identity = Identity::new(email);
        identity.display_name = display_name(email);
        identity
    }

    fn messy_genre(&mut self) -> String {
        let genre = self.pick(&GENRES);
        match self.rng.int_n(4) {
            0 => genre.to_lowercase(),
            1 => format!(" {genre} "),
            2 => genre.to_uppercase(),
            _ => genre.to_owned(),
        }
    }

    fn rating(&mut self) -> FieldValue {
        if self.rng.one_in(12) {
            return FieldValue::text("N/A");
        }
        let tenths = self.rng.int_n(101);
        let text = format!("{}.{}", tenths / 10, tenths % 10);
        FieldValue::text(text.trim_end_matches(".0"))
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

/// A small hand-written catalog covering the cases filters care about.
pub fn sample_catalog() -> Vec<Movie> {
    let rows = [
        ("650000000000000000000001", "Heat", "Action", "8.3", USERS[0]),
        ("650000000000000000000002", "Point Break", " action ", "7.3", USERS[1]),
        ("650000000000000000000003", "Magnolia", "Drama", "8", USERS[0]),
        ("650000000000000000000004", "The Room", "drama", "3.6", USERS[2]),
        ("650000000000000000000005", "Lost Reel", "Drama", "N/A", USERS[3]),
        ("650000000000000000000006", "Alien", "HORROR", "8.5", USERS[0]),
        ("650000000000000000000007", "Airplane!", "Comedy", "7.7", USERS[4]),
    ];
    rows.into_iter()
        .map(|(id, title, genre, rating, owner)| {
            let mut movie = Movie::new(id, title, genre, FieldValue::text(rating));
            movie.added_by = Some(UserEmail::new(owner));
            movie
        })
        .collect()
}

pub fn sample_identity() -> Identity {
    let mut identity = Identity::new(USERS[0]);
    identity.display_name = display_name(USERS[0]);
    identity
}

fn display_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 24 hex digits: a 4-byte timestamp followed by 8 bytes of noise.
fn object_id(seconds: i64, noise: u64) -> MovieId {
    let seconds = u32::try_from(seconds).unwrap_or(u32::MAX);
    MovieId::new(format!("{seconds:08x}{noise:016x}"))
}

fn reference_epoch() -> i64 {
    Date::from_calendar_date(REFERENCE_YEAR, Month::January, 1)
        .map(|date| date.with_time(Time::MIDNIGHT).assume_utc())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
        .unix_timestamp()
}
