// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(MovieId);
string_id!(UserEmail);

const OBJECT_ID_HEX_LEN: usize = 24;

impl MovieId {
    /// Creation time embedded in a 24-hex-digit object id: the leading four
    /// bytes are seconds since the Unix epoch.
    pub fn created_at(&self) -> Option<OffsetDateTime> {
        let raw = self.as_str();
        if raw.len() != OBJECT_ID_HEX_LEN || !raw.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return None;
        }
        let seconds = u32::from_str_radix(&raw[..8], 16).ok()?;
        OffsetDateTime::from_unix_timestamp(i64::from(seconds)).ok()
    }
}

impl UserEmail {
    pub fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{MovieId, UserEmail};
    use time::OffsetDateTime;

    #[test]
    fn object_id_exposes_creation_timestamp() {
        let id = MovieId::new("65a1b2c3d4e5f60718293a4b");
        let created = id.created_at().expect("hex object id has a timestamp");
        assert_eq!(created.unix_timestamp(), 0x65a1_b2c3);
    }

    #[test]
    fn non_object_ids_have_no_timestamp() {
        assert_eq!(MovieId::new("42").created_at(), None);
        assert_eq!(MovieId::new("zz a1b2c3d4e5f60718293a4b").created_at(), None);
        assert_eq!(MovieId::new("").created_at(), None);
    }

    #[test]
    fn epoch_prefix_maps_to_unix_epoch() {
        let id = MovieId::new("000000000000000000000000");
        assert_eq!(id.created_at(), Some(OffsetDateTime::UNIX_EPOCH));
    }

    #[test]
    fn ids_serialize_as_plain_strings() -> anyhow::Result<()> {
        let encoded = serde_json::to_string(&MovieId::new("abc"))?;
        assert_eq!(encoded, "\"abc\"");
        let email: UserEmail = serde_json::from_str("\"a@b.c\"")?;
        assert_eq!(email.as_str(), "a@b.c");
        assert!(!email.is_blank());
        assert!(UserEmail::new("  ").is_blank());
        Ok(())
    }
}
