use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Catalog section an external media id belongs to.
///
/// Catalog ids are only unique within one section, so a bare id never
/// identifies an item on its own; see [`MediaKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            other => Err(DomainError::validation(format!(
                "mediaType must be \"movie\" or \"tv\", got {other:?}"
            ))),
        }
    }
}

/// Identity of a catalog item: the (id, type) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaKey {
    pub media_id: i64,
    pub media_type: MediaType,
}

impl MediaKey {
    pub fn new(media_id: i64, media_type: MediaType) -> Self {
        Self { media_id, media_type }
    }

    pub fn movie(media_id: i64) -> Self {
        Self::new(media_id, MediaType::Movie)
    }

    pub fn tv(media_id: i64) -> Self {
        Self::new(media_id, MediaType::Tv)
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.media_type, self.media_id)
    }
}

/// Outcome of a presence toggle (like, watchlist membership).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Present,
    Absent,
}

impl Toggle {
    pub fn is_present(self) -> bool {
        matches!(self, Toggle::Present)
    }
}

/// Outcome of a create-or-overwrite write.
#[derive(Debug, Clone, PartialEq)]
pub enum Upserted<T> {
    Created(T),
    Updated(T),
}

impl<T> Upserted<T> {
    pub fn was_created(&self) -> bool {
        matches!(self, Upserted::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Upserted::Created(value) | Upserted::Updated(value) => value,
        }
    }
}
