use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::EpgError;

/// Partition of the cache and of the provider search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Series,
    Movie,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Series, Category::Movie];

    /// Value stored in the cache's category column.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Series => "tv",
            Category::Movie => "movie",
        }
    }

    /// Label written into each programme's `<category>` element.
    pub fn guide_label(self) -> &'static str {
        match self {
            Category::Series => "Series",
            Category::Movie => "Movie",
        }
    }

    pub fn guide_file_name(self) -> &'static str {
        match self {
            Category::Series => "tv.xml",
            Category::Movie => "movies.xml",
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            Category::Series => "TV show",
            Category::Movie => "movie",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A provider search hit awaiting operator selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateMatch {
    pub title: String,
    pub description: Option<String>,
    pub artwork: Option<String>,
    pub year: Option<String>,
}

/// Resolved metadata for one listed title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub title: String,
    pub description: String,
    pub artwork: Option<String>,
    pub origin_name: String,
    pub updated_at: DateTime<Utc>,
}

impl CacheRecord {
    /// Artwork reference usable as an icon, if any.
    pub fn icon(&self) -> Option<&str> {
        self.artwork
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn channel_id(&self) -> String {
        channel_slug(&self.origin_name)
    }

    /// Field-wise equality that ignores `updated_at`.
    pub fn same_content(&self, other: &CacheRecord) -> bool {
        self.title == other.title
            && self.description == other.description
            && self.artwork == other.artwork
            && self.origin_name == other.origin_name
    }
}

/// Channel identifier derived from a listed name: lowercase, spaces as underscores.
pub fn channel_slug(name: &str) -> String {
    name.replace(' ', "_").to_lowercase()
}

/// What a single run does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    SeriesOnly,
    MoviesOnly,
    #[default]
    Both,
    ClearCache,
    DeleteCachedItem,
}

impl RunMode {
    pub const DEFAULT_CHOICE: &'static str = "3";

    pub fn categories(self) -> &'static [Category] {
        match self {
            RunMode::SeriesOnly => &[Category::Series],
            RunMode::MoviesOnly => &[Category::Movie],
            RunMode::Both => &Category::ALL,
            RunMode::ClearCache | RunMode::DeleteCachedItem => &[],
        }
    }
}

impl FromStr for RunMode {
    type Err = EpgError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "1" => Ok(RunMode::SeriesOnly),
            "2" => Ok(RunMode::MoviesOnly),
            "3" => Ok(RunMode::Both),
            "4" => Ok(RunMode::ClearCache),
            "5" => Ok(RunMode::DeleteCachedItem),
            other => Err(EpgError::InvalidSetting(format!("unknown mode: {other}"))),
        }
    }
}
