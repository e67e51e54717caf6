use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SeedsError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedId(String);

impl SeedId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SeedId {
    type Err = SeedsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SeedsError::SeedNotFound(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// One row of the remote `seeds` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    pub id: SeedId,
    pub seed_code: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub edition: String,
    #[serde(default)]
    pub biomes: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub views: u64,
    pub created_at: String,
}

impl Seed {
    /// Parsed `created_at`, accepting RFC 3339 and the store's
    /// space-separated timestamp form.
    pub fn created_at_parsed(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.created_at.trim();
        if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
            return Some(value);
        }
        if let Ok(value) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
            return Some(value);
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    }

    pub fn with_views(&self, views: u64) -> Self {
        Self {
            views,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Popular,
    Recent,
}

impl SortMode {
    /// Column the store orders by.
    pub fn order_field(self) -> &'static str {
        match self {
            SortMode::Popular => "views",
            SortMode::Recent => "created_at",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortMode::Popular => SortMode::Recent,
            SortMode::Recent => SortMode::Popular,
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Popular => write!(f, "popular"),
            SortMode::Recent => write!(f, "recent"),
        }
    }
}

impl FromStr for SortMode {
    type Err = SeedsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "popular" => Ok(SortMode::Popular),
            "recent" => Ok(SortMode::Recent),
            _ => Err(SeedsError::InvalidSortMode(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = SeedsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(SeedsError::InvalidTheme(value.to_string())),
        }
    }
}
