//! Year identifiers and source resolution
//!
//! A FARS source is one file per calendar year. This module turns a year
//! identifier into the location of that year's file, using a base directory
//! and a file-name pattern supplied by the caller.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::error::FarsError;

/// Default file-name pattern for yearly accident files
pub const DEFAULT_FILE_PATTERN: &str = "accident_{year}.csv.bz2";

/// Placeholder substituted with the year in a file-name pattern
pub const YEAR_PLACEHOLDER: &str = "{year}";

/// A calendar year identifying one source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct YearId(i32);

impl YearId {
    /// Create a year identifier from an integer year
    #[must_use]
    pub const fn new(year: i32) -> Self {
        Self(year)
    }

    /// The integer year
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl From<i32> for YearId {
    fn from(year: i32) -> Self {
        Self(year)
    }
}

impl fmt::Display for YearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for YearId {
    type Err = FarsError;

    /// Parse a numeric-looking string into a year
    ///
    /// Supported formats:
    /// - "2013" - plain integer, surrounding whitespace ignored
    /// - "2013.0" - a float with no fractional part
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_integral(s)
            .and_then(|value| i32::try_from(value).ok())
            .map(Self)
            .ok_or_else(|| FarsError::InvalidYearId(s.to_string()))
    }
}

/// Parse an integer written as text, also accepting floats with no fractional part
pub(crate) fn parse_integral(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }

    #[allow(clippy::cast_precision_loss)]
    let (min, max) = (i64::MIN as f64, i64::MAX as f64);
    match trimmed.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value >= min && value < max => {
            #[allow(clippy::cast_possible_truncation)]
            let integral = value as i64;
            Some(integral)
        }
        _ => None,
    }
}

/// Substitute a year into a file-name pattern
#[must_use]
pub fn make_filename(pattern: &str, year: YearId) -> String {
    pattern.replace(YEAR_PLACEHOLDER, &year.to_string())
}

/// Maps a year to the location of its source
pub trait SourceResolver: Send + Sync {
    /// Resolve the location for a year. Never touches the filesystem.
    fn resolve(&self, year: YearId) -> PathBuf;
}

/// Resolves years to `base_dir/pattern` with `{year}` substituted
#[derive(Debug, Clone)]
pub struct PatternResolver {
    base_dir: PathBuf,
    pattern: String,
}

impl PatternResolver {
    /// Create a resolver for a base directory and file-name pattern
    pub fn new(base_dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            pattern: pattern.into(),
        }
    }

    /// Create a resolver using [`DEFAULT_FILE_PATTERN`]
    pub fn with_default_pattern(base_dir: impl Into<PathBuf>) -> Self {
        Self::new(base_dir, DEFAULT_FILE_PATTERN)
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl SourceResolver for PatternResolver {
    fn resolve(&self, year: YearId) -> PathBuf {
        self.base_dir.join(make_filename(&self.pattern, year))
    }
}
