//! Single-state accident locations
//!
//! Loads one year, checks the requested state code against the codes present
//! in that year, keeps the state's rows and turns their coordinates into
//! [`GeoRecord`]s with provider sentinels replaced by missing values.

use std::fmt;
use std::str::FromStr;

use itertools::{Itertools, MinMaxResult};
use log::info;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{FarsError, Result};
use crate::loader::TableSource;
use crate::table::{LATITUDE, LONGITUDE, STATE};
use crate::year::{YearId, parse_integral};

/// Longitudes above this value mean "unknown"
pub const LONGITUDE_SENTINEL: f64 = 900.0;
/// Latitudes above this value mean "unknown"
pub const LATITUDE_SENTINEL: f64 = 90.0;

/// A numeric state code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StateCode(i64);

impl StateCode {
    #[must_use]
    pub const fn new(code: i64) -> Self {
        Self(code)
    }

    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for StateCode {
    fn from(code: i64) -> Self {
        Self(code)
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StateCode {
    /// Parse a state code given as text, reporting failures against `year`
    pub fn parse_for_year(text: &str, year: YearId) -> Result<Self> {
        text.parse::<Self>().map_err(|_| FarsError::InvalidState {
            state: text.trim().to_string(),
            year,
        })
    }
}

impl FromStr for StateCode {
    type Err = FarsError;

    /// Accepts the same numeric text as [`YearId`]: "6", " 6 " or "6.0"
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_integral(s)
            .map(Self)
            .ok_or_else(|| FarsError::InvalidStateCode(s.to_string()))
    }
}

/// A requested state, either already numeric or as the caller typed it
///
/// Text is only normalized once the year's table has loaded, so a missing
/// source is reported before a malformed code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateQuery<'a> {
    Code(StateCode),
    Text(&'a str),
}

impl StateQuery<'_> {
    fn resolve(self, year: YearId) -> Result<StateCode> {
        match self {
            Self::Code(code) => Ok(code),
            Self::Text(text) => StateCode::parse_for_year(text, year),
        }
    }
}

impl From<StateCode> for StateQuery<'_> {
    fn from(code: StateCode) -> Self {
        Self::Code(code)
    }
}

impl From<i64> for StateQuery<'_> {
    fn from(code: i64) -> Self {
        Self::Code(StateCode(code))
    }
}

impl<'a> From<&'a str> for StateQuery<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

/// Replace a sentinel longitude with `None`
#[must_use]
pub fn sanitize_longitude(value: Option<f64>) -> Option<f64> {
    match value {
        Some(v) if v > LONGITUDE_SENTINEL => None,
        other => other,
    }
}

/// Replace a sentinel latitude with `None`
#[must_use]
pub fn sanitize_latitude(value: Option<f64>) -> Option<f64> {
    match value {
        Some(v) if v > LATITUDE_SENTINEL => None,
        other => other,
    }
}

/// Location of one accident; either coordinate may be unknown
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoRecord {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

impl GeoRecord {
    /// Build a record from raw coordinates, dropping sentinel values
    #[must_use]
    pub fn from_raw(longitude: Option<f64>, latitude: Option<f64>) -> Self {
        Self {
            longitude: sanitize_longitude(longitude),
            latitude: sanitize_latitude(latitude),
        }
    }

    /// Both coordinates, when both are known
    #[must_use]
    pub fn point(&self) -> Option<(f64, f64)> {
        Some((self.longitude?, self.latitude?))
    }
}

/// Bounding ranges of the known coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_latitude: f64,
    pub max_latitude: f64,
}

impl Viewport {
    /// Compute the viewport over non-missing values
    ///
    /// Longitude and latitude ranges are taken independently. Returns `None`
    /// when either axis has no known value.
    #[must_use]
    pub fn from_records(records: &[GeoRecord]) -> Option<Self> {
        let (min_longitude, max_longitude) =
            min_max(records.iter().filter_map(|r| r.longitude))?;
        let (min_latitude, max_latitude) = min_max(records.iter().filter_map(|r| r.latitude))?;

        Some(Self {
            min_longitude,
            max_longitude,
            min_latitude,
            max_latitude,
        })
    }

    /// `[min_lon, min_lat, max_lon, max_lat]`, the GeoJSON bbox order
    #[must_use]
    pub fn bbox(&self) -> [f64; 4] {
        [
            self.min_longitude,
            self.min_latitude,
            self.max_longitude,
            self.max_latitude,
        ]
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    match values.minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v, v)),
        MinMaxResult::MinMax(min, max) => Some((min, max)),
    }
}

/// Cleaned locations for one state and year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapData {
    pub state: StateCode,
    pub year: YearId,
    pub records: Vec<GeoRecord>,
    pub viewport: Option<Viewport>,
}

impl MapData {
    /// Points with both coordinates known, as a GeoJSON `FeatureCollection`
    #[must_use]
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .records
            .iter()
            .filter_map(GeoRecord::point)
            .map(|(lon, lat)| {
                json!({
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [lon, lat]},
                    "properties": {"state": self.state, "year": self.year},
                })
            })
            .collect();

        let mut collection = json!({
            "type": "FeatureCollection",
            "features": features,
        });
        if let Some(viewport) = &self.viewport {
            collection["bbox"] = json!(viewport.bbox());
        }
        collection
    }
}

/// Outcome of a state query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StateMap {
    /// The state has accidents this year
    Points(MapData),
    /// The state code is valid but no rows matched
    ///
    /// Codes are validated against the same table that is filtered, so this
    /// only occurs for a [`TableSource`] whose `STATE` column reports a code
    /// that the row filter then does not match.
    Empty { state: StateCode, year: YearId },
}

/// Load a year and extract the cleaned locations for one state
///
/// The year is loaded first, so a missing source propagates as
/// [`FarsError::SourceNotFound`] whatever the state. A state that is not
/// numeric, or a code that does not occur in the year's `STATE` column, is
/// [`FarsError::InvalidState`].
pub fn filter_state<'a, S: TableSource + ?Sized>(
    source: &S,
    state: impl Into<StateQuery<'a>>,
    year: YearId,
) -> Result<StateMap> {
    let table = source.load_year(year)?;
    let state = state.into().resolve(year)?;

    let observed = table.distinct_ints(STATE)?;
    if !observed.contains(&state.value()) {
        return Err(FarsError::InvalidState {
            state: state.to_string(),
            year,
        });
    }

    let rows = table.filter_eq(STATE, state.value())?;
    if rows.is_empty() {
        info!("no accidents to plot for state {state} in {year}");
        return Ok(StateMap::Empty { state, year });
    }

    let records: Vec<GeoRecord> = rows
        .float_column(LONGITUDE)?
        .into_iter()
        .zip(rows.float_column(LATITUDE)?)
        .map(|(lon, lat)| GeoRecord::from_raw(lon, lat))
        .collect();
    let viewport = Viewport::from_records(&records);

    info!(
        "State {state} in {year}: {} accidents, {} with known location",
        records.len(),
        records.iter().filter(|r| r.point().is_some()).count()
    );

    Ok(StateMap::Points(MapData {
        state,
        year,
        records,
        viewport,
    }))
}
