//! Timestamp parsing and the derived sensing-center instant.
//!
//! Product attributes carry two timestamp spellings, distinguished only by
//! length: the 19-char `2020-03-03T01:35:47` form and the 20-char
//! `2020-03-03T01:35:47Z` form. Both denote the same wall-clock instant; no
//! timezone conversion is ever applied.

use crate::constants;
use crate::types::{S5pResult, S5pError, TemporalExtent};
use chrono::NaiveDateTime;

const FORMAT_WITH_Z: &str = "%Y-%m-%dT%H:%M:%SZ";
const FORMAT_NO_Z: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses product timestamps and resolves the sensing window
pub struct TemporalResolver;

impl TemporalResolver {
    /// Parse one of the two fixed-length timestamp forms
    pub fn parse_timestamp(s: &str) -> S5pResult<NaiveDateTime> {
        let format = match s.len() {
            20 => FORMAT_WITH_Z,
            19 => FORMAT_NO_Z,
            _ => return Err(S5pError::UnsupportedTimeFormat(s.to_string())),
        };
        NaiveDateTime::parse_from_str(s, format)
            .map_err(|_| S5pError::UnsupportedTimeFormat(s.to_string()))
    }

    /// Midpoint of the sensing window: `start + (end - start) / 2`.
    ///
    /// Integer duration arithmetic, so an odd-second window yields an exact
    /// half-second center.
    pub fn center(start: NaiveDateTime, end: NaiveDateTime) -> NaiveDateTime {
        start + (end - start) / 2
    }

    /// Resolve a start/end pair into a [`TemporalExtent`]
    pub fn extent(start: &str, end: &str) -> S5pResult<TemporalExtent> {
        let start = Self::parse_timestamp(start)?;
        let end = Self::parse_timestamp(end)?;
        Ok(TemporalExtent {
            start,
            end,
            center: Self::center(start, end),
        })
    }

    /// Whether the granule was sensed strictly after the along-track
    /// resolution upgrade of the instrument
    pub fn is_after_upgrade(start: NaiveDateTime) -> bool {
        start > constants::upgrade_datetime()
    }
}
