/*
 *  timemap.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Time of day to strip position mapping
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */
//! The strip is a 24 hour ruler: position 0 is local midnight and every LED
//! covers `86400 / N` seconds. The division truncates, so for lengths that do
//! not divide a day evenly the last seconds of the day land at or past `N`.
//! Nothing here clamps; writers check `contains` before touching a pixel.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use thiserror::Error;

use crate::constants::{MINUTES_PER_DAY, SECONDS_PER_DAY};

/// Zero-based LED index, 0 being local midnight.
pub type StripPosition = usize;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("strip length must be 1..=86400 LEDs, got {0}")]
    InvalidLength(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockParseError {
    #[error("'{0}' is not a HH:MM clock time")]
    Malformed(String),
}

/// Fixed strip layout for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripGeometry {
    led_count: usize,
    seconds_per_led: u32,
}

impl StripGeometry {
    pub fn new(led_count: usize) -> Result<Self, GeometryError> {
        if led_count == 0 || led_count > SECONDS_PER_DAY as usize {
            return Err(GeometryError::InvalidLength(led_count));
        }
        Ok(Self {
            led_count,
            seconds_per_led: SECONDS_PER_DAY / led_count as u32,
        })
    }

    pub fn led_count(&self) -> usize {
        self.led_count
    }

    pub fn seconds_per_led(&self) -> u32 {
        self.seconds_per_led
    }

    /// Position for a time of day in seconds. May return `>= led_count`.
    pub fn map_to_position(&self, seconds_of_day: u32) -> StripPosition {
        (seconds_of_day / self.seconds_per_led) as StripPosition
    }

    pub fn map_minutes_to_position(&self, minutes_of_day: u32) -> StripPosition {
        self.map_to_position(minutes_of_day * 60)
    }

    #[inline]
    pub fn contains(&self, position: StripPosition) -> bool {
        position < self.led_count
    }

    /// The position if it can be written, `None` when it falls off the end.
    pub fn checked(&self, position: StripPosition) -> Option<StripPosition> {
        self.contains(position).then_some(position)
    }
}

/// Seconds since local midnight, 0..=86399.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub fn from_seconds(seconds: u32) -> Option<Self> {
        (seconds < SECONDS_PER_DAY).then_some(Self(seconds))
    }

    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self((hour * 60 + minute) * 60 + second))
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0 / 3600
    }

    pub fn minute(&self) -> u32 {
        (self.0 / 60) % 60
    }

    pub fn second(&self) -> u32 {
        self.0 % 60
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(t: NaiveTime) -> Self {
        // leap seconds report nanosecond overflow, not second 60, so this stays in range
        Self(t.num_seconds_from_midnight())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour(), self.minute(), self.second())
    }
}

/// Parse "HH:MM" into minutes since midnight.
pub fn parse_clock_minutes(clock: &str) -> Result<u32, ClockParseError> {
    let t = NaiveTime::parse_from_str(clock.trim(), "%H:%M")
        .map_err(|_| ClockParseError::Malformed(clock.to_string()))?;
    Ok(t.hour() * 60 + t.minute())
}

/// "HH:MM" for a minute-of-day value, wrapping past midnight.
pub fn format_minutes(minutes: u32) -> String {
    let m = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", m / 60, m % 60)
}
