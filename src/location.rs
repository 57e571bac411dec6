/*
 *  location.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Observer coordinates used for solar data lookups
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

use std::fmt;

/// Where the strip lives, in decimal degrees (north and east positive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

#[derive(Debug, PartialEq)]
pub enum LocationError {
    InvalidLatitude(f64),
    InvalidLongitude(f64),
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::InvalidLatitude(v) => write!(f, "latitude {} outside -90..=90", v),
            LocationError::InvalidLongitude(v) => write!(f, "longitude {} outside -180..=180", v),
        }
    }
}

impl std::error::Error for LocationError {}

impl Location {
    /// Validated coordinates; NaN is rejected along with out of range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(LocationError::InvalidLatitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::InvalidLongitude(longitude));
        }
        Ok(Self { latitude, longitude })
    }
}
