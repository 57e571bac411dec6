/*
 *  solar.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Daily solar data, its cache and the provider seam
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

use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Timelike, Utc};
use log::{debug, info, warn};
use thiserror::Error;

use crate::location::Location;
use crate::timemap::format_minutes;

/// Sunrise, sunset and solar noon as local minutes since midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolarData {
    pub sunrise_minutes: u32,
    pub sunset_minutes: u32,
    pub solar_noon_minutes: u32,
    pub day_seconds: u32,
}

impl SolarData {
    /// Build from UTC event instants, converting each into `tz` wall-clock minutes.
    pub fn from_utc_events<Tz: TimeZone>(
        sunrise: DateTime<Utc>,
        sunset: DateTime<Utc>,
        solar_noon: DateTime<Utc>,
        day_seconds: u32,
        tz: &Tz,
    ) -> Self {
        Self {
            sunrise_minutes: local_minutes_of_day(&sunrise, tz),
            sunset_minutes: local_minutes_of_day(&sunset, tz),
            solar_noon_minutes: local_minutes_of_day(&solar_noon, tz),
            day_seconds,
        }
    }
}

/// Minute of day for a UTC instant as seen on a wall clock in `tz`.
pub fn local_minutes_of_day<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> u32 {
    let local = instant.with_timezone(tz);
    local.hour() * 60 + local.minute()
}

/// Anything that can go wrong getting today's solar data
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("solar API reported status '{0}'")]
    Api(String),
    #[error("malformed solar data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no {0} at this location today")]
    NoEvent(&'static str),
}

/// Source of daily solar data.
#[allow(async_fn_in_trait)]
pub trait SolarDataProvider {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    async fn fetch(&self, location: &Location) -> Result<SolarData, FetchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Data was recent enough; the provider was not called
    Fresh,
    Refreshed,
    /// Provider failed; previous data kept
    Failed,
}

/// Last known good solar data plus when it arrived.
///
/// Starts zeroed with no update time, which counts as stale, so the first
/// tick always fetches. A failed fetch touches nothing, so a cache that has
/// never been filled keeps asking on every tick until a fetch succeeds, while
/// a filled one keeps its old data until the next interval comes round.
#[derive(Debug, Clone, PartialEq)]
pub struct SolarDataCache {
    data: SolarData,
    last_update: Option<Instant>,
    refresh_interval: Duration,
}

impl SolarDataCache {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            data: SolarData::default(),
            last_update: None,
            refresh_interval,
        }
    }

    pub fn data(&self) -> &SolarData {
        &self.data
    }

    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    pub fn is_stale(&self, now: Instant) -> bool {
        match self.last_update {
            None => true,
            Some(at) => now.saturating_duration_since(at) > self.refresh_interval,
        }
    }

    /// Fetch from `provider` once if the data is stale.
    pub async fn refresh_if_stale<P: SolarDataProvider>(
        &mut self,
        provider: &P,
        location: &Location,
        now: Instant,
    ) -> RefreshOutcome {
        if !self.is_stale(now) {
            return RefreshOutcome::Fresh;
        }

        debug!("Solar data stale, asking {} for {}", provider.name(), location);
        match provider.fetch(location).await {
            Ok(data) => {
                self.data = data;
                self.last_update = Some(now);
                info!(
                    "Solar data refreshed from {}: sunrise {}, solar noon {}, sunset {}, day {}s",
                    provider.name(),
                    format_minutes(data.sunrise_minutes),
                    format_minutes(data.solar_noon_minutes),
                    format_minutes(data.sunset_minutes),
                    data.day_seconds
                );
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                warn!(
                    "Solar data fetch from {} failed, keeping previous data: {}",
                    provider.name(),
                    e
                );
                RefreshOutcome::Failed
            }
        }
    }
}
