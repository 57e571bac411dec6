/*
 *  providers/sunrise_api.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  sunrise-sunset.org client
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

use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};
use log::debug;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;

use crate::constants::SUNRISE_API_URL;
use crate::location::Location;
use crate::solar::{FetchError, SolarData, SolarDataProvider};

/// Top level reply; `results` is an empty string when `status` is not OK
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    results: Value,
}

/// `formatted=0` results: RFC 3339 UTC instants and day length in seconds
#[derive(Debug, Deserialize)]
struct Results {
    sunrise: DateTime<Utc>,
    sunset: DateTime<Utc>,
    solar_noon: DateTime<Utc>,
    day_length: i64,
}

/// Turn a response body into local solar data for `tz`.
pub fn parse_response<Tz: TimeZone>(body: &str, tz: &Tz) -> Result<SolarData, FetchError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if envelope.status != "OK" {
        return Err(FetchError::Api(envelope.status));
    }
    let results: Results = serde_json::from_value(envelope.results)?;

    // polar day/night comes back as the epoch plus one second
    if results.sunrise.timestamp() <= 1 {
        return Err(FetchError::NoEvent("sunrise"));
    }
    if results.sunset.timestamp() <= 1 {
        return Err(FetchError::NoEvent("sunset"));
    }

    let day_seconds = u32::try_from(results.day_length).unwrap_or(0);
    Ok(SolarData::from_utc_events(
        results.sunrise,
        results.sunset,
        results.solar_noon,
        day_seconds,
        tz,
    ))
}

/// Today's events from api.sunrise-sunset.org, converted to host local time
#[derive(Debug, Clone)]
pub struct SunriseSunsetApi {
    base_url: String,
    client: Client,
}

impl SunriseSunsetApi {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Self::with_base_url(SUNRISE_API_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));
        headers.insert("Connection", header::HeaderValue::from_static("close"));

        let client = Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }
}

impl SolarDataProvider for SunriseSunsetApi {
    fn name(&self) -> &'static str {
        "sunrise-sunset.org"
    }

    async fn fetch(&self, location: &Location) -> Result<SolarData, FetchError> {
        let params = [
            ("lat", format!("{:.6}", location.latitude)),
            ("lng", format!("{:.6}", location.longitude)),
            ("formatted", "0".to_string()),
        ];

        let response = self.client.get(&self.base_url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        debug!("solar API replied: {}", body);
        parse_response(&body, &Local)
    }
}
