/*
 *  providers/mod.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
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
//! Solar data sources

pub mod astronomical;
pub mod sunrise_api;

use std::time::Duration;

pub use astronomical::AstronomicalProvider;
pub use sunrise_api::SunriseSunsetApi;

use crate::config::ProviderKind;
use crate::location::Location;
use crate::solar::{FetchError, SolarData, SolarDataProvider};

/// The configured provider
#[derive(Debug, Clone)]
pub enum Provider {
    Api(SunriseSunsetApi),
    Offline(AstronomicalProvider),
}

impl Provider {
    pub fn from_kind(kind: ProviderKind, fetch_timeout: Duration) -> Result<Self, FetchError> {
        Ok(match kind {
            ProviderKind::Api => Provider::Api(SunriseSunsetApi::new(fetch_timeout)?),
            ProviderKind::Offline => Provider::Offline(AstronomicalProvider),
        })
    }
}

impl SolarDataProvider for Provider {
    fn name(&self) -> &'static str {
        match self {
            Provider::Api(p) => p.name(),
            Provider::Offline(p) => p.name(),
        }
    }

    async fn fetch(&self, location: &Location) -> Result<SolarData, FetchError> {
        match self {
            Provider::Api(p) => p.fetch(location).await,
            Provider::Offline(p) => p.fetch(location).await,
        }
    }
}
