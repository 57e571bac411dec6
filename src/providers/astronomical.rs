/*
 *  providers/astronomical.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Offline sunrise/sunset, NOAA almanac method, zenith 90.833°
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
//! Computes the day's events locally, for hosts without network access.
//! Agrees with the web service to within a couple of minutes at mid latitudes.

use chrono::{prelude::*, Duration};

use crate::location::Location;
use crate::solar::{FetchError, SolarData, SolarDataProvider};

const ZENITH_DEG: f64 = 90.833; // refraction and solar disc radius

#[inline]
fn sin_deg(x: f64) -> f64 { x.to_radians().sin() }
#[inline]
fn cos_deg(x: f64) -> f64 { x.to_radians().cos() }
#[inline]
fn tan_deg(x: f64) -> f64 { x.to_radians().tan() }

fn norm(x: f64, period: f64) -> f64 {
    x.rem_euclid(period)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Horizon {
    Rising,
    Setting,
}

/// UT hour of the event on day `n` of the year, `None` when the sun stays
/// above or below the horizon all day.
fn event_ut_hours(latitude: f64, longitude: f64, n: u32, horizon: Horizon) -> Option<f64> {
    let lng_hour = longitude / 15.0;
    let approx_local = match horizon {
        Horizon::Rising => 6.0,
        Horizon::Setting => 18.0,
    };
    let t = n as f64 + (approx_local - lng_hour) / 24.0;

    let mean_anomaly = 0.9856 * t - 3.289;
    let true_lng = norm(
        mean_anomaly + 1.916 * sin_deg(mean_anomaly) + 0.020 * sin_deg(2.0 * mean_anomaly) + 282.634,
        360.0,
    );

    // right ascension, pulled into the same quadrant as the true longitude
    let mut ra = norm((0.91764 * tan_deg(true_lng)).atan().to_degrees(), 360.0);
    ra += (true_lng / 90.0).floor() * 90.0 - (ra / 90.0).floor() * 90.0;
    let ra_hours = ra / 15.0;

    let sin_dec = 0.39782 * sin_deg(true_lng);
    let cos_dec = (1.0 - sin_dec * sin_dec).sqrt();

    let cos_h = (cos_deg(ZENITH_DEG) - sin_dec * sin_deg(latitude)) / (cos_dec * cos_deg(latitude));
    if !(-1.0..=1.0).contains(&cos_h) {
        return None;
    }

    let h_deg = match horizon {
        Horizon::Rising => 360.0 - cos_h.acos().to_degrees(),
        Horizon::Setting => cos_h.acos().to_degrees(),
    };

    let local_mean = h_deg / 15.0 + ra_hours - 0.06571 * t - 6.622;
    Some(norm(local_mean - lng_hour, 24.0))
}

fn ut_hours_on(date: NaiveDate, ut_hours: f64) -> DateTime<Utc> {
    let seconds = (ut_hours * 3600.0).round() as i64;
    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    midnight + Duration::seconds(seconds)
}

/// Solar data for `date`, reported on `tz` wall-clock time.
pub fn solar_data_for_date<Tz: TimeZone>(
    location: &Location,
    date: NaiveDate,
    tz: &Tz,
) -> Result<SolarData, FetchError> {
    let n = date.ordinal();
    let rise_h = event_ut_hours(location.latitude, location.longitude, n, Horizon::Rising)
        .ok_or(FetchError::NoEvent("sunrise"))?;
    let set_h = event_ut_hours(location.latitude, location.longitude, n, Horizon::Setting)
        .ok_or(FetchError::NoEvent("sunset"))?;

    let sunrise = ut_hours_on(date, rise_h);
    let mut sunset = ut_hours_on(date, set_h);
    // far from Greenwich the UT sunset can land before the UT sunrise
    if sunset < sunrise {
        sunset += Duration::days(1);
    }
    let length = sunset - sunrise;
    let solar_noon = sunrise + length / 2;
    let day_seconds = u32::try_from(length.num_seconds()).unwrap_or(0);

    Ok(SolarData::from_utc_events(sunrise, sunset, solar_noon, day_seconds, tz))
}

/// Offline provider working from the host's local date
#[derive(Debug, Clone, Copy, Default)]
pub struct AstronomicalProvider;

impl SolarDataProvider for AstronomicalProvider {
    fn name(&self) -> &'static str {
        "astronomical"
    }

    async fn fetch(&self, location: &Location) -> Result<SolarData, FetchError> {
        solar_data_for_date(location, Local::now().date_naive(), &Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn within(actual: u32, expected: u32, slack: u32) -> bool {
        actual.abs_diff(expected) <= slack
    }

    #[test]
    fn test_greenwich_midsummer() {
        let greenwich = Location::new(51.478581, -0.001292).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        let data = solar_data_for_date(&greenwich, date, &Utc).unwrap();

        // published: 03:43 / 12:02 / 20:21 UTC
        assert!(within(data.sunrise_minutes, 223, 4), "sunrise {}", data.sunrise_minutes);
        assert!(within(data.sunset_minutes, 1221, 4), "sunset {}", data.sunset_minutes);
        assert!(within(data.solar_noon_minutes, 722, 4), "noon {}", data.solar_noon_minutes);
        assert!(data.day_seconds.abs_diff(59_875) <= 480);
    }

    #[test]
    fn test_greenwich_midwinter() {
        let greenwich = Location::new(51.478581, -0.001292).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 12, 21).unwrap();
        let data = solar_data_for_date(&greenwich, date, &Utc).unwrap();

        // published: 08:04 / 11:58 / 15:53 UTC
        assert!(within(data.sunrise_minutes, 484, 4), "sunrise {}", data.sunrise_minutes);
        assert!(within(data.sunset_minutes, 953, 4), "sunset {}", data.sunset_minutes);
        assert!(data.sunrise_minutes < data.solar_noon_minutes);
        assert!(data.solar_noon_minutes < data.sunset_minutes);
    }

    #[test]
    fn test_western_longitude_wraps_sunset() {
        // Los Angeles: UT sunset falls after midnight UT
        let la = Location::new(34.05, -118.25).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        let pdt = FixedOffset::west_opt(7 * 3600).unwrap();
        let data = solar_data_for_date(&la, date, &pdt).unwrap();

        // published: 05:42 / 20:08 PDT
        assert!(within(data.sunrise_minutes, 342, 5), "sunrise {}", data.sunrise_minutes);
        assert!(within(data.sunset_minutes, 1208, 5), "sunset {}", data.sunset_minutes);
        assert!(data.day_seconds > 14 * 3600 && data.day_seconds < 15 * 3600);
    }

    #[test]
    fn test_polar_night_has_no_sunrise() {
        let tromso = Location::new(69.65, 18.96).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 12, 21).unwrap();
        assert!(matches!(
            solar_data_for_date(&tromso, date, &Utc),
            Err(FetchError::NoEvent("sunrise"))
        ));
    }

    #[test]
    fn test_midnight_sun_has_no_sunrise() {
        let tromso = Location::new(69.65, 18.96).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        assert!(solar_data_for_date(&tromso, date, &Utc).is_err());
    }
}
