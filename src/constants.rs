/*
 *  constants.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Defaults and fixed calendar constants
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
//! Global constants shared by the clock, the renderer and the drivers.

/// Seconds in one civil day.
pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;
/// Minutes in one civil day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;
/// Hour ticks drawn along the strip.
pub const HOURS_PER_DAY: u32 = 24;

/// Number of LEDs on the reference build.
pub const DEFAULT_STRIP_LENGTH: usize = 332;
/// Global brightness applied on output (0-255). 255 leaves colours untouched.
pub const DEFAULT_BRIGHTNESS: u8 = 255;
/// Seconds between rendered frames.
pub const DEFAULT_SECONDS_PER_TICK: u64 = 1;
/// Solar data is refetched once this many hours have elapsed.
pub const DEFAULT_REFRESH_INTERVAL_HOURS: u64 = 24;
/// Upper bound on a single solar data request.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Royal Observatory, Greenwich.
pub const DEFAULT_LATITUDE: f64 = 51.478581;
pub const DEFAULT_LONGITUDE: f64 = -0.001292;

// Layer colours as (r, g, b)
pub const DAYLIGHT_RGB: [u8; 3] = [0, 0, 8];
pub const HOUR_MARKER_RGB: [u8; 3] = [32, 0, 0];
pub const SOLSTICE_RGB: [u8; 3] = [0, 255, 0];
pub const CURRENT_TIME_RGB: [u8; 3] = [255, 255, 0];

// Solstice sunrise/sunset local clock times; fixed reference marks, never refreshed
pub const WINTER_SOLSTICE_SUNRISE: &str = "08:47";
pub const WINTER_SOLSTICE_SUNSET: &str = "16:02";
pub const SUMMER_SOLSTICE_SUNRISE: &str = "03:47";
pub const SUMMER_SOLSTICE_SUNSET: &str = "20:34";

/// sunrise-sunset.org JSON endpoint.
pub const SUNRISE_API_URL: &str = "https://api.sunrise-sunset.org/json";

/// Default WLED realtime UDP port.
pub const WLED_UDP_PORT: u16 = 21324;
/// Seconds WLED stays in realtime mode after the last packet.
pub const WLED_DEFAULT_TIMEOUT_SECS: u8 = 2;

/// SPI clock for the 4 SPI bits per WS2812 bit encoding (~1.33us per bit).
pub const WS2812_SPI_CLOCK_HZ: u32 = 3_000_000;

/// SPI clock range the WS2812 encoding tolerates
pub const WS2812_SPI_CLOCK_MIN_HZ: u32 = 2_000_000;
pub const WS2812_SPI_CLOCK_MAX_HZ: u32 = 3_800_000;

/// FastLED `TypicalLEDStrip` channel scales
pub const TYPICAL_STRIP_CORRECTION: [u8; 3] = [255, 176, 240];
