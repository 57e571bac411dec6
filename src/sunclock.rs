/*
 *  sunclock.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  The render loop: refresh, render, emit, sleep
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

use log::{debug, error, warn};

use crate::clock::TimeSource;
use crate::location::Location;
use crate::markers::SolsticeMarkerSet;
use crate::render::{ColorCorrection, FrameBuffer, FrameRenderer};
use crate::solar::{RefreshOutcome, SolarDataCache, SolarDataProvider};
use crate::strip::{BoxedDriver, StripError};
use crate::timemap::format_minutes;

/// Escalate to an error log every this many failed refreshes in a row
const FAILURE_REPORT_EVERY: u32 = 60;

/// Loop timing and output level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunClockOptions {
    pub tick: Duration,
    pub brightness: u8,
    pub correction: ColorCorrection,
    pub refresh_interval: Duration,
}

/// Owns everything a tick needs; single threaded, no shared state.
pub struct SunClock<P: SolarDataProvider, C: TimeSource> {
    renderer: FrameRenderer,
    markers: SolsticeMarkerSet,
    cache: SolarDataCache,
    provider: P,
    clock: C,
    driver: BoxedDriver,
    location: Location,
    tick: Duration,
    brightness: u8,
    correction: ColorCorrection,
    failed_refreshes: u32,
}

impl<P: SolarDataProvider, C: TimeSource> SunClock<P, C> {
    pub fn new(
        renderer: FrameRenderer,
        markers: SolsticeMarkerSet,
        provider: P,
        clock: C,
        driver: BoxedDriver,
        location: Location,
        options: SunClockOptions,
    ) -> Self {
        Self {
            renderer,
            markers,
            cache: SolarDataCache::new(options.refresh_interval),
            provider,
            clock,
            driver,
            location,
            tick: options.tick,
            brightness: options.brightness,
            correction: options.correction,
            failed_refreshes: 0,
        }
    }

    pub fn cache(&self) -> &SolarDataCache {
        &self.cache
    }

    /// Failed refreshes since the last good one
    pub fn failed_refreshes(&self) -> u32 {
        self.failed_refreshes
    }

    /// One pass: refresh if stale, render, emit. Returns the frame as
    /// rendered, before correction and brightness.
    pub async fn tick(&mut self, now: Instant) -> FrameBuffer {
        match self.cache.refresh_if_stale(&self.provider, &self.location, now).await {
            RefreshOutcome::Refreshed => self.failed_refreshes = 0,
            RefreshOutcome::Failed => {
                self.failed_refreshes += 1;
                if self.failed_refreshes % FAILURE_REPORT_EVERY == 0 {
                    error!(
                        "{} solar data refreshes in a row have failed, {}",
                        self.failed_refreshes,
                        if self.cache.last_update().is_some() {
                            "still showing old data"
                        } else {
                            "no data yet"
                        }
                    );
                }
            }
            RefreshOutcome::Fresh => {}
        }

        let time = self.clock.now();
        let solar = *self.cache.data();
        let frame = self.renderer.render(time, &solar, &self.markers);

        let pos = self.renderer.positions(time, &solar);
        debug!(
            "{} -> LED {} | sunrise {} (LED {}) | noon {} (LED {}) | sunset {} (LED {}) | day {}s",
            time,
            pos.current,
            format_minutes(solar.sunrise_minutes),
            pos.sunrise,
            format_minutes(solar.solar_noon_minutes),
            pos.solar_noon,
            format_minutes(solar.sunset_minutes),
            pos.sunset,
            solar.day_seconds
        );

        if let Err(e) = self.driver.emit(&frame.corrected(self.correction, self.brightness)) {
            warn!("Strip emit failed: {}", e);
        }
        frame
    }

    /// Tick forever at the configured cadence.
    pub async fn run(&mut self) {
        loop {
            let started = Instant::now();
            self.tick(started).await;
            tokio::time::sleep(self.tick.saturating_sub(started.elapsed())).await;
        }
    }

    /// All LEDs off, for shutdown.
    pub fn blank(&mut self) -> Result<(), StripError> {
        self.driver.blank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::SolsticeTimes;
    use crate::render::Palette;
    use crate::solar::{FetchError, SolarData};
    use crate::strip::drivers::mock::MockDriver;
    use crate::timemap::{StripGeometry, TimeOfDay};
    use smart_leds::RGB8;
    use std::cell::Cell;

    const DAY: Duration = Duration::from_secs(86_400);

    struct Fixed(TimeOfDay);

    impl TimeSource for Fixed {
        fn now(&self) -> TimeOfDay {
            self.0
        }
    }

    struct Flaky {
        fail: Cell<bool>,
        calls: Cell<u32>,
    }

    impl SolarDataProvider for Flaky {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn fetch(&self, _location: &Location) -> Result<SolarData, FetchError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail.get() {
                return Err(FetchError::Api("OVER_QUERY_LIMIT".into()));
            }
            Ok(SolarData {
                sunrise_minutes: 480,
                sunset_minutes: 1020,
                solar_noon_minutes: 750,
                day_seconds: 32_400,
            })
        }
    }

    fn sun_clock(fail: bool, brightness: u8, driver: MockDriver) -> SunClock<Flaky, Fixed> {
        sun_clock_with(fail, brightness, ColorCorrection::Uncorrected, driver)
    }

    fn sun_clock_with(
        fail: bool,
        brightness: u8,
        correction: ColorCorrection,
        driver: MockDriver,
    ) -> SunClock<Flaky, Fixed> {
        let geometry = StripGeometry::new(332).unwrap();
        let markers = SolsticeMarkerSet::new(&geometry, &SolsticeTimes::reference().unwrap());
        SunClock::new(
            FrameRenderer::new(geometry, Palette::default()),
            markers,
            Flaky { fail: Cell::new(fail), calls: Cell::new(0) },
            Fixed(TimeOfDay::from_hms(12, 0, 0).unwrap()),
            Box::new(driver),
            Location::new(51.478581, -0.001292).unwrap(),
            SunClockOptions {
                tick: Duration::from_secs(1),
                brightness,
                correction,
                refresh_interval: DAY,
            },
        )
    }

    #[tokio::test]
    async fn test_tick_fetches_renders_and_emits() {
        let driver = MockDriver::new(332);
        let state = driver.state();
        let mut clock = sun_clock(false, 255, driver);

        let frame = clock.tick(Instant::now()).await;
        assert_eq!(frame.get(166), Some(RGB8::new(255, 255, 0)));
        assert_eq!(clock.provider.calls.get(), 1);
        assert!(clock.cache().last_update().is_some());

        let state = state.lock().unwrap();
        assert_eq!(state.frames.len(), 1);
        assert_eq!(state.frames[0], frame.pixels());
    }

    #[tokio::test]
    async fn test_fetch_happens_once_per_interval() {
        let mut clock = sun_clock(false, 255, MockDriver::new(332));
        let start = Instant::now();
        for s in 0..10 {
            clock.tick(start + Duration::from_secs(s)).await;
        }
        assert_eq!(clock.provider.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_failures_counted_and_reset() {
        let mut clock = sun_clock(true, 255, MockDriver::new(332));
        let start = Instant::now();
        for s in 0..3 {
            let frame = clock.tick(start + Duration::from_secs(s)).await;
            // zeroed data: no band, no sun
            assert!(!frame.pixels().contains(&RGB8::new(255, 255, 0)));
        }
        assert_eq!(clock.failed_refreshes(), 3);
        assert_eq!(clock.provider.calls.get(), 3);

        clock.provider.fail.set(false);
        clock.tick(start + Duration::from_secs(3)).await;
        assert_eq!(clock.failed_refreshes(), 0);
    }

    #[tokio::test]
    async fn test_brightness_applied_at_emit_only() {
        let driver = MockDriver::new(332);
        let state = driver.state();
        let mut clock = sun_clock(false, 128, driver);

        let frame = clock.tick(Instant::now()).await;
        let emitted = state.lock().unwrap().frames[0].clone();
        assert_eq!(frame.get(166), Some(RGB8::new(255, 255, 0)));
        assert!(emitted[166].r < 255 && emitted[166].r > 0);
    }

    #[tokio::test]
    async fn test_typical_correction_on_emitted_frame() {
        let driver = MockDriver::new(332);
        let state = driver.state();
        let mut clock = sun_clock_with(false, 255, ColorCorrection::Typical, driver);

        let frame = clock.tick(Instant::now()).await;
        let emitted = state.lock().unwrap().frames[0].clone();
        assert_eq!(frame.get(166), Some(RGB8::new(255, 255, 0)));
        assert_eq!(emitted[166], RGB8::new(255, 176, 0));
        assert_eq!(emitted[111], RGB8::new(0, 0, 7));
    }

    #[tokio::test]
    async fn test_emit_failure_does_not_stop_ticking() {
        let driver = MockDriver::new(332);
        let state = driver.state();
        state.lock().unwrap().simulate_emit_failure = true;
        let mut clock = sun_clock(false, 255, driver);

        let start = Instant::now();
        clock.tick(start).await;
        clock.tick(start + Duration::from_secs(1)).await;
        assert!(state.lock().unwrap().frames.is_empty());

        state.lock().unwrap().simulate_emit_failure = false;
        clock.tick(start + Duration::from_secs(2)).await;
        assert_eq!(state.lock().unwrap().frames.len(), 1);
    }

    #[test]
    fn test_blank_turns_everything_off() {
        let driver = MockDriver::new(332);
        let state = driver.state();
        let mut clock = sun_clock(false, 255, driver);
        clock.blank().unwrap();
        let state = state.lock().unwrap();
        assert!(state.frames[0].iter().all(|px| *px == RGB8::default()));
    }
}
