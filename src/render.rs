/*
 *  render.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered frame composition for the sun clock
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
//! Every tick the whole strip is rebuilt from nothing. Layers are painted in
//! a fixed order and later layers win:
//!
//! 1. daylight band, sunrise to sunset inclusive, skipping solar noon and
//!    anything already written this frame
//! 2. hour ticks, skipping solar noon
//! 3. solstice markers, which do not skip solar noon
//! 4. the sun itself, only between sunrise and sunset and never on solar noon
//!
//! Solar noon is never painted deliberately, so it reads as a dark notch in
//! the band.

use serde::{Deserialize, Serialize};
use smart_leds::RGB8;

use crate::constants::{
    CURRENT_TIME_RGB, DAYLIGHT_RGB, HOURS_PER_DAY, HOUR_MARKER_RGB, SOLSTICE_RGB,
    TYPICAL_STRIP_CORRECTION,
};
use crate::markers::SolsticeMarkerSet;
use crate::solar::SolarData;
use crate::timemap::{StripGeometry, StripPosition, TimeOfDay};

pub const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

#[inline]
pub const fn rgb(c: [u8; 3]) -> RGB8 {
    RGB8 { r: c[0], g: c[1], b: c[2] }
}

/// Colours for each layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub daylight: RGB8,
    pub hour_marker: RGB8,
    pub solstice: RGB8,
    pub current_time: RGB8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            daylight: rgb(DAYLIGHT_RGB),
            hour_marker: rgb(HOUR_MARKER_RGB),
            solstice: rgb(SOLSTICE_RGB),
            current_time: rgb(CURRENT_TIME_RGB),
        }
    }
}

/// One strip's worth of colours plus which positions were painted this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Vec<RGB8>,
    written: Vec<bool>,
}

impl FrameBuffer {
    /// All positions off and unwritten
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![OFF; len],
            written: vec![false; len],
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Paint one position. Out of range writes are dropped and return false.
    pub fn set(&mut self, position: StripPosition, color: RGB8) -> bool {
        match self.pixels.get_mut(position) {
            Some(px) => {
                *px = color;
                self.written[position] = true;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, position: StripPosition) -> Option<RGB8> {
        self.pixels.get(position).copied()
    }

    pub fn is_written(&self, position: StripPosition) -> bool {
        self.written.get(position).copied().unwrap_or(false)
    }

    pub fn pixels(&self) -> &[RGB8] {
        &self.pixels
    }

    /// What the strip is sent: colour corrected, then scaled by a global
    /// brightness (255 = unchanged).
    pub fn corrected(&self, correction: ColorCorrection, level: u8) -> Vec<RGB8> {
        let [r, g, b] = correction.scales();
        let pixels = self.pixels.iter().map(|px| RGB8 {
            r: scale_channel(px.r, r),
            g: scale_channel(px.g, g),
            b: scale_channel(px.b, b),
        });
        if level == u8::MAX {
            return pixels.collect();
        }
        smart_leds::brightness(pixels, level).collect()
    }
}

/// Per-channel output correction for the LED type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorCorrection {
    /// FastLED `TypicalLEDStrip`
    #[default]
    Typical,
    #[serde(rename = "none")]
    Uncorrected,
}

impl ColorCorrection {
    pub fn scales(self) -> [u8; 3] {
        match self {
            ColorCorrection::Typical => TYPICAL_STRIP_CORRECTION,
            ColorCorrection::Uncorrected => [u8::MAX; 3],
        }
    }
}

#[inline]
fn scale_channel(value: u8, by: u8) -> u8 {
    (value as u16 * by as u16 / 255) as u8
}

/// Strip positions derived from the clock and today's solar data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPositions {
    pub current: StripPosition,
    pub sunrise: StripPosition,
    pub sunset: StripPosition,
    pub solar_noon: StripPosition,
}

impl DayPositions {
    /// Whether `position` lies within the daylight band, ends included.
    pub fn is_daylight(&self, position: StripPosition) -> bool {
        position >= self.sunrise && position <= self.sunset
    }
}

#[derive(Debug, Clone)]
pub struct FrameRenderer {
    geometry: StripGeometry,
    palette: Palette,
}

impl FrameRenderer {
    pub fn new(geometry: StripGeometry, palette: Palette) -> Self {
        Self { geometry, palette }
    }

    pub fn geometry(&self) -> &StripGeometry {
        &self.geometry
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn positions(&self, now: TimeOfDay, solar: &SolarData) -> DayPositions {
        let g = &self.geometry;
        DayPositions {
            current: g.map_to_position(now.seconds()),
            sunrise: g.map_minutes_to_position(solar.sunrise_minutes),
            sunset: g.map_minutes_to_position(solar.sunset_minutes),
            solar_noon: g.map_minutes_to_position(solar.solar_noon_minutes),
        }
    }

    pub fn render(
        &self,
        now: TimeOfDay,
        solar: &SolarData,
        markers: &SolsticeMarkerSet,
    ) -> FrameBuffer {
        let pos = self.positions(now, solar);
        let mut frame = FrameBuffer::new(self.geometry.led_count());

        // daylight; an inverted range is simply empty
        for i in pos.sunrise..=pos.sunset {
            if i != pos.solar_noon && !frame.is_written(i) {
                frame.set(i, self.palette.daylight);
            }
        }

        for hour in 0..HOURS_PER_DAY {
            let tick = self.geometry.map_to_position(hour * 3600);
            if self.geometry.contains(tick) && tick != pos.solar_noon {
                frame.set(tick, self.palette.hour_marker);
            }
        }

        for marker in markers.positions() {
            if let Some(p) = self.geometry.checked(marker) {
                frame.set(p, self.palette.solstice);
            }
        }

        // no sun at night
        if self.geometry.contains(pos.current)
            && pos.current != pos.solar_noon
            && pos.is_daylight(pos.current)
        {
            frame.set(pos.current, self.palette.current_time);
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::SolsticeTimes;

    fn renderer() -> FrameRenderer {
        FrameRenderer::new(StripGeometry::new(332).unwrap(), Palette::default())
    }

    fn markers() -> SolsticeMarkerSet {
        SolsticeMarkerSet::new(
            &StripGeometry::new(332).unwrap(),
            &SolsticeTimes::reference().unwrap(),
        )
    }

    fn workday() -> SolarData {
        SolarData {
            sunrise_minutes: 480,
            sunset_minutes: 1020,
            solar_noon_minutes: 750,
            day_seconds: 32_400,
        }
    }

    #[test]
    fn test_frame_buffer_bounds() {
        let mut frame = FrameBuffer::new(4);
        assert!(frame.set(3, rgb([1, 2, 3])));
        assert!(!frame.set(4, rgb([1, 2, 3])));
        assert_eq!(frame.len(), 4);
        assert!(frame.is_written(3));
        assert!(!frame.is_written(0));
        assert!(!frame.is_written(99));
        assert_eq!(frame.get(3), Some(rgb([1, 2, 3])));
        assert_eq!(frame.get(4), None);
    }

    #[test]
    fn test_midday_frame() {
        let r = renderer();
        let palette = Palette::default();
        let now = TimeOfDay::from_hms(12, 0, 0).unwrap();
        let frame = r.render(now, &workday(), &markers());
        let pos = r.positions(now, &workday());

        assert_eq!(pos, DayPositions { current: 166, sunrise: 110, sunset: 235, solar_noon: 173 });

        // sun, even though 12:00 is also an hour tick
        assert_eq!(frame.get(166), Some(palette.current_time));
        // noon notch stays dark
        assert_eq!(frame.get(173), Some(OFF));
        assert!(!frame.is_written(173));
        // band interior, band ends (hour ticks at 08:00 and 17:00)
        assert_eq!(frame.get(111), Some(palette.daylight));
        assert_eq!(frame.get(234), Some(palette.daylight));
        assert_eq!(frame.get(110), Some(palette.hour_marker));
        assert_eq!(frame.get(235), Some(palette.hour_marker));
        // outside the band
        assert_eq!(frame.get(109), Some(OFF));
        assert_eq!(frame.get(236), Some(OFF));
        // solstice markers inside and outside the band
        assert_eq!(frame.get(121), Some(palette.solstice));
        assert_eq!(frame.get(222), Some(palette.solstice));
        assert_eq!(frame.get(52), Some(palette.solstice));
        assert_eq!(frame.get(284), Some(palette.solstice));
        // night hour tick
        assert_eq!(frame.get(13), Some(palette.hour_marker));
    }

    #[test]
    fn test_band_covers_sunrise_to_sunset() {
        let r = renderer();
        let frame = r.render(TimeOfDay::from_hms(12, 0, 0).unwrap(), &workday(), &markers());
        for i in 110..=235 {
            if i == 173 {
                continue;
            }
            assert!(frame.is_written(i), "position {} not painted", i);
        }
    }

    #[test]
    fn test_no_sun_at_night() {
        let r = renderer();
        let palette = Palette::default();
        let frame = r.render(TimeOfDay::from_hms(1, 0, 0).unwrap(), &workday(), &markers());
        assert!(frame.pixels().iter().all(|px| *px != palette.current_time));
    }

    #[test]
    fn test_sun_hidden_on_solar_noon() {
        let r = renderer();
        let palette = Palette::default();
        // 12:30:00 maps to 173, the solar noon LED
        let frame = r.render(TimeOfDay::from_hms(12, 30, 0).unwrap(), &workday(), &markers());
        assert_eq!(frame.get(173), Some(OFF));
        assert!(frame.pixels().iter().all(|px| *px != palette.current_time));
    }

    #[test]
    fn test_solstice_marker_overrides_noon() {
        let r = renderer();
        let palette = Palette::default();
        // solar noon at 08:47 lands on the winter sunrise marker
        let solar = SolarData {
            sunrise_minutes: 480,
            sunset_minutes: 1020,
            solar_noon_minutes: 527,
            day_seconds: 32_400,
        };
        let frame = r.render(TimeOfDay::from_hms(12, 0, 0).unwrap(), &solar, &markers());
        assert_eq!(frame.get(121), Some(palette.solstice));
    }

    #[test]
    fn test_end_of_day_never_written_past_strip() {
        let r = renderer();
        let palette = Palette::default();
        let solar = SolarData {
            sunrise_minutes: 0,
            sunset_minutes: 1439,
            solar_noon_minutes: 720,
            day_seconds: 86_340,
        };
        let now = TimeOfDay::from_hms(23, 59, 59).unwrap();
        let pos = r.positions(now, &solar);
        assert_eq!(pos.current, 332);
        assert_eq!(pos.sunset, 332);

        let frame = r.render(now, &solar, &markers());
        assert_eq!(frame.len(), 332);
        assert!(frame.pixels().iter().all(|px| *px != palette.current_time));
        assert_eq!(frame.get(331), Some(palette.daylight));
    }

    #[test]
    fn test_inverted_band_is_empty() {
        let r = renderer();
        let palette = Palette::default();
        let solar = SolarData {
            sunrise_minutes: 1020,
            sunset_minutes: 480,
            solar_noon_minutes: 750,
            day_seconds: 0,
        };
        let frame = r.render(TimeOfDay::from_hms(12, 0, 0).unwrap(), &solar, &markers());
        assert!(frame.pixels().iter().all(|px| *px != palette.daylight));
        assert!(frame.pixels().iter().all(|px| *px != palette.current_time));
    }

    #[test]
    fn test_zeroed_data_draws_only_fixed_marks() {
        let r = renderer();
        let palette = Palette::default();
        let frame = r.render(
            TimeOfDay::from_hms(12, 0, 0).unwrap(),
            &SolarData::default(),
            &markers(),
        );
        // noon sits on LED 0, which also hides the midnight tick
        assert_eq!(frame.get(0), Some(OFF));
        assert_eq!(frame.pixels().iter().filter(|px| **px == palette.hour_marker).count(), 23);
        assert_eq!(frame.pixels().iter().filter(|px| **px == palette.solstice).count(), 4);
        assert!(frame.pixels().iter().all(|px| *px != palette.daylight));
    }

    #[test]
    fn test_render_is_idempotent() {
        let r = renderer();
        let now = TimeOfDay::from_hms(15, 17, 42).unwrap();
        let a = r.render(now, &workday(), &markers());
        let b = r.render(now, &workday(), &markers());
        assert_eq!(a, b);
    }

    #[test]
    fn test_brightness_only() {
        let mut frame = FrameBuffer::new(2);
        frame.set(0, rgb([255, 128, 0]));
        let full = frame.corrected(ColorCorrection::Uncorrected, 255);
        assert_eq!(full, frame.pixels().to_vec());
        let half = frame.corrected(ColorCorrection::Uncorrected, 127);
        assert!(half[0].r < 255 && half[0].r > 100);
        assert_eq!(half[1], OFF);
    }

    #[test]
    fn test_typical_correction() {
        let mut frame = FrameBuffer::new(3);
        frame.set(0, rgb(CURRENT_TIME_RGB));
        frame.set(1, rgb([255, 255, 255]));
        let out = frame.corrected(ColorCorrection::Typical, 255);
        assert_eq!(out[0], RGB8::new(255, 176, 0));
        assert_eq!(out[1], RGB8::new(255, 176, 240));
        assert_eq!(out[2], OFF);
        // the frame itself is left alone
        assert_eq!(frame.get(0), Some(rgb(CURRENT_TIME_RGB)));
    }

    #[test]
    fn test_correction_before_brightness() {
        let mut frame = FrameBuffer::new(1);
        frame.set(0, rgb([255, 255, 255]));
        let out = frame.corrected(ColorCorrection::Typical, 127);
        assert!(out[0].g < 176 && out[0].g > 80);
        assert!(out[0].r > out[0].b && out[0].b > out[0].g);
    }
}
