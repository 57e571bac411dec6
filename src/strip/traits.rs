/*
 *  strip/traits.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  LED strip driver abstraction
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

use smart_leds::RGB8;

use crate::strip::error::StripError;

/// What a driver drives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripCapabilities {
    /// Short name for log lines
    pub name: &'static str,

    /// Number of addressable LEDs
    pub led_count: usize,
}

/// Every LED output implements this.
///
/// Frames arrive already brightness scaled, one colour per LED, index 0 at
/// local midnight.
pub trait StripDriver: Send {
    fn capabilities(&self) -> &StripCapabilities;

    fn led_count(&self) -> usize {
        self.capabilities().led_count
    }

    /// Open the device or socket.
    fn init(&mut self) -> Result<(), StripError>;

    /// Push one full frame to the strip.
    fn emit(&mut self, pixels: &[RGB8]) -> Result<(), StripError>;

    /// Turn every LED off.
    fn blank(&mut self) -> Result<(), StripError> {
        let off = vec![RGB8::default(); self.led_count()];
        self.emit(&off)
    }
}

/// Reject frames that do not match the strip length.
pub fn check_frame_len(caps: &StripCapabilities, pixels: &[RGB8]) -> Result<(), StripError> {
    if pixels.len() != caps.led_count {
        return Err(StripError::LengthMismatch {
            expected: caps.led_count,
            actual: pixels.len(),
        });
    }
    Ok(())
}
