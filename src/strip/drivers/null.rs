/*
 *  strip/drivers/null.rs
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

use smart_leds::RGB8;

use crate::strip::error::StripError;
use crate::strip::traits::{check_frame_len, StripCapabilities, StripDriver};

/// Accepts and drops every frame; for headless runs with debug logging.
#[derive(Debug)]
pub struct NullDriver {
    caps: StripCapabilities,
}

impl NullDriver {
    pub fn new(led_count: usize) -> Self {
        Self { caps: StripCapabilities { name: "null", led_count } }
    }
}

impl StripDriver for NullDriver {
    fn capabilities(&self) -> &StripCapabilities {
        &self.caps
    }

    fn init(&mut self) -> Result<(), StripError> {
        Ok(())
    }

    fn emit(&mut self, pixels: &[RGB8]) -> Result<(), StripError> {
        check_frame_len(&self.caps, pixels)
    }
}
