/*
 *  strip/drivers/mock.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Recording strip driver for tests
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

use std::sync::{Arc, Mutex};

use smart_leds::RGB8;

use crate::strip::error::StripError;
use crate::strip::traits::{check_frame_len, StripCapabilities, StripDriver};

/// Shared state, cloned out of the driver so tests can inspect it after the
/// driver has been boxed.
#[derive(Debug, Default)]
pub struct MockDriverState {
    pub frames: Vec<Vec<RGB8>>,
    /// Fail every emit while set
    pub simulate_emit_failure: bool,
}

#[derive(Debug, Clone)]
pub struct MockDriver {
    caps: StripCapabilities,
    state: Arc<Mutex<MockDriverState>>,
}

impl MockDriver {
    pub fn new(led_count: usize) -> Self {
        Self {
            caps: StripCapabilities { name: "mock", led_count },
            state: Arc::new(Mutex::new(MockDriverState::default())),
        }
    }

    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }
}

impl StripDriver for MockDriver {
    fn capabilities(&self) -> &StripCapabilities {
        &self.caps
    }

    fn init(&mut self) -> Result<(), StripError> {
        Ok(())
    }

    fn emit(&mut self, pixels: &[RGB8]) -> Result<(), StripError> {
        check_frame_len(&self.caps, pixels)?;
        let mut state = self.state.lock().unwrap();
        if state.simulate_emit_failure {
            return Err(StripError::Io(std::io::Error::other("simulated")));
        }
        state.frames.push(pixels.to_vec());
        Ok(())
    }
}
