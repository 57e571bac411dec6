/*
 *  strip/drivers/ws2812.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  WS2812 frames through ws2812-spi
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
//! The prerendered `ws2812-spi` encoder builds the whole frame in one buffer
//! so it leaves in a single transfer. The bus underneath only has to report
//! how many bytes it took; anything short of the full buffer is an error,
//! because a truncated frame never latches.

use embedded_hal::spi::{ErrorType, SpiBus};
use smart_leds::{SmartLedsWrite, RGB8};
use ws2812_spi::prerendered::Ws2812;

use crate::strip::error::StripError;
use crate::strip::traits::{check_frame_len, StripCapabilities, StripDriver};

/// 4 SPI bits per WS2812 bit, 24 bits per LED
pub const ENCODED_BYTES_PER_LED: usize = 12;

/// Head room for the reset gap
const RESET_BYTES: usize = 140;

/// A raw SPI sink that reports how many bytes a write accepted.
pub trait SpiWrite: Send {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, StripError>;
}

/// `SpiBus` over a [`SpiWrite`], turning short writes into errors.
struct CheckedBus<'a, S: SpiWrite>(&'a mut S);

impl<S: SpiWrite> ErrorType for CheckedBus<'_, S> {
    type Error = StripError;
}

impl<S: SpiWrite> SpiBus<u8> for CheckedBus<'_, S> {
    fn read(&mut self, words: &mut [u8]) -> Result<(), StripError> {
        // MISO is not wired; clock out zeros
        words.fill(0);
        self.write(words)
    }

    fn write(&mut self, words: &[u8]) -> Result<(), StripError> {
        let written = self.0.write_bytes(words)?;
        if written != words.len() {
            return Err(StripError::SpiError(format!(
                "short write {}/{}",
                written,
                words.len()
            )));
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), StripError> {
        self.write(write)?;
        read.fill(0);
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), StripError> {
        self.write(words)?;
        words.fill(0);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StripError> {
        Ok(())
    }
}

pub struct Ws2812Driver<S: SpiWrite> {
    caps: StripCapabilities,
    spi: S,
    buffer: Vec<u8>,
}

impl<S: SpiWrite> Ws2812Driver<S> {
    pub fn new(spi: S, led_count: usize) -> Self {
        Self {
            caps: StripCapabilities { name: "ws2812", led_count },
            spi,
            buffer: vec![0; led_count * ENCODED_BYTES_PER_LED + RESET_BYTES],
        }
    }
}

impl<S: SpiWrite> StripDriver for Ws2812Driver<S> {
    fn capabilities(&self) -> &StripCapabilities {
        &self.caps
    }

    fn init(&mut self) -> Result<(), StripError> {
        Ok(())
    }

    fn emit(&mut self, pixels: &[RGB8]) -> Result<(), StripError> {
        check_frame_len(&self.caps, pixels)?;
        let mut strip = Ws2812::new(CheckedBus(&mut self.spi), &mut self.buffer);
        strip
            .write(pixels.iter().copied())
            .map_err(|e| StripError::SpiError(format!("WS2812 frame: {:?}", e)))
    }
}
