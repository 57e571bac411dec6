/*
 *  strip/drivers/spi.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  WS2812 strip on the Raspberry Pi SPI MOSI pin
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
//! The encoded frame goes out as a single transfer so the line never idles
//! low mid-frame. Strips longer than ~330 LEDs exceed the default 4096 byte
//! spidev buffer; raise it with `spidev.bufsiz=` on the kernel command line.

use log::info;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use smart_leds::RGB8;

use crate::strip::drivers::ws2812::{SpiWrite, Ws2812Driver};
use crate::strip::error::StripError;
use crate::strip::traits::{StripCapabilities, StripDriver};

impl SpiWrite for Spi {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, StripError> {
        Ok(Spi::write(self, bytes)?)
    }
}

fn bus_for(index: u8) -> Result<Bus, StripError> {
    Ok(match index {
        0 => Bus::Spi0,
        1 => Bus::Spi1,
        2 => Bus::Spi2,
        3 => Bus::Spi3,
        4 => Bus::Spi4,
        5 => Bus::Spi5,
        6 => Bus::Spi6,
        other => {
            return Err(StripError::InvalidConfiguration(format!(
                "SPI bus {} does not exist (0..=6)",
                other
            )))
        }
    })
}

pub struct SpiDriver {
    caps: StripCapabilities,
    bus: Bus,
    clock_hz: u32,
    strip: Option<Ws2812Driver<Spi>>,
}

impl SpiDriver {
    pub fn new(bus: u8, clock_hz: u32, led_count: usize) -> Result<Self, StripError> {
        Ok(Self {
            caps: StripCapabilities { name: "spi", led_count },
            bus: bus_for(bus)?,
            clock_hz,
            strip: None,
        })
    }
}

impl StripDriver for SpiDriver {
    fn capabilities(&self) -> &StripCapabilities {
        &self.caps
    }

    fn init(&mut self) -> Result<(), StripError> {
        let spi = Spi::new(self.bus, SlaveSelect::Ss0, self.clock_hz, Mode::Mode0)
            .map_err(|e| StripError::InitializationFailed(format!("SPI {:?}: {}", self.bus, e)))?;
        info!("WS2812 on SPI {:?} at {} Hz", self.bus, self.clock_hz);
        self.strip = Some(Ws2812Driver::new(spi, self.caps.led_count));
        Ok(())
    }

    fn emit(&mut self, pixels: &[RGB8]) -> Result<(), StripError> {
        self.strip.as_mut().ok_or(StripError::NotInitialized)?.emit(pixels)
    }
}
