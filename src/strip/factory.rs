/*
 *  strip/factory.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Strip driver factory
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

use log::info;

use crate::config::{DriverKind, StripSettings};
use crate::strip::drivers::null::NullDriver;
use crate::strip::drivers::terminal::{TerminalDriver, DEFAULT_ROW_WIDTH};
use crate::strip::drivers::wled::WledDriver;
use crate::strip::error::StripError;
use crate::strip::traits::StripDriver;

#[cfg(feature = "pi")]
use crate::strip::drivers::spi::SpiDriver;

/// Type alias for boxed strip driver trait objects
pub type BoxedDriver = Box<dyn StripDriver>;

/// Factory for creating strip drivers from configuration
pub struct StripDriverFactory;

impl StripDriverFactory {
    /// Build and initialise the configured driver.
    pub fn create_from_settings(settings: &StripSettings) -> Result<BoxedDriver, StripError> {
        let mut driver = Self::build(settings)?;
        driver.init()?;
        info!(
            "Strip driver '{}' ready, {} LEDs",
            driver.capabilities().name,
            driver.led_count()
        );
        Ok(driver)
    }

    fn build(settings: &StripSettings) -> Result<BoxedDriver, StripError> {
        let leds = settings.length;
        match settings.driver {
            DriverKind::Terminal => Ok(Box::new(
                TerminalDriver::new(std::io::stdout(), leds, DEFAULT_ROW_WIDTH)
                    .in_place(settings.redraw_in_place),
            )),
            DriverKind::Null => Ok(Box::new(NullDriver::new(leds))),
            DriverKind::Wled => {
                let address = settings.wled_address.as_deref().ok_or_else(|| {
                    StripError::InvalidConfiguration("wled driver needs an address".to_string())
                })?;
                Ok(Box::new(WledDriver::new(address, leds, settings.wled_timeout_secs)?))
            }

            #[cfg(feature = "pi")]
            DriverKind::Spi => Ok(Box::new(SpiDriver::new(
                settings.spi_bus,
                settings.spi_clock_hz,
                leds,
            )?)),

            #[cfg(not(feature = "pi"))]
            DriverKind::Spi => Err(StripError::Unsupported(
                "SPI driver (rebuild with --features pi)",
            )),
        }
    }
}
