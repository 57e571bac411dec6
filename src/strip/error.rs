/*
 *  strip/error.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error type for the LED output layer
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

use std::error::Error;
use std::fmt;
use std::io;

/// Anything a strip driver can fail at
#[derive(Debug)]
pub enum StripError {
    /// Hardware or socket setup failed
    InitializationFailed(String),

    /// emit() before init()
    NotInitialized,

    /// Terminal or socket I/O
    Io(io::Error),

    /// SPI bus error
    SpiError(String),

    /// Invalid configuration
    InvalidConfiguration(String),

    /// Frame length differs from the strip length
    LengthMismatch { expected: usize, actual: usize },

    /// Driver not compiled into this build
    Unsupported(&'static str),
}

impl fmt::Display for StripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StripError::InitializationFailed(msg) =>
                write!(f, "Strip initialization failed: {}", msg),
            StripError::NotInitialized =>
                write!(f, "Strip driver not initialized"),
            StripError::Io(err) =>
                write!(f, "Strip I/O error: {}", err),
            StripError::SpiError(msg) =>
                write!(f, "SPI communication error: {}", msg),
            StripError::InvalidConfiguration(msg) =>
                write!(f, "Invalid configuration: {}", msg),
            StripError::LengthMismatch { expected, actual } =>
                write!(f, "Frame length mismatch: expected {} LEDs, got {}", expected, actual),
            StripError::Unsupported(what) =>
                write!(f, "{} not enabled in this build", what),
        }
    }
}

impl Error for StripError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StripError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for StripError {
    fn from(err: io::Error) -> Self {
        StripError::Io(err)
    }
}

impl embedded_hal::spi::Error for StripError {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        embedded_hal::spi::ErrorKind::Other
    }
}

#[cfg(feature = "pi")]
impl From<rppal::spi::Error> for StripError {
    fn from(err: rppal::spi::Error) -> Self {
        StripError::SpiError(err.to_string())
    }
}
