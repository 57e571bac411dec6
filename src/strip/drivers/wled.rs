/*
 *  strip/drivers/wled.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  WLED realtime UDP output
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
//! Byte 0 is the protocol, byte 1 the seconds WLED waits before returning to
//! its own effects. DRGB carries up to 490 LEDs from index 0; longer strips
//! go out as DNRGB packets, each with a big-endian start index.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, ToSocketAddrs, UdpSocket};

use log::debug;
use smart_leds::RGB8;

use crate::constants::WLED_UDP_PORT;
use crate::strip::error::StripError;
use crate::strip::traits::{check_frame_len, StripCapabilities, StripDriver};

pub const PROTOCOL_DRGB: u8 = 2;
pub const PROTOCOL_DNRGB: u8 = 4;

const DRGB_MAX_LEDS: usize = 490;
const DNRGB_MAX_LEDS: usize = 489;

/// Split a frame into the UDP payloads WLED expects.
pub fn encode_packets(pixels: &[RGB8], timeout_secs: u8) -> Vec<Vec<u8>> {
    if pixels.len() <= DRGB_MAX_LEDS {
        let mut packet = Vec::with_capacity(2 + 3 * pixels.len());
        packet.push(PROTOCOL_DRGB);
        packet.push(timeout_secs);
        for px in pixels {
            packet.extend_from_slice(&[px.r, px.g, px.b]);
        }
        return vec![packet];
    }

    pixels
        .chunks(DNRGB_MAX_LEDS)
        .enumerate()
        .map(|(i, chunk)| {
            let start = (i * DNRGB_MAX_LEDS) as u16;
            let mut packet = Vec::with_capacity(4 + 3 * chunk.len());
            packet.push(PROTOCOL_DNRGB);
            packet.push(timeout_secs);
            packet.extend_from_slice(&start.to_be_bytes());
            for px in chunk {
                packet.extend_from_slice(&[px.r, px.g, px.b]);
            }
            packet
        })
        .collect()
}

/// Resolve "host" or "host:port", defaulting the WLED realtime port.
pub fn resolve_target(address: &str) -> Result<SocketAddr, StripError> {
    let address = address.trim();
    let resolved = match address.to_socket_addrs() {
        Ok(mut addrs) => addrs.next(),
        Err(_) => (address, WLED_UDP_PORT)
            .to_socket_addrs()
            .map_err(|e| StripError::InvalidConfiguration(format!("WLED address '{}': {}", address, e)))?
            .next(),
    };
    resolved.ok_or_else(|| {
        StripError::InvalidConfiguration(format!("WLED address '{}' did not resolve", address))
    })
}

pub struct WledDriver {
    caps: StripCapabilities,
    target: SocketAddr,
    timeout_secs: u8,
    socket: Option<UdpSocket>,
}

impl WledDriver {
    pub fn new(address: &str, led_count: usize, timeout_secs: u8) -> Result<Self, StripError> {
        // DNRGB start index is 16 bit
        if led_count > u16::MAX as usize {
            return Err(StripError::InvalidConfiguration(format!(
                "WLED realtime addresses at most {} LEDs, strip has {}",
                u16::MAX, led_count
            )));
        }
        Ok(Self {
            caps: StripCapabilities { name: "wled", led_count },
            target: resolve_target(address)?,
            timeout_secs,
            socket: None,
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl StripDriver for WledDriver {
    fn capabilities(&self) -> &StripCapabilities {
        &self.caps
    }

    fn init(&mut self) -> Result<(), StripError> {
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))
            .map_err(|e| StripError::InitializationFailed(format!("UDP bind: {}", e)))?;
        socket
            .connect(self.target)
            .map_err(|e| StripError::InitializationFailed(format!("UDP connect {}: {}", self.target, e)))?;
        debug!("WLED realtime output to {}", self.target);
        self.socket = Some(socket);
        Ok(())
    }

    fn emit(&mut self, pixels: &[RGB8]) -> Result<(), StripError> {
        check_frame_len(&self.caps, pixels)?;
        let socket = self.socket.as_ref().ok_or(StripError::NotInitialized)?;
        for packet in encode_packets(pixels, self.timeout_secs) {
            socket.send(&packet)?;
        }
        Ok(())
    }
}
