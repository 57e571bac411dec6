/*
 *  strip/drivers/terminal.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  ANSI truecolor strip preview
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

use std::fmt::Write as _;
use std::io::Write;

use smart_leds::RGB8;

use crate::strip::error::StripError;
use crate::strip::traits::{check_frame_len, StripCapabilities, StripDriver};

/// 332 LEDs wrap onto four rows
pub const DEFAULT_ROW_WIDTH: usize = 83;

const LIT: char = '●';
const UNLIT: char = '·';
const RESET: &str = "\x1b[0m";

/// Draws the strip as rows of coloured dots.
///
/// In place mode moves the cursor up over the rows of the previous frame, so
/// anything else written to the same terminal in between (log lines on
/// stderr, say) is overdrawn and the frame drifts down. Turn it off with
/// [`TerminalDriver::in_place`] when logging is chatty.
pub struct TerminalDriver<W: Write + Send> {
    out: W,
    caps: StripCapabilities,
    row_width: usize,
    in_place: bool,
    rows_drawn: usize,
    initialized: bool,
}

impl<W: Write + Send> TerminalDriver<W> {
    pub fn new(out: W, led_count: usize, row_width: usize) -> Self {
        Self {
            out,
            caps: StripCapabilities { name: "terminal", led_count },
            row_width: row_width.max(1),
            in_place: true,
            rows_drawn: 0,
            initialized: false,
        }
    }

    /// Redraw over the previous frame (default) or append each frame.
    pub fn in_place(mut self, in_place: bool) -> Self {
        self.in_place = in_place;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn draw(&self, pixels: &[RGB8]) -> String {
        let mut s = String::new();
        if self.in_place && self.rows_drawn > 0 {
            // cursor up over the previous frame
            let _ = write!(s, "\x1b[{}A\r", self.rows_drawn);
        }
        for row in pixels.chunks(self.row_width) {
            for px in row {
                if *px == RGB8::default() {
                    let _ = write!(s, "\x1b[38;2;48;48;48m{}", UNLIT);
                } else {
                    let _ = write!(s, "\x1b[38;2;{};{};{}m{}", px.r, px.g, px.b, LIT);
                }
            }
            s.push_str(RESET);
            s.push('\n');
        }
        s
    }
}

impl<W: Write + Send> StripDriver for TerminalDriver<W> {
    fn capabilities(&self) -> &StripCapabilities {
        &self.caps
    }

    fn init(&mut self) -> Result<(), StripError> {
        self.rows_drawn = 0;
        self.initialized = true;
        Ok(())
    }

    fn emit(&mut self, pixels: &[RGB8]) -> Result<(), StripError> {
        if !self.initialized {
            return Err(StripError::NotInitialized);
        }
        check_frame_len(&self.caps, pixels)?;

        let frame = self.draw(pixels);
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        self.rows_drawn = pixels.len().div_ceil(self.row_width);
        Ok(())
    }
}
