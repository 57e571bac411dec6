/*
 *  lib.rs
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
//! Maps the time of day and today's sunrise, solar noon and sunset onto a
//! linear LED strip: index 0 is local midnight, the last LED just before the
//! next one.

pub mod clock;
pub mod config;
pub mod constants;
pub mod location;
pub mod markers;
pub mod providers;
pub mod render;
pub mod solar;
pub mod strip;
pub mod sunclock;
pub mod timemap;
