/*
 *  lib.rs
 *
 *  stripdeck - mixer strips at a glance
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
//! Key and dial images for a hardware controller driving a software mixer:
//! level meters with peak hold, gain faders and strip/bus status markers.

pub mod graphics;
pub mod stripbus;
pub mod gain;
pub mod feedback;
pub mod session;
pub mod config;

pub use config::{Config, ConfigError};
pub use feedback::FeedbackPayload;
pub use session::{RenderRequest, RenderSession, RenderWorker, SessionError};
pub use stripbus::{BusStatus, MixerKind, StripBusError, StripOrBus, StripOrBusKind, StripStatus};
