/*
    Helmsman, segmented steering guidance
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

/*! # helmsman

Segmented steering guidance for solar sails and other low-thrust spacecraft.

A pilot authors a timeline of control segments, each pinning a steering frame,
three steering angles, a throttle level, and a propulsion switch for a fixed
duration. Every simulation tick, the host provides the current orbital state
and epoch, and helmsman resolves the active segment into a commanded attitude
quaternion, a throttle level, and a propulsion on/off decision.
*/

/// Provides the orbital state input and the orthonormal orbital basis derived from it.
pub mod cosmic;

/// Provides the steering frames, the control schedule, per-tick command resolution, and the schedule preview.
pub mod guidance;

mod errors;
/// Helmsman will (almost) never panic and functions which may fail will return an error.
pub use self::errors::GuidanceError;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
    pub use na::geometry::{Quaternion, UnitQuaternion};
}

/// Re-export some useful things
pub use self::cosmic::OrbitalState;
pub use self::guidance::{
    ControlSchedule, ControlSegment, Setpoint, SteeringCommand, SteeringFrame,
};
