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

use crate::cosmic::OrbitalState;
use crate::linalg::UnitQuaternion;
use crate::GuidanceError;

use std::fmt;

mod frames;
pub use frames::SteeringFrame;

mod schedule;
pub use schedule::{ActiveSegment, ControlSchedule, ControlSegment, Setpoint, SharedSchedule};

mod preview;
pub use preview::{OrbitPropagator, PreviewSample, SchedulePreview};

/// The steering decision for one simulation tick: the commanded attitude, the
/// engine throttle, and the propulsion switch. Produced fresh on every query
/// and owned by the caller.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SteeringCommand {
    /// Commanded attitude, rotating body axes into the inertial basis
    pub orientation: UnitQuaternion<f64>,
    /// Engine throttle level in [0; 1]
    pub throttle: f64,
    /// Whether the engine should fire, or the sail be deployed
    pub propulsion_on: bool,
}

impl fmt::Display for SteeringCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "attitude {} @ {:.1}% throttle, propulsion {}",
            self.orientation,
            100.0 * self.throttle,
            if self.propulsion_on { "on" } else { "off" },
        )
    }
}

impl ControlSchedule {
    /// Resolves the steering command for the provided orbital state: finds the
    /// active setpoint at the state's epoch, evaluates its frame, and packages
    /// the attitude with the setpoint's throttle and propulsion switch.
    ///
    /// This is the single per-tick entry point for the host actuation logic. It
    /// errors if the active setpoint references a frame missing from the
    /// registry or if the state is degenerate; see [`SteeringExecutor`] for the
    /// fail-soft wrapper the tick loop should prefer.
    pub fn command_at(&self, state: &OrbitalState) -> Result<SteeringCommand, GuidanceError> {
        let active = self.segment_at(state.epoch);
        let frame = active.setpoint.frame()?;
        let orientation = frame.orientation(state, &active.setpoint.angles)?;
        Ok(SteeringCommand {
            orientation,
            throttle: active.setpoint.throttle,
            propulsion_on: active.setpoint.propulsion_on,
        })
    }
}

/// Per-tick resolution wrapper which reports errors without taking down the
/// simulation step: on a failed resolution, the previously resolved command is
/// held and a diagnostic is logged.
#[derive(Clone, Debug, Default)]
pub struct SteeringExecutor {
    last_command: Option<SteeringCommand>,
}

impl SteeringExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the schedule at the provided state, holding the previous
    /// command on error. Returns `None` only if no command has ever resolved.
    pub fn update(
        &mut self,
        state: &OrbitalState,
        schedule: &ControlSchedule,
    ) -> Option<SteeringCommand> {
        match schedule.command_at(state) {
            Ok(command) => {
                self.last_command = Some(command);
                Some(command)
            }
            Err(err) => {
                error!("steering resolution failed at {}: {err}", state.epoch);
                self.last_command
            }
        }
    }

    /// Returns the last successfully resolved command, if any.
    pub fn last_command(&self) -> Option<SteeringCommand> {
        self.last_command
    }
}
