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
use crate::guidance::{ControlSchedule, SteeringCommand};
use crate::time::{Duration, Epoch, TimeSeries};

/// Advances an orbital state to a requested epoch. The host provides the
/// implementation: helmsman never integrates an orbit itself.
///
/// Implemented for closures, so a propagator may simply be
/// `|state: &OrbitalState, to: Epoch| -> OrbitalState { ... }`. The returned
/// state must be tagged with the requested epoch.
pub trait OrbitPropagator {
    fn propagate(&mut self, state: &OrbitalState, to: Epoch) -> OrbitalState;
}

impl<F> OrbitPropagator for F
where
    F: FnMut(&OrbitalState, Epoch) -> OrbitalState,
{
    fn propagate(&mut self, state: &OrbitalState, to: Epoch) -> OrbitalState {
        self(state, to)
    }
}

/// One forecast sample: the predicted steering command at a future epoch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PreviewSample {
    pub epoch: Epoch,
    pub command: SteeringCommand,
}

/// A lazy forecast of the steering commands a schedule will produce over a
/// future window, for rendering a trajectory preview.
///
/// Each sample propagates the rolling state forward with the host propagator
/// and re-resolves the schedule at the sample epoch. Nothing is persisted: the
/// preview borrows the schedule, and restarting is simply building a new
/// preview with the same inputs, which yields the same samples.
pub struct SchedulePreview<'a, P: OrbitPropagator> {
    time_series: TimeSeries,
    schedule: &'a ControlSchedule,
    propagator: P,
    state: OrbitalState,
}

impl<'a, P: OrbitPropagator> SchedulePreview<'a, P> {
    /// Builds a preview sampling the window `[state.epoch, state.epoch + window]`
    /// inclusive at the provided step.
    pub fn new(
        schedule: &'a ControlSchedule,
        state: OrbitalState,
        window: Duration,
        step: Duration,
        propagator: P,
    ) -> Self {
        Self {
            time_series: TimeSeries::inclusive(state.epoch, state.epoch + window, step),
            schedule,
            propagator,
            state,
        }
    }
}

impl<P: OrbitPropagator> Iterator for SchedulePreview<'_, P> {
    type Item = PreviewSample;

    fn next(&mut self) -> Option<Self::Item> {
        let epoch = self.time_series.next()?;
        self.state = self.propagator.propagate(&self.state, epoch);
        match self.schedule.command_at(&self.state) {
            Ok(command) => Some(PreviewSample { epoch, command }),
            Err(err) => {
                error!("schedule preview aborted at {epoch}: {err}");
                None
            }
        }
    }
}
