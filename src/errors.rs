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

use hifitime::Duration;
use snafu::Snafu;

/// Errors raised while editing a control schedule or resolving a steering command.
///
/// Edit errors reject the edit and leave the schedule untouched. Resolution errors
/// must not take down the tick loop: see [`crate::guidance::SteeringExecutor`] for
/// the fail-soft policy.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GuidanceError {
    #[snafu(display("no steering frame registered under id `{id}`"))]
    UnknownFrame { id: String },
    #[snafu(display("steering angles must be three finite values in degrees, got {got:?}"))]
    InvalidAngles { got: Vec<f64> },
    #[snafu(display("Throttle is not between 0.0 and 1.0: {ratio}"))]
    ThrottleRatio { ratio: f64 },
    #[snafu(display("segment duration must be non-negative, got {duration}"))]
    NegativeDuration { duration: Duration },
    #[snafu(display("no segment at index {index}, schedule holds {len}"))]
    SegmentIndex { index: usize, len: usize },
    #[snafu(display(
        "degenerate orbital state: |r| = {rmag_km} km, |v| = {vmag_km_s} km/s does not define an orbital basis"
    ))]
    DegenerateState { rmag_km: f64, vmag_km_s: f64 },
}
