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

use crate::cosmic::{OrbitalBasis, OrbitalState};
use crate::errors::{InvalidAnglesSnafu, UnknownFrameSnafu};
use crate::linalg::{UnitQuaternion, Vector3};
use crate::GuidanceError;

use enum_iterator::{all, Sequence};
use lazy_static::lazy_static;
use serde_derive::{Deserialize, Serialize};
use snafu::OptionExt;

use std::collections::HashMap;
use std::fmt;

lazy_static! {
    /// Process-wide frame registry, built once and immutable thereafter.
    static ref FRAME_REGISTRY: HashMap<&'static str, SteeringFrame> =
        all::<SteeringFrame>().map(|frame| (frame.id(), frame)).collect();
}

/// The steering frames available to a control segment.
///
/// Each frame derives a base orientation from the orbital state and composes it
/// with a local rotation built from the segment's three steering angles. The body
/// convention is +Z forward and +Y up: the base orientation is the look rotation
/// whose +Z axis points along the frame's forward direction with +Y as close as
/// possible to the frame's up direction.
///
/// Orbital axes used below: radial `r` (unit position), velocity `v` (unit
/// velocity), orbit normal `h = r × v` normalized, and tangential `t = h × r`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Sequence)]
pub enum SteeringFrame {
    /// Radial / tangential / normal. Forward along `t`, up along `r`. The local
    /// rotation swivels about the radial by the clock angle, tilts about the
    /// clock-rotated orbit normal by the cone angle, then flatspins about the
    /// resulting radial. Composed as base then local.
    Rtn,
    /// In-track / cross-track / normal. Forward along the cross-track axis
    /// `h × v`, up along `v`. The local rotation swivels about the velocity by
    /// the azimuth, tilts about the azimuth-rotated orbit normal by the flight
    /// path angle, then flatspins. Composed as base then local.
    Icn,
    /// Inertial frame: the base orientation is the identity for every orbital
    /// state, so the steering angles alone set the attitude.
    World,
    /// Counterclockwise variant of [`Self::Rtn`]. Forward along `r`, up along
    /// the tangential taken about the mirrored radial, `h × (-r)`. Same local
    /// rotation law as RTN, but composed as local then base — the reversed
    /// order is deliberate and must match the RTN convention's mirror.
    Ccwf,
}

impl SteeringFrame {
    /// Returns the unique registry key of this frame.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Rtn => "RTN",
            Self::Icn => "ICN",
            Self::World => "WORLD",
            Self::Ccwf => "CCWF",
        }
    }

    /// Returns the human readable name of this frame.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Rtn => "Radial/Tangential/Normal",
            Self::Icn => "In-track/Cross-track/Normal",
            Self::World => "Inertial",
            Self::Ccwf => "Counterclockwise RTN",
        }
    }

    /// Returns the names of the three steering angles of this frame, in the
    /// order the angle triple is provided to [`Self::orientation`].
    pub const fn angle_labels(&self) -> [&'static str; 3] {
        match self {
            Self::Rtn | Self::Ccwf => ["Cone", "Clock", "Flatspin"],
            Self::Icn => ["Flight path angle", "Azimuth", "Flatspin"],
            Self::World => ["Azimuth", "Elevation", "Flatspin"],
        }
    }

    /// Returns the default steering angles of this frame, in degrees.
    pub const fn angle_defaults(&self) -> [f64; 3] {
        match self {
            Self::Rtn | Self::Icn | Self::Ccwf => [90.0, 0.0, 0.0],
            Self::World => [0.0, 90.0, 0.0],
        }
    }

    /// Looks up a frame by its registry key, e.g. `"RTN"`.
    ///
    /// An unknown id is a reportable error and not a panic: schedules restored
    /// from host save data may reference frames a different registry version
    /// renamed or removed.
    pub fn from_id(id: &str) -> Result<Self, GuidanceError> {
        FRAME_REGISTRY
            .get(id)
            .copied()
            .context(UnknownFrameSnafu { id })
    }

    /// Iterates over every registered frame, e.g. to populate an editing UI.
    pub fn all() -> impl Iterator<Item = SteeringFrame> {
        all::<SteeringFrame>()
    }

    /// Computes the base orientation of this frame from the orbital state alone.
    ///
    /// Fails fast on a state which does not span an orbital basis, except for
    /// [`Self::World`] which never reads the state.
    pub fn base_orientation(
        &self,
        state: &OrbitalState,
    ) -> Result<UnitQuaternion<f64>, GuidanceError> {
        match self {
            Self::World => Ok(UnitQuaternion::identity()),
            Self::Rtn => {
                let basis = OrbitalBasis::try_from_state(state)?;
                Ok(UnitQuaternion::face_towards(&basis.that, &basis.rhat))
            }
            Self::Icn => {
                let basis = OrbitalBasis::try_from_state(state)?;
                let cross_track = basis.hhat.cross(&basis.vhat);
                Ok(UnitQuaternion::face_towards(&cross_track, &basis.vhat))
            }
            Self::Ccwf => {
                let basis = OrbitalBasis::try_from_state(state)?;
                let mirrored_tangential = basis.hhat.cross(&(-basis.rhat));
                Ok(UnitQuaternion::face_towards(
                    &basis.rhat,
                    &mirrored_tangential,
                ))
            }
        }
    }

    /// Computes the local rotation of this frame from a validated angle triple,
    /// in degrees, ordered per [`Self::angle_labels`].
    pub fn local_orientation(&self, angles: &[f64; 3]) -> UnitQuaternion<f64> {
        match self {
            // Clock swivels about the radial (+Y), cone tilts about the orbit normal (+X)
            Self::Rtn | Self::Ccwf => swivel_tilt_spin(angles[1], angles[0], angles[2]),
            // Azimuth swivels about the velocity (+Y), flight path angle tilts about the orbit normal (+X)
            Self::Icn => swivel_tilt_spin(angles[1], angles[0], angles[2]),
            Self::World => swivel_tilt_spin(angles[0], angles[1], angles[2]),
        }
    }

    /// Computes the commanded orientation from the orbital state and the angle
    /// triple, in degrees.
    ///
    /// All frames compose base then local, except [`Self::Ccwf`] which composes
    /// local then base.
    pub fn orientation(
        &self,
        state: &OrbitalState,
        angles: &[f64],
    ) -> Result<UnitQuaternion<f64>, GuidanceError> {
        let angles = validate_angles(angles)?;
        let base = self.base_orientation(state)?;
        let local = self.local_orientation(&angles);
        Ok(match self {
            Self::Ccwf => local * base,
            _ => base * local,
        })
    }
}

impl fmt::Display for SteeringFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Checks that the provided slice is a triple of finite angles, in degrees.
pub(crate) fn validate_angles(angles: &[f64]) -> Result<[f64; 3], GuidanceError> {
    if angles.len() != 3 || angles.iter().any(|angle| !angle.is_finite()) {
        return InvalidAnglesSnafu {
            got: angles.to_vec(),
        }
        .fail();
    }
    Ok([angles[0], angles[1], angles[2]])
}

/// Intrinsic Y-X-Y rotation from angles in degrees: swivel about +Y, tilt about
/// the swiveled +X, then spin about the resulting +Y. Rotating about an already
/// rotated axis is a right multiplication about the canonical axis, so the
/// product below reads left to right in application order.
fn swivel_tilt_spin(swivel_deg: f64, tilt_deg: f64, spin_deg: f64) -> UnitQuaternion<f64> {
    let swivel = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), swivel_deg.to_radians());
    let tilt = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), tilt_deg.to_radians());
    let spin = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), spin_deg.to_radians());
    swivel * tilt * spin
}

#[test]
fn registry_covers_every_frame() {
    for frame in SteeringFrame::all() {
        assert_eq!(SteeringFrame::from_id(frame.id()), Ok(frame));
        assert_eq!(frame.angle_labels().len(), frame.angle_defaults().len());
    }
    assert!(matches!(
        SteeringFrame::from_id("SEZ"),
        Err(GuidanceError::UnknownFrame { .. })
    ));
}
