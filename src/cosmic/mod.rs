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

use crate::errors::DegenerateStateSnafu;
use crate::linalg::Vector3;
use crate::time::Epoch;
use crate::GuidanceError;

use std::fmt;

/// Below this norm, a vector no longer defines a direction.
const NORM_EPSILON: f64 = 1e-12;

/// The instantaneous position and velocity of the vehicle with respect to the
/// orbited body, in a fixed inertial basis, tagged with the universal epoch.
///
/// This is the per-tick input the host orbit simulation provides. Helmsman never
/// propagates it: the preview API takes a host-provided propagator instead.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrbitalState {
    /// Position of the vehicle with respect to the orbited body, in kilometers
    pub radius_km: Vector3<f64>,
    /// Velocity of the vehicle with respect to the orbited body, in kilometers per second
    pub velocity_km_s: Vector3<f64>,
    /// Universal epoch at which this state is valid
    pub epoch: Epoch,
}

impl OrbitalState {
    /// Creates a new orbital state from the position and velocity components, in km and km/s.
    #[allow(clippy::too_many_arguments)]
    pub fn cartesian(
        x_km: f64,
        y_km: f64,
        z_km: f64,
        vx_km_s: f64,
        vy_km_s: f64,
        vz_km_s: f64,
        epoch: Epoch,
    ) -> Self {
        Self {
            radius_km: Vector3::new(x_km, y_km, z_km),
            velocity_km_s: Vector3::new(vx_km_s, vy_km_s, vz_km_s),
            epoch,
        }
    }

    /// Creates a new orbital state from the provided position and velocity vectors.
    pub fn from_vectors(radius_km: Vector3<f64>, velocity_km_s: Vector3<f64>, epoch: Epoch) -> Self {
        Self {
            radius_km,
            velocity_km_s,
            epoch,
        }
    }

    /// Returns the position vector, in km
    pub fn radius(&self) -> Vector3<f64> {
        self.radius_km
    }

    /// Returns the velocity vector, in km/s
    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity_km_s
    }

    /// Returns the magnitude of the position vector, in km
    pub fn rmag_km(&self) -> f64 {
        self.radius_km.norm()
    }

    /// Returns the magnitude of the velocity vector, in km/s
    pub fn vmag_km_s(&self) -> f64 {
        self.velocity_km_s.norm()
    }

    /// Returns the orbital angular momentum vector, in km^2/s
    pub fn hvec(&self) -> Vector3<f64> {
        self.radius_km.cross(&self.velocity_km_s)
    }
}

impl fmt::Display for OrbitalState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}] position = [{:.3}, {:.3}, {:.3}] km\tvelocity = [{:.3}, {:.3}, {:.3}] km/s",
            self.epoch,
            self.radius_km[0],
            self.radius_km[1],
            self.radius_km[2],
            self.velocity_km_s[0],
            self.velocity_km_s[1],
            self.velocity_km_s[2],
        )
    }
}

/// The right-handed orthonormal triad spanned by an orbital state: unit radial,
/// unit velocity, orbit normal, and tangential axes. All steering frames which
/// depend on the orbit build their base orientation from this triad.
#[derive(Copy, Clone, Debug)]
pub struct OrbitalBasis {
    /// Unit position vector
    pub rhat: Vector3<f64>,
    /// Unit velocity vector
    pub vhat: Vector3<f64>,
    /// Unit orbital angular momentum vector
    pub hhat: Vector3<f64>,
    /// Unit tangential vector, completing the radial/tangential/normal triad
    pub that: Vector3<f64>,
}

impl OrbitalBasis {
    /// Builds the orbital triad, failing fast on a state which does not span one.
    ///
    /// A zero-length position or velocity, or a position colinear with the
    /// velocity, leaves the orbit normal undefined and is rejected before any
    /// NaN can propagate into an attitude command.
    pub fn try_from_state(state: &OrbitalState) -> Result<Self, GuidanceError> {
        let rmag = state.rmag_km();
        let vmag = state.vmag_km_s();
        snafu::ensure!(
            rmag > NORM_EPSILON && vmag > NORM_EPSILON,
            DegenerateStateSnafu {
                rmag_km: rmag,
                vmag_km_s: vmag,
            }
        );
        let rhat = state.radius_km / rmag;
        let vhat = state.velocity_km_s / vmag;
        let h = rhat.cross(&vhat);
        let hmag = h.norm();
        snafu::ensure!(
            hmag > NORM_EPSILON,
            DegenerateStateSnafu {
                rmag_km: rmag,
                vmag_km_s: vmag,
            }
        );
        let hhat = h / hmag;
        let that = hhat.cross(&rhat).normalize();
        Ok(Self {
            rhat,
            vhat,
            hhat,
            that,
        })
    }
}
