/*
    Asteria, field of regard computation for space survey planning
    Copyright (C) 2021-onwards The Asteria Developers

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

/*! Spacecraft orbit from a two-line element set.

Propagation runs through SGP4 and returns geocentric positions in the TEME
frame, in km. Parsing the element file itself belongs to the caller: this
module consumes either the two raw lines or already parsed elements.
*/

use chrono::{Datelike, Timelike};
use serde_derive::{Deserialize, Serialize};
use sgp4::{Constants, Elements, MinutesSinceEpoch};
use snafu::prelude::*;

use crate::ephem;
use crate::linalg::Vector3;
use crate::time::{Duration, Epoch, Unit};

/// Beyond this many days from the element set epoch, SGP4 accuracy is degraded
/// enough that results should be treated with suspicion. Documented
/// limitation, not an error.
pub const VALIDITY_WINDOW_DAYS: f64 = 30.0;

#[derive(Debug, Snafu)]
pub enum PropagationError {
    #[snafu(display("element set could not be interpreted: {details}"))]
    InvalidElements { details: String },
    #[snafu(display("SGP4 initialization failed: {details}"))]
    Initialization { details: String },
    #[snafu(display("SGP4 did not converge at {epoch}: {details}"))]
    NoConvergence { epoch: Epoch, details: String },
    #[snafu(display("propagation returned a non finite position at {epoch}"))]
    NonFinitePosition { epoch: Epoch },
    #[snafu(display("element set declares a mean motion of {mean_motion} rev/day"))]
    NonPositiveMeanMotion { mean_motion: f64 },
}

/// Geodetic coordinates on the WGS-84 ellipsoid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geodetic {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

const WGS84_A_KM: f64 = ephem::EARTH_EQUATORIAL_RADIUS_KM;
const WGS84_E2: f64 = 0.006_694_379_990_14;

impl Geodetic {
    /// Earth fixed Cartesian position of this geodetic point, in km.
    pub fn to_ecef(&self) -> Vector3<f64> {
        let lat = self.latitude_deg.to_radians();
        let lon = self.longitude_deg.to_radians();
        let (slat, clat) = lat.sin_cos();
        let (slon, clon) = lon.sin_cos();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * slat * slat).sqrt();
        Vector3::new(
            (n + self.altitude_km) * clat * clon,
            (n + self.altitude_km) * clat * slon,
            (n * (1.0 - WGS84_E2) + self.altitude_km) * slat,
        )
    }

    /// Geodetic coordinates of an Earth fixed position, in km, via the usual
    /// fixed-point iteration on the latitude.
    pub fn from_ecef(position: &Vector3<f64>) -> Self {
        let p = (position[0] * position[0] + position[1] * position[1]).sqrt();
        let mut lat = position[2].atan2(p);
        for _ in 0..10 {
            let slat = lat.sin();
            let n = WGS84_A_KM / (1.0 - WGS84_E2 * slat * slat).sqrt();
            lat = (position[2] + WGS84_E2 * n * slat).atan2(p);
        }
        let slat = lat.sin();
        let clat = lat.cos();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * slat * slat).sqrt();
        let altitude_km = if clat.abs() > 1e-10 {
            p / clat - n
        } else {
            position[2].abs() / slat.abs() - n * (1.0 - WGS84_E2)
        };
        Self {
            latitude_deg: lat.to_degrees(),
            longitude_deg: position[1].atan2(position[0]).to_degrees(),
            altitude_km,
        }
    }
}

/// An immutable spacecraft orbit built from a two-line element set.
pub struct Orbit {
    constants: Constants,
    epoch: Epoch,
    period: Duration,
    norad_id: u64,
}

impl Orbit {
    /// Builds an orbit from the two lines of an element set.
    pub fn from_tle(line1: &str, line2: &str) -> Result<Self, PropagationError> {
        let elements = Elements::from_tle(None, line1.as_bytes(), line2.as_bytes())
            .map_err(|e| PropagationError::InvalidElements {
                details: e.to_string(),
            })?;
        Self::from_elements(elements)
    }

    /// Builds an orbit from already parsed elements.
    pub fn from_elements(elements: Elements) -> Result<Self, PropagationError> {
        ensure!(
            elements.mean_motion > 0.0,
            NonPositiveMeanMotionSnafu {
                mean_motion: elements.mean_motion
            }
        );
        let dt = elements.datetime;
        let epoch = Epoch::from_gregorian_utc(
            dt.year(),
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            dt.nanosecond(),
        );
        let period = (1_440.0 / elements.mean_motion) * Unit::Minute;
        let norad_id = elements.norad_id;
        let constants =
            Constants::from_elements(&elements).map_err(|e| PropagationError::Initialization {
                details: e.to_string(),
            })?;
        info!(
            "orbit of {norad_id}: epoch {epoch}, period {period}, {:.4} rev/day",
            elements.mean_motion
        );
        Ok(Self {
            constants,
            epoch,
            period,
            norad_id,
        })
    }

    /// Epoch of the element set.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Orbital period derived from the mean motion.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// NORAD catalog number of the satellite.
    pub fn norad_id(&self) -> u64 {
        self.norad_id
    }

    /// Geocentric TEME position of the spacecraft at the provided epoch, in km.
    pub fn position(&self, epoch: Epoch) -> Result<Vector3<f64>, PropagationError> {
        Ok(self.state(epoch)?.0)
    }

    /// Geocentric TEME position and velocity at the provided epoch, in km and km/s.
    pub fn state(&self, epoch: Epoch) -> Result<(Vector3<f64>, Vector3<f64>), PropagationError> {
        let since_epoch = epoch - self.epoch;
        if since_epoch.abs() > VALIDITY_WINDOW_DAYS * Unit::Day {
            warn!(
                "propagating {} to {epoch}, {since_epoch} from its element set epoch: accuracy is degraded",
                self.norad_id
            );
        }
        let minutes = since_epoch.to_unit(Unit::Minute);
        let prediction = self
            .constants
            .propagate(MinutesSinceEpoch(minutes))
            .map_err(|e| PropagationError::NoConvergence {
                epoch,
                details: e.to_string(),
            })?;
        let r = Vector3::from(prediction.position);
        let v = Vector3::from(prediction.velocity);
        ensure!(
            r.iter().chain(v.iter()).all(|x| x.is_finite()),
            NonFinitePositionSnafu { epoch }
        );
        Ok((r, v))
    }

    /// Positions for an ordered sequence of epochs.
    pub fn positions(&self, epochs: &[Epoch]) -> Result<Vec<Vector3<f64>>, PropagationError> {
        epochs.iter().map(|epoch| self.position(*epoch)).collect()
    }

    /// Geodetic sub-satellite point at the provided epoch.
    pub fn subpoint(&self, epoch: Epoch) -> Result<Geodetic, PropagationError> {
        let teme = self.position(epoch)?;
        Ok(Geodetic::from_ecef(&ephem::teme_to_ecef(epoch, &teme)))
    }
}
