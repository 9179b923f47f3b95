//! Heliographic Stonyhurst (HGS) coordinates.
//!
//! HGS is Sun-centred:
//!
//! - `Z` is the solar rotation axis
//! - `X` lies in the plane of `Z` and the Sun→Earth vector, pointing at Earth
//!   (longitude 0 is the central meridian seen from Earth)
//!
//! Inputs are Sun-relative positions in the J2000 equatorial frame.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::HelioError;

/// Right ascension of the solar north pole (IAU), degrees, J2000.
pub const SUN_POLE_RA_DEG: f64 = 286.13;
/// Declination of the solar north pole (IAU), degrees, J2000.
pub const SUN_POLE_DEC_DEG: f64 = 63.87;

pub const AU_KM: f64 = 149_597_870.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HgsCoord {
    /// Longitude in (-180, 180].
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub radius_km: f64,
}

impl HgsCoord {
    pub fn radius_au(&self) -> f64 {
        self.radius_km / AU_KM
    }
}

/// Unit vector of the solar rotation axis in J2000.
pub fn sun_pole_j2000() -> Vector3<f64> {
    let ra = SUN_POLE_RA_DEG.to_radians();
    let dec = SUN_POLE_DEC_DEG.to_radians();
    Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
}

/// Convert a Sun-relative J2000 position into HGS given Earth's Sun-relative position.
pub fn to_heliographic_stonyhurst(
    position_km: &Vector3<f64>,
    earth_km: &Vector3<f64>,
) -> Result<HgsCoord, HelioError> {
    let z = sun_pole_j2000();
    let perp = earth_km - z * earth_km.dot(&z);
    if !(perp.norm() > 1e-9 * earth_km.norm()) {
        return Err(HelioError::Ephemeris(
            "Earth position is degenerate for the HGS frame".into(),
        ));
    }
    let x = perp.normalize();
    let y = z.cross(&x);

    let radius_km = position_km.norm();
    if radius_km == 0.0 {
        return Ok(HgsCoord {
            lon_deg: 0.0,
            lat_deg: 0.0,
            radius_km,
        });
    }

    let px = position_km.dot(&x);
    let py = position_km.dot(&y);
    let pz = position_km.dot(&z);

    Ok(HgsCoord {
        lon_deg: py.atan2(px).to_degrees(),
        lat_deg: pz.atan2(px.hypot(py)).to_degrees(),
        radius_km,
    })
}
