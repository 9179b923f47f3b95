//! Spacecraft trajectory along a time series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Spacecraft, TimeSeriesTable};
use crate::ephem::frames::{HgsCoord, to_heliographic_stonyhurst};
use crate::ephem::session::{EARTH_NAIF_ID, Ephemeris, SUN_NAIF_ID};
use crate::error::HelioError;

/// HGS coordinates aligned 1:1 with a list of timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub spacecraft: Spacecraft,
    times: Vec<DateTime<Utc>>,
    coords: Vec<HgsCoord>,
}

impl Trajectory {
    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn coords(&self) -> &[HgsCoord] {
        &self.coords
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Heliocentric distance per sample, AU.
    pub fn radial_distance_au(&self) -> Vec<f64> {
        self.coords.iter().map(HgsCoord::radius_au).collect()
    }
}

/// Trajectory of PSP or Solar Orbiter at every timestamp of `series`.
pub fn get_trajectory<E: Ephemeris + ?Sized>(
    ephemeris: &mut E,
    series: &TimeSeriesTable,
    spacecraft: Spacecraft,
) -> Result<Trajectory, HelioError> {
    get_trajectory_at(ephemeris, series.times(), spacecraft)
}

/// Same as [`get_trajectory`] for a bare list of timestamps.
pub fn get_trajectory_at<E: Ephemeris + ?Sized>(
    ephemeris: &mut E,
    times: &[DateTime<Utc>],
    spacecraft: Spacecraft,
) -> Result<Trajectory, HelioError> {
    let body = spacecraft.naif_id()?;
    ephemeris.prepare(spacecraft)?;

    let mut coords = Vec::with_capacity(times.len());
    for &t in times {
        let sc = ephemeris.position_km(body, SUN_NAIF_ID, t)?;
        let earth = ephemeris.position_km(EARTH_NAIF_ID, SUN_NAIF_ID, t)?;
        coords.push(to_heliographic_stonyhurst(&sc, &earth)?);
    }

    Ok(Trajectory {
        spacecraft,
        times: times.to_vec(),
        coords,
    })
}

/// Add the trajectory's heliocentric distance (AU) as a `Distance` column.
pub fn attach_distance(table: TimeSeriesTable, trajectory: &Trajectory) -> Result<TimeSeriesTable, HelioError> {
    if table.times() != trajectory.times() {
        return Err(HelioError::validation(
            "trajectory timestamps do not match the table index",
        ));
    }
    table.with_column("Distance", trajectory.radial_distance_au())
}
