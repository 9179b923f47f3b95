//! Spacecraft, dataset and time-window types.
//!
//! Inputs arrive as loose strings (`"psp"`, `"mag"`, `"2021-04-29"`); everything
//! is validated here, up front, so the network-facing code only ever sees
//! well-formed requests.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::time::parse_time;
use crate::error::HelioError;

/// Spacecraft with data on CDAWeb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacecraft {
    /// Parker Solar Probe.
    Psp,
    /// Solar Orbiter.
    Solo,
    /// Advanced Composition Explorer.
    Ace,
}

impl Spacecraft {
    pub const ALL: [Spacecraft; 3] = [Spacecraft::Psp, Spacecraft::Solo, Spacecraft::Ace];

    pub fn as_str(self) -> &'static str {
        match self {
            Spacecraft::Psp => "psp",
            Spacecraft::Solo => "solo",
            Spacecraft::Ace => "ace",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Spacecraft::Psp => "Parker Solar Probe",
            Spacecraft::Solo => "Solar Orbiter",
            Spacecraft::Ace => "ACE",
        }
    }

    /// NAIF id of the spacecraft in SPICE kernels.
    ///
    /// Only PSP and Solar Orbiter ship with trajectory kernels.
    pub fn naif_id(self) -> Result<i32, HelioError> {
        match self {
            Spacecraft::Psp => Ok(-96),
            Spacecraft::Solo => Ok(-144),
            Spacecraft::Ace => Err(HelioError::validation(
                "trajectory lookup supports 'psp' or 'solo' only",
            )),
        }
    }
}

impl fmt::Display for Spacecraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Spacecraft {
    type Err = HelioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "psp" => Ok(Spacecraft::Psp),
            "solo" => Ok(Spacecraft::Solo),
            "ace" => Ok(Spacecraft::Ace),
            _ => Err(HelioError::validation(format!(
                "spacecraft name '{s}' not recognised, use 'psp', 'solo' or 'ace'"
            ))),
        }
    }
}

/// Magnetic field or solar wind plasma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Mag,
    Sw,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 2] = [DatasetKind::Mag, DatasetKind::Sw];

    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKind::Mag => "mag",
            DatasetKind::Sw => "sw",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = HelioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mag" => Ok(DatasetKind::Mag),
            "sw" => Ok(DatasetKind::Sw),
            _ => Err(HelioError::validation(format!(
                "dataset name '{s}' not recognised, use 'mag' or 'sw'"
            ))),
        }
    }
}

/// CDAWeb dataset identifier for a spacecraft/kind pair.
pub fn dataset_id(spacecraft: Spacecraft, kind: DatasetKind) -> &'static str {
    match (spacecraft, kind) {
        (Spacecraft::Psp, DatasetKind::Mag) => "PSP_FLD_L2_MAG_RTN_1MIN",
        (Spacecraft::Psp, DatasetKind::Sw) => "PSP_SWP_SPC_L3I",
        (Spacecraft::Solo, DatasetKind::Mag) => "SOLO_L2_MAG-RTN-NORMAL-1-MINUTE",
        (Spacecraft::Solo, DatasetKind::Sw) => "SOLO_L2_SWA-PAS-GRND-MOM",
        (Spacecraft::Ace, DatasetKind::Mag) => "AC_H2_MFI",
        (Spacecraft::Ace, DatasetKind::Sw) => "AC_H2_SWE",
    }
}

/// Closed UTC interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, HelioError> {
        if start > end {
            return Err(HelioError::validation(format!(
                "time window start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both ends with [`parse_time`].
    pub fn parse(start: &str, end: &str) -> Result<Self, HelioError> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }
}

/// A fully validated dataset download request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetRequest {
    pub spacecraft: Spacecraft,
    pub kind: DatasetKind,
    pub window: TimeWindow,
}

impl DatasetRequest {
    pub fn new(spacecraft: Spacecraft, kind: DatasetKind, window: TimeWindow) -> Self {
        Self {
            spacecraft,
            kind,
            window,
        }
    }

    /// Validate raw string inputs.
    pub fn parse(spacecraft: &str, kind: &str, window: (&str, &str)) -> Result<Self, HelioError> {
        let spacecraft: Spacecraft = spacecraft.parse()?;
        let kind: DatasetKind = kind.parse()?;
        let window = TimeWindow::parse(window.0, window.1)?;
        Ok(Self::new(spacecraft, kind, window))
    }

    pub fn dataset_id(&self) -> &'static str {
        dataset_id(self.spacecraft, self.kind)
    }
}
