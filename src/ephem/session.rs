//! Scoped ephemeris state.
//!
//! An [`EphemerisSession`] owns the loaded SPK data. It is opened once,
//! reused across trajectory lookups, and released when dropped. Each kernel
//! is loaded at most once per session; nothing is shared globally.

use std::path::{Path, PathBuf};

use anise::constants::frames::{EARTH_J2000, SUN_J2000};
use anise::prelude::{Almanac, Epoch, Frame};
use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use crate::config::HelioConfig;
use crate::domain::Spacecraft;
use crate::ephem::kernels::{KernelCache, RemoteCache, kernel_urls};
use crate::error::HelioError;

pub const SUN_NAIF_ID: i32 = 10;
pub const EARTH_NAIF_ID: i32 = 399;

/// Position lookups against loaded ephemerides.
pub trait Ephemeris {
    /// Make sure everything needed for `spacecraft` is loaded. Idempotent.
    fn prepare(&mut self, spacecraft: Spacecraft) -> Result<(), HelioError>;

    /// Position of `target` relative to `observer` in J2000, km.
    fn position_km(&self, target: i32, observer: i32, at: DateTime<Utc>) -> Result<Vector3<f64>, HelioError>;
}

pub struct EphemerisSession<C: RemoteCache = KernelCache> {
    almanac: Almanac,
    cache: C,
    loaded: Vec<PathBuf>,
}

impl EphemerisSession<KernelCache> {
    /// Session backed by the on-disk kernel cache from `config`.
    pub fn open(config: &HelioConfig) -> Result<Self, HelioError> {
        Ok(Self::with_cache(KernelCache::new(config)?))
    }
}

impl<C: RemoteCache> EphemerisSession<C> {
    pub fn with_cache(cache: C) -> Self {
        Self {
            almanac: Almanac::default(),
            cache,
            loaded: Vec::new(),
        }
    }

    pub fn loaded_kernels(&self) -> &[PathBuf] {
        &self.loaded
    }

    /// Load one kernel file; repeated calls with the same path do nothing.
    pub fn load_kernel(&mut self, path: &Path) -> Result<(), HelioError> {
        if self.loaded.iter().any(|p| p == path) {
            return Ok(());
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| HelioError::Ephemeris(format!("kernel path {} is not UTF-8", path.display())))?;
        self.almanac = self
            .almanac
            .load(path_str)
            .map_err(|e| HelioError::Ephemeris(format!("failed to load {}: {e}", path.display())))?;
        log::info!("loaded kernel {}", path.display());
        self.loaded.push(path.to_path_buf());
        Ok(())
    }
}

impl<C: RemoteCache> Ephemeris for EphemerisSession<C> {
    fn prepare(&mut self, spacecraft: Spacecraft) -> Result<(), HelioError> {
        spacecraft.naif_id()?;
        for url in kernel_urls() {
            let path = self.cache.fetch(&url)?;
            self.load_kernel(&path)?;
        }
        Ok(())
    }

    fn position_km(&self, target: i32, observer: i32, at: DateTime<Utc>) -> Result<Vector3<f64>, HelioError> {
        let state = self
            .almanac
            .translate(frame_for(target), frame_for(observer), to_epoch(at), None)
            .map_err(|e| HelioError::Ephemeris(format!("no position for body {target} at {at}: {e}")))?;
        let r = state.radius_km;
        Ok(Vector3::new(r.x, r.y, r.z))
    }
}

fn frame_for(naif_id: i32) -> Frame {
    match naif_id {
        SUN_NAIF_ID => SUN_J2000,
        EARTH_NAIF_ID => EARTH_J2000,
        id => Frame::from_ephem_j2000(id),
    }
}

fn to_epoch(t: DateTime<Utc>) -> Epoch {
    let secs = t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) * 1e-9;
    Epoch::from_unix_seconds(secs)
}
