//! SPICE kernel set and the local kernel cache.

use std::path::{Path, PathBuf};

use reqwest::blocking::Client;

use crate::config::HelioConfig;
use crate::data::http::{build_client, download_to, file_name_from_url};
use crate::error::HelioError;

const SOLO_KERNEL_ROOT: &str = "http://spiftp.esac.esa.int/data/SPICE/SOLAR-ORBITER/kernels/";

/// Solar Orbiter kernels, relative to the ESA SPICE root.
///
/// `de421.bsp` is the planetary ephemeris (Sun, Earth) used by both spacecraft.
pub const SOLO_KERNELS: [&str; 2] = [
    "spk/de421.bsp",
    "spk/solo_ANC_soc-orbit-stp_20200210-20301120_280_V1_00288_V01.bsp",
];

pub const PSP_KERNELS: [&str; 1] = [
    "https://spdf.gsfc.nasa.gov/pub/data/psp/ephemeris/spice/ephemerides/spp_nom_20180812_20250831_v040_RO7.bsp",
];

/// Full kernel URL list: Solar Orbiter set followed by PSP set.
pub fn kernel_urls() -> Vec<String> {
    SOLO_KERNELS
        .iter()
        .map(|k| format!("{SOLO_KERNEL_ROOT}{k}"))
        .chain(PSP_KERNELS.iter().map(|k| k.to_string()))
        .collect()
}

/// Maps a remote URL to a local file, downloading it at most once.
pub trait RemoteCache {
    fn fetch(&self, url: &str) -> Result<PathBuf, HelioError>;
}

pub struct KernelCache {
    client: Client,
    dir: PathBuf,
}

impl KernelCache {
    pub fn new(config: &HelioConfig) -> Result<Self, HelioError> {
        Ok(Self {
            client: build_client(config.http_timeout)?,
            dir: config.kernel_dir(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn local_path(&self, url: &str) -> Result<PathBuf, HelioError> {
        Ok(self.dir.join(file_name_from_url(url)?))
    }
}

impl RemoteCache for KernelCache {
    fn fetch(&self, url: &str) -> Result<PathBuf, HelioError> {
        let dest = self.local_path(url)?;
        download_to(&self.client, url, &dest, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_set_is_fixed() {
        let urls = kernel_urls();
        assert_eq!(urls.len(), 3);
        assert_eq!(
            urls[0],
            "http://spiftp.esac.esa.int/data/SPICE/SOLAR-ORBITER/kernels/spk/de421.bsp"
        );
        assert!(urls[2].ends_with("spp_nom_20180812_20250831_v040_RO7.bsp"));
    }

    #[test]
    fn cache_paths_live_under_kernel_dir() {
        let config = HelioConfig::default().with_cache_dir("/tmp/helio-cache");
        let cache = KernelCache::new(&config).unwrap();
        let path = cache.local_path(&kernel_urls()[1]).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/tmp/helio-cache/kernels/solo_ANC_soc-orbit-stp_20200210-20301120_280_V1_00288_V01.bsp")
        );
    }
}
