//! Blocking HTTP helpers shared by the archive client and the kernel cache.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::HelioError;

pub fn build_client(timeout: Duration) -> Result<Client, HelioError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("helio-toolkit/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| HelioError::Config(format!("failed to build HTTP client: {e}")))
}

/// Last path segment of a URL, without query or fragment.
pub fn file_name_from_url(url: &str) -> Result<String, HelioError> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() && path.contains('/') => Ok(name.to_string()),
        _ => Err(HelioError::validation(format!("URL '{url}' has no file name"))),
    }
}

/// True when `dest` already holds a complete copy of the remote file.
///
/// Without an advertised length any non-empty file counts as complete.
pub fn is_cached(dest: &Path, expected_len: Option<u64>) -> bool {
    match fs::metadata(dest) {
        Ok(meta) if meta.is_file() => match expected_len {
            Some(len) => meta.len() == len,
            None => meta.len() > 0,
        },
        _ => false,
    }
}

/// Download `url` to `dest` unless a complete copy is already there.
///
/// The body is streamed to a `.part` sibling and renamed into place, so an
/// interrupted transfer never looks cached.
pub fn download_to(
    client: &Client,
    url: &str,
    dest: &Path,
    expected_len: Option<u64>,
) -> Result<PathBuf, HelioError> {
    if is_cached(dest, expected_len) {
        log::debug!("using cached {}", dest.display());
        return Ok(dest.to_path_buf());
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| HelioError::io(parent, e))?;
    }

    log::info!("downloading {url}");
    let mut resp = client.get(url).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(HelioError::Archive {
            status: status.as_u16(),
            message: format!("download of {url} failed"),
        });
    }

    write_atomically(&mut resp, dest)?;
    Ok(dest.to_path_buf())
}

/// Stream `body` into `<dest>.part`, then rename it to `dest`.
///
/// Failures reading the body are `Network`, failures on disk are `Io`. The
/// `.part` file is removed on any error.
pub fn write_atomically<R: Read>(body: &mut R, dest: &Path) -> Result<u64, HelioError> {
    let mut part = dest.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    let result = stream_to(body, &part).and_then(|n| {
        fs::rename(&part, dest).map_err(|e| HelioError::io(dest, e))?;
        Ok(n)
    });
    if result.is_err() {
        let _ = fs::remove_file(&part);
    }
    result
}

fn stream_to<R: Read>(body: &mut R, path: &Path) -> Result<u64, HelioError> {
    let mut file = File::create(path).map_err(|e| HelioError::io(path, e))?;
    let mut buf = vec![0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = match body.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(HelioError::Network(format!("reading response body: {e}"))),
        };
        file.write_all(&buf[..n]).map_err(|e| HelioError::io(path, e))?;
        total += n as u64;
    }
    file.flush().map_err(|e| HelioError::io(path, e))?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Yields some bytes, then fails like a dropped connection.
    struct BrokenBody {
        sent: bool,
    }

    impl Read for BrokenBody {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            self.sent = true;
            buf[..4].copy_from_slice(b"SPK ");
            Ok(4)
        }
    }

    #[test]
    fn body_is_renamed_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("k.bsp");
        let n = write_atomically(&mut &b"kernel bytes"[..], &dest).unwrap();
        assert_eq!(n, 12);
        assert_eq!(fs::read(&dest).unwrap(), b"kernel bytes");
        assert!(!dir.path().join("k.bsp.part").exists());
    }

    #[test]
    fn interrupted_body_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("k.bsp");
        let err = write_atomically(&mut BrokenBody { sent: false }, &dest).unwrap_err();
        assert!(matches!(err, HelioError::Network(_)), "{err}");
        assert!(err.is_retryable());
        assert!(!dest.exists());
        assert!(!dir.path().join("k.bsp.part").exists());
    }

    #[test]
    fn disk_failure_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing").join("k.bsp");
        let err = write_atomically(&mut &b"x"[..], &dest).unwrap_err();
        assert!(matches!(err, HelioError::Io { .. }), "{err}");
        assert!(!err.is_retryable());
    }

    #[test]
    fn file_names_from_urls() {
        assert_eq!(
            file_name_from_url("http://spiftp.esac.esa.int/data/SPICE/SOLAR-ORBITER/kernels/spk/de421.bsp").unwrap(),
            "de421.bsp"
        );
        assert_eq!(
            file_name_from_url("https://cdaweb.gsfc.nasa.gov/tmp/ws/AC_H2_MFI.csv?x=1").unwrap(),
            "AC_H2_MFI.csv"
        );
        assert!(file_name_from_url("https://example.org/dir/").is_err());
        assert!(file_name_from_url("no-slashes").is_err());
    }

    #[test]
    fn cache_check_uses_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("k.bsp");
        assert!(!is_cached(&path, None));

        File::create(&path).unwrap().write_all(b"abcd").unwrap();
        assert!(is_cached(&path, None));
        assert!(is_cached(&path, Some(4)));
        assert!(!is_cached(&path, Some(5)));
    }

    #[test]
    fn cached_file_is_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("de421.bsp");
        File::create(&path).unwrap().write_all(b"kernel").unwrap();

        // An unroutable URL proves no request is made.
        let client = build_client(Duration::from_millis(10)).unwrap();
        let got = download_to(&client, "http://0.0.0.0:9/de421.bsp", &path, Some(6)).unwrap();
        assert_eq!(got, path);
    }
}
