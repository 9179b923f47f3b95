//! Dataset download: validate, query, fetch, merge.

use std::path::{Path, PathBuf};

use crate::config::HelioConfig;
use crate::data::cdaweb::{Archive, CdawebClient};
use crate::domain::{DatasetRequest, TimeSeriesTable};
use crate::error::HelioError;
use crate::io::{CsvTableReader, TableReader, load_tables};

/// Download a PSP / Solar Orbiter / ACE dataset from CDAWeb as one table.
///
/// - `sc_name`: `"psp"`, `"solo"` or `"ace"`
/// - `ds_type`: `"mag"` (magnetic field) or `"sw"` (solar wind)
/// - `time_window`: start and end timestamps, see [`crate::domain::parse_time`]
///
/// All inputs are validated before any network traffic. Files are stored
/// under `<data_dir>/<sc_name>/`.
pub fn download_sc_dataset(
    config: &HelioConfig,
    sc_name: &str,
    ds_type: &str,
    time_window: (&str, &str),
) -> Result<TimeSeriesTable, HelioError> {
    let request = DatasetRequest::parse(sc_name, ds_type, time_window)?;
    let client = CdawebClient::new(config)?;
    fetch_dataset(&client, &CsvTableReader, &config.data_dir, &request)
}

/// Directory a spacecraft's files are written to.
pub fn spacecraft_dir(data_dir: &Path, request: &DatasetRequest) -> PathBuf {
    data_dir.join(request.spacecraft.as_str())
}

/// Run a validated request against any archive and reader.
pub fn fetch_dataset<A, R>(
    archive: &A,
    reader: &R,
    data_dir: &Path,
    request: &DatasetRequest,
) -> Result<TimeSeriesTable, HelioError>
where
    A: Archive + ?Sized,
    R: TableReader + ?Sized,
{
    let dataset = request.dataset_id();
    let files = archive.search(dataset, &request.window)?;
    if files.is_empty() {
        return Err(HelioError::NoData(format!(
            "no {dataset} files between {} and {}",
            request.window.start(),
            request.window.end()
        )));
    }

    let dir = spacecraft_dir(data_dir, request);
    let mut paths = Vec::with_capacity(files.len());
    for file in &files {
        paths.push(archive.fetch(file, &dir)?);
    }
    log::info!(
        "{} {}: {} file(s) in {}",
        request.spacecraft,
        request.kind,
        paths.len(),
        dir.display()
    );

    load_tables(reader, &paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;

    use crate::data::cdaweb::RemoteFile;
    use crate::domain::TimeWindow;

    /// In-memory archive serving canned CSV bodies.
    struct FakeArchive {
        files: Vec<(String, &'static str)>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeArchive {
        fn new(files: Vec<(String, &'static str)>) -> Self {
            Self {
                files,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Archive for FakeArchive {
        fn search(&self, dataset: &str, _window: &TimeWindow) -> Result<Vec<RemoteFile>, HelioError> {
            self.calls.borrow_mut().push(format!("search {dataset}"));
            Ok(self
                .files
                .iter()
                .map(|(name, _)| RemoteFile {
                    url: format!("https://archive.test/{name}"),
                    start: None,
                    end: None,
                    length: None,
                })
                .collect())
        }

        fn fetch(&self, file: &RemoteFile, dir: &Path) -> Result<PathBuf, HelioError> {
            self.calls.borrow_mut().push(format!("fetch {}", file.url));
            let name = file.url.rsplit('/').next().unwrap();
            let body = self.files.iter().find(|(n, _)| n == name).unwrap().1;
            fs::create_dir_all(dir).unwrap();
            let path = dir.join(name);
            fs::write(&path, body).unwrap();
            Ok(path)
        }
    }

    #[test]
    fn merges_files_in_time_order() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FakeArchive::new(vec![
            ("day2.csv".into(), "EPOCH,BR\n2021-01-02T00:00:00Z,2.0\n"),
            ("day1.csv".into(), "EPOCH,BR\n2021-01-01T00:00:00Z,1.0\n"),
        ]);
        let request = DatasetRequest::parse("psp", "mag", ("2021-01-01", "2021-01-03")).unwrap();

        let table = fetch_dataset(&archive, &CsvTableReader, dir.path(), &request).unwrap();
        assert_eq!(table.column("BR").unwrap(), &[1.0, 2.0]);
        assert!(dir.path().join("psp").join("day1.csv").exists());
        assert_eq!(archive.calls.borrow()[0], "search PSP_FLD_L2_MAG_RTN_1MIN");
    }

    #[test]
    fn empty_search_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FakeArchive::new(Vec::new());
        let request = DatasetRequest::parse("ace", "sw", ("2021-01-01", "2021-01-02")).unwrap();
        let err = fetch_dataset(&archive, &CsvTableReader, dir.path(), &request).unwrap_err();
        assert!(matches!(err, HelioError::NoData(_)));
    }

    #[test]
    fn invalid_names_fail_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let config = HelioConfig::default()
            .with_data_dir(dir.path())
            // Unreachable on purpose: any request would fail as Network, not Validation.
            .with_timeout(std::time::Duration::from_millis(1));

        for (sc, ds) in [("voyager", "mag"), ("psp", "plasma"), ("", "")] {
            let err = download_sc_dataset(&config, sc, ds, ("2021-01-01", "2021-01-02")).unwrap_err();
            assert!(matches!(err, HelioError::Validation(_)), "{sc}/{ds}: {err}");
        }
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
