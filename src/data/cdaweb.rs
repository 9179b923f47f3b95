//! CDAWeb REST integration.
//!
//! A data request against
//! `{base}/dataviews/sp_phys/datasets/{id}/data/{start},{end}/ALL-VARIABLES`
//! returns a list of generated files; those are then fetched one by one.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::HelioConfig;
use crate::data::http::{build_client, download_to, file_name_from_url};
use crate::domain::{TimeWindow, format_cdaweb};
use crate::error::HelioError;

const DATAVIEW: &str = "sp_phys";
const FORMAT: &str = "csv";

/// A file advertised by the archive for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    pub url: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub length: Option<u64>,
}

/// Remote archive: search for files covering a window, then fetch them.
pub trait Archive {
    fn search(&self, dataset: &str, window: &TimeWindow) -> Result<Vec<RemoteFile>, HelioError>;

    /// Download `file` into `dir`, returning the local path.
    fn fetch(&self, file: &RemoteFile, dir: &Path) -> Result<PathBuf, HelioError>;
}

pub struct CdawebClient {
    client: Client,
    base_url: String,
}

impl CdawebClient {
    pub fn new(config: &HelioConfig) -> Result<Self, HelioError> {
        Ok(Self {
            client: build_client(config.http_timeout)?,
            base_url: config.cdaweb_base_url.clone(),
        })
    }

    /// URL of the data request for `dataset` over `window`.
    pub fn data_url(&self, dataset: &str, window: &TimeWindow) -> Result<Url, HelioError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| HelioError::Config(format!("invalid CDAWeb base URL '{}': {e}", self.base_url)))?;
        let range = format!("{},{}", format_cdaweb(window.start()), format_cdaweb(window.end()));
        url.path_segments_mut()
            .map_err(|_| HelioError::Config(format!("CDAWeb base URL '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(["dataviews", DATAVIEW, "datasets", dataset, "data", range.as_str(), "ALL-VARIABLES"]);
        url.query_pairs_mut().append_pair("format", FORMAT);
        Ok(url)
    }
}

impl Archive for CdawebClient {
    fn search(&self, dataset: &str, window: &TimeWindow) -> Result<Vec<RemoteFile>, HelioError> {
        let url = self.data_url(dataset, window)?;
        log::debug!("CDAWeb query {url}");

        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()?;

        let status = resp.status();
        if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_FOUND {
            return Err(HelioError::NoData(format!(
                "CDAWeb has no {dataset} data between {} and {}",
                window.start(),
                window.end()
            )));
        }
        if !status.is_success() {
            return Err(HelioError::Archive {
                status: status.as_u16(),
                message: format!("CDAWeb query for {dataset} failed"),
            });
        }

        let body = resp.text()?;
        parse_data_result(&body)
    }

    fn fetch(&self, file: &RemoteFile, dir: &Path) -> Result<PathBuf, HelioError> {
        let name = file_name_from_url(&file.url)?;
        download_to(&self.client, &file.url, &dir.join(name), file.length)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DataResult {
    #[serde(default)]
    file_description: Vec<FileDescription>,
    #[serde(default)]
    error: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FileDescription {
    name: String,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    length: Option<u64>,
}

/// Decode a CDAWeb `DataResult` document.
pub fn parse_data_result(body: &str) -> Result<Vec<RemoteFile>, HelioError> {
    let result: DataResult =
        serde_json::from_str(body).map_err(|e| HelioError::parse("CDAWeb response", e))?;

    if !result.error.is_empty() {
        return Err(HelioError::Archive {
            status: 200,
            message: result.error.join("; "),
        });
    }

    let parse_opt = |raw: &Option<String>| -> Option<DateTime<Utc>> {
        raw.as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    };

    Ok(result
        .file_description
        .into_iter()
        .map(|fd| RemoteFile {
            start: parse_opt(&fd.start_time),
            end: parse_opt(&fd.end_time),
            length: fd.length,
            url: fd.name,
        })
        .collect())
}
