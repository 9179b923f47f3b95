//! Load downloaded data files into [`TimeSeriesTable`]s.
//!
//! CDAWeb text exports are CSV with a timestamp in the first column and one
//! numeric column per variable. The reader is lenient about content:
//! - comment lines (`#`) and a UTF-8 BOM on the header are ignored
//! - unparseable numbers and CDF fill values become NaN
//! - rows whose timestamp can't be parsed are skipped and counted

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::domain::{TimeSeriesTable, parse_time};
use crate::error::HelioError;

/// CDF fill values are around -1e31; anything this large is a missing sample.
const FILL_THRESHOLD: f64 = 1e30;

/// Turns one local data file into a table.
pub trait TableReader {
    fn read(&self, path: &Path) -> Result<TimeSeriesTable, HelioError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvTableReader;

impl TableReader for CsvTableReader {
    fn read(&self, path: &Path) -> Result<TimeSeriesTable, HelioError> {
        let file = File::open(path).map_err(|e| HelioError::io(path, e))?;
        let (table, skipped) = read_csv(file, &path.display().to_string())?;
        if skipped > 0 {
            log::debug!("{}: skipped {skipped} rows with unparseable timestamps", path.display());
        }
        Ok(table)
    }
}

/// Parse CSV from any reader. Returns the table and the number of skipped rows.
pub fn read_csv<R: std::io::Read>(input: R, source: &str) -> Result<(TimeSeriesTable, usize), HelioError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| HelioError::parse(source, format!("failed to read CSV headers: {e}")))?
        .clone();
    if headers.len() < 2 {
        return Err(HelioError::parse(
            source,
            "expected a timestamp column followed by at least one data column",
        ));
    }
    let names = column_names(&headers);
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(HelioError::parse(source, format!("duplicate column '{name}'")));
        }
    }

    let mut times = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    let mut skipped = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: 1-based lines, header on line 1.
        let line = idx + 2;
        let record = result.map_err(|e| HelioError::parse(source, format!("line {line}: {e}")))?;

        let Some(time) = record.get(0).and_then(|raw| parse_time(raw).ok()) else {
            skipped += 1;
            continue;
        };
        times.push(time);
        for (j, col) in values.iter_mut().enumerate() {
            col.push(parse_value(record.get(j + 1).unwrap_or("")));
        }
    }

    let mut table = TimeSeriesTable::new(times);
    for (name, col) in names.into_iter().zip(values) {
        table.push_column(name, col)?;
    }
    table.sort_by_time();
    Ok((table, skipped))
}

/// Read every file and merge them in time order.
pub fn load_tables<R: TableReader + ?Sized>(
    reader: &R,
    paths: &[PathBuf],
) -> Result<TimeSeriesTable, HelioError> {
    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        tables.push(reader.read(path)?);
    }
    Ok(TimeSeriesTable::concat(tables))
}

fn column_names(headers: &StringRecord) -> Vec<String> {
    headers
        .iter()
        .skip(1)
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim().trim_start_matches('\u{feff}');
            if name.is_empty() {
                format!("column_{}", i + 1)
            } else {
                name.to_string()
            }
        })
        .collect()
}

fn parse_value(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v.abs() < FILL_THRESHOLD => v,
        _ => f64::NAN,
    }
}
