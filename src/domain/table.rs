//! Time-indexed table of numeric columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HelioError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Rows indexed by UTC timestamp, columns are named `f64` series.
///
/// Invariant: every column has exactly `times.len()` values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct TimeSeriesTable {
    times: Vec<DateTime<Utc>>,
    columns: Vec<Column>,
}

/// Serialized form, checked column by column on the way in.
#[derive(Deserialize)]
struct RawTable {
    times: Vec<DateTime<Utc>>,
    columns: Vec<Column>,
}

impl TryFrom<RawTable> for TimeSeriesTable {
    type Error = HelioError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        let mut table = TimeSeriesTable::new(raw.times);
        for col in raw.columns {
            if table.column(&col.name).is_some() {
                return Err(HelioError::validation(format!("duplicate column '{}'", col.name)));
            }
            table.push_column(col.name, col.values)?;
        }
        Ok(table)
    }
}

impl TimeSeriesTable {
    pub fn new(times: Vec<DateTime<Utc>>) -> Self {
        Self {
            times,
            columns: Vec::new(),
        }
    }

    /// Builder form of [`TimeSeriesTable::push_column`].
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self, HelioError> {
        self.push_column(name, values)?;
        Ok(self)
    }

    /// Add a column, replacing any existing column of the same name.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), HelioError> {
        let name = name.into();
        if values.len() != self.times.len() {
            return Err(HelioError::validation(format!(
                "column '{name}' has {} values but the table has {} rows",
                values.len(),
                self.times.len()
            )));
        }
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column { name, values }),
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Stable sort of all rows by timestamp.
    pub fn sort_by_time(&mut self) {
        if self.times.windows(2).all(|w| w[0] <= w[1]) {
            return;
        }
        let mut order: Vec<usize> = (0..self.times.len()).collect();
        order.sort_by_key(|&i| self.times[i]);

        self.times = order.iter().map(|&i| self.times[i]).collect();
        for col in &mut self.columns {
            col.values = order.iter().map(|&i| col.values[i]).collect();
        }
    }

    /// Concatenate tables row-wise and order the result by time.
    ///
    /// Columns are matched by name; a table lacking a column contributes NaN
    /// for its rows. Column order follows first appearance.
    pub fn concat(tables: impl IntoIterator<Item = TimeSeriesTable>) -> Self {
        let mut out = TimeSeriesTable::default();
        for table in tables {
            let offset = out.times.len();
            let added = table.times.len();
            out.times.extend(table.times);

            for col in &mut out.columns {
                col.values.resize(offset + added, f64::NAN);
            }
            for col in table.columns {
                match out.columns.iter_mut().find(|c| c.name == col.name) {
                    Some(existing) => {
                        existing.values[offset..offset + added].copy_from_slice(&col.values);
                    }
                    None => {
                        let mut values = vec![f64::NAN; offset];
                        values.extend(col.values);
                        out.columns.push(Column {
                            name: col.name,
                            values,
                        });
                    }
                }
            }
        }
        out.sort_by_time();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = TimeSeriesTable::new(vec![t(0), t(1)])
            .with_column("B_R", vec![1.0])
            .unwrap_err();
        assert!(matches!(err, HelioError::Validation(_)));
    }

    #[test]
    fn push_replaces_same_name() {
        let table = TimeSeriesTable::new(vec![t(0)])
            .with_column("Distance", vec![0.3])
            .unwrap()
            .with_column("Distance", vec![0.4])
            .unwrap();
        assert_eq!(table.columns().len(), 1);
        assert_eq!(table.column("Distance").unwrap(), &[0.4]);
    }

    #[test]
    fn concat_orders_rows_and_fills_missing_columns() {
        let late = TimeSeriesTable::new(vec![t(2), t(3)])
            .with_column("B_R", vec![2.0, 3.0])
            .unwrap();
        let early = TimeSeriesTable::new(vec![t(0), t(1)])
            .with_column("B_R", vec![0.0, 1.0])
            .unwrap()
            .with_column("B_T", vec![10.0, 11.0])
            .unwrap();

        let merged = TimeSeriesTable::concat(vec![late, early]);
        assert_eq!(merged.times(), &[t(0), t(1), t(2), t(3)]);
        assert_eq!(merged.column("B_R").unwrap(), &[0.0, 1.0, 2.0, 3.0]);

        let bt = merged.column("B_T").unwrap();
        assert_eq!(&bt[..2], &[10.0, 11.0]);
        assert!(bt[2].is_nan() && bt[3].is_nan());
        assert_eq!(merged.column_names().collect::<Vec<_>>(), vec!["B_R", "B_T"]);
    }

    #[test]
    fn deserialize_checks_column_lengths() {
        let ragged = r#"{
            "times": ["2021-01-01T00:00:00Z", "2021-01-01T01:00:00Z"],
            "columns": [
                {"name": "Distance", "values": [0.1, 0.2]},
                {"name": "V", "values": [1.0]}
            ]
        }"#;
        let err = serde_json::from_str::<TimeSeriesTable>(ragged).unwrap_err();
        assert!(err.to_string().contains("column 'V'"), "{err}");

        let table = TimeSeriesTable::new(vec![t(0), t(1)])
            .with_column("Distance", vec![0.1, 0.2])
            .unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(serde_json::from_str::<TimeSeriesTable>(&json).unwrap(), table);
    }

    #[test]
    fn sort_is_stable_for_equal_timestamps() {
        let mut table = TimeSeriesTable::new(vec![t(1), t(0), t(1)])
            .with_column("x", vec![1.0, 0.0, 2.0])
            .unwrap();
        table.sort_by_time();
        assert_eq!(table.column("x").unwrap(), &[0.0, 1.0, 2.0]);
    }
}
