//! Flexible timestamp parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::HelioError;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%Y-%jT%H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y-%j"];

/// Parse a timestamp written in any of the usual archive/notebook forms.
///
/// Naive inputs are taken as UTC. Accepted: RFC 3339, ISO date or
/// date-time (`T` or space separated, optional `Z`), slash dates, compact
/// `YYYYMMDD[THHMMSS]` and day-of-year `YYYY-DOY`.
pub fn parse_time(raw: &str) -> Result<DateTime<Utc>, HelioError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(HelioError::validation("empty timestamp"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = s.strip_suffix('Z').unwrap_or(s);
    let expanded = expand_compact(naive);
    let naive = expanded.as_deref().unwrap_or(naive);

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Ok(dt.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(naive, fmt) {
            return Ok(d.and_time(NaiveTime::MIN).and_utc());
        }
    }

    Err(HelioError::validation(format!("unrecognised timestamp '{raw}'")))
}

/// Rewrite `YYYYMMDD` / `YYYYMMDDTHHMMSS` into ISO form.
fn expand_compact(s: &str) -> Option<String> {
    let (date, time) = match s.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (s, None),
    };
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let iso_date = format!("{}-{}-{}", &date[0..4], &date[4..6], &date[6..8]);
    match time {
        None => Some(iso_date),
        Some(t) if t.len() == 6 && t.bytes().all(|b| b.is_ascii_digit()) => Some(format!(
            "{iso_date}T{}:{}:{}",
            &t[0..2],
            &t[2..4],
            &t[4..6]
        )),
        Some(_) => None,
    }
}

/// CDAWeb REST form: `YYYYMMDDTHHMMSSZ`.
pub fn format_cdaweb(t: DateTime<Utc>) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn accepts_common_forms() {
        let expected = utc(2021, 4, 29, 12, 30, 0);
        for raw in [
            "2021-04-29T12:30:00",
            "2021-04-29 12:30:00",
            "2021-04-29 12:30",
            "2021-04-29T12:30:00Z",
            "2021-04-29T12:30:00+00:00",
            "2021/04/29 12:30:00",
            "20210429T123000",
            "20210429T123000Z",
        ] {
            assert_eq!(parse_time(raw).unwrap(), expected, "input {raw}");
        }
    }

    #[test]
    fn dates_are_midnight_utc() {
        let expected = utc(2020, 5, 2, 0, 0, 0);
        assert_eq!(parse_time("2020-05-02").unwrap(), expected);
        assert_eq!(parse_time("2020/05/02").unwrap(), expected);
        assert_eq!(parse_time("20200502").unwrap(), expected);
        assert_eq!(parse_time("2020-123").unwrap(), expected);
    }

    #[test]
    fn fractional_seconds_and_offsets() {
        let t = parse_time("2021-04-29T12:30:00.250").unwrap();
        assert_eq!(t.timestamp_subsec_millis(), 250);
        let t = parse_time("2021-04-29T14:30:00+02:00").unwrap();
        assert_eq!(t, utc(2021, 4, 29, 12, 30, 0));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_time(""), Err(HelioError::Validation(_))));
        assert!(matches!(parse_time("yesterday"), Err(HelioError::Validation(_))));
        assert!(parse_time("2021-13-01").is_err());
    }

    #[test]
    fn cdaweb_format() {
        assert_eq!(format_cdaweb(utc(2021, 4, 29, 1, 2, 3)), "20210429T010203Z");
    }
}
