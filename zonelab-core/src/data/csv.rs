//! CSV directory candle source.
//!
//! One file per instrument and granularity, named `<INSTRUMENT>_<GRANULARITY>.csv`
//! (`EUR_USD_H1.csv`), with header `timestamp,open,high,low,close,volume`.
//! Timestamps are RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` (all UTC) or
//! unix seconds. The volume column may be missing or empty.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::source::{CandleSource, SourceError};
use crate::domain::{normalize_instrument, Candle, Granularity};

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

/// Parse the timestamp formats the directory format accepts.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return Utc.timestamp_opt(secs, 0).single();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Reads candles from a directory of CSV files.
#[derive(Debug, Clone)]
pub struct CsvCandleSource {
    dir: PathBuf,
}

impl CsvCandleSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, instrument: &str, granularity: Granularity) -> PathBuf {
        self.dir
            .join(format!("{}_{}.csv", normalize_instrument(instrument), granularity))
    }

    /// Instruments with at least one well-named file in the directory.
    pub fn instruments(&self) -> Result<Vec<String>, SourceError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| SourceError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;
        let mut found = BTreeSet::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some((instrument, granularity)) = stem.rsplit_once('_') {
                if !instrument.is_empty() && granularity.parse::<Granularity>().is_ok() {
                    found.insert(instrument.to_string());
                }
            }
        }
        Ok(found.into_iter().collect())
    }

    fn read_file(&self, path: &Path) -> Result<Vec<Candle>, SourceError> {
        let display = path.display().to_string();
        let mut reader = ::csv::ReaderBuilder::new()
            .trim(::csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| SourceError::Other(format!("{display}: {e}")))?;

        let mut candles = Vec::new();
        for (i, record) in reader.deserialize::<CsvRow>().enumerate() {
            // Header is line 1.
            let row = i + 2;
            let record = record.map_err(|e| SourceError::Parse {
                path: display.clone(),
                row,
                reason: e.to_string(),
            })?;
            let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| SourceError::Parse {
                path: display.clone(),
                row,
                reason: format!("unrecognised timestamp '{}'", record.timestamp),
            })?;
            candles.push(Candle::new(
                timestamp,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume.unwrap_or(0.0),
            ));
        }
        Ok(candles)
    }
}

impl CandleSource for CsvCandleSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        instrument: &str,
        granularity: Granularity,
        count: usize,
    ) -> Result<Vec<Candle>, SourceError> {
        let path = self.path_for(instrument, granularity);
        if !path.is_file() {
            return Err(SourceError::NotFound {
                instrument: normalize_instrument(instrument),
                granularity,
            });
        }
        let mut candles = self.read_file(&path)?;
        if candles.is_empty() {
            return Err(SourceError::Empty {
                instrument: normalize_instrument(instrument),
                granularity,
            });
        }
        let start = candles.len().saturating_sub(count);
        Ok(candles.split_off(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_data_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("zonelab_csv_test_{}_{id}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-02T00:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02T02:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02 00:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02"), Some(expected));
        assert_eq!(parse_timestamp("1704153600"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn reads_last_count_rows() {
        let dir = temp_data_dir();
        fs::write(
            dir.join("EUR_USD_H1.csv"),
            "timestamp,open,high,low,close,volume\n\
             2024-01-02T00:00:00Z,1.1000,1.1010,1.0990,1.1005,120\n\
             2024-01-02T01:00:00Z,1.1005,1.1020,1.1000,1.1015,130\n\
             1704160800,1.1015,1.1030,1.1010,1.1025,\n",
        )
        .unwrap();
        let source = CsvCandleSource::new(&dir);
        let candles = source.fetch("eur_usd", Granularity::H1, 2).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 1.1015);
        assert_eq!(candles[1].volume, 0.0);
        assert_eq!(candles[1].timestamp, Utc.with_ymd_and_hms(2024, 1, 2, 2, 0, 0).unwrap());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = temp_data_dir();
        let source = CsvCandleSource::new(&dir);
        assert!(matches!(
            source.fetch("EUR_USD", Granularity::D, 10),
            Err(SourceError::NotFound { .. })
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn bad_row_reports_line() {
        let dir = temp_data_dir();
        fs::write(
            dir.join("EUR_USD_D.csv"),
            "timestamp,open,high,low,close,volume\n\
             2024-01-02,1.1,1.2,1.0,1.15,10\n\
             2024-01-03,abc,1.2,1.0,1.15,10\n",
        )
        .unwrap();
        let err = CsvCandleSource::new(&dir)
            .fetch("EUR_USD", Granularity::D, 10)
            .unwrap_err();
        assert!(matches!(err, SourceError::Parse { row: 3, .. }), "{err}");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn header_only_is_empty() {
        let dir = temp_data_dir();
        fs::write(dir.join("EUR_USD_H4.csv"), "timestamp,open,high,low,close,volume\n").unwrap();
        assert!(matches!(
            CsvCandleSource::new(&dir).fetch("EUR_USD", Granularity::H4, 10),
            Err(SourceError::Empty { .. })
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn lists_instruments_from_file_names() {
        let dir = temp_data_dir();
        for name in ["EUR_USD_H1.csv", "EUR_USD_D.csv", "USD_JPY_H4.csv", "notes.txt", "README_X.csv"] {
            fs::write(dir.join(name), "timestamp,open,high,low,close,volume\n").unwrap();
        }
        let instruments = CsvCandleSource::new(&dir).instruments().unwrap();
        assert_eq!(instruments, vec!["EUR_USD".to_string(), "USD_JPY".to_string()]);
        let _ = fs::remove_dir_all(&dir);
    }
}
