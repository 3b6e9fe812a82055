//! Signal log: JSONL append-only record of every signalled symbol.
//!
//! One JSON object per line. Each line is independent, so the format survives
//! partial writes and can be tailed or streamed by an external viewer.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use scanlab_core::domain::{Signal, SignalType};
use scanlab_core::ScoredSnapshot;

/// Sized position as written to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedPosition {
    pub action: SignalType,
    pub shares: u64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub position_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    /// ISO-8601 time the record was produced.
    pub timestamp: String,
    pub symbol: String,
    pub price: f64,
    #[serde(rename = "RSI")]
    pub rsi: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub signals: Vec<Signal>,
    pub position: Option<LoggedPosition>,
}

impl SignalRecord {
    /// Record for a snapshot, or None when it carries no signals.
    pub fn from_snapshot(snapshot: &ScoredSnapshot, now: DateTime<Utc>) -> Option<Self> {
        if snapshot.signals.is_empty() {
            return None;
        }
        Some(Self {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            symbol: snapshot.symbol.clone(),
            price: snapshot.price,
            rsi: snapshot.rsi(),
            volume_ratio: snapshot.volume_ratio(),
            signals: snapshot.signals.clone(),
            position: snapshot.plan.as_ref().map(|p| LoggedPosition {
                action: p.action,
                shares: p.shares,
                stop_loss: p.stop_loss,
                take_profit: p.take_profit,
                position_value: p.position_value,
            }),
        })
    }
}

/// JSONL signal log file.
#[derive(Debug, Clone)]
pub struct SignalLog {
    path: PathBuf,
}

impl SignalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append records, creating the file and its parent directories on demand.
    pub fn append_all(&self, records: &[SignalRecord]) -> io::Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        for record in records {
            let json = serde_json::to_string(record)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(file, "{json}")?;
        }
        file.flush()
    }

    pub fn append(&self, record: &SignalRecord) -> io::Result<()> {
        self.append_all(std::slice::from_ref(record))
    }

    /// Read every record. Blank lines are skipped; a malformed line is an error.
    pub fn read_all(&self) -> io::Result<Vec<SignalRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path)?;
        let reader = io::BufReader::new(file);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            records.push(record);
        }

        Ok(records)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use scanlab_core::domain::SignalStrength;

    fn record(symbol: &str, position: Option<LoggedPosition>) -> SignalRecord {
        SignalRecord {
            timestamp: "2024-06-28T20:00:00Z".into(),
            symbol: symbol.into(),
            price: 50.0,
            rsi: Some(28.5),
            volume_ratio: None,
            signals: vec![Signal::new(
                SignalType::Buy,
                "RSI oversold reversal",
                SignalStrength::Medium,
            )],
            position,
        }
    }

    #[test]
    fn record_schema() {
        let json = serde_json::to_value(record("AAA", None)).unwrap();
        assert_eq!(json["RSI"], 28.5);
        assert!(json["volume_ratio"].is_null());
        assert!(json["position"].is_null());
        assert_eq!(json["signals"][0]["type"], "BUY");
        assert_eq!(json["signals"][0]["strength"], "MEDIUM");
    }

    #[test]
    fn append_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let log = SignalLog::new(dir.path().join("logs/nested/signals.jsonl"));
        assert!(log.read_all().unwrap().is_empty());

        let sized = record(
            "BBB",
            Some(LoggedPosition {
                action: SignalType::Buy,
                shares: 500,
                stop_loss: 46.0,
                take_profit: 58.0,
                position_value: 25_000.0,
            }),
        );
        log.append(&record("AAA", None)).unwrap();
        log.append_all(&[sized.clone()]).unwrap();

        let back = log.read_all().unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].symbol, "AAA");
        assert_eq!(back[1], sized);
    }

    #[test]
    fn blank_lines_skipped_malformed_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signals.jsonl");
        let line = serde_json::to_string(&record("AAA", None)).unwrap();
        fs::write(&path, format!("{line}\n\n   \n{line}\n")).unwrap();
        assert_eq!(SignalLog::new(&path).read_all().unwrap().len(), 2);

        fs::write(&path, "{not json}\n").unwrap();
        assert_eq!(
            SignalLog::new(&path).read_all().unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );
    }

    #[test]
    fn timestamp_is_iso8601() {
        let now = Utc.with_ymd_and_hms(2024, 6, 28, 20, 0, 0).unwrap();
        assert_eq!(
            now.to_rfc3339_opts(SecondsFormat::Secs, true),
            "2024-06-28T20:00:00Z"
        );
    }
}
