//! Local bar sources.
//!
//! - `CsvBarSource` reads `<dir>/<SYMBOL>.csv` files with a
//!   `timestamp,open,high,low,close,volume` header.
//! - `SyntheticBarSource` produces a deterministic random walk per symbol,
//!   seeded from the symbol name, for running a scan without any data.
//!
//! Both trim to the requested lookback and refuse histories shorter than
//! `min_bars` with `FetchError::InsufficientData`.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use scanlab_core::domain::Bar;
use scanlab_core::pipeline::MIN_BARS;

use crate::source::{ensure_history, BarSource, FetchError, Lookback};

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Parse CSV content into bars sorted by timestamp.
pub fn parse_csv(symbol: &str, content: &str) -> Result<Vec<Bar>, FetchError> {
    let parse_err = |reason: String| FetchError::Parse {
        symbol: symbol.to_string(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut bars = Vec::new();
    for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| parse_err(e.to_string()))?;
        let timestamp = parse_timestamp(&row.timestamp)
            .ok_or_else(|| parse_err(format!("row {}: bad timestamp {:?}", line + 1, row.timestamp)))?;
        if !row.volume.is_finite() || row.volume < 0.0 {
            return Err(parse_err(format!("row {}: bad volume {}", line + 1, row.volume)));
        }
        bars.push(Bar {
            symbol: symbol.to_string(),
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume.round() as u64,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

/// Keep the bars within `lookback` calendar days of the newest bar.
pub fn trim_to_lookback(mut bars: Vec<Bar>, lookback: Lookback) -> Vec<Bar> {
    if let Some(newest) = bars.last().map(|b| b.timestamp) {
        let cutoff = newest - Duration::days(i64::from(lookback.days));
        bars.retain(|b| b.timestamp >= cutoff);
    }
    bars
}

#[derive(Debug, Clone)]
pub struct CsvBarSource {
    dir: PathBuf,
    min_bars: usize,
}

impl CsvBarSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            min_bars: MIN_BARS,
        }
    }

    pub fn with_min_bars(mut self, min_bars: usize) -> Self {
        self.min_bars = min_bars;
        self
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl BarSource for CsvBarSource {
    async fn fetch(&self, symbol: &str, lookback: Lookback) -> Result<Vec<Bar>, FetchError> {
        let path = self.path_for(symbol);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
            Err(source) => return Err(FetchError::Io { path, source }),
        };
        let bars = trim_to_lookback(parse_csv(symbol, &content)?, lookback);
        ensure_history(symbol, bars, self.min_bars)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Deterministic random-walk bars, one per weekday up to `anchor`.
///
/// These are clearly fake; they exist for demos and tests.
#[derive(Debug, Clone)]
pub struct SyntheticBarSource {
    anchor: NaiveDate,
    min_bars: usize,
}

impl SyntheticBarSource {
    pub fn new(anchor: NaiveDate) -> Self {
        Self {
            anchor,
            min_bars: MIN_BARS,
        }
    }

    pub fn with_min_bars(mut self, min_bars: usize) -> Self {
        self.min_bars = min_bars;
        self
    }

    /// Same symbol and window always yields the same bars.
    pub fn generate(&self, symbol: &str, lookback: Lookback) -> Vec<Bar> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut price: f64 = rng.gen_range(20.0..200.0);
        let mut bars = Vec::new();
        let mut day = self.anchor - Duration::days(i64::from(lookback.days));

        while day <= self.anchor {
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                let daily_return: f64 = rng.gen_range(-0.03..0.03);
                let open = price;
                let close = price * (1.0 + daily_return);
                let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
                let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
                let volume = rng.gen_range(500_000..5_000_000u64);

                if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
                    bars.push(Bar {
                        symbol: symbol.to_string(),
                        timestamp: Utc.from_utc_datetime(&midnight),
                        open,
                        high,
                        low,
                        close,
                        volume,
                    });
                }
                price = close;
            }
            day += Duration::days(1);
        }
        bars
    }
}

#[async_trait]
impl BarSource for SyntheticBarSource {
    async fn fetch(&self, symbol: &str, lookback: Lookback) -> Result<Vec<Bar>, FetchError> {
        ensure_history(symbol, self.generate(symbol, lookback), self.min_bars)
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
    }

    fn csv_with_rows(n: usize) -> String {
        let mut out = String::from("timestamp,open,high,low,close,volume\n");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // written newest first to exercise sorting
        for i in (0..n).rev() {
            let day = start + Duration::days(i as i64);
            let close = 100.0 + i as f64;
            writeln!(out, "{day},{},{},{},{close},{}", close - 0.5, close + 1.0, close - 1.0, 1000 + i)
                .unwrap();
        }
        out
    }

    #[test]
    fn parses_dates_and_rfc3339() {
        assert_eq!(
            parse_timestamp("2024-03-01"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2024-03-01T14:30:00-05:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 19, 30, 0).unwrap())
        );
        assert_eq!(parse_timestamp("03/01/2024"), None);
    }

    #[test]
    fn csv_rows_are_sorted() {
        let bars = parse_csv("AAA", &csv_with_rows(5)).unwrap();
        assert_eq!(bars.len(), 5);
        assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(bars[0].close, 100.0);
        assert_eq!(bars[4].volume, 1004);
    }

    #[test]
    fn bad_rows_are_parse_errors() {
        let content = "timestamp,open,high,low,close,volume\nyesterday,1,2,0.5,1.5,10\n";
        assert!(matches!(
            parse_csv("AAA", content),
            Err(FetchError::Parse { .. })
        ));
        let content = "timestamp,open,high,low,close,volume\n2024-01-02,1,2,0.5,abc,10\n";
        assert!(parse_csv("AAA", content).is_err());
    }

    #[test]
    fn lookback_trims_old_bars() {
        let bars = parse_csv("AAA", &csv_with_rows(100)).unwrap();
        let trimmed = trim_to_lookback(bars, Lookback::days(9));
        assert_eq!(trimmed.len(), 10);
        assert_eq!(trimmed[9].close, 199.0);
    }

    #[tokio::test]
    async fn csv_source_reads_files_and_classifies_failures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("LONG.csv"), csv_with_rows(80)).unwrap();
        std::fs::write(dir.path().join("SHORT.csv"), csv_with_rows(20)).unwrap();
        std::fs::write(dir.path().join("EMPTY.csv"), csv_with_rows(0)).unwrap();

        let source = CsvBarSource::new(dir.path());
        let bars = source.fetch("LONG", Lookback::default()).await.unwrap();
        assert_eq!(bars.len(), 80);
        assert_eq!(bars[0].symbol, "LONG");

        assert!(matches!(
            source.fetch("SHORT", Lookback::default()).await,
            Err(FetchError::InsufficientData {
                required: 50,
                actual: 20,
                ..
            })
        ));
        assert!(matches!(
            source.fetch("EMPTY", Lookback::default()).await,
            Err(FetchError::NoData { .. })
        ));
        assert!(matches!(
            source.fetch("NOPE", Lookback::default()).await,
            Err(FetchError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn synthetic_bars_are_deterministic_weekdays() {
        let source = SyntheticBarSource::new(anchor());
        let a = source.generate("SPY", Lookback::default());
        let b = source.generate("SPY", Lookback::default());
        assert_eq!(a, b);
        assert_ne!(a, source.generate("QQQ", Lookback::default()));

        assert!(a.len() > 250);
        assert!(a
            .iter()
            .all(|bar| !matches!(bar.timestamp.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(a.iter().all(|bar| bar.high >= bar.close && bar.low <= bar.close));
        assert_eq!(a.last().unwrap().timestamp.date_naive(), anchor());
    }

    #[tokio::test]
    async fn synthetic_short_lookback_is_insufficient() {
        let source = SyntheticBarSource::new(anchor());
        assert!(matches!(
            source.fetch("SPY", Lookback::days(30)).await,
            Err(FetchError::InsufficientData { .. })
        ));
        assert!(source.fetch("SPY", Lookback::days(120)).await.is_ok());
    }
}
