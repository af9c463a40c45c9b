//! Shot log records
//!
//! A shot log is plain text: a header line `version,profile,unix_timestamp`
//! followed by one sample per line. Samples carry eleven comma separated
//! numbers, see [`ShotSample`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::record::{HistoryItem, RecordParser};

const SAMPLE_FIELDS: usize = 11;

/// A single measurement recorded while brewing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotSample {
    /// Milliseconds since the shot started
    pub t: u64,
    pub target_temperature: f64,
    pub current_temperature: f64,
    pub target_pressure: f64,
    pub current_pressure: f64,
    pub pump_flow: f64,
    pub target_flow: f64,
    pub puck_flow: f64,
    pub volumetric_flow: f64,
    pub volume: f64,
    pub estimated_volume: f64,
}

impl ShotSample {
    fn parse_line(line: &str) -> Option<Self> {
        let fields: Vec<f64> = line
            .split(',')
            .map(|f| f.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
            .collect::<Option<_>>()?;
        if fields.len() != SAMPLE_FIELDS || fields[0] < 0.0 {
            return None;
        }

        Some(Self {
            t: fields[0] as u64,
            target_temperature: fields[1],
            current_temperature: fields[2],
            target_pressure: fields[3],
            current_pressure: fields[4],
            pump_flow: fields[5],
            target_flow: fields[6],
            puck_flow: fields[7],
            volumetric_flow: fields[8],
            volume: fields[9],
            estimated_volume: fields[10],
        })
    }
}

/// A parsed shot history entry
#[derive(Debug, Clone, PartialEq)]
pub struct ShotSummary {
    pub id: String,
    pub version: u32,
    pub profile: String,
    pub timestamp: DateTime<Utc>,
    pub samples: Vec<ShotSample>,
}

impl ShotSummary {
    /// Parse a shot log. Returns `None` when the header is unusable;
    /// malformed sample lines are skipped.
    pub fn parse_log(id: impl Into<String>, log: &str) -> Option<Self> {
        let mut lines = log.lines().filter(|l| !l.trim().is_empty());
        let header = lines.next()?;

        // The profile label may itself contain commas
        let (version, rest) = header.split_once(',')?;
        let (profile, timestamp) = rest.rsplit_once(',')?;
        let version = version.trim().parse::<u32>().ok()?;
        let timestamp = DateTime::from_timestamp(timestamp.trim().parse::<i64>().ok()?, 0)?;

        let samples = lines.filter_map(ShotSample::parse_line).collect();

        Some(Self {
            id: id.into(),
            version,
            profile: profile.to_string(),
            timestamp,
            samples,
        })
    }

    /// Elapsed time of the last sample
    pub fn duration_ms(&self) -> u64 {
        self.samples.last().map_or(0, |s| s.t)
    }

    /// Final measured volume, falling back to the estimate when no scale was
    /// connected
    pub fn volume(&self) -> Option<f64> {
        let last = self.samples.last()?;
        if last.volume > 0.0 {
            Some(last.volume)
        } else if last.estimated_volume > 0.0 {
            Some(last.estimated_volume)
        } else {
            None
        }
    }
}

impl fmt::Display for ShotSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}  {}  {}  {:.1}s",
            self.id,
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.profile,
            self.duration_ms() as f64 / 1000.0
        )?;
        if let Some(volume) = self.volume() {
            write!(f, "  {volume:.1}g")?;
        }
        Ok(())
    }
}

impl HistoryItem for ShotSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Default parser for `{"id": .., "history": "<shot log>"}` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShotParser;

impl RecordParser for ShotParser {
    type Item = ShotSummary;

    fn parse(&self, raw: &Value) -> Option<ShotSummary> {
        let id = match raw.get("id")? {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let log = raw.get("history")?.as_str()?;
        ShotSummary::parse_log(id, log)
    }
}
