//! Recorded click sequence and its one-record-per-line text encoding

use autoclick_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker of an interval line: `延迟:<millis>`
pub const INTERVAL_MARK: &str = "延迟";
/// Marker of a position line: `坐标:<x>:<y>`
pub const POSITION_MARK: &str = "坐标";

const SEPARATOR: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One line of a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Position(Point),
    /// Wait between the previous position and the next one
    Interval(i64),
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Position(p) => write!(f, "{POSITION_MARK}{SEPARATOR}{}{SEPARATOR}{}", p.x, p.y),
            Record::Interval(ms) => write!(f, "{INTERVAL_MARK}{SEPARATOR}{ms}"),
        }
    }
}

impl Record {
    /// Parse one non-blank line. `line_no` is 1-based and only used for errors.
    ///
    /// Any line not tagged with the interval marker is read as a position.
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let mut fields = line.split(SEPARATOR);
        let mark = fields.next().unwrap_or_default();

        if mark == INTERVAL_MARK {
            let ms = int_field(fields.next(), "interval", line, line_no)?;
            return Ok(Record::Interval(ms));
        }

        let x = int_field(fields.next(), "x", line, line_no)?;
        let y = int_field(fields.next(), "y", line, line_no)?;
        Ok(Record::Position(Point::new(x, y)))
    }
}

fn int_field<T: std::str::FromStr>(
    field: Option<&str>,
    name: &str,
    line: &str,
    line_no: usize,
) -> Result<T> {
    let field = field.ok_or_else(|| Error::format(line_no, line, &format!("missing {name}")))?;
    field
        .trim()
        .parse()
        .map_err(|_| Error::format(line_no, line, &format!("{name} is not an integer")))
}

/// Positions in replay order plus the waits between them.
///
/// `intervals[i]` is the wait that follows `positions[i]`; it may be shorter
/// than `positions`, the missing tail falls back to the replay minimum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedSequence {
    pub positions: Vec<Point>,
    pub intervals: Vec<i64>,
}

impl RecordedSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        match record {
            Record::Position(p) => self.positions.push(p),
            Record::Interval(ms) => self.intervals.push(ms),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Wait after step `index`, never negative
    pub fn wait_after(&self, index: usize, default_ms: i64) -> i64 {
        self.intervals
            .get(index)
            .copied()
            .unwrap_or(default_ms)
            .max(0)
    }

    /// Sum of the recorded waits, negatives counted as 0, saturating
    pub fn total_wait_ms(&self) -> i64 {
        self.intervals
            .iter()
            .fold(0i64, |total, ms| total.saturating_add((*ms).max(0)))
    }

    /// Records in file order: every interval precedes the position it leads to
    pub fn records(&self) -> Vec<Record> {
        let mut out = Vec::with_capacity(self.positions.len() + self.intervals.len());
        for (i, p) in self.positions.iter().enumerate() {
            if i > 0 {
                if let Some(ms) = self.intervals.get(i - 1) {
                    out.push(Record::Interval(*ms));
                }
            }
            out.push(Record::Position(*p));
        }
        // intervals with no following position still belong to the file
        let trailing = self.intervals.len().saturating_sub(self.positions.len().saturating_sub(1));
        for ms in &self.intervals[self.intervals.len() - trailing..] {
            out.push(Record::Interval(*ms));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoclick_core::ErrorCode;

    #[test]
    fn encodes_markers() {
        assert_eq!(Record::Position(Point::new(10, -20)).to_string(), "坐标:10:-20");
        assert_eq!(Record::Interval(700).to_string(), "延迟:700");
    }

    #[test]
    fn parses_both_line_kinds() {
        assert_eq!(Record::parse("坐标:10:20", 1).unwrap(), Record::Position(Point::new(10, 20)));
        assert_eq!(Record::parse("延迟:700", 2).unwrap(), Record::Interval(700));
    }

    #[test]
    fn unknown_marker_reads_as_position() {
        assert_eq!(Record::parse("pos:1:2", 1).unwrap(), Record::Position(Point::new(1, 2)));
    }

    #[test]
    fn rejects_non_integer_fields() {
        let e = Record::parse("坐标:ten:20", 4).unwrap_err();
        assert_eq!(e.code, ErrorCode::FormatError);
        assert!(e.message.contains("line 4"));

        assert_eq!(Record::parse("延迟:soon", 1).unwrap_err().code, ErrorCode::FormatError);
        assert_eq!(Record::parse("坐标:10", 1).unwrap_err().code, ErrorCode::FormatError);
    }

    #[test]
    fn wait_falls_back_to_default() {
        let seq = RecordedSequence {
            positions: vec![Point::new(10, 20), Point::new(30, 40)],
            intervals: vec![700],
        };
        assert_eq!(seq.wait_after(0, 500), 700);
        assert_eq!(seq.wait_after(1, 500), 500);
    }

    #[test]
    fn negative_waits_clamp_to_zero() {
        let seq = RecordedSequence { positions: vec![Point::new(0, 0)], intervals: vec![-5] };
        assert_eq!(seq.wait_after(0, 500), 0);
        assert_eq!(seq.wait_after(3, -1), 0);
    }

    #[test]
    fn total_wait_saturates_on_huge_intervals() {
        let seq = RecordedSequence {
            positions: vec![Point::new(0, 0)],
            intervals: vec![i64::MAX, 1, -7],
        };
        assert_eq!(seq.total_wait_ms(), i64::MAX);

        let seq = RecordedSequence { positions: vec![], intervals: vec![700, -5, 300] };
        assert_eq!(seq.total_wait_ms(), 1_000);
    }

    #[test]
    fn records_interleave_intervals_between_positions() {
        let seq = RecordedSequence {
            positions: vec![Point::new(1, 1), Point::new(2, 2), Point::new(3, 3)],
            intervals: vec![600, 800],
        };
        let lines: Vec<String> = seq.records().iter().map(ToString::to_string).collect();
        assert_eq!(lines, ["坐标:1:1", "延迟:600", "坐标:2:2", "延迟:800", "坐标:3:3"]);
    }
}
