//! Daily cycle counts kept in a small CSV file, and the weekly totals derived from it.

use std::{
    fs::{File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::Path,
};

use chrono::NaiveDate;
use thiserror::Error;

use crate::boiler::LoadStatusData;

pub const HEADER: &str = "Date,Total,Load 1,Load 2,Load 3,Load 4";

/// Number of columns summed per day: the boiler total, then loads 1-4.
pub const COLUMNS: usize = 5;

const DAYS_PER_WEEK: usize = 7;

#[derive(Error, Debug)]
pub enum CyclesError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected 5 counts after the date")]
    MissingColumns { line: usize },

    #[error("line {line}: invalid cycle count {value:?}")]
    InvalidCount { line: usize, value: String },
}

/// One row of the daily CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCycles {
    pub date: String,
    /// Total boiler cycles followed by cycles of loads 1-4
    pub counts: [i64; COLUMNS],
}

impl DailyCycles {
    /// Builds the row for `date` from the boiler total and the configured loads.
    /// Loads that aren't configured are recorded as 0.
    pub fn new(date: NaiveDate, total: i32, loads: &[LoadStatusData]) -> Self {
        let mut counts = [0; COLUMNS];
        counts[0] = total as i64;
        for (count, load) in counts[1..].iter_mut().zip(loads) {
            *count = load.cycles as i64;
        }

        Self {
            date: date.format("%Y-%m-%d").to_string(),
            counts,
        }
    }

    pub fn to_csv_line(&self) -> String {
        let mut line = self.date.clone();
        for count in self.counts {
            line.push(',');
            line.push_str(&count.to_string());
        }
        line
    }

    fn parse(line_no: usize, line: &str) -> Result<Self, CyclesError> {
        let mut parts = line.split(',');
        let date = parts.next().unwrap_or_default().to_string();

        let mut counts = [0; COLUMNS];
        for count in counts.iter_mut() {
            let value = parts
                .next()
                .ok_or(CyclesError::MissingColumns { line: line_no })?
                .trim();
            *count = value.parse().map_err(|_| CyclesError::InvalidCount {
                line: line_no,
                value: value.to_string(),
            })?;
        }

        Ok(Self { date, counts })
    }
}

/// Reads all rows of a daily CSV, skipping the header and blank lines.
pub fn read_rows(reader: impl BufRead) -> Result<Vec<DailyCycles>, CyclesError> {
    let mut rows = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with("Date") {
            continue;
        }
        rows.push(DailyCycles::parse(i + 1, &line)?);
    }
    Ok(rows)
}

/// Creates the file if needed, without touching its contents.
pub fn touch(path: &Path) -> Result<(), CyclesError> {
    OpenOptions::new().append(true).create(true).open(path)?;
    Ok(())
}

/// Appends `row`, writing the header first when the file is empty.
pub fn append(path: &Path, row: &DailyCycles) -> Result<(), CyclesError> {
    let mut f = OpenOptions::new().append(true).create(true).open(path)?;
    if f.metadata()?.len() == 0 {
        writeln!(f, "{}", HEADER)?;
    }
    writeln!(f, "{}", row.to_csv_line())?;
    Ok(())
}

/// Cycle totals of the last week compared to the week before.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeeklySummary {
    pub days: Vec<DailyCycles>,
    pub current: [i64; COLUMNS],
    pub last: [i64; COLUMNS],
    pub delta: [i64; COLUMNS],
}

impl WeeklySummary {
    /// The last seven rows make up the current week, the seven before them the last week.
    pub fn from_rows(rows: &[DailyCycles]) -> Self {
        let split = rows.len().saturating_sub(DAYS_PER_WEEK);
        let (earlier, this_week) = rows.split_at(split);
        let last_week = &earlier[earlier.len().saturating_sub(DAYS_PER_WEEK)..];

        let current = totals(this_week);
        let last = totals(last_week);
        let mut delta = [0; COLUMNS];
        for (i, d) in delta.iter_mut().enumerate() {
            *d = current[i] - last[i];
        }

        Self {
            days: this_week.to_vec(),
            current,
            last,
            delta,
        }
    }

    pub fn load(path: &Path) -> Result<Self, CyclesError> {
        let rows = read_rows(BufReader::new(File::open(path)?))?;
        Ok(Self::from_rows(&rows))
    }
}

fn totals(rows: &[DailyCycles]) -> [i64; COLUMNS] {
    let mut sum = [0; COLUMNS];
    for row in rows {
        for (s, count) in sum.iter_mut().zip(row.counts) {
            *s += count;
        }
    }
    sum
}
