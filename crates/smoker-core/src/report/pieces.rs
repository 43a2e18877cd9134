use core::fmt::Write;

use heapless::String;

use super::Snapshot;
use crate::clock::EpochTime;
use crate::storage::{Iter, Measurement};

/// Longest formatted line: one table row with two extreme `f32` values.
pub const LINE_CAPACITY: usize = 192;

/// A single formatted line, at most one record row.
pub type Line = String<LINE_CAPACITY>;

pub(crate) const NO_DATA: &str = "No data logged yet.<BR>";
const NO_DATA_TIME: &str = "no data yet";

const TABLE_OPEN: &str = "<style>table, th, td {border: 2px solid black; border-collapse: collapse;} th, td {padding: 5px;} th {text-align: left;}</style>\
<table style=\"width:100%\"><tr><th>Time / UTC</th><th>T &deg;F</th><th>Set &deg;F</th></tr>";
const TABLE_CLOSE: &str = "</table>";

/// Building blocks of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Part {
    Text(&'static str),
    /// `temp,setP` script variables for the dashboard gauges
    GaugeValues,
    /// Timestamp of the newest record
    LatestTime,
    /// Sampling interval in milliseconds
    Interval,
    /// Full history as an HTML table, newest first
    TableRows,
    /// Full history as chart data rows, oldest first
    ChartRows,
    Footer,
}

pub(crate) const TABLE_REPORT: &[Part] = &[Part::TableRows];
pub(crate) const CHART_REPORT: &[Part] = &[Part::ChartRows];

/// One unit of page output: borrowed text or a formatted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    Text(&'a str),
    Line(Line),
}

impl Piece<'_> {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Line(line) => line.as_bytes(),
        }
    }
}

/// Progress through a record section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Enter,
    Rows,
    Close,
}

/// Cursor yielding the pieces of a page one at a time
///
/// Only the current piece is ever materialized; record rows are formatted on
/// demand straight from the store.
pub struct Pieces<'a> {
    parts: &'static [Part],
    snapshot: &'a Snapshot<'a>,
    part: usize,
    section: Section,
    rows: Option<Iter<'a>>,
}

impl<'a> Pieces<'a> {
    pub(crate) fn new(parts: &'static [Part], snapshot: &'a Snapshot<'a>) -> Self {
        Self {
            parts,
            snapshot,
            part: 0,
            section: Section::Enter,
            rows: None,
        }
    }

    fn advance(&mut self) {
        self.part += 1;
        self.section = Section::Enter;
        self.rows = None;
    }

    fn table_rows(&mut self) -> Option<Piece<'a>> {
        let set_point = self.snapshot.readings().set_point;
        loop {
            match self.section {
                Section::Enter => {
                    let store = self.snapshot.store();
                    if store.is_empty() {
                        self.advance();
                        return Some(Piece::Text(NO_DATA));
                    }
                    self.rows = Some(store.iter());
                    self.section = Section::Rows;
                    return Some(Piece::Text(TABLE_OPEN));
                }
                Section::Rows => match self.rows.as_mut().and_then(|rows| rows.next_back()) {
                    Some(m) => return Some(Piece::Line(table_row(m, set_point))),
                    None => self.section = Section::Close,
                },
                Section::Close => {
                    self.advance();
                    return Some(Piece::Text(TABLE_CLOSE));
                }
            }
        }
    }

    fn chart_rows(&mut self) -> Option<Piece<'a>> {
        let set_point = self.snapshot.readings().set_point;
        if self.section == Section::Enter {
            self.rows = Some(self.snapshot.store().iter());
            self.section = Section::Rows;
        }
        match self.rows.as_mut().and_then(|rows| rows.next()) {
            Some(m) => Some(Piece::Line(chart_row(m, set_point))),
            None => {
                self.advance();
                None
            }
        }
    }

    fn gauge_values(&self) -> Line {
        let readings = self.snapshot.readings();
        let temperature = self
            .snapshot
            .store()
            .latest()
            .map_or(readings.temperature, |m| m.value);
        let mut line = Line::new();
        let _ = write!(line, "{:.2},setP={:.2};\n", temperature, readings.set_point);
        line
    }

    fn latest_time(&self) -> Piece<'a> {
        match self.snapshot.store().latest() {
            Some(m) => {
                let mut line = Line::new();
                let _ = write!(line, "{} UTC", EpochTime(m.timestamp));
                Piece::Line(line)
            }
            None => Piece::Text(NO_DATA_TIME),
        }
    }

    fn interval(&self) -> Line {
        let mut line = Line::new();
        let _ = write!(line, "{}", self.snapshot.store().interval_ms());
        line
    }
}

impl<'a> Iterator for Pieces<'a> {
    type Item = Piece<'a>;

    fn next(&mut self) -> Option<Piece<'a>> {
        loop {
            let part = *self.parts.get(self.part)?;
            let piece = match part {
                Part::Text(text) => Piece::Text(text),
                Part::GaugeValues => Piece::Line(self.gauge_values()),
                Part::LatestTime => self.latest_time(),
                Part::Interval => Piece::Line(self.interval()),
                Part::Footer => Piece::Text(self.snapshot.footer()),
                Part::TableRows => match self.table_rows() {
                    Some(piece) => return Some(piece),
                    None => continue,
                },
                Part::ChartRows => match self.chart_rows() {
                    Some(piece) => return Some(piece),
                    None => continue,
                },
            };
            self.advance();
            return Some(piece);
        }
    }
}

fn table_row(m: &Measurement, set_point: f32) -> Line {
    let mut line = Line::new();
    let _ = write!(
        line,
        "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td></tr>",
        EpochTime(m.timestamp),
        m.value,
        set_point
    );
    line
}

fn chart_row(m: &Measurement, set_point: f32) -> Line {
    let mut line = Line::new();
    let _ = write!(
        line,
        "['{}',{:.2},{:.2}],\n",
        EpochTime(m.timestamp),
        m.value,
        set_point
    );
    line
}
