//! Measure-then-stream rendering of the web pages
//!
//! A response must announce its exact `Content-Length` before the first body
//! byte, yet the table and chart pages grow with the history and do not fit
//! in RAM. Every page is therefore generated twice from the same frozen
//! [`Snapshot`]: once only counting bytes, once writing them out in chunks of
//! at most [`CHUNK_SIZE`] bytes. Both passes run the same [`Chunks`] cursor,
//! so the two results cannot disagree.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let snapshot = Snapshot::new(&store, readings, counters, free_heap);
//! let length = Report::Table.measure(&snapshot);
//! let written = Report::Table.emit(&snapshot, &mut socket)?;
//! assert_eq!(length, written);
//! ```

mod chunks;
mod footer;
pub(crate) mod pages;
mod pieces;

pub use chunks::{CHUNK_SIZE, Chunk, Chunks};
pub use footer::{FOOTER_CAPACITY, Footer};
pub use pages::Page;
pub use pieces::{LINE_CAPACITY, Line, Piece, Pieces};

use embedded_io::{Error as _, ErrorKind, Write};
use thiserror_no_std::Error;

use crate::http::Counters;
use crate::logger::Readings;
use crate::storage::MeasurementStore;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitError {
    #[error("transport write failed: {0:?}")]
    Write(ErrorKind),
}

/// Frozen view of everything a page renders
///
/// Holding a shared borrow of the store guarantees that no measurement can
/// be recorded between the measure and the emit pass. Counters and the free
/// heap figure are rendered into the footer once, at construction.
pub struct Snapshot<'a> {
    store: &'a MeasurementStore,
    readings: Readings,
    footer: Footer,
}

impl<'a> Snapshot<'a> {
    pub fn new(
        store: &'a MeasurementStore,
        readings: Readings,
        counters: Counters,
        free_memory: usize,
    ) -> Self {
        Self {
            store,
            readings,
            footer: Footer::render(counters, free_memory, store.capacity()),
        }
    }

    pub fn store(&self) -> &'a MeasurementStore {
        self.store
    }

    pub fn readings(&self) -> Readings {
        self.readings
    }

    pub fn footer(&self) -> &str {
        self.footer.as_str()
    }
}

/// The two history reports that are streamed rather than built in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// HTML table, newest record first
    Table,
    /// Chart data rows, oldest record first
    ChartList,
}

impl Report {
    pub fn chunks<'a>(self, snapshot: &'a Snapshot<'a>) -> Chunks<'a> {
        let parts = match self {
            Self::Table => pieces::TABLE_REPORT,
            Self::ChartList => pieces::CHART_REPORT,
        };
        Chunks::new(Pieces::new(parts, snapshot))
    }

    /// Byte length of the report without producing any output.
    pub fn measure(self, snapshot: &Snapshot<'_>) -> usize {
        measure(self.chunks(snapshot))
    }

    /// Write the report to `sink`, returning the number of bytes written.
    pub fn emit<W: Write>(self, snapshot: &Snapshot<'_>, sink: &mut W) -> Result<usize, EmitError> {
        emit(self.chunks(snapshot), sink)
    }
}

/// Measure pass: total length of every chunk.
pub fn measure(chunks: Chunks<'_>) -> usize {
    chunks.map(|chunk| chunk.len()).sum()
}

/// Emit pass: write every chunk to a blocking sink.
pub fn emit<W: Write>(chunks: Chunks<'_>, sink: &mut W) -> Result<usize, EmitError> {
    let mut written = 0;
    for chunk in chunks {
        sink.write_all(&chunk)
            .map_err(|e| EmitError::Write(e.kind()))?;
        written += chunk.len();
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ClockReconciler, EpochTime};
    use crate::test_support::{VecSink, filled_store};

    const READINGS: Readings = Readings::new(225.0, 230.5);

    fn snapshot(store: &MeasurementStore) -> Snapshot<'_> {
        Snapshot::new(store, READINGS, Counters::default(), 40_000)
    }

    fn emitted(report: Report, store: &MeasurementStore) -> String {
        let mut sink = VecSink::default();
        let written = report.emit(&snapshot(store), &mut sink).unwrap();
        assert_eq!(written, sink.bytes.len());
        String::from_utf8(sink.bytes).unwrap()
    }

    #[test]
    fn test_measure_equals_emit_at_boundaries() {
        const C: usize = 300;
        for n in [0, 1, C - 1, C, C + 1] {
            let store = filled_store(C, n);
            let snapshot = snapshot(&store);
            for report in [Report::Table, Report::ChartList] {
                let mut sink = VecSink::default();
                let written = report.emit(&snapshot, &mut sink).unwrap();

                assert_eq!(
                    report.measure(&snapshot),
                    written,
                    "{:?} with {} records",
                    report,
                    n
                );
                assert_eq!(written, sink.bytes.len());
            }
        }
    }

    #[test]
    fn test_large_report_spans_many_chunks() {
        let store = filled_store(300, 300);
        let snapshot = snapshot(&store);

        let chunks: Vec<Chunk> = Report::Table.chunks(&snapshot).collect();
        assert!(chunks.len() > 10);
        assert!(chunks.iter().all(|c| c.len() <= CHUNK_SIZE));
        assert!(
            chunks[..chunks.len() - 1].iter().all(|c| c.len() == CHUNK_SIZE),
            "only the last chunk may be short"
        );
    }

    #[test]
    fn test_table_lists_newest_first() {
        let store = filled_store(4, 6);
        let html = emitted(Report::Table, &store);

        let positions: Vec<usize> = store
            .iter()
            .map(|m| html.find(&format!("<td>{}</td>", EpochTime(m.timestamp))).unwrap())
            .collect();
        assert!(
            positions.windows(2).all(|w| w[0] > w[1]),
            "timestamps must decrease down the table"
        );
        assert!(html.starts_with("<style>"));
        assert!(html.ends_with("</table>"));
        assert_eq!(html.matches("<tr><td>").count(), 4);
    }

    #[test]
    fn test_chart_lists_oldest_first() {
        let store = filled_store(4, 6);
        let text = emitted(Report::ChartList, &store);

        let positions: Vec<usize> = store
            .iter()
            .map(|m| text.find(&format!("['{}'", EpochTime(m.timestamp))).unwrap())
            .collect();
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "timestamps must increase along the list"
        );
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_row_contents() {
        let clock = ClockReconciler::initialize(Some(1_432_232_648), 0);
        let mut store = MeasurementStore::try_with_capacity(2, 1000, 0).unwrap();
        store.maybe_record(1000, 201.256, &clock);

        assert_eq!(
            emitted(Report::ChartList, &store),
            "['18:24:09 - 21.5.2015',201.26,230.50],\n"
        );
        assert!(
            emitted(Report::Table, &store)
                .contains("<tr><td>18:24:09 - 21.5.2015</td><td>201.26</td><td>230.50</td></tr>")
        );
    }

    #[test]
    fn test_empty_reports() {
        let store = MeasurementStore::disabled();

        assert_eq!(emitted(Report::ChartList, &store), "");
        assert_eq!(Report::ChartList.measure(&snapshot(&store)), 0);
        assert_eq!(emitted(Report::Table, &store), pieces::NO_DATA);
    }

    #[test]
    fn test_write_error_is_reported() {
        let store = filled_store(10, 10);
        let mut sink = crate::test_support::BrokenSink;

        assert_eq!(
            Report::Table.emit(&snapshot(&store), &mut sink),
            Err(EmitError::Write(ErrorKind::BrokenPipe))
        );
    }
}
