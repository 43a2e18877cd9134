use core::fmt::Write as _;

use embedded_io::{Error as _, ErrorKind, Write};
use heapless::String;
use thiserror_no_std::Error;

use super::route::Route;
use crate::report::{self, Chunks, EmitError, Page, Snapshot};

/// Room for the response head with a 20-digit `Content-Length`.
pub const HEAD_CAPACITY: usize = 128;

pub type Head = String<HEAD_CAPACITY>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseError {
    #[error("writing the response head failed: {0:?}")]
    Head(ErrorKind),
    #[error("writing the response body failed: {0}")]
    Body(EmitError),
}

impl From<EmitError> for ResponseError {
    fn from(e: EmitError) -> Self {
        Self::Body(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
}

impl Status {
    pub const fn line(self) -> &'static str {
        match self {
            Self::Ok => "200 OK",
            Self::NotFound => "404 Not Found",
        }
    }
}

/// A page bound to the snapshot it renders
///
/// Nothing is rendered until the length is asked for or the response is
/// written; both run over the same snapshot and always agree.
pub struct Response<'a> {
    status: Status,
    page: Page,
    snapshot: Snapshot<'a>,
}

impl<'a> Response<'a> {
    pub fn new(route: Route, snapshot: Snapshot<'a>) -> Self {
        Self {
            status: route.status(),
            page: route.page(),
            snapshot,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Body chunks, for transports that write asynchronously.
    pub fn chunks(&self) -> Chunks<'_> {
        self.page.chunks(&self.snapshot)
    }

    /// Exact body length, from a measure pass.
    pub fn content_length(&self) -> usize {
        report::measure(self.chunks())
    }

    pub fn head(&self) -> Head {
        let mut head = Head::new();
        let _ = write!(
            head,
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n",
            self.status.line(),
            self.content_length()
        );
        head
    }

    /// Write head and body to a blocking sink, returning the body length.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<usize, ResponseError> {
        sink.write_all(self.head().as_bytes())
            .map_err(|e| ResponseError::Head(e.kind()))?;
        let written = report::emit(self.chunks(), sink)?;
        sink.flush().map_err(|e| ResponseError::Body(EmitError::Write(e.kind())))?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Counters;
    use crate::logger::Readings;
    use crate::storage::MeasurementStore;
    use crate::test_support::{BrokenSink, VecSink, filled_store};

    fn response(route: Route, store: &MeasurementStore) -> Response<'_> {
        Response::new(
            route,
            Snapshot::new(store, Readings::new(200.0, 225.0), Counters::default(), 5000),
        )
    }

    fn split(bytes: &[u8]) -> (&str, &[u8]) {
        let end = bytes.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
        (core::str::from_utf8(&bytes[..end]).unwrap(), &bytes[end..])
    }

    #[test]
    fn test_content_length_matches_body() {
        let store = filled_store(50, 80);
        for route in [Route::Dashboard, Route::Table, Route::Chart, Route::NotFound] {
            let response = response(route, &store);
            let mut sink = VecSink::default();
            let written = response.write_to(&mut sink).unwrap();

            let (head, body) = split(&sink.bytes);
            assert_eq!(body.len(), written, "{:?}", route);
            assert!(
                head.contains(&format!("\r\nContent-Length: {}\r\n", body.len())),
                "{:?}: {}",
                route,
                head
            );
        }
    }

    #[test]
    fn test_head_format() {
        let store = MeasurementStore::disabled();
        let response = response(Route::NotFound, &store);

        assert_eq!(
            response.head().as_str(),
            format!(
                "HTTP/1.1 404 Not Found\r\nContent-Length: {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n",
                crate::report::pages::NOT_FOUND.len()
            )
        );
        assert!(response_head_starts(Route::Table, "HTTP/1.1 200 OK\r\n"));
    }

    fn response_head_starts(route: Route, prefix: &str) -> bool {
        let store = MeasurementStore::disabled();
        response(route, &store).head().starts_with(prefix)
    }

    #[test]
    fn test_broken_transport() {
        let store = filled_store(4, 4);

        assert_eq!(
            response(Route::Dashboard, &store).write_to(&mut BrokenSink),
            Err(ResponseError::Head(ErrorKind::BrokenPipe))
        );
    }
}
