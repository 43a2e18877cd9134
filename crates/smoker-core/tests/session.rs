//! Drives a `DataLogger` through a logging session and a round of requests,
//! the way the firmware main loop does.

use std::convert::Infallible;

use embedded_io::{ErrorType, Write};

use smoker_core::clock::EpochTime;
use smoker_core::config::{LoggerConfig, StoreConfig};
use smoker_core::http::Status;
use smoker_core::{DataLogger, Readings};

#[derive(Default)]
struct Socket {
    sent: Vec<u8>,
}

impl ErrorType for Socket {
    type Error = Infallible;
}

impl Write for Socket {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.sent.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

const EPOCH: u32 = 1_432_232_648;

/// 40 slots over one hour: one sample every 90 s.
fn logger() -> DataLogger {
    let config = LoggerConfig::new()
        .with_store(StoreConfig::new().with_span_hours(1).with_reserved_bytes(1000));
    DataLogger::begin(config, 1000 + 40 * 8, Some(EPOCH), 0)
}

fn serve(logger: &mut DataLogger, line: &str) -> Option<(Status, String, String)> {
    let readings = Readings::new(0.0, 225.0);
    let response = logger.serve_line(line.as_bytes(), readings, 12_345)?;
    let status = response.status();
    let mut socket = Socket::default();
    let written = response.write_to(&mut socket).unwrap();

    let text = String::from_utf8(socket.sent).unwrap();
    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    assert_eq!(body.len(), written);
    assert!(
        head.contains(&format!("Content-Length: {}\r\n", body.len())),
        "{}: {}",
        line,
        head
    );
    Some((status, head.to_string(), body.to_string()))
}

#[test]
fn test_full_session() {
    let mut logger = logger();
    assert_eq!(logger.store().capacity(), 40);
    assert_eq!(logger.store().interval_ms(), 90_000);

    // Poll every 10 s for two hours: the history wraps and keeps the newest 40
    let mut now_ms = 0u32;
    for step in 0..720 {
        now_ms += 10_000;
        logger.data_logging(now_ms, Readings::new(100.0 + step as f32, 225.0));
    }
    assert_eq!(logger.store().count(), 80);
    assert_eq!(logger.store().len(), 40);

    let (status, _, dashboard) = serve(&mut logger, "GET / HTTP/1.1\r\n").unwrap();
    assert_eq!(status, Status::Ok);
    let latest = *logger.store().latest().unwrap();
    assert!(dashboard.contains(&format!("var temp={:.2},setP=225.00;", latest.value)));

    let (_, _, table) = serve(&mut logger, "GET /tabelle HTTP/1.1\r\n").unwrap();
    assert_eq!(table.matches("<tr><td>").count(), 40);
    let newest = table.find(&EpochTime(latest.timestamp).to_string()).unwrap();
    let oldest = logger.store().iter().next().unwrap();
    let oldest = table.find(&format!("<td>{}</td>", EpochTime(oldest.timestamp))).unwrap();
    assert!(newest < oldest, "table must start with the newest record");

    let (_, _, chart) = serve(&mut logger, "GET /grafik?range=all HTTP/1.1\r\n").unwrap();
    assert_eq!(chart.matches(",225.00],\n").count(), 40);

    let (status, head, _) = serve(&mut logger, "GET /missing HTTP/1.1\r\n").unwrap();
    assert_eq!(status, Status::NotFound);
    assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));

    let (status, _, _) = serve(&mut logger, "POST / HTTP/1.1\r\n").unwrap();
    assert_eq!(status, Status::NotFound);

    assert!(serve(&mut logger, "").is_none());

    let counters = logger.counters();
    assert_eq!(counters.requests, 3);
    assert_eq!(counters.reconnects, 1);
}

#[test]
fn test_footer_reflects_counters_at_request_time() {
    let mut logger = logger();

    serve(&mut logger, "GET / HTTP/1.1").unwrap();
    let (_, _, body) = serve(&mut logger, "GET /tabelle HTTP/1.1").unwrap();

    assert!(body.contains("Page requests=2 - Network connects=1 - Free RAM=12345 - Max. data points=40<BR>"));
    assert!(body.contains("No data logged yet.<BR>"));
}

#[test]
fn test_without_time_source_timestamps_count_from_boot() {
    let mut logger = DataLogger::begin(LoggerConfig::new(), 20_240 + 8 * 100, None, 0);

    let stored = logger.data_logging(216_000, Readings::new(90.0, 225.0)).unwrap();

    assert_eq!(stored.timestamp, 216);
    assert_eq!(EpochTime(stored.timestamp).to_string(), "00:03:36 - 1.1.1970");
}
