//! Host TCP glue: `std::net` streams behind the `embedded_io` traits.

use std::fmt;
use std::io::{self, Read, Write as _};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use embedded_io::{ErrorKind, ErrorType, Write};
use smoker_core::http::RequestBuffer;

/// A `std::io::Error` seen through `embedded_io`.
#[derive(Debug)]
pub struct IoError(pub io::Error);

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for IoError {}

impl embedded_io::Error for IoError {
    fn kind(&self) -> ErrorKind {
        match self.0.kind() {
            io::ErrorKind::BrokenPipe => ErrorKind::BrokenPipe,
            io::ErrorKind::ConnectionReset => ErrorKind::ConnectionReset,
            io::ErrorKind::ConnectionAborted => ErrorKind::ConnectionAborted,
            io::ErrorKind::NotConnected => ErrorKind::NotConnected,
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ErrorKind::TimedOut,
            io::ErrorKind::Interrupted => ErrorKind::Interrupted,
            io::ErrorKind::WriteZero => ErrorKind::WriteZero,
            _ => ErrorKind::Other,
        }
    }
}

/// Blocking writer over an accepted client stream.
pub struct StreamWriter<'a> {
    stream: &'a mut TcpStream,
}

impl<'a> StreamWriter<'a> {
    pub fn new(stream: &'a mut TcpStream) -> Self {
        Self { stream }
    }
}

impl ErrorType for StreamWriter<'_> {
    type Error = IoError;
}

impl Write for StreamWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.stream.write(buf).map_err(IoError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.stream.flush().map_err(IoError)
    }
}

/// Read the request line with an overall deadline of `timeout`.
///
/// Whatever arrived before the deadline is returned; an idle client yields
/// an empty buffer.
pub fn read_request(stream: &mut TcpStream, timeout: Duration) -> io::Result<RequestBuffer> {
    // Accepted streams inherit the listener's non-blocking flag on some hosts
    stream.set_nonblocking(false)?;

    let deadline = Instant::now() + timeout;
    let mut request = RequestBuffer::new();
    while !request.is_complete() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        stream.set_read_timeout(Some(remaining))?;
        match stream.read(request.spare()) {
            Ok(0) => break,
            Ok(n) => request.commit(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                break;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(request)
}
