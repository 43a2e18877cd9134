use core::str;

use thiserror_no_std::Error;

/// Bytes kept of an incoming request; anything past this is ignored.
pub const MAX_REQUEST_LINE: usize = 512;

const GET: &str = "GET ";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    #[error("empty request")]
    Empty,
    #[error("request line is not valid UTF-8")]
    Utf8,
}

/// The parts of a request line the dispatcher cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    path: &'a str,
    params: &'a str,
}

impl<'a> Request<'a> {
    /// Split a request line into path and query parameters
    ///
    /// Anything other than `GET` yields an empty path, which resolves to the
    /// not-found page.
    pub fn parse(line: &'a str) -> Result<Self, RequestError> {
        if line.is_empty() {
            return Err(RequestError::Empty);
        }

        let Some(rest) = line.strip_prefix(GET) else {
            return Ok(Self::default());
        };
        let Some(end) = rest.find(' ') else {
            return Ok(Self::default());
        };

        let target = &rest[..end];
        let (path, params) = match target.find('?') {
            Some(quest) => (&target[..quest], &target[quest..]),
            None => (target, ""),
        };
        Ok(Self { path, params })
    }

    pub fn path(&self) -> &'a str {
        self.path
    }

    /// Raw query string including the leading `?`, or empty.
    pub fn params(&self) -> &'a str {
        self.params
    }
}

impl Default for Request<'_> {
    fn default() -> Self {
        Self {
            path: "",
            params: "",
        }
    }
}

/// The first line of `bytes`, up to the first `\r` or the end of the buffer.
///
/// A line with invalid UTF-8 is cut before the first bad byte, so its path
/// never reaches the next space and it resolves to the not-found page. Only a
/// line that starts with an invalid byte is rejected.
pub fn read_request_line(bytes: &[u8]) -> Result<&str, RequestError> {
    let end = bytes.iter().position(|&b| b == b'\r').unwrap_or(bytes.len());
    match str::from_utf8(&bytes[..end]) {
        Ok(line) => Ok(line),
        Err(e) if e.valid_up_to() > 0 => {
            // The prefix is valid by construction
            str::from_utf8(&bytes[..e.valid_up_to()]).map_err(|_| RequestError::Utf8)
        }
        Err(_) => Err(RequestError::Utf8),
    }
}

/// Fixed buffer the transport reads a request into
///
/// Reading stops at the first `\r`, when the buffer is full, when the peer
/// closes or when the request timeout expires. In every case the transport
/// serves what was filled; an empty buffer means the connection is closed
/// without an answer.
pub struct RequestBuffer {
    buf: [u8; MAX_REQUEST_LINE],
    len: usize,
}

impl RequestBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_REQUEST_LINE],
            len: 0,
        }
    }

    /// Unfilled space for the next read.
    pub fn spare(&mut self) -> &mut [u8] {
        &mut self.buf[self.len..]
    }

    /// Mark `n` bytes of [`Self::spare`] as filled.
    pub fn commit(&mut self, n: usize) {
        self.len = (self.len + n).min(MAX_REQUEST_LINE);
    }

    /// The request line has ended or no more bytes can be taken.
    pub fn is_complete(&self) -> bool {
        self.len == MAX_REQUEST_LINE || self.filled().contains(&b'\r')
    }

    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn line(&self) -> Result<&str, RequestError> {
        read_request_line(self.filled())
    }
}

impl Default for RequestBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(line: &str) -> &str {
        Request::parse(line).unwrap().path()
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(path("GET /tabelle HTTP/1.1"), "/tabelle");
        assert_eq!(path("GET / HTTP/1.1"), "/");
        assert_eq!(path("GET /grafik?x=1 HTTP/1.1"), "/grafik");
        assert_eq!(path("POST / HTTP/1.1"), "");
        assert_eq!(path("GET /nospace"), "");
    }

    #[test]
    fn test_query_is_kept_but_separate() {
        let request = Request::parse("GET /grafik?x=1&y=2 HTTP/1.1").unwrap();

        assert_eq!(request.path(), "/grafik");
        assert_eq!(request.params(), "?x=1&y=2");
    }

    #[test]
    fn test_question_mark_after_space_is_ignored() {
        let request = Request::parse("GET /tabelle HTTP/1.1?").unwrap();

        assert_eq!(request.path(), "/tabelle");
        assert_eq!(request.params(), "");
    }

    #[test]
    fn test_empty_line_is_an_error() {
        assert_eq!(Request::parse(""), Err(RequestError::Empty));
    }

    #[test]
    fn test_read_request_line_stops_at_cr() {
        let bytes = b"GET / HTTP/1.1\r\nHost: smoker\r\n\r\n";

        assert_eq!(read_request_line(bytes), Ok("GET / HTTP/1.1"));
        assert_eq!(read_request_line(b"GET /"), Ok("GET /"));
        assert_eq!(read_request_line(b"\r\n"), Ok(""));
        assert_eq!(read_request_line(&[0xff, 0xfe]), Err(RequestError::Utf8));
    }

    #[test]
    fn test_invalid_utf8_cuts_line_before_bad_byte() {
        let line = read_request_line(b"GET /caf\xe9 HTTP/1.1\r\n").unwrap();

        assert_eq!(line, "GET /caf");
        assert_eq!(Request::parse(line).unwrap().path(), "", "resolves to not found");
    }

    #[test]
    fn test_full_buffer_split_inside_multibyte_char() {
        let mut buffer = RequestBuffer::new();
        let mut line = b"GET /".to_vec();
        line.resize(MAX_REQUEST_LINE - 1, b'a');
        line.push(0xc3); // first byte of a two-byte character
        buffer.spare().copy_from_slice(&line);
        buffer.commit(MAX_REQUEST_LINE);

        let text = buffer.line().unwrap();
        assert_eq!(text.len(), MAX_REQUEST_LINE - 1);
        assert_eq!(Request::parse(text).unwrap().path(), "");
    }

    #[test]
    fn test_buffer_fills_in_pieces() {
        let mut buffer = RequestBuffer::new();
        let first = b"GET /gra";
        buffer.spare()[..first.len()].copy_from_slice(first);
        buffer.commit(first.len());
        assert!(!buffer.is_complete());

        let second = b"fik HTTP/1.1\r\n";
        buffer.spare()[..second.len()].copy_from_slice(second);
        buffer.commit(second.len());

        assert!(buffer.is_complete());
        assert_eq!(buffer.line(), Ok("GET /grafik HTTP/1.1"));
    }

    #[test]
    fn test_full_buffer_is_complete() {
        let mut buffer = RequestBuffer::new();
        buffer.spare().fill(b'a');
        buffer.commit(MAX_REQUEST_LINE);

        assert!(buffer.is_complete());
        assert!(buffer.spare().is_empty());
        assert_eq!(buffer.line().map(str::len), Ok(MAX_REQUEST_LINE));
    }
}
