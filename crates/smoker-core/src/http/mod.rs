//! Minimal HTTP/1.1 layer for the logger's web pages
//!
//! Only the request line of a `GET` is ever looked at; headers and bodies are
//! ignored. Every response closes the connection.

pub mod request;
pub mod response;
pub mod route;

pub use request::{MAX_REQUEST_LINE, Request, RequestBuffer, RequestError, read_request_line};
pub use response::{Head, Response, ResponseError, Status};
pub use route::{Counters, Dispatcher, Route};
