use log::debug;

use super::request::Request;
use super::response::Status;
use crate::report::Page;

/// Where a request path leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Table,
    Chart,
    NotFound,
}

impl Route {
    /// Exact path match; query strings must already be stripped.
    pub fn resolve(path: &str) -> Self {
        match path {
            "/" => Self::Dashboard,
            "/tabelle" => Self::Table,
            "/grafik" => Self::Chart,
            _ => Self::NotFound,
        }
    }

    pub const fn is_found(self) -> bool {
        !matches!(self, Self::NotFound)
    }

    pub const fn page(self) -> Page {
        match self {
            Self::Dashboard => Page::Dashboard,
            Self::Table => Page::Table,
            Self::Chart => Page::Chart,
            Self::NotFound => Page::NotFound,
        }
    }

    pub const fn status(self) -> Status {
        match self {
            Self::NotFound => Status::NotFound,
            _ => Status::Ok,
        }
    }
}

/// Monotonic counters shown in every page footer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Requests answered with one of the known pages
    pub requests: u32,
    /// Network (re)connections since boot
    pub reconnects: u32,
}

/// Resolves requests and keeps the request statistics.
#[derive(Debug, Default)]
pub struct Dispatcher {
    counters: Counters,
}

impl Dispatcher {
    pub const fn new() -> Self {
        Self {
            counters: Counters {
                requests: 0,
                reconnects: 0,
            },
        }
    }

    /// Resolve the request path, counting it only if a page matched.
    pub fn dispatch(&mut self, request: &Request<'_>) -> Route {
        let route = Route::resolve(request.path());
        if route.is_found() {
            self.counters.requests = self.counters.requests.wrapping_add(1);
        }
        debug!("{:?} -> {:?}", request.path(), route);
        route
    }

    pub fn note_reconnect(&mut self) {
        self.counters.reconnects = self.counters.reconnects.wrapping_add(1);
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }
}
