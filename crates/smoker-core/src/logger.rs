//! The logger state owned by the firmware's main loop
//!
//! [`DataLogger`] bundles the clock, the measurement history and the request
//! statistics. The main loop alternates two calls on it: a logging tick via
//! [`DataLogger::data_logging`] and one served request via
//! [`DataLogger::serve_line`]. A [`Response`] borrows the logger, so no tick
//! can run while a page is being measured and written.

use log::{debug, info, warn};

use crate::clock::ClockReconciler;
use crate::config::LoggerConfig;
use crate::http::{
    Counters, Dispatcher, Request, RequestError, Response, Route, read_request_line,
};
use crate::report::Snapshot;
use crate::storage::{Measurement, MeasurementStore};

/// Live values published by the regulator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Readings {
    /// Current smoker temperature
    pub temperature: f32,
    /// Regulator target temperature
    pub set_point: f32,
}

impl Readings {
    pub const fn new(temperature: f32, set_point: f32) -> Self {
        Self {
            temperature,
            set_point,
        }
    }
}

pub struct DataLogger {
    config: LoggerConfig,
    clock: ClockReconciler,
    store: MeasurementStore,
    dispatcher: Dispatcher,
}

impl DataLogger {
    /// Size the store, capture the wall clock and count the network connect.
    ///
    /// `epoch_now` is the time source's answer, if any; `now_ms` is the
    /// monotonic tick at the moment it was read.
    pub fn begin(
        config: LoggerConfig,
        available_memory: usize,
        epoch_now: Option<u32>,
        now_ms: u32,
    ) -> Self {
        let store = MeasurementStore::allocate(available_memory, &config.store, now_ms);
        let clock = ClockReconciler::initialize(epoch_now, now_ms);
        Self::with_parts(config, clock, store)
    }

    pub fn with_parts(config: LoggerConfig, clock: ClockReconciler, store: MeasurementStore) -> Self {
        let mut dispatcher = Dispatcher::new();
        dispatcher.note_reconnect();
        Self {
            config,
            clock,
            store,
            dispatcher,
        }
    }

    /// One logging tick: stores the temperature if the interval has elapsed.
    pub fn data_logging(&mut self, now_ms: u32, readings: Readings) -> Option<Measurement> {
        let stored = self
            .store
            .maybe_record(now_ms, readings.temperature, &self.clock)?;
        info!(
            "Logging temperature {:.2} at {}",
            stored.value, stored.timestamp
        );
        Some(stored)
    }

    pub fn dispatch(&mut self, request: &Request<'_>) -> Route {
        self.dispatcher.dispatch(request)
    }

    /// Count a network reconnect after the link was lost.
    pub fn note_reconnect(&mut self) {
        self.dispatcher.note_reconnect();
        info!("Network reconnected ({} connects)", self.counters().reconnects);
    }

    /// Freeze the current state into a response for `route`.
    pub fn respond(&self, route: Route, readings: Readings, free_memory: usize) -> Response<'_> {
        let snapshot = Snapshot::new(&self.store, readings, self.counters(), free_memory);
        Response::new(route, snapshot)
    }

    /// Parse raw request bytes and build the matching response
    ///
    /// Returns `None` only for an empty request line; the transport should
    /// close the connection without answering. Any other malformed line is
    /// answered with the not-found page.
    pub fn serve_line(
        &mut self,
        bytes: &[u8],
        readings: Readings,
        free_memory: usize,
    ) -> Option<Response<'_>> {
        let request = match read_request_line(bytes).and_then(Request::parse) {
            Ok(request) => request,
            Err(RequestError::Empty) => {
                warn!("Dropping client: {}", RequestError::Empty);
                return None;
            }
            Err(e) => {
                warn!("Unreadable request: {}", e);
                Request::default()
            }
        };
        let route = self.dispatch(&request);
        debug!("Serving {:?}", route);
        Some(self.respond(route, readings, free_memory))
    }

    pub fn store(&self) -> &MeasurementStore {
        &self.store
    }

    pub fn clock(&self) -> &ClockReconciler {
        &self.clock
    }

    pub fn counters(&self) -> Counters {
        self.dispatcher.counters()
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn request_timeout_ms(&self) -> u32 {
        self.config.request_timeout_ms
    }
}
