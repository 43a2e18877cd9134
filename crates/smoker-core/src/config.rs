//! Runtime configuration for the logger core
//!
//! The defaults match the regulator hardware: six hours of history, a
//! 20 KB heap reserve for the network stack, and a 250 ms window for the
//! client to send its request line.

/// Hours of history the store is stretched over.
pub const DEFAULT_SPAN_HOURS: u32 = 6;

/// Heap bytes left untouched when sizing the measurement store.
pub const DEFAULT_RESERVED_BYTES: usize = 20_240;

/// How long a connected client may take to send its request line.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 250;

/// Sizing parameters for the measurement store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Retention span; the sampling interval is derived from it.
    pub span_hours: u32,
    /// Safety margin subtracted from the available heap before sizing.
    pub reserved_bytes: usize,
}

impl StoreConfig {
    pub const fn new() -> Self {
        Self {
            span_hours: DEFAULT_SPAN_HOURS,
            reserved_bytes: DEFAULT_RESERVED_BYTES,
        }
    }

    pub const fn with_span_hours(mut self, span_hours: u32) -> Self {
        self.span_hours = span_hours;
        self
    }

    pub const fn with_reserved_bytes(mut self, reserved_bytes: usize) -> Self {
        self.reserved_bytes = reserved_bytes;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level configuration handed to [`crate::DataLogger::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerConfig {
    pub store: StoreConfig,
    /// Bounded wait for request bytes; the transport enforces it.
    pub request_timeout_ms: u32,
}

impl LoggerConfig {
    pub const fn new() -> Self {
        Self {
            store: StoreConfig::new(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    pub const fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    pub const fn with_request_timeout_ms(mut self, request_timeout_ms: u32) -> Self {
        self.request_timeout_ms = request_timeout_ms;
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new()
    }
}
