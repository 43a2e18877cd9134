//! Desktop simulator for the smoker regulator logger.
//!
//! Serves the dashboard, table and chart pages from `smoker-core` on a host
//! TCP port, fed by a synthetic smoker that heats up towards its set-point.
//! The loop is the same as on the device: one logging tick, then at most one
//! client, repeated.
//!
//! ```text
//! RUST_LOG=debug smoker-simulator --bind 127.0.0.1:8080 --span-hours 1
//! ```

mod transport;

use std::io;
use std::net::{Shutdown, TcpListener};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use log::{debug, info, warn};

use smoker_core::config::{LoggerConfig, StoreConfig};
use smoker_core::config::{DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_RESERVED_BYTES, DEFAULT_SPAN_HOURS};
use smoker_core::storage::Measurement;
use smoker_core::{DataLogger, Readings};

use transport::{StreamWriter, read_request};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "smoker-simulator")]
#[command(author, version, about = "Serve the smoker logger pages from a simulated regulator")]
struct Args {
    /// Address the web server listens on
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Heap bytes the store is sized from, as reported by the device allocator
    #[arg(long, default_value_t = 64 * 1024)]
    available_memory: usize,

    /// Hours of history kept in the store
    #[arg(long, default_value_t = DEFAULT_SPAN_HOURS)]
    span_hours: u32,

    /// Heap bytes held back from the store
    #[arg(long, default_value_t = DEFAULT_RESERVED_BYTES)]
    reserved_bytes: usize,

    /// Time a client has to send its request line
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    timeout_ms: u32,

    /// Start without a wall clock, as when the time server is unreachable
    #[arg(long)]
    no_time_sync: bool,
}

impl Args {
    fn logger_config(&self) -> LoggerConfig {
        LoggerConfig::new()
            .with_store(
                StoreConfig::new()
                    .with_span_hours(self.span_hours)
                    .with_reserved_bytes(self.reserved_bytes),
            )
            .with_request_timeout_ms(self.timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// Mock regulator
// ---------------------------------------------------------------------------

/// Interval between loop iterations while no client is waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

const SET_POINT: f32 = 225.0;
const AMBIENT: f32 = 70.0;

/// First-order heat-up towards the set-point with a slow wobble.
struct MockRegulator {
    started: Instant,
}

impl MockRegulator {
    fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    fn readings(&self) -> Readings {
        let t = self.started.elapsed().as_secs_f32();
        let approach = 1.0 - (-t / 600.0).exp();
        let wobble = 4.0 * (t / 45.0).sin();
        Readings::new(AMBIENT + (SET_POINT - AMBIENT) * approach + wobble, SET_POINT)
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Milliseconds since `boot`, truncated like the device tick.
fn tick_ms(boot: Instant) -> u32 {
    boot.elapsed().as_millis() as u32
}

fn epoch_now() -> Option<u32> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs() as u32)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    info!("Starting smoker simulator");

    let boot = Instant::now();
    let epoch = if args.no_time_sync { None } else { epoch_now() };
    let mut logger = DataLogger::begin(args.logger_config(), args.available_memory, epoch, tick_ms(boot));
    let regulator = MockRegulator::new();

    // The device reports what is left after the store took its share
    let store_bytes = logger.store().capacity() * Measurement::size();
    let free_memory = args.available_memory.saturating_sub(store_bytes);

    let listener = TcpListener::bind(&args.bind)?;
    listener.set_nonblocking(true)?;
    info!("Serving on http://{}", listener.local_addr()?);

    let request_timeout = Duration::from_millis(u64::from(logger.request_timeout_ms()));

    loop {
        logger.data_logging(tick_ms(boot), regulator.readings());

        let mut stream = match listener.accept() {
            Ok((stream, peer)) => {
                debug!("Client {} connected", peer);
                stream
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(POLL_INTERVAL);
                continue;
            }
            Err(e) => {
                warn!("Accept failed: {}", e);
                continue;
            }
        };

        let request = match read_request(&mut stream, request_timeout) {
            Ok(request) => request,
            Err(e) => {
                warn!("Reading request failed: {}", e);
                continue;
            }
        };

        if let Some(response) = logger.serve_line(request.filled(), regulator.readings(), free_memory) {
            let mut writer = StreamWriter::new(&mut stream);
            match response.write_to(&mut writer) {
                Ok(written) => debug!("Sent {:?} page, {} bytes", response.page(), written),
                Err(e) => warn!("Writing response failed: {}", e),
            }
        }
        let _ = stream.shutdown(Shutdown::Both);
    }
}
