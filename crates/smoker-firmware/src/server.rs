//! The firmware main loop: logging ticks interleaved with HTTP clients
//!
//! Logging and serving share one task, so a response is always written to
//! completion before the next tick can touch the store.

use embassy_net::Stack;
use embassy_net::tcp::{self, TcpSocket};
use embassy_time::{Duration, Instant, Timer, with_timeout};
use embedded_io_async::Write;
use log::{debug, warn};
use smoker_core::DataLogger;
use smoker_core::http::RequestBuffer;
use thiserror_no_std::Error;

use crate::{net, readings};

const HTTP_PORT: u16 = 80;

/// How long one accept waits before the loop returns to logging.
const ACCEPT_POLL: Duration = Duration::from_millis(500);

/// Idle limit for a connected socket while writing.
const SOCKET_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("reading the request failed: {0:?}")]
    Read(tcp::Error),
    #[error("writing the response failed: {0:?}")]
    Write(tcp::Error),
}

/// Low 32 bits of the uptime in milliseconds; wraps like a hardware tick.
pub fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

fn free_memory() -> usize {
    esp_alloc::HEAP.free()
}

/// Run the logger forever on `stack`.
pub async fn run(stack: Stack<'static>, mut logger: DataLogger) -> ! {
    let mut rx_buf = [0u8; 1024];
    let mut tx_buf = [0u8; 2048];
    let mut link_ups = net::link_ups();

    loop {
        logger.data_logging(now_ms(), readings::current());

        let current = net::link_ups();
        while link_ups < current {
            logger.note_reconnect();
            link_ups += 1;
        }

        if !stack.is_config_up() {
            Timer::after(ACCEPT_POLL).await;
            continue;
        }

        let mut socket = TcpSocket::new(stack, &mut rx_buf, &mut tx_buf);
        socket.set_timeout(Some(SOCKET_TIMEOUT));

        match with_timeout(ACCEPT_POLL, socket.accept(HTTP_PORT)).await {
            Err(_) => {}
            Ok(Err(e)) => warn!("HTTP accept error: {:?}", e),
            Ok(Ok(())) => {
                if let Err(e) = handle_connection(&mut socket, &mut logger).await {
                    warn!("HTTP client dropped: {}", e);
                }
                socket.close();
                let _ = socket.flush().await;
            }
        }

        socket.abort();
    }
}

async fn handle_connection(
    socket: &mut TcpSocket<'_>,
    logger: &mut DataLogger,
) -> Result<(), ServeError> {
    let timeout_ms = logger.request_timeout_ms();
    let mut request = RequestBuffer::new();
    // The deadline bounds the whole read; what arrived by then is served
    if let Ok(read) = with_timeout(
        Duration::from_millis(u64::from(timeout_ms)),
        read_request(socket, &mut request),
    )
    .await
    {
        read?;
    } else {
        debug!(
            "Request read timed out after {} ms with {} bytes",
            timeout_ms,
            request.filled().len()
        );
    }

    let Some(response) = logger.serve_line(request.filled(), readings::current(), free_memory())
    else {
        return Ok(());
    };

    socket
        .write_all(response.head().as_bytes())
        .await
        .map_err(ServeError::Write)?;
    let mut written = 0;
    for chunk in response.chunks() {
        socket.write_all(&chunk).await.map_err(ServeError::Write)?;
        written += chunk.len();
    }
    debug!("Sent {:?} page, {} bytes", response.page(), written);
    Ok(())
}

/// Fill `request` until the request line ends or the peer closes.
async fn read_request(socket: &mut TcpSocket<'_>, request: &mut RequestBuffer) -> Result<(), ServeError> {
    while !request.is_complete() {
        let n = socket.read(request.spare()).await.map_err(ServeError::Read)?;
        if n == 0 {
            break;
        }
        request.commit(n);
    }
    Ok(())
}
