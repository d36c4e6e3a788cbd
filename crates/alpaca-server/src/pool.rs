use embedded_io::Error as _;

use log::{info, warn};

use crate::connection::{ConnectionHandler, RequestListener};
use crate::error::Error;
use crate::socket::{SocketDriver, SocketId, SocketStatus};

/// Time granted to a closing connection before its socket is released.
pub const DISCONNECT_TIMEOUT_MS: u64 = 5000;

struct Slot<const RX: usize, const TX: usize> {
    handler: ConnectionHandler<RX, TX>,
    was_open: bool,
    closing_since_ms: Option<u64>,
}

/// A fixed pool of `N` hardware sockets listening on the same port.
///
/// Slot `i` drives the socket with identifier `i`.
pub struct ConnectionPool<const N: usize, const RX: usize, const TX: usize> {
    slots: [Slot<RX, TX>; N],
    port: u16,
    idle_timeout_ms: Option<u64>,
}

impl<const N: usize, const RX: usize, const TX: usize> ConnectionPool<N, RX, TX> {
    /// Creates a [`ConnectionPool`] listening on a port.
    #[must_use]
    pub fn new(port: u16) -> Self {
        Self {
            slots: core::array::from_fn(|index| Slot {
                // Hardware interfaces expose at most a handful of sockets.
                handler: ConnectionHandler::new(index as SocketId),
                was_open: false,
                closing_since_ms: None,
            }),
            port,
            idle_timeout_ms: None,
        }
    }

    /// Changes the listening port, used when a socket is next armed.
    pub const fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Closes connections that do not progress for the given time, or
    /// never when `None`.
    pub const fn set_idle_timeout(&mut self, timeout_ms: Option<u64>) {
        self.idle_timeout_ms = timeout_ms;
    }

    /// Returns the listening port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the handler driving a socket.
    #[must_use]
    pub fn handler(&self, socket: SocketId) -> Option<&ConnectionHandler<RX, TX>> {
        self.slots
            .get(usize::from(socket))
            .map(|slot| &slot.handler)
    }

    /// Polls every socket once and advances its connection.
    pub fn perform_io<D, L>(&mut self, driver: &mut D, listener: &mut L, now_ms: u64)
    where
        D: SocketDriver,
        L: RequestListener,
    {
        for slot in &mut self.slots {
            let socket = slot.handler.socket();
            let status = driver.status(socket);
            let is_open = status.is_open();
            let newly_open = is_open && !slot.was_open;

            if slot.was_open && !is_open {
                info!("Socket {socket}: disconnected ({status:?})");
                slot.handler.on_disconnect();
            }

            match status {
                SocketStatus::Closed => {
                    slot.closing_since_ms = None;
                    match driver.listen(socket, self.port) {
                        Ok(()) => slot.handler.on_listening(),
                        Err(e) => warn!(
                            "Socket {socket}: cannot listen on port {}: {}",
                            self.port,
                            Error::from(e.kind())
                        ),
                    }
                }
                SocketStatus::Listen | SocketStatus::SynReceived => {}
                SocketStatus::Established => {
                    if newly_open {
                        slot.handler.on_connect(now_ms);
                    } else {
                        slot.handler.on_can_read(driver, listener, now_ms);
                    }
                }
                SocketStatus::CloseWait => {
                    if newly_open {
                        slot.handler.on_connect(now_ms);
                    } else if driver.available(socket) > 0 {
                        slot.handler.on_can_read(driver, listener, now_ms);
                    } else {
                        slot.handler.on_half_closed(driver, listener, now_ms);
                    }
                }
                status if status.is_closing() => match slot.closing_since_ms {
                    None => slot.closing_since_ms = Some(now_ms),
                    Some(since) if now_ms.saturating_sub(since) > DISCONNECT_TIMEOUT_MS => {
                        warn!("Socket {socket}: still {status:?} after {DISCONNECT_TIMEOUT_MS} ms, closing");
                        driver.close(socket);
                        slot.closing_since_ms = None;
                    }
                    Some(_) => {}
                },
                // Init and Unexpected.
                _ => {
                    warn!("Socket {socket}: unexpected status {status:?}, closing");
                    driver.close(socket);
                }
            }

            if is_open && let Some(timeout_ms) = self.idle_timeout_ms {
                slot.handler.close_if_idle(driver, now_ms, timeout_ms);
            }

            slot.was_open = is_open;
        }
    }
}
