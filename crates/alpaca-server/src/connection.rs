use alpaca::http::{HttpMethod, HttpStatus};

use embedded_io::Error as _;

use log::{debug, error, warn};

use crate::decoder::{DecodeOutcome, DecoderStatus, RequestDecoder};
use crate::error::Error;
use crate::request::AlpacaRequest;
use crate::response::ResponseWriter;
use crate::socket::{SocketDriver, SocketId};

/// Receiver of the requests decoded by a [`ConnectionHandler`].
pub trait RequestListener {
    /// Called before the first byte of a request is decoded.
    fn on_start_decoding(&mut self, request: &mut AlpacaRequest);

    /// Called with a completely decoded request.
    ///
    /// Writes the response and returns whether the connection can stay
    /// open once the response has been sent.
    fn on_request_decoded(
        &mut self,
        request: &AlpacaRequest,
        writer: &mut ResponseWriter<'_>,
    ) -> bool;

    /// Called with a request that cannot be decoded.
    ///
    /// Writes the `HTTP` error response. The connection is closed once the
    /// response has been sent.
    fn on_request_decoding_error(
        &mut self,
        request: &AlpacaRequest,
        status: HttpStatus,
        writer: &mut ResponseWriter<'_>,
    );
}

/// State of a [`ConnectionHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and the socket is not armed.
    Idle,
    /// The socket waits for a client.
    Accepting,
    /// A request is being received.
    Decoding,
    /// A decoded request is being answered.
    Dispatching,
    /// A response is being sent.
    Responding,
    /// The peer closed its half while a response is being sent.
    HalfClosing,
    /// The connection has been closed by this side.
    Closed,
}

/// Handler of the connection accepted by a single socket.
///
/// The handler owns an input buffer of `RX` bytes and an output buffer of
/// `TX` bytes, so a request larger than `RX` or a response larger than
/// `TX` is rejected.
pub struct ConnectionHandler<const RX: usize, const TX: usize> {
    socket: SocketId,
    state: ConnectionState,
    decoder: RequestDecoder,
    request: AlpacaRequest,
    rx: [u8; RX],
    rx_len: usize,
    tx: [u8; TX],
    tx_len: usize,
    tx_sent: usize,
    close_after_response: bool,
    peer_half_closed: bool,
    last_activity_ms: u64,
}

impl<const RX: usize, const TX: usize> ConnectionHandler<RX, TX> {
    /// Creates a [`ConnectionHandler`] for a socket.
    #[must_use]
    pub const fn new(socket: SocketId) -> Self {
        Self {
            socket,
            state: ConnectionState::Idle,
            decoder: RequestDecoder::new(RX),
            request: AlpacaRequest::new(),
            rx: [0; RX],
            rx_len: 0,
            tx: [0; TX],
            tx_len: 0,
            tx_sent: 0,
            close_after_response: false,
            peer_half_closed: false,
            last_activity_ms: 0,
        }
    }

    /// Returns the socket served by the handler.
    #[must_use]
    pub const fn socket(&self) -> SocketId {
        self.socket
    }

    /// Returns the handler state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Records that the socket has been armed.
    pub fn on_listening(&mut self) {
        self.release();
        self.state = ConnectionState::Accepting;
    }

    /// Starts serving a newly accepted connection.
    pub fn on_connect(&mut self, now_ms: u64) {
        debug!("Socket {}: connection accepted", self.socket);
        self.release();
        self.decoder.reset(&mut self.request);
        self.state = ConnectionState::Decoding;
        self.last_activity_ms = now_ms;
    }

    /// Reads the available bytes, decodes them, and sends the pending
    /// response.
    pub fn on_can_read<D, L>(&mut self, driver: &mut D, listener: &mut L, now_ms: u64)
    where
        D: SocketDriver,
        L: RequestListener,
    {
        match self.state {
            ConnectionState::Decoding => {}
            ConnectionState::Responding | ConnectionState::HalfClosing => {
                self.flush(driver, now_ms);
                return;
            }
            _ => return,
        }

        if self.rx_len < RX {
            match driver.read(self.socket, &mut self.rx[self.rx_len..]) {
                Ok(0) => {}
                Ok(count) => {
                    self.rx_len += count;
                    self.last_activity_ms = now_ms;
                }
                Err(e) => {
                    warn!(
                        "Socket {}: read failed: {}",
                        self.socket,
                        Error::from(e.kind())
                    );
                    self.abort(driver);
                    return;
                }
            }
        }

        self.process_input(driver, listener, now_ms);
    }

    /// Handles a peer that will not send any more bytes.
    ///
    /// A pending response is still sent, while a partially received request
    /// is rejected.
    pub fn on_half_closed<D, L>(&mut self, driver: &mut D, listener: &mut L, now_ms: u64)
    where
        D: SocketDriver,
        L: RequestListener,
    {
        self.peer_half_closed = true;
        match self.state {
            ConnectionState::Decoding => {
                if self.rx_len == 0 && self.decoder.status() != DecoderStatus::InProgress {
                    debug!("Socket {}: peer closed between requests", self.socket);
                    self.disconnect(driver);
                } else {
                    // Whatever is buffered cannot complete the request.
                    self.process_input(driver, listener, now_ms);
                }
            }
            ConnectionState::Responding => {
                self.state = ConnectionState::HalfClosing;
                self.flush(driver, now_ms);
            }
            ConnectionState::HalfClosing => self.flush(driver, now_ms),
            _ => {}
        }
    }

    /// Releases the connection, whatever its state.
    pub fn on_disconnect(&mut self) {
        if !matches!(
            self.state,
            ConnectionState::Idle | ConnectionState::Accepting | ConnectionState::Closed
        ) {
            debug!("Socket {}: connection lost in {:?}", self.socket, self.state);
        }
        self.release();
        self.state = ConnectionState::Closed;
    }

    /// Closes a connection that has not progressed for `timeout_ms`.
    pub fn close_if_idle<D: SocketDriver>(&mut self, driver: &mut D, now_ms: u64, timeout_ms: u64) {
        let serving = matches!(
            self.state,
            ConnectionState::Decoding | ConnectionState::Responding | ConnectionState::HalfClosing
        );
        if serving && now_ms.saturating_sub(self.last_activity_ms) > timeout_ms {
            warn!(
                "Socket {}: no progress for {timeout_ms} ms, closing",
                self.socket
            );
            self.disconnect(driver);
        }
    }

    fn process_input<D, L>(&mut self, driver: &mut D, listener: &mut L, now_ms: u64)
    where
        D: SocketDriver,
        L: RequestListener,
    {
        while self.state == ConnectionState::Decoding {
            if self.decoder.status() == DecoderStatus::Idle {
                if self.rx_len == 0 {
                    return;
                }
                listener.on_start_decoding(&mut self.request);
            }

            let mut input = &self.rx[..self.rx_len];
            let outcome = self.decoder.decode(
                &mut self.request,
                &mut input,
                self.rx_len == RX,
                self.peer_half_closed,
            );
            let consumed = self.rx_len - input.len();
            self.rx.copy_within(consumed..self.rx_len, 0);
            self.rx_len -= consumed;

            match outcome {
                DecodeOutcome::NeedMoreInput if self.peer_half_closed => {
                    self.reject(listener, HttpStatus::BadRequest);
                }
                DecodeOutcome::NeedMoreInput => return,
                DecodeOutcome::Complete => self.dispatch(listener),
                DecodeOutcome::Malformed(status) => self.reject(listener, status),
            }

            self.flush(driver, now_ms);
        }
    }

    fn dispatch<L: RequestListener>(&mut self, listener: &mut L) {
        self.state = ConnectionState::Dispatching;

        let omit_body = self.omits_body();
        let mut writer = ResponseWriter::new(&mut self.tx, omit_body);
        let keep_open = listener.on_request_decoded(&self.request, &mut writer);

        if writer.overflowed() || writer.is_empty() {
            error!(
                "Socket {}: no response fits {TX} bytes for {:?}",
                self.socket,
                self.request.api()
            );
            if !write_fallback(
                &mut writer,
                HttpStatus::InternalServerError,
                "Response too large",
            ) {
                warn!("Socket {}: closing without response", self.socket);
            }
            self.close_after_response = true;
        } else {
            self.close_after_response = !keep_open || writer.closes() || self.request.do_close();
        }

        self.tx_len = writer.len();
        self.tx_sent = 0;
        self.state = ConnectionState::Responding;
    }

    fn reject<L: RequestListener>(&mut self, listener: &mut L, status: HttpStatus) {
        debug!("Socket {}: rejecting request with {status}", self.socket);

        let omit_body = self.omits_body();
        let mut writer = ResponseWriter::new(&mut self.tx, omit_body);
        listener.on_request_decoding_error(&self.request, status, &mut writer);
        if (writer.overflowed() || writer.is_empty())
            && !write_fallback(&mut writer, status, status.reason())
        {
            warn!("Socket {}: closing without response", self.socket);
        }

        self.tx_len = writer.len();
        self.tx_sent = 0;
        self.close_after_response = true;
        self.state = ConnectionState::Responding;
    }

    fn omits_body(&self) -> bool {
        self.request.http_method() == Some(HttpMethod::Head)
    }

    fn flush<D: SocketDriver>(&mut self, driver: &mut D, now_ms: u64) {
        while self.tx_sent < self.tx_len {
            match driver.write(self.socket, &self.tx[self.tx_sent..self.tx_len]) {
                Ok(0) => return,
                Ok(count) => {
                    self.tx_sent += count;
                    self.last_activity_ms = now_ms;
                }
                Err(e) => {
                    warn!(
                        "Socket {}: write failed: {}",
                        self.socket,
                        Error::from(e.kind())
                    );
                    self.abort(driver);
                    return;
                }
            }
        }

        self.tx_len = 0;
        self.tx_sent = 0;
        if self.close_after_response || self.peer_half_closed {
            self.disconnect(driver);
        } else {
            self.decoder.reset(&mut self.request);
            self.state = ConnectionState::Decoding;
        }
    }

    fn disconnect<D: SocketDriver>(&mut self, driver: &mut D) {
        driver.disconnect(self.socket);
        self.release();
        self.state = ConnectionState::Closed;
    }

    fn abort<D: SocketDriver>(&mut self, driver: &mut D) {
        driver.close(self.socket);
        self.release();
        self.state = ConnectionState::Closed;
    }

    fn release(&mut self) {
        self.rx_len = 0;
        self.tx_len = 0;
        self.tx_sent = 0;
        self.close_after_response = false;
        self.peer_half_closed = false;
    }
}

// Replaces the written response with a bare error. When even that does not
// fit, nothing is left to send and the connection is closed.
fn write_fallback(writer: &mut ResponseWriter<'_>, status: HttpStatus, message: &str) -> bool {
    writer.clear();
    if writer.http_error(status, message).is_err() {
        writer.clear();
        return false;
    }
    true
}
