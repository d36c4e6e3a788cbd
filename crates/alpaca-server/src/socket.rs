//! The boundary between the server and a network interface exposing a
//! fixed number of hardware sockets, such as the `W5500` chip.
//!
//! Every operation is non-blocking: reads return the bytes already
//! received, writes accept as many bytes as fit the socket transmit buffer.

use embedded_io::ErrorType;

/// Identifier of a hardware socket.
pub type SocketId = u8;

/// Status of a hardware socket, as reported by the network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketStatus {
    /// The socket is closed and can be armed.
    Closed,
    /// The socket has been opened but not armed yet.
    Init,
    /// The socket waits for a connection.
    Listen,
    /// A connection request has been received.
    SynReceived,
    /// The connection is open in both directions.
    Established,
    /// The peer has closed its half of the connection.
    CloseWait,
    /// Closing started by this side, waiting for the peer.
    FinWait,
    /// Both sides are closing simultaneously.
    Closing,
    /// Waiting for late packets of a closed connection.
    TimeWait,
    /// Waiting for the acknowledgement of the final close.
    LastAck,
    /// A status the server does not expect for a listening socket.
    Unexpected,
}

impl SocketStatus {
    /// Whether a client is connected to the socket.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Established | Self::CloseWait)
    }

    /// Whether the socket is closing a connection.
    #[must_use]
    pub const fn is_closing(self) -> bool {
        matches!(
            self,
            Self::FinWait | Self::Closing | Self::TimeWait | Self::LastAck
        )
    }
}

/// A network interface driving hardware `TCP` sockets.
pub trait SocketDriver: ErrorType {
    /// Returns the status of a socket.
    fn status(&mut self, socket: SocketId) -> SocketStatus;

    /// Arms a closed socket to accept a connection on a port.
    ///
    /// # Errors
    ///
    /// Fails when the interface cannot arm the socket.
    fn listen(&mut self, socket: SocketId, port: u16) -> Result<(), Self::Error>;

    /// Returns the number of received bytes waiting to be read.
    fn available(&mut self, socket: SocketId) -> usize;

    /// Reads received bytes, returning how many bytes have been read.
    ///
    /// # Errors
    ///
    /// Fails when the connection is broken.
    fn read(&mut self, socket: SocketId, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Queues bytes for transmission, returning how many bytes have been
    /// accepted. Zero means the transmit buffer is full.
    ///
    /// # Errors
    ///
    /// Fails when the connection is broken.
    fn write(&mut self, socket: SocketId, buf: &[u8]) -> Result<usize, Self::Error>;

    /// Starts a graceful close of the connection.
    fn disconnect(&mut self, socket: SocketId);

    /// Releases the socket immediately.
    fn close(&mut self, socket: SocketId);
}
