//! Alpaca discovery responder.
//!
//! Clients broadcast `alpacadiscovery1` to the `UDP` port `32227`, and each
//! server answers the sender with the `TCP` port of its Alpaca API.

use core::net::SocketAddr;

use alpaca::description::{DISCOVERY_PORT, DISCOVERY_REQUEST, DiscoveryResponse};

use embedded_io::{Error as _, ErrorType};

use log::{debug, info, warn};

use crate::error::{Error, Result};

// A discovery request fits a short datagram, larger ones are ignored.
const DATAGRAM_SIZE: usize = 64;

/// A network interface driving the `UDP` socket of the discovery service.
pub trait DatagramDriver: ErrorType {
    /// Opens the discovery socket on a port.
    ///
    /// # Errors
    ///
    /// Fails when the socket cannot be opened.
    fn bind(&mut self, port: u16) -> core::result::Result<(), Self::Error>;

    /// Receives a pending datagram, returning its length and sender.
    ///
    /// # Errors
    ///
    /// Fails when the socket is broken.
    fn receive(
        &mut self,
        buf: &mut [u8],
    ) -> core::result::Result<Option<(usize, SocketAddr)>, Self::Error>;

    /// Sends a datagram.
    ///
    /// # Errors
    ///
    /// Fails when the datagram cannot be sent.
    fn send_to(&mut self, remote: SocketAddr, data: &[u8])
    -> core::result::Result<(), Self::Error>;
}

/// Answers Alpaca discovery requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryResponder {
    alpaca_port: u16,
    bound: bool,
}

impl DiscoveryResponder {
    /// Creates a [`DiscoveryResponder`] advertising a `TCP` port.
    #[must_use]
    #[inline]
    pub const fn new(alpaca_port: u16) -> Self {
        Self {
            alpaca_port,
            bound: false,
        }
    }

    /// Changes the advertised `TCP` port.
    pub const fn set_port(&mut self, alpaca_port: u16) {
        self.alpaca_port = alpaca_port;
    }

    /// Writes the answer sent to discovery requests into a buffer.
    ///
    /// # Errors
    ///
    /// Fails when the answer does not fit the buffer.
    pub fn response<'b>(&self, buffer: &'b mut [u8]) -> Result<&'b [u8]> {
        let len = serde_json_core::to_slice(&DiscoveryResponse::new(self.alpaca_port), buffer)?;
        Ok(&buffer[..len])
    }

    /// Answers every pending discovery request.
    pub fn perform_io<D: DatagramDriver>(&mut self, driver: &mut D) {
        if !self.bound {
            match driver.bind(DISCOVERY_PORT) {
                Ok(()) => {
                    info!("Discovery listening on UDP port {DISCOVERY_PORT}");
                    self.bound = true;
                }
                Err(e) => {
                    warn!("Discovery cannot bind: {}", Error::from(e.kind()));
                    return;
                }
            }
        }

        let mut buffer = [0; DATAGRAM_SIZE];
        let mut answer = [0; DATAGRAM_SIZE];
        loop {
            let (len, remote) = match driver.receive(&mut buffer) {
                Ok(Some(datagram)) => datagram,
                Ok(None) => return,
                Err(e) => {
                    warn!("Discovery receive failed: {}", Error::from(e.kind()));
                    self.bound = false;
                    return;
                }
            };

            if !is_discovery_request(&buffer[..len]) {
                debug!("Ignoring datagram of {len} bytes from {remote}");
                continue;
            }

            debug!("Discovery request from {remote}");
            let response = match self.response(&mut answer) {
                Ok(response) => response,
                Err(e) => {
                    warn!("Discovery answer cannot be built: {e}");
                    return;
                }
            };
            if let Err(e) = driver.send_to(remote, response) {
                warn!(
                    "Discovery answer to {remote} failed: {}",
                    Error::from(e.kind())
                );
            }
        }
    }
}

fn is_discovery_request(datagram: &[u8]) -> bool {
    datagram == DISCOVERY_REQUEST
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    use super::{DiscoveryResponder, is_discovery_request};

    #[test]
    fn test_discovery_request() {
        assert!(is_discovery_request(b"alpacadiscovery1"));
        assert!(!is_discovery_request(b"alpacadiscovery1\n"));
        assert!(!is_discovery_request(b"AlpacaDiscovery1"));
        assert!(!is_discovery_request(b"alpacadiscovery"));
        assert!(!is_discovery_request(b"alpacadiscovery2"));
    }

    #[test]
    fn test_discovery_response() {
        let mut responder = DiscoveryResponder::new(80);
        responder.set_port(8080);
        let mut buffer = [0; 32];
        assert_eq!(
            responder.response(&mut buffer).unwrap(),
            br#"{"alpacaport":8080}"#
        );

        let mut buffer = [0; 8];
        assert_eq!(
            responder.response(&mut buffer).unwrap_err().kind(),
            ErrorKind::ResponseTooLarge
        );
    }
}
