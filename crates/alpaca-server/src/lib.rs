//! `alpaca-server` is a library crate for building ASCOM Alpaca device
//! servers on microcontrollers whose network interface exposes a small,
//! fixed number of hardware `TCP` sockets.
//!
//! It provides APIs to:
//!
//! - Decode Alpaca `HTTP/1.1` requests incrementally, whatever the way they
//!   are split across socket reads
//! - Serve every socket of the network interface with a connection state
//!   machine driven by a non-blocking polling loop
//! - Route requests to the configured devices and answer the management
//!   and setup requests
//! - Define `Switch`, `CoverCalibrator`, and `ObservingConditions` devices on
//!   top of simple hardware traits
//! - Answer Alpaca discovery requests
//!
//! The server never allocates a socket buffer at runtime: each connection
//! owns an input and an output buffer whose sizes are fixed at compile time.
//!
//! Each device is described by its type, its number, and a unique
//! identifier which must remain the same across restarts. Device methods
//! either return a value or an ASCOM error, and both are carried to the
//! client inside a `JSON` response.
//!
//! The firmware main loop owns the network driver and lends it to
//! [`server::Server::perform_io`] on every iteration, together with the
//! current time.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![no_std]

extern crate alloc;

/// All supported device types.
pub mod devices;

/// Per-socket connection state machine.
pub mod connection;
/// Incremental request decoder.
pub mod decoder;
/// General device definition along with its common methods.
pub mod device;
/// Alpaca discovery service.
pub mod discovery;
/// Error management.
pub mod error;
/// Pool of hardware socket connections.
pub mod pool;
/// Decoded request.
pub mod request;
/// Response writer.
pub mod response;
/// Request routing.
pub mod router;
/// The device server.
pub mod server;
/// Hardware socket interface.
pub mod socket;
/// Device unique identifiers.
pub mod storage;
