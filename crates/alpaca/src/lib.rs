//! The vocabulary of the ASCOM Alpaca protocol.
//!
//! This crate provides the tokens and the message structures shared by an
//! Alpaca device server and its clients:
//!
//! - `HTTP` tokens recognized by a request decoder: methods, headers,
//!   content types, and the status codes a server answers with.
//! - The Alpaca API tree: API groups, management methods, device types, and
//!   the methods each device type exposes.
//! - Request parameters and observing-conditions sensor names.
//! - ASCOM error numbers and the JSON method response carrying them.
//! - Management structures describing a server and its configured devices,
//!   together with the UDP discovery answer.
//!
//! Every token kind is declared through a single name table, so the same
//! table matches incoming names and prints outgoing ones.
//!
//! A device server serializes these structures while a client deserializes
//! them. A server can avoid importing deserialization functions by disabling
//! the `deserialize` feature at compile time.
//!
//! This crate can be compiled for both `std` and `no_std` environments.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![no_std]

extern crate alloc;

mod macros;

/// Alpaca API groups and the specific APIs they contain.
pub mod api;
/// Management structures describing a server and its devices.
pub mod description;
/// Device types.
pub mod devices;
/// ASCOM error numbers.
pub mod error;
/// `HTTP` tokens and status codes.
pub mod http;
/// Device methods.
pub mod methods;
/// Request parameters.
pub mod parameters;
/// Alpaca method responses.
pub mod response;

#[cfg(test)]
pub(crate) fn serialize<T: serde::Serialize>(value: T) -> serde_json::Value {
    serde_json::to_value(value).unwrap()
}

#[cfg(test)]
#[cfg(feature = "deserialize")]
pub(crate) fn deserialize<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).unwrap()
}
