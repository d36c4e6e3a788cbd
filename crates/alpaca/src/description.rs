use alloc::borrow::Cow;

use serde::Serialize;

use crate::devices::DeviceType;

/// The `UDP` port on which Alpaca servers listen for discovery requests.
pub const DISCOVERY_PORT: u16 = 32227;

/// The payload of an Alpaca discovery request.
pub const DISCOVERY_REQUEST: &[u8] = b"alpacadiscovery1";

/// Description of an Alpaca server, returned by
/// `/management/v1/description`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
#[serde(rename_all = "PascalCase")]
pub struct ServerDescription {
    /// Server name.
    pub server_name: Cow<'static, str>,
    /// Manufacturer name.
    pub manufacturer: Cow<'static, str>,
    /// Manufacturer version.
    pub manufacturer_version: Cow<'static, str>,
    /// Server location.
    pub location: Cow<'static, str>,
}

impl ServerDescription {
    /// Creates a [`ServerDescription`] with the given server name.
    #[must_use]
    #[inline]
    pub const fn new(server_name: &'static str) -> Self {
        Self {
            server_name: Cow::Borrowed(server_name),
            manufacturer: Cow::Borrowed(""),
            manufacturer_version: Cow::Borrowed(""),
            location: Cow::Borrowed(""),
        }
    }

    /// Sets the manufacturer name.
    #[must_use]
    #[inline]
    pub fn manufacturer(mut self, manufacturer: &'static str) -> Self {
        self.manufacturer = Cow::Borrowed(manufacturer);
        self
    }

    /// Sets the manufacturer version.
    #[must_use]
    #[inline]
    pub fn manufacturer_version(mut self, manufacturer_version: &'static str) -> Self {
        self.manufacturer_version = Cow::Borrowed(manufacturer_version);
        self
    }

    /// Sets the server location.
    #[must_use]
    #[inline]
    pub fn location(mut self, location: &'static str) -> Self {
        self.location = Cow::Borrowed(location);
        self
    }
}

/// A device entry returned by `/management/v1/configureddevices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
#[serde(rename_all = "PascalCase")]
pub struct ConfiguredDevice {
    /// Device name.
    pub device_name: Cow<'static, str>,
    /// Device type.
    pub device_type: DeviceType,
    /// Device number, unique among the devices of the same type.
    pub device_number: u32,
    /// Device unique identifier.
    #[serde(rename = "UniqueID")]
    pub unique_id: Cow<'static, str>,
}

/// The answer to an Alpaca discovery request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub struct DiscoveryResponse {
    /// The `TCP` port of the Alpaca server.
    #[serde(rename = "alpacaport")]
    #[cfg_attr(feature = "deserialize", serde(alias = "AlpacaPort"))]
    pub alpaca_port: u16,
}

impl DiscoveryResponse {
    /// Creates a [`DiscoveryResponse`].
    #[must_use]
    #[inline]
    pub const fn new(alpaca_port: u16) -> Self {
        Self { alpaca_port }
    }
}
