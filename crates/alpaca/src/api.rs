use crate::macros::wire_names;

/// The only Alpaca API version served.
pub const API_VERSION: &str = "v1";

/// The API versions reported by `/management/apiversions`.
pub const SUPPORTED_API_VERSIONS: &[u32] = &[1];

wire_names! {
    /// First path segment of an Alpaca request.
    ALL_API_GROUPS => ApiGroup {
        /// Device API calls, `/api/v1/{type}/{number}/{method}`.
        Device => "api",
        /// Management calls, `/management/...`.
        Management => "management",
        /// `HTML` setup pages, `/setup/...`.
        Setup => "setup",
    }
}

wire_names! {
    /// Management methods below `/management/v1`.
    ALL_MANAGEMENT_METHODS => ManagementMethod {
        /// `/management/v1/description`
        Description => "description",
        /// `/management/v1/configureddevices`
        ConfiguredDevices => "configureddevices",
    }
}

/// The specific API addressed by a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Api {
    /// `/api/v1/{type}/{number}/{method}`
    DeviceApi,
    /// `/setup/v1/{type}/{number}/setup`
    DeviceSetup,
    /// `/management/apiversions`
    ManagementApiVersions,
    /// `/management/v1/description`
    ManagementDescription,
    /// `/management/v1/configureddevices`
    ManagementConfiguredDevices,
    /// `/setup`
    ServerSetup,
    /// `/`
    ServerStatus,
}

impl Api {
    /// Whether the API addresses a single device.
    #[must_use]
    pub const fn is_device(&self) -> bool {
        matches!(self, Self::DeviceApi | Self::DeviceSetup)
    }

    /// Whether the API answers with an Alpaca `JSON` body.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(
            self,
            Self::DeviceApi
                | Self::ManagementApiVersions
                | Self::ManagementDescription
                | Self::ManagementConfiguredDevices
        )
    }

    /// Returns the [`ApiGroup`] containing the API.
    #[must_use]
    pub const fn group(&self) -> Option<ApiGroup> {
        match self {
            Self::DeviceApi => Some(ApiGroup::Device),
            Self::DeviceSetup | Self::ServerSetup => Some(ApiGroup::Setup),
            Self::ManagementApiVersions
            | Self::ManagementDescription
            | Self::ManagementConfiguredDevices => Some(ApiGroup::Management),
            Self::ServerStatus => None,
        }
    }
}

impl core::fmt::Display for Api {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Self::DeviceApi => "api",
            Self::DeviceSetup => "setup",
            Self::ManagementApiVersions => "management/apiversions",
            Self::ManagementDescription => "management/v1/description",
            Self::ManagementConfiguredDevices => "management/v1/configureddevices",
            Self::ServerSetup => "setup",
            Self::ServerStatus => "status",
        };
        f.write_str(text)
    }
}
