use alloc::borrow::Cow;
use alloc::format;

use serde::Serialize;

/// ASCOM error numbers reported in the `ErrorNumber` field of a method
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
#[serde(into = "u32")]
#[cfg_attr(feature = "deserialize", serde(try_from = "u32"))]
pub enum AscomErrorCode {
    /// Property or method not implemented.
    NotImplemented,
    /// Invalid value.
    InvalidValue,
    /// A value has not been set.
    ValueNotSet,
    /// The communications channel is not connected.
    NotConnected,
    /// The mount is parked.
    InvalidWhileParked,
    /// The mount is slaved.
    InvalidWhileSlaved,
    /// Settings could not be read or written.
    SettingsProviderError,
    /// The operation cannot be undertaken at this time.
    InvalidOperation,
    /// The requested action is not implemented.
    ActionNotImplemented,
    /// The requested item is not in the cache.
    NotInCache,
    /// Catch-all error.
    UnspecifiedError,
}

/// All [`AscomErrorCode`]s.
pub const ALL_ASCOM_ERROR_CODES: &[AscomErrorCode] = &[
    AscomErrorCode::NotImplemented,
    AscomErrorCode::InvalidValue,
    AscomErrorCode::ValueNotSet,
    AscomErrorCode::NotConnected,
    AscomErrorCode::InvalidWhileParked,
    AscomErrorCode::InvalidWhileSlaved,
    AscomErrorCode::SettingsProviderError,
    AscomErrorCode::InvalidOperation,
    AscomErrorCode::ActionNotImplemented,
    AscomErrorCode::NotInCache,
    AscomErrorCode::UnspecifiedError,
];

impl AscomErrorCode {
    /// Returns the error number.
    #[must_use]
    pub const fn number(&self) -> u32 {
        match self {
            Self::NotImplemented => 0x400,
            Self::InvalidValue => 0x401,
            Self::ValueNotSet => 0x402,
            Self::NotConnected => 0x407,
            Self::InvalidWhileParked => 0x408,
            Self::InvalidWhileSlaved => 0x409,
            Self::SettingsProviderError => 0x40A,
            Self::InvalidOperation => 0x40B,
            Self::ActionNotImplemented => 0x40C,
            Self::NotInCache => 0x40D,
            Self::UnspecifiedError => 0x4FF,
        }
    }

    /// Returns the default error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::NotImplemented => "Not implemented",
            Self::InvalidValue => "Invalid value",
            Self::ValueNotSet => "Value not set",
            Self::NotConnected => "Not connected",
            Self::InvalidWhileParked => "Invalid while parked",
            Self::InvalidWhileSlaved => "Invalid while slaved",
            Self::SettingsProviderError => "Settings provider error",
            Self::InvalidOperation => "Invalid operation",
            Self::ActionNotImplemented => "Action not implemented",
            Self::NotInCache => "Not in cache",
            Self::UnspecifiedError => "Unspecified error",
        }
    }

    /// Finds the [`AscomErrorCode`] with the given error number.
    #[must_use]
    pub fn from_number(number: u32) -> Option<Self> {
        ALL_ASCOM_ERROR_CODES
            .iter()
            .copied()
            .find(|code| code.number() == number)
    }
}

impl From<AscomErrorCode> for u32 {
    fn from(code: AscomErrorCode) -> Self {
        code.number()
    }
}

impl TryFrom<u32> for AscomErrorCode {
    type Error = &'static str;

    fn try_from(number: u32) -> Result<Self, Self::Error> {
        Self::from_number(number).ok_or("unknown ASCOM error number")
    }
}

/// An ASCOM error, answered to a client inside a successful `HTTP` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AscomError {
    /// Error number.
    pub code: AscomErrorCode,
    /// Error message.
    pub message: Cow<'static, str>,
}

impl AscomError {
    /// Creates an [`AscomError`].
    #[must_use]
    #[inline]
    pub fn new(code: AscomErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Creates an [`AscomError`] with the default message of its code.
    #[must_use]
    #[inline]
    pub const fn from_code(code: AscomErrorCode) -> Self {
        Self {
            code,
            message: Cow::Borrowed(code.message()),
        }
    }

    /// Creates an [`AscomError`] for a method that is not implemented.
    #[must_use]
    pub fn not_implemented(method: &str) -> Self {
        Self::new(
            AscomErrorCode::NotImplemented,
            format!("Alpaca method not implemented: {method}"),
        )
    }

    /// Creates an [`AscomError`] for a device action that is not implemented.
    #[must_use]
    #[inline]
    pub const fn action_not_implemented() -> Self {
        Self::from_code(AscomErrorCode::ActionNotImplemented)
    }

    /// Creates an [`AscomError`] for a required parameter that is missing.
    #[must_use]
    pub fn missing_parameter(parameter: &str) -> Self {
        Self::new(
            AscomErrorCode::ValueNotSet,
            format!("Missing parameter: {parameter}"),
        )
    }

    /// Creates an [`AscomError`] for a parameter whose value is invalid.
    #[must_use]
    pub fn invalid_parameter(parameter: &str) -> Self {
        Self::new(
            AscomErrorCode::InvalidValue,
            format!("Invalid parameter: {parameter}"),
        )
    }

    /// Creates an [`AscomError`] for an operation that cannot be performed
    /// at this time.
    #[must_use]
    pub fn invalid_operation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(AscomErrorCode::InvalidOperation, message)
    }

    /// Creates an [`AscomError`] for a device that is not connected.
    #[must_use]
    #[inline]
    pub const fn not_connected() -> Self {
        Self::from_code(AscomErrorCode::NotConnected)
    }
}

impl core::fmt::Display for AscomError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} (0x{:X})", self.message, self.code.number())
    }
}

impl From<AscomErrorCode> for AscomError {
    fn from(code: AscomErrorCode) -> Self {
        Self::from_code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::{ALL_ASCOM_ERROR_CODES, AscomError, AscomErrorCode};

    use crate::serialize;

    #[cfg(feature = "deserialize")]
    use crate::deserialize;

    #[test]
    fn test_error_numbers() {
        assert_eq!(AscomErrorCode::NotImplemented.number(), 1024);
        assert_eq!(AscomErrorCode::InvalidValue.number(), 1025);
        assert_eq!(AscomErrorCode::ValueNotSet.number(), 1026);
        assert_eq!(AscomErrorCode::ActionNotImplemented.number(), 1036);
        assert_eq!(AscomErrorCode::UnspecifiedError.number(), 1279);

        for code in ALL_ASCOM_ERROR_CODES {
            assert_eq!(AscomErrorCode::from_number(code.number()), Some(*code));
        }
        assert_eq!(AscomErrorCode::from_number(0), None);
    }

    #[test]
    fn test_error_messages() {
        let error = AscomError::missing_parameter("State");
        assert_eq!(error.code, AscomErrorCode::ValueNotSet);
        assert_eq!(error.message, "Missing parameter: State");

        let error = AscomError::invalid_parameter("Id");
        assert_eq!(error.code, AscomErrorCode::InvalidValue);
        assert_eq!(error.message, "Invalid parameter: Id");

        assert_eq!(
            AscomError::not_implemented("commandblind").message,
            "Alpaca method not implemented: commandblind"
        );
    }

    #[test]
    fn test_error_code_serde() {
        assert_eq!(
            serialize(AscomErrorCode::NotConnected),
            serde_json::json!(1031)
        );

        #[cfg(feature = "deserialize")]
        assert_eq!(
            deserialize::<AscomErrorCode>(serde_json::json!(1035)),
            AscomErrorCode::InvalidOperation
        );
    }
}
