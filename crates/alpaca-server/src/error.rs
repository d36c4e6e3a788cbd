use alloc::borrow::Cow;

/// All possible error kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configured device list cannot be served.
    Configuration,
    /// A device unique identifier cannot be loaded or created.
    UniqueId,
    /// A socket operation failed.
    Socket,
    /// A response does not fit the output buffer.
    ResponseTooLarge,
    /// A value cannot be serialized.
    Serialization,
}

impl ErrorKind {
    pub(crate) const fn description(self) -> &'static str {
        match self {
            Self::Configuration => "Configuration",
            Self::UniqueId => "Unique Identifier",
            Self::Socket => "Socket",
            Self::ResponseTooLarge => "Response Too Large",
            Self::Serialization => "Serialization",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.description())
    }
}

/// A server error.
#[derive(PartialEq)]
pub struct Error {
    kind: ErrorKind,
    description: Cow<'static, str>,
    info: Option<Cow<'static, str>>,
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.error())
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.error())
    }
}

impl Error {
    /// Creates an [`Error`] from an [`ErrorKind`] and a description.
    #[must_use]
    #[inline]
    pub fn new(kind: ErrorKind, description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            description: description.into(),
            info: None,
        }
    }

    /// Adds information describing the underlying cause.
    #[must_use]
    #[inline]
    pub fn with_info(mut self, info: impl Into<Cow<'static, str>>) -> Self {
        self.info = Some(info.into());
        self
    }

    /// Returns the [`ErrorKind`].
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the error as a single line of text.
    #[must_use]
    pub fn error(&self) -> alloc::string::String {
        match &self.info {
            Some(info) => alloc::format!("{}: {} ({info})", self.kind, self.description),
            None => alloc::format!("{}: {}", self.kind, self.description),
        }
    }
}

impl From<serde_json_core::ser::Error> for Error {
    fn from(_: serde_json_core::ser::Error) -> Self {
        // The serializer only fails on a full buffer.
        Self::new(
            ErrorKind::ResponseTooLarge,
            "Response does not fit the output buffer",
        )
    }
}

impl From<embedded_io::ErrorKind> for Error {
    fn from(e: embedded_io::ErrorKind) -> Self {
        Self::new(ErrorKind::Socket, alloc::format!("{e:?}"))
    }
}

/// A specialized [`Result`] type for [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{Error, ErrorKind};

    #[test]
    fn test_error_text() {
        let error = Error::new(ErrorKind::Configuration, "Duplicate device Switch/0");
        assert_eq!(error.kind(), ErrorKind::Configuration);
        assert_eq!(
            error.to_string(),
            "Configuration: Duplicate device Switch/0"
        );

        let error = Error::new(ErrorKind::Socket, "Cannot listen").with_info("socket 2");
        assert_eq!(error.to_string(), "Socket: Cannot listen (socket 2)");
    }

    #[test]
    fn test_error_conversions() {
        let error: Error = embedded_io::ErrorKind::ConnectionReset.into();
        assert_eq!(error.kind(), ErrorKind::Socket);
        assert_eq!(error.description(), "ConnectionReset");

        let error: Error = serde_json_core::ser::Error::BufferFull.into();
        assert_eq!(error.kind(), ErrorKind::ResponseTooLarge);
    }
}
