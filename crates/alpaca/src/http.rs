use crate::macros::wire_names;

wire_names! {
    /// Request methods recognized in an `HTTP/1.1` request line.
    ///
    /// Only [`HttpMethod::Get`], [`HttpMethod::Head`], and [`HttpMethod::Put`]
    /// are served; the other methods are recognized so that they can be
    /// rejected as not allowed rather than as unknown.
    ALL_HTTP_METHODS => HttpMethod {
        /// `GET`
        Get => "GET",
        /// `HEAD`
        Head => "HEAD",
        /// `PUT`
        Put => "PUT",
        /// `POST`
        Post => "POST",
        /// `DELETE`
        Delete => "DELETE",
        /// `PATCH`
        Patch => "PATCH",
        /// `OPTIONS`
        Options => "OPTIONS",
        /// `CONNECT`
        Connect => "CONNECT",
        /// `TRACE`
        Trace => "TRACE",
    }
}

impl HttpMethod {
    /// Whether requests with this method are served.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Put)
    }

    /// Whether this method only reads state.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        matches!(self, Self::Get | Self::Head)
    }

    /// Whether a request with this method may carry a body.
    #[must_use]
    pub const fn has_body(&self) -> bool {
        matches!(self, Self::Put)
    }
}

wire_names! {
    /// Request headers interpreted by the decoder.
    ///
    /// All other headers are skipped.
    ALL_HTTP_HEADERS => HttpHeader {
        /// `Accept`
        Accept => "Accept",
        /// `Connection`
        Connection => "Connection",
        /// `Content-Length`
        ContentLength => "Content-Length",
        /// `Content-Type`
        ContentType => "Content-Type",
    }
}

wire_names! {
    /// Media types produced or accepted by the server.
    ALL_CONTENT_TYPES => ContentType {
        /// `application/json`
        Json => "application/json",
        /// `text/plain`
        TextPlain => "text/plain",
        /// `text/html`
        TextHtml => "text/html",
        /// `application/x-www-form-urlencoded`
        FormUrlEncoded => "application/x-www-form-urlencoded",
    }
}

/// `HTTP` status codes produced by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    /// `200 OK`
    Ok,
    /// `400 Bad Request`
    BadRequest,
    /// `404 Not Found`
    NotFound,
    /// `405 Method Not Allowed`
    MethodNotAllowed,
    /// `406 Not Acceptable`
    NotAcceptable,
    /// `411 Length Required`
    LengthRequired,
    /// `413 Payload Too Large`
    PayloadTooLarge,
    /// `415 Unsupported Media Type`
    UnsupportedMediaType,
    /// `431 Request Header Fields Too Large`
    RequestHeaderFieldsTooLarge,
    /// `500 Internal Server Error`
    InternalServerError,
    /// `501 Not Implemented`
    NotImplemented,
    /// `505 HTTP Version Not Supported`
    VersionNotSupported,
}

impl HttpStatus {
    /// Returns the numeric status code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::NotAcceptable => 406,
            Self::LengthRequired => 411,
            Self::PayloadTooLarge => 413,
            Self::UnsupportedMediaType => 415,
            Self::RequestHeaderFieldsTooLarge => 431,
            Self::InternalServerError => 500,
            Self::NotImplemented => 501,
            Self::VersionNotSupported => 505,
        }
    }

    /// Returns the reason phrase sent in the status line.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::NotAcceptable => "Not Acceptable",
            Self::LengthRequired => "Length Required",
            Self::PayloadTooLarge => "Payload Too Large",
            Self::UnsupportedMediaType => "Unsupported Media Type",
            Self::RequestHeaderFieldsTooLarge => "Request Header Fields Too Large",
            Self::InternalServerError => "Internal Server Error",
            Self::NotImplemented => "Not Implemented",
            Self::VersionNotSupported => "HTTP Version Not Supported",
        }
    }

    /// Whether the status reports an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.code() >= 400
    }
}

impl core::fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}
