use core::fmt::{Display, Write};

use alpaca::http::{ContentType, HttpHeader, HttpStatus};

use serde::Serialize;

use crate::error::{Error, ErrorKind, Result};

/// Value of the `Server` header of every response.
pub const SERVER_NAME: &str = concat!("alpaca-server/", env!("CARGO_PKG_VERSION"));

// Terminates a JSON body, counted in its length.
const JSON_BODY_END: &[u8] = b"\r\n";

struct Headers {
    status: HttpStatus,
    content_type: ContentType,
    close: bool,
}

impl Headers {
    const fn json(close: bool) -> Self {
        Self {
            status: HttpStatus::Ok,
            content_type: ContentType::Json,
            close,
        }
    }

    const fn html(close: bool) -> Self {
        Self {
            status: HttpStatus::Ok,
            content_type: ContentType::TextHtml,
            close,
        }
    }

    const fn http_error(status: HttpStatus) -> Self {
        Self {
            status,
            content_type: ContentType::TextPlain,
            close: true,
        }
    }

    fn write(&self, out: &mut impl Write, length: usize) -> core::fmt::Result {
        write!(out, "HTTP/1.1 {}\r\nServer: {SERVER_NAME}\r\n", self.status)?;
        if self.close {
            write!(out, "{}: close\r\n", HttpHeader::Connection)?;
        }
        write!(
            out,
            "{}: {}\r\n{}: {length}\r\n\r\n",
            HttpHeader::ContentType,
            self.content_type,
            HttpHeader::ContentLength
        )
    }
}

// Measures formatted output without storing it.
#[derive(Default)]
struct ByteCounter(usize);

impl ByteCounter {
    fn measure(value: &dyn Display) -> Result<usize> {
        let mut counter = Self::default();
        write!(counter, "{value}")
            .map_err(|_| Error::new(ErrorKind::Serialization, "Cannot format the response"))?;
        Ok(counter.0)
    }
}

impl Write for ByteCounter {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

/// Writer of a single `HTTP` response into a fixed output buffer.
///
/// The writer never grows the buffer and never allocates: bodies are
/// serialized or formatted in place, and their length is measured before
/// the headers are written. When a response does not fit, the writer is
/// marked as overflowed and the bytes written so far must be discarded.
pub struct ResponseWriter<'a> {
    buffer: &'a mut [u8],
    len: usize,
    overflowed: bool,
    omit_body: bool,
    status: Option<HttpStatus>,
    close: bool,
}

impl<'a> ResponseWriter<'a> {
    /// Creates a [`ResponseWriter`] over an output buffer.
    ///
    /// When `omit_body` is `true`, as for a `HEAD` request, only the status
    /// line and the headers are written, while `Content-Length` still
    /// reports the length of the omitted body.
    #[must_use]
    #[inline]
    pub fn new(buffer: &'a mut [u8], omit_body: bool) -> Self {
        Self {
            buffer,
            len: 0,
            overflowed: false,
            omit_body,
            status: None,
            close: false,
        }
    }

    /// Writes a `200 OK` response with a serialized `JSON` body.
    ///
    /// The body is serialized straight into the free part of the buffer and
    /// then moved behind the headers.
    ///
    /// # Errors
    ///
    /// Fails when the response does not fit the output buffer.
    pub fn json<T: Serialize>(&mut self, value: &T, close: bool) -> Result<()> {
        let headers = Headers::json(close);
        self.status = Some(headers.status);
        self.close = headers.close;

        let start = self.len;
        let body = serde_json_core::to_slice(value, &mut self.buffer[start..]).map_err(|e| {
            self.overflowed = true;
            Error::from(e)
        })?;
        let length = body + JSON_BODY_END.len();

        let mut counter = ByteCounter::default();
        // Counting never fails.
        let _ = headers.write(&mut counter, length);
        let head = counter.0;

        if self.omit_body {
            return self.write_head(&headers, length);
        }
        if start + head + length > self.buffer.len() {
            return Err(self.too_large());
        }
        self.buffer.copy_within(start..start + body, start + head);
        self.write_head(&headers, length)?;
        self.len += body;
        self.push(JSON_BODY_END);
        Ok(())
    }

    /// Writes a `200 OK` response with an `HTML` page.
    ///
    /// # Errors
    ///
    /// Fails when the response does not fit the output buffer.
    pub fn html(&mut self, page: impl Display, close: bool) -> Result<()> {
        self.respond(&Headers::html(close), &page)
    }

    /// Writes an `HTTP` error with a one-line plain text body.
    ///
    /// The response always asks the client to close the connection.
    ///
    /// # Errors
    ///
    /// Fails when the response does not fit the output buffer.
    pub fn http_error(&mut self, status: HttpStatus, message: impl Display) -> Result<()> {
        self.respond(&Headers::http_error(status), &message)
    }

    /// Discards everything written so far.
    pub fn clear(&mut self) {
        self.len = 0;
        self.overflowed = false;
        self.status = None;
        self.close = false;
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been written.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether a response did not fit the output buffer.
    #[must_use]
    pub const fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Returns the status of the written response.
    #[must_use]
    pub const fn status(&self) -> Option<HttpStatus> {
        self.status
    }

    /// Whether the written response asks the client to close the connection.
    #[must_use]
    pub const fn closes(&self) -> bool {
        self.close
    }

    fn respond(&mut self, headers: &Headers, body: &dyn Display) -> Result<()> {
        let length = ByteCounter::measure(body)?;
        self.status = Some(headers.status);
        self.close = headers.close;

        self.write_head(headers, length)?;
        if !self.omit_body && write!(self, "{body}").is_err() {
            return Err(self.too_large());
        }
        Ok(())
    }

    fn write_head(&mut self, headers: &Headers, length: usize) -> Result<()> {
        if headers.write(self, length).is_err() || self.overflowed {
            return Err(self.too_large());
        }
        Ok(())
    }

    fn too_large(&mut self) -> Error {
        self.overflowed = true;
        Error::new(
            ErrorKind::ResponseTooLarge,
            "Response does not fit the output buffer",
        )
    }

    fn push(&mut self, bytes: &[u8]) {
        if self.overflowed {
            return;
        }
        match self.buffer.get_mut(self.len..self.len + bytes.len()) {
            Some(free) => {
                free.copy_from_slice(bytes);
                self.len += bytes.len();
            }
            None => self.overflowed = true,
        }
    }
}

impl Write for ResponseWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.push(s.as_bytes());
        if self.overflowed {
            Err(core::fmt::Error)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use alpaca::http::HttpStatus;
    use alpaca::response::MethodResponse;

    use crate::error::ErrorKind;

    use super::{ResponseWriter, SERVER_NAME};

    fn text<'w>(writer: &'w ResponseWriter<'_>) -> &'w str {
        core::str::from_utf8(writer.as_bytes()).unwrap()
    }

    #[test]
    fn test_json_response() {
        let mut buffer = [0; 512];
        let mut writer = ResponseWriter::new(&mut buffer, false);

        let response = MethodResponse::ok(Some(true), Some(4), 7);
        writer.json(&response, false).unwrap();

        let body = r#"{"Value":true,"ClientTransactionID":4,"ServerTransactionID":7,"ErrorNumber":0,"ErrorMessage":""}"#;
        let expected = alloc::format!(
            "HTTP/1.1 200 OK\r\nServer: {SERVER_NAME}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}\r\n",
            body.len() + 2
        );
        assert_eq!(text(&writer), expected);
        assert_eq!(writer.status(), Some(HttpStatus::Ok));
        assert!(!writer.closes());
    }

    #[test]
    fn test_json_response_fits_exactly() {
        let response = MethodResponse::ok(Some(12u32), None, 1);
        let mut buffer = [0; 512];
        let mut writer = ResponseWriter::new(&mut buffer, false);
        writer.json(&response, true).unwrap();
        let size = writer.len();

        let mut buffer = alloc::vec![0; size];
        let mut writer = ResponseWriter::new(&mut buffer, false);
        writer.json(&response, true).unwrap();
        assert_eq!(writer.len(), size);
        assert!(text(&writer).ends_with("\"ErrorMessage\":\"\"}\r\n"));

        // The body fits, but not once moved behind the headers.
        let mut buffer = alloc::vec![0; size - 1];
        let mut writer = ResponseWriter::new(&mut buffer, false);
        let error = writer.json(&response, true).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ResponseTooLarge);
        assert!(writer.overflowed());

        // Not even the body fits.
        let mut buffer = [0; 16];
        let mut writer = ResponseWriter::new(&mut buffer, false);
        let error = writer.json(&response, true).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ResponseTooLarge);
        assert!(writer.overflowed());
    }

    #[test]
    fn test_head_json_response() {
        let mut buffer = [0; 512];
        let mut writer = ResponseWriter::new(&mut buffer, true);

        writer
            .json(&MethodResponse::ok(Some("Relay"), None, 3), false)
            .unwrap();

        let body = r#"{"Value":"Relay","ServerTransactionID":3,"ErrorNumber":0,"ErrorMessage":""}"#;
        let expected = alloc::format!(
            "HTTP/1.1 200 OK\r\nServer: {SERVER_NAME}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
            body.len() + 2
        );
        assert_eq!(text(&writer), expected);
    }

    #[test]
    fn test_formatted_body() {
        let mut buffer = [0; 512];
        let mut writer = ResponseWriter::new(&mut buffer, false);

        let device = "Switch/3";
        writer
            .http_error(
                HttpStatus::BadRequest,
                format_args!("api {device}: Unknown device"),
            )
            .unwrap();

        let response = text(&writer);
        assert!(response.contains("Content-Length: 28\r\n"));
        assert!(response.ends_with("\r\n\r\napi Switch/3: Unknown device"));
    }

    #[test]
    fn test_head_response() {
        let mut buffer = [0; 512];
        let mut writer = ResponseWriter::new(&mut buffer, true);

        writer.html("<html></html>", true).unwrap();

        let expected = alloc::format!(
            "HTTP/1.1 200 OK\r\nServer: {SERVER_NAME}\r\nConnection: close\r\nContent-Type: text/html\r\nContent-Length: 13\r\n\r\n"
        );
        assert_eq!(text(&writer), expected);
        assert!(writer.closes());
    }

    #[test]
    fn test_http_error() {
        let mut buffer = [0; 512];
        let mut writer = ResponseWriter::new(&mut buffer, false);

        writer
            .http_error(HttpStatus::BadRequest, "api Camera/0: Unknown device")
            .unwrap();

        let response = text(&writer);
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(response.contains("Connection: close\r\n"));
        assert!(response.contains("Content-Type: text/plain\r\n"));
        assert!(response.contains("Content-Length: 28\r\n"));
        assert!(response.ends_with("\r\n\r\napi Camera/0: Unknown device"));
        assert!(writer.closes());
    }

    #[test]
    fn test_overflow() {
        let mut buffer = [0; 64];
        let mut writer = ResponseWriter::new(&mut buffer, false);

        let page = "x".repeat(128);
        let error = writer.html(&page, false).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ResponseTooLarge);
        assert!(writer.overflowed());

        writer.clear();
        assert!(writer.is_empty());
        assert!(!writer.overflowed());
        let _ = writer
            .http_error(HttpStatus::InternalServerError, "")
            .unwrap_err();

        let mut buffer = [0; 256];
        let mut writer = ResponseWriter::new(&mut buffer, false);
        writer
            .http_error(HttpStatus::InternalServerError, "Too large")
            .unwrap();
        assert!(text(&writer).ends_with("Too large"));
    }
}
