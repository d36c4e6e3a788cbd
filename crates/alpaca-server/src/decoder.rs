//! Incremental decoder of Alpaca `HTTP/1.1` requests.
//!
//! The decoder never owns input. Each call receives the bytes not yet
//! consumed, advances the slice past every complete token it recognizes,
//! and leaves a partial token for the caller to present again, extended
//! with newly arrived bytes. The outcome is therefore independent of how the
//! request is split across reads.

use core::str::FromStr;

use alpaca::api::{API_VERSION, Api, ApiGroup, ManagementMethod};
use alpaca::devices::DeviceType;
use alpaca::http::{ContentType, HttpHeader, HttpMethod, HttpStatus};
use alpaca::methods::DeviceMethod;
use alpaca::parameters::{Parameter, SensorName};

use log::{debug, error, trace};

use crate::request::{AlpacaRequest, ShortName};

// Request line suffix, the only protocol version served.
const HTTP_VERSION_LINE: &[u8] = b" HTTP/1.1\r\n";
const HTTP_VERSION: &[u8] = b" HTTP/1.1";
// A request line ending with this prefix names another version.
const HTTP_VERSION_PREFIX: &[u8] = b" HTTP/";

// Media ranges admitting an `application/json` response.
const JSON_MEDIA_RANGES: &[&[u8]] = &[b"application/json", b"application/*", b"*/*"];

/// Decoder status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderStatus {
    /// Reset, waiting for the first byte of a request.
    Idle,
    /// Some bytes of a request have been decoded.
    InProgress,
    /// A request has been decoded or rejected.
    ///
    /// A newly created decoder starts in this status, so it must be reset
    /// before the first request.
    Complete,
}

/// Outcome of a [`RequestDecoder::decode`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The request is not complete yet.
    NeedMoreInput,
    /// The request has been completely decoded.
    Complete,
    /// The request is malformed and must be answered with the given status.
    Malformed(HttpStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Method,
    PathStart,
    ApiGroup,
    ManagementPath,
    ManagementMethod,
    DeviceVersion,
    DeviceType,
    DeviceNumber,
    DeviceMethod,
    ParameterName,
    ParameterValue(Parameter),
    SkipParameterValue,
    Version,
    HeaderName,
    HeaderValue(HttpHeader),
    SkipHeaderValue,
    EndOfHeaders,
}

enum Flow {
    Continue(Step),
    NeedMoreInput,
    Complete,
    Error(HttpStatus),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Source {
    Query,
    // Whether the input ends exactly where the body ends.
    Body { at_end: bool },
}

/// Restartable decoder of Alpaca requests.
#[derive(Debug)]
pub struct RequestDecoder {
    capacity: usize,
    status: DecoderStatus,
    step: Step,
    in_body: bool,
    header_bytes: usize,
    content_length: Option<usize>,
    remaining_body: usize,
}

impl RequestDecoder {
    /// Creates a [`RequestDecoder`] for an input buffer of `capacity` bytes.
    ///
    /// The header section of a request and its body cannot be larger than
    /// the input buffer.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            status: DecoderStatus::Complete,
            step: Step::Method,
            in_body: false,
            header_bytes: 0,
            content_length: None,
            remaining_body: 0,
        }
    }

    /// Returns the decoder status.
    #[must_use]
    pub const fn status(&self) -> DecoderStatus {
        self.status
    }

    /// Prepares the decoder and the request for a new request.
    pub fn reset(&mut self, request: &mut AlpacaRequest) {
        request.clear();
        self.status = DecoderStatus::Idle;
        self.step = Step::Method;
        self.in_body = false;
        self.header_bytes = 0;
        self.content_length = None;
        self.remaining_body = 0;
    }

    /// Decodes as much of `input` as possible into `request`.
    ///
    /// `input` is advanced past the consumed bytes. `buffer_is_full` tells
    /// whether the caller has no room left to extend `input`, in which case
    /// a request that cannot progress is rejected as too large.
    /// `peer_half_closed` tells whether the peer will not send any more
    /// bytes, in which case an incomplete request is rejected.
    pub fn decode(
        &mut self,
        request: &mut AlpacaRequest,
        input: &mut &[u8],
        buffer_is_full: bool,
        peer_half_closed: bool,
    ) -> DecodeOutcome {
        match self.status {
            DecoderStatus::Complete => {
                error!("Request decoder used without being reset");
                return DecodeOutcome::Malformed(HttpStatus::InternalServerError);
            }
            _ if input.is_empty() => return DecodeOutcome::NeedMoreInput,
            DecoderStatus::Idle => self.status = DecoderStatus::InProgress,
            DecoderStatus::InProgress => {}
        }

        let start_len = input.len();
        let outcome = if self.in_body {
            self.decode_body(request, input)
        } else {
            self.decode_header(request, input)
        };

        let outcome = match outcome {
            DecodeOutcome::NeedMoreInput if peer_half_closed => {
                debug!("Peer half-closed the connection before the request was complete");
                DecodeOutcome::Malformed(HttpStatus::BadRequest)
            }
            DecodeOutcome::NeedMoreInput if buffer_is_full && input.len() == start_len => {
                debug!("Input buffer is full and no more input can be decoded");
                DecodeOutcome::Malformed(HttpStatus::RequestHeaderFieldsTooLarge)
            }
            outcome => outcome,
        };

        match outcome {
            DecodeOutcome::NeedMoreInput => {}
            DecodeOutcome::Complete => {
                self.status = DecoderStatus::Complete;
                debug!(
                    "Decoded {:?} {:?} request",
                    request.http_method(),
                    request.api()
                );
            }
            DecodeOutcome::Malformed(status) => {
                self.status = DecoderStatus::Complete;
                debug!("Malformed request: {status}");
            }
        }
        outcome
    }

    fn decode_header(&mut self, request: &mut AlpacaRequest, input: &mut &[u8]) -> DecodeOutcome {
        loop {
            let step = self.step;
            trace!("Decoding {step:?}");

            let before = input.len();
            let flow = self.header_step(request, input);

            if step != Step::EndOfHeaders {
                self.header_bytes += before - input.len();
                if self.header_bytes > self.capacity {
                    return DecodeOutcome::Malformed(HttpStatus::RequestHeaderFieldsTooLarge);
                }
            }

            match flow {
                Flow::Continue(next) => {
                    self.step = next;
                    if self.in_body {
                        return self.decode_body(request, input);
                    }
                }
                Flow::NeedMoreInput => return DecodeOutcome::NeedMoreInput,
                Flow::Complete => return DecodeOutcome::Complete,
                Flow::Error(status) => return DecodeOutcome::Malformed(status),
            }
        }
    }

    fn decode_body(&mut self, request: &mut AlpacaRequest, input: &mut &[u8]) -> DecodeOutcome {
        loop {
            if self.remaining_body == 0 {
                return match self.step {
                    Step::ParameterName | Step::SkipParameterValue => DecodeOutcome::Complete,
                    _ => DecodeOutcome::Malformed(HttpStatus::BadRequest),
                };
            }

            trace!("Decoding body {:?}", self.step);

            let limit = input.len().min(self.remaining_body);
            let mut body = &input[..limit];
            let source = Source::Body {
                at_end: limit == self.remaining_body,
            };

            let flow = match self.step {
                Step::ParameterName => Self::parameter_name(&mut body, source),
                Step::ParameterValue(parameter) => {
                    Self::parameter_value(request, parameter, &mut body, source)
                }
                Step::SkipParameterValue => Self::skip_parameter_value(&mut body, source),
                _ => Flow::Error(HttpStatus::InternalServerError),
            };

            let consumed = limit - body.len();
            *input = &input[consumed..];
            self.remaining_body -= consumed;

            match flow {
                Flow::Continue(next) => self.step = next,
                Flow::NeedMoreInput => return DecodeOutcome::NeedMoreInput,
                Flow::Complete => return DecodeOutcome::Complete,
                Flow::Error(status) => return DecodeOutcome::Malformed(status),
            }
        }
    }

    fn header_step(&mut self, request: &mut AlpacaRequest, input: &mut &[u8]) -> Flow {
        match self.step {
            Step::Method => Self::method(request, input),
            Step::PathStart => Self::path_start(input),
            Step::ApiGroup => Self::api_group(request, input),
            Step::ManagementPath => Self::management_path(request, input),
            Step::ManagementMethod => Self::management_method(request, input),
            Step::DeviceVersion => Self::device_version(input),
            Step::DeviceType => Self::device_type(request, input),
            Step::DeviceNumber => Self::device_number(request, input),
            Step::DeviceMethod => Self::device_method(request, input),
            Step::ParameterName => Self::parameter_name(input, Source::Query),
            Step::ParameterValue(parameter) => {
                Self::parameter_value(request, parameter, input, Source::Query)
            }
            Step::SkipParameterValue => Self::skip_parameter_value(input, Source::Query),
            Step::Version => Self::version(input),
            Step::HeaderName => Self::header_name(input),
            Step::HeaderValue(header) => self.header_value(request, header, input),
            Step::SkipHeaderValue => Self::skip_header_value(input),
            Step::EndOfHeaders => self.end_of_headers(request, input),
        }
    }

    fn method(request: &mut AlpacaRequest, input: &mut &[u8]) -> Flow {
        let Some((token, terminator)) = split_token(input, is_name_char) else {
            return Flow::NeedMoreInput;
        };
        if token.is_empty() || terminator != b' ' {
            return Flow::Error(HttpStatus::BadRequest);
        }

        match HttpMethod::from_name(token_str(token)) {
            None => Flow::Error(HttpStatus::NotImplemented),
            Some(method) if !method.is_supported() => Flow::Error(HttpStatus::MethodNotAllowed),
            Some(method) => {
                request.set_http_method(method);
                *input = &input[token.len() + 1..];
                Flow::Continue(Step::PathStart)
            }
        }
    }

    fn path_start(input: &mut &[u8]) -> Flow {
        match input.first() {
            None => Flow::NeedMoreInput,
            Some(b'/') => {
                *input = &input[1..];
                Flow::Continue(Step::ApiGroup)
            }
            Some(_) => Flow::Error(HttpStatus::BadRequest),
        }
    }

    fn api_group(request: &mut AlpacaRequest, input: &mut &[u8]) -> Flow {
        let Some((segment, terminator)) = split_token(input, is_name_char) else {
            return Flow::NeedMoreInput;
        };

        if segment.is_empty() {
            if !is_end_of_path(terminator) {
                return Flow::Error(HttpStatus::BadRequest);
            }
            request.set_api(Api::ServerStatus);
            return require_read(request).unwrap_or_else(|| end_of_path(input));
        }

        let group = ApiGroup::from_name(token_str(segment));
        match (group, terminator) {
            (Some(ApiGroup::Device), b'/') => {
                request.set_api(Api::DeviceApi);
                *input = &input[segment.len() + 1..];
                Flow::Continue(Step::DeviceVersion)
            }
            (Some(ApiGroup::Setup), b'/') => {
                request.set_api(Api::DeviceSetup);
                *input = &input[segment.len() + 1..];
                require_read(request).unwrap_or(Flow::Continue(Step::DeviceVersion))
            }
            (Some(ApiGroup::Setup), terminator) if is_end_of_path(terminator) => {
                request.set_api(Api::ServerSetup);
                *input = &input[segment.len()..];
                require_read(request).unwrap_or_else(|| end_of_path(input))
            }
            (Some(ApiGroup::Management), b'/') => {
                *input = &input[segment.len() + 1..];
                require_read(request).unwrap_or(Flow::Continue(Step::ManagementPath))
            }
            _ => Flow::Error(HttpStatus::BadRequest),
        }
    }

    fn management_path(request: &mut AlpacaRequest, input: &mut &[u8]) -> Flow {
        let Some((segment, terminator)) = split_token(input, is_name_char) else {
            return Flow::NeedMoreInput;
        };

        match (segment, terminator) {
            (b"apiversions", terminator) if is_end_of_path(terminator) => {
                request.set_api(Api::ManagementApiVersions);
                *input = &input[segment.len()..];
                end_of_path(input)
            }
            (segment, b'/') if segment == API_VERSION.as_bytes() => {
                *input = &input[segment.len() + 1..];
                Flow::Continue(Step::ManagementMethod)
            }
            _ => Flow::Error(HttpStatus::BadRequest),
        }
    }

    fn management_method(request: &mut AlpacaRequest, input: &mut &[u8]) -> Flow {
        let Some((segment, terminator)) = split_token(input, is_name_char) else {
            return Flow::NeedMoreInput;
        };
        if !is_end_of_path(terminator) {
            return Flow::Error(HttpStatus::BadRequest);
        }

        let api = match ManagementMethod::from_name(token_str(segment)) {
            Some(ManagementMethod::Description) => Api::ManagementDescription,
            Some(ManagementMethod::ConfiguredDevices) => Api::ManagementConfiguredDevices,
            None => return Flow::Error(HttpStatus::BadRequest),
        };
        request.set_api(api);
        *input = &input[segment.len()..];
        end_of_path(input)
    }

    fn device_version(input: &mut &[u8]) -> Flow {
        let Some((segment, terminator)) = split_token(input, is_name_char) else {
            return Flow::NeedMoreInput;
        };
        if segment != API_VERSION.as_bytes() || terminator != b'/' {
            return Flow::Error(HttpStatus::BadRequest);
        }
        *input = &input[segment.len() + 1..];
        Flow::Continue(Step::DeviceType)
    }

    fn device_type(request: &mut AlpacaRequest, input: &mut &[u8]) -> Flow {
        let Some((segment, terminator)) = split_token(input, is_name_char) else {
            return Flow::NeedMoreInput;
        };
        let Some(device_type) = DeviceType::from_path_segment(token_str(segment)) else {
            return Flow::Error(HttpStatus::BadRequest);
        };
        if terminator != b'/' {
            return Flow::Error(HttpStatus::BadRequest);
        }
        request.set_device_type(device_type);
        *input = &input[segment.len() + 1..];
        Flow::Continue(Step::DeviceNumber)
    }

    fn device_number(request: &mut AlpacaRequest, input: &mut &[u8]) -> Flow {
        let Some((digits, terminator)) = split_token(input, |b| b.is_ascii_digit()) else {
            return Flow::NeedMoreInput;
        };
        if terminator != b'/' {
            return Flow::Error(HttpStatus::BadRequest);
        }
        let Ok(device_number) = parse_unsigned::<u32>(digits) else {
            return Flow::Error(HttpStatus::BadRequest);
        };
        request.set_device_number(device_number);
        *input = &input[digits.len() + 1..];
        Flow::Continue(Step::DeviceMethod)
    }

    fn device_method(request: &mut AlpacaRequest, input: &mut &[u8]) -> Flow {
        let Some((segment, terminator)) = split_token(input, is_name_char) else {
            return Flow::NeedMoreInput;
        };
        if !is_end_of_path(terminator) {
            return Flow::Error(HttpStatus::BadRequest);
        }
        let Some(device_type) = request.device_type() else {
            return Flow::Error(HttpStatus::InternalServerError);
        };

        let method = DeviceMethod::from_name(token_str(segment));
        let method = if request.api() == Some(Api::DeviceSetup) {
            method.filter(|method| *method == DeviceMethod::Setup)
        } else {
            method.filter(|method| method.applies_to(device_type))
        };
        let Some(method) = method else {
            return Flow::Error(HttpStatus::BadRequest);
        };

        request.set_device_method(method);
        *input = &input[segment.len()..];
        end_of_path(input)
    }

    fn parameter_name(input: &mut &[u8], source: Source) -> Flow {
        match input.first() {
            None if source == (Source::Body { at_end: true }) => return Flow::Complete,
            None => return Flow::NeedMoreInput,
            Some(b'&') => {
                let separators = input.iter().take_while(|b| **b == b'&').count();
                *input = &input[separators..];
                return Flow::Continue(Step::ParameterName);
            }
            Some(b' ') if source == Source::Query => return Flow::Continue(Step::Version),
            Some(_) => {}
        }

        let Some((name, terminator)) = split_token(input, is_name_char) else {
            return match source {
                Source::Body { at_end: true } => Flow::Error(HttpStatus::BadRequest),
                _ => Flow::NeedMoreInput,
            };
        };
        if name.is_empty() || terminator != b'=' {
            return Flow::Error(HttpStatus::BadRequest);
        }
        *input = &input[name.len() + 1..];

        match Parameter::from_name_ignore_case(token_str(name)) {
            Some(parameter) if parameter.is_recorded() => {
                Flow::Continue(Step::ParameterValue(parameter))
            }
            _ => Flow::Continue(Step::SkipParameterValue),
        }
    }

    fn parameter_value(
        request: &mut AlpacaRequest,
        parameter: Parameter,
        input: &mut &[u8],
        source: Source,
    ) -> Flow {
        let value = match split_token(input, is_value_char) {
            Some((value, terminator)) => {
                if !is_parameter_separator(terminator, source) {
                    return Flow::Error(HttpStatus::BadRequest);
                }
                value
            }
            None if source == (Source::Body { at_end: true }) => *input,
            None => return Flow::NeedMoreInput,
        };

        if let Err(status) = store_parameter(request, parameter, value) {
            debug!("Invalid value for parameter {parameter}");
            return Flow::Error(status);
        }
        *input = &input[value.len()..];
        Flow::Continue(Step::ParameterName)
    }

    fn skip_parameter_value(input: &mut &[u8], source: Source) -> Flow {
        let skipped = input.iter().take_while(|b| is_value_char(**b)).count();
        *input = &input[skipped..];

        match input.first() {
            None if source == (Source::Body { at_end: true }) => {
                Flow::Continue(Step::ParameterName)
            }
            None => Flow::NeedMoreInput,
            Some(terminator) if is_parameter_separator(*terminator, source) => {
                Flow::Continue(Step::ParameterName)
            }
            Some(_) => Flow::Error(HttpStatus::BadRequest),
        }
    }

    fn version(input: &mut &[u8]) -> Flow {
        if input.starts_with(HTTP_VERSION_LINE) {
            *input = &input[HTTP_VERSION_LINE.len()..];
            Flow::Continue(Step::HeaderName)
        } else if HTTP_VERSION_LINE.starts_with(input) {
            Flow::NeedMoreInput
        } else if input.starts_with(HTTP_VERSION) {
            // Served version, but the line does not end with CRLF.
            Flow::Error(HttpStatus::BadRequest)
        } else if input.starts_with(HTTP_VERSION_PREFIX) {
            Flow::Error(HttpStatus::VersionNotSupported)
        } else {
            Flow::Error(HttpStatus::BadRequest)
        }
    }

    fn header_name(input: &mut &[u8]) -> Flow {
        match input.first() {
            None => return Flow::NeedMoreInput,
            Some(b'\r') => return Flow::Continue(Step::EndOfHeaders),
            Some(_) => {}
        }

        let Some((name, terminator)) = split_token(input, is_name_char) else {
            return Flow::NeedMoreInput;
        };
        if name.is_empty() || terminator != b':' {
            return Flow::Error(HttpStatus::BadRequest);
        }
        *input = &input[name.len() + 1..];

        match HttpHeader::from_name_ignore_case(token_str(name)) {
            Some(header) => Flow::Continue(Step::HeaderValue(header)),
            None => Flow::Continue(Step::SkipHeaderValue),
        }
    }

    fn header_value(
        &mut self,
        request: &mut AlpacaRequest,
        header: HttpHeader,
        input: &mut &[u8],
    ) -> Flow {
        let whitespace = input.iter().take_while(|b| is_ows(**b)).count();
        *input = &input[whitespace..];

        let Some(end) = input.iter().position(|b| *b == b'\r') else {
            return if input.iter().all(|b| is_field_content(*b)) {
                Flow::NeedMoreInput
            } else {
                Flow::Error(HttpStatus::BadRequest)
            };
        };

        let value = &input[..end];
        if !value.iter().all(|b| is_field_content(*b)) {
            return Flow::Error(HttpStatus::BadRequest);
        }
        match input.get(end + 1) {
            None => return Flow::NeedMoreInput,
            Some(b'\n') => {}
            Some(_) => return Flow::Error(HttpStatus::BadRequest),
        }

        if let Err(status) = self.store_header(request, header, trim_trailing_ows(value)) {
            debug!("Invalid value for header {header}");
            return Flow::Error(status);
        }
        *input = &input[end + 2..];
        Flow::Continue(Step::HeaderName)
    }

    fn skip_header_value(input: &mut &[u8]) -> Flow {
        let Some(end) = input.iter().position(|b| *b == b'\r') else {
            *input = &input[input.len()..];
            return Flow::NeedMoreInput;
        };
        *input = &input[end..];

        match input.get(1) {
            None => Flow::NeedMoreInput,
            Some(b'\n') => {
                *input = &input[2..];
                Flow::Continue(Step::HeaderName)
            }
            Some(_) => Flow::Error(HttpStatus::BadRequest),
        }
    }

    fn end_of_headers(&mut self, request: &AlpacaRequest, input: &mut &[u8]) -> Flow {
        match *input {
            [] | [b'\r'] => return Flow::NeedMoreInput,
            [b'\r', b'\n', ..] => *input = &input[2..],
            _ => return Flow::Error(HttpStatus::BadRequest),
        }

        if !request.http_method().is_some_and(|method| method.has_body()) {
            return Flow::Complete;
        }

        match self.content_length {
            None => Flow::Error(HttpStatus::LengthRequired),
            Some(0) => Flow::Complete,
            Some(length) => {
                self.remaining_body = length;
                self.in_body = true;
                Flow::Continue(Step::ParameterName)
            }
        }
    }

    fn store_header(
        &mut self,
        request: &mut AlpacaRequest,
        header: HttpHeader,
        value: &[u8],
    ) -> Result<(), HttpStatus> {
        let has_body = request.http_method().is_some_and(|method| method.has_body());

        match header {
            HttpHeader::ContentLength => {
                if self.content_length.is_some() {
                    return Err(HttpStatus::BadRequest);
                }
                let length =
                    parse_unsigned::<usize>(value).map_err(|_| HttpStatus::BadRequest)?;
                if length > 0 && !has_body {
                    return Err(HttpStatus::BadRequest);
                }
                if length > self.capacity {
                    return Err(HttpStatus::PayloadTooLarge);
                }
                self.content_length = Some(length);
            }
            HttpHeader::ContentType => {
                if !has_body {
                    return Err(HttpStatus::BadRequest);
                }
                if !value.eq_ignore_ascii_case(ContentType::FormUrlEncoded.name().as_bytes()) {
                    return Err(HttpStatus::UnsupportedMediaType);
                }
            }
            HttpHeader::Connection => {
                if value
                    .split(|b| *b == b',')
                    .any(|option| trim_ows(option).eq_ignore_ascii_case(b"close"))
                {
                    request.set_do_close();
                }
            }
            HttpHeader::Accept => request.set_accepts_json(accepts_json(value)),
        }
        Ok(())
    }
}

// Finds the longest prefix of `input` matched by `matcher`, returning it
// together with the byte following it. Returns `None` when every byte
// matches, since the token may continue in the next input.
fn split_token(input: &[u8], matcher: impl Fn(u8) -> bool) -> Option<(&[u8], u8)> {
    let end = input.iter().position(|b| !matcher(*b))?;
    Some((&input[..end], input[end]))
}

// Tokens are made of ASCII characters only.
fn token_str(token: &[u8]) -> &str {
    core::str::from_utf8(token).unwrap_or_default()
}

const fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.')
}

const fn is_value_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'+' | b'_' | b'=' | b'%' | b'.')
}

const fn is_end_of_path(b: u8) -> bool {
    matches!(b, b' ' | b'?')
}

fn is_parameter_separator(b: u8, source: Source) -> bool {
    b == b'&' || (b == b' ' && source == Source::Query)
}

const fn is_ows(b: u8) -> bool {
    matches!(b, b' ' | b'\t')
}

const fn is_field_content(b: u8) -> bool {
    matches!(b, b' '..=b'~' | b'\t')
}

fn trim_trailing_ows(mut value: &[u8]) -> &[u8] {
    while let [rest @ .., last] = value {
        if !is_ows(*last) {
            break;
        }
        value = rest;
    }
    value
}

fn trim_ows(value: &[u8]) -> &[u8] {
    let start = value.iter().take_while(|b| is_ows(**b)).count();
    trim_trailing_ows(&value[start..])
}

fn end_of_path(input: &mut &[u8]) -> Flow {
    match input.first() {
        Some(b'?') => {
            *input = &input[1..];
            Flow::Continue(Step::ParameterName)
        }
        Some(b' ') => Flow::Continue(Step::Version),
        _ => Flow::Error(HttpStatus::BadRequest),
    }
}

// Requests outside of the device API can only read.
fn require_read(request: &AlpacaRequest) -> Option<Flow> {
    (!request.is_read()).then_some(Flow::Error(HttpStatus::MethodNotAllowed))
}

fn accepts_json(value: &[u8]) -> bool {
    value.split(|b| *b == b',').any(|range| {
        let media_type = range.split(|b| *b == b';').next().unwrap_or_default();
        let media_type = trim_ows(media_type);
        JSON_MEDIA_RANGES
            .iter()
            .any(|accepted| media_type.eq_ignore_ascii_case(accepted))
    })
}

fn parse_unsigned<T: FromStr>(digits: &[u8]) -> Result<T, HttpStatus> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(HttpStatus::BadRequest);
    }
    token_str(digits)
        .parse()
        .map_err(|_| HttpStatus::BadRequest)
}

fn parse_signed(value: &[u8]) -> Result<i32, HttpStatus> {
    match value {
        [b'-', digits @ ..] => {
            let magnitude = parse_unsigned::<i64>(digits)?;
            i32::try_from(-magnitude).map_err(|_| HttpStatus::BadRequest)
        }
        digits => parse_unsigned(digits),
    }
}

fn parse_float(value: &[u8]) -> Result<f64, HttpStatus> {
    token_str(value)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(HttpStatus::BadRequest)
}

fn parse_bool(value: &[u8]) -> Result<bool, HttpStatus> {
    if value.eq_ignore_ascii_case(b"true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case(b"false") {
        Ok(false)
    } else {
        Err(HttpStatus::BadRequest)
    }
}

fn store_parameter(
    request: &mut AlpacaRequest,
    parameter: Parameter,
    value: &[u8],
) -> Result<(), HttpStatus> {
    match parameter {
        Parameter::ClientId => request.set_client_id(parse_unsigned(value)?),
        Parameter::ClientTransactionId => request.set_client_transaction_id(parse_unsigned(value)?),
        Parameter::Id => request.set_id(parse_unsigned(value)?),
        Parameter::Brightness => request.set_brightness(parse_signed(value)?),
        Parameter::Value => request.set_value(parse_float(value)?),
        Parameter::AveragePeriod => request.set_average_period(parse_float(value)?),
        Parameter::Connected => request.set_connected(parse_bool(value)?),
        Parameter::State => request.set_state(parse_bool(value)?),
        Parameter::SensorName => request.set_sensor_name(
            SensorName::from_name_ignore_case(token_str(value)).ok_or(HttpStatus::BadRequest)?,
        ),
        Parameter::Name => request
            .set_name(ShortName::from_form_value(value).ok_or(HttpStatus::BadRequest)?),
        Parameter::Action | Parameter::Command | Parameter::Parameters | Parameter::Raw => {}
    }
    Ok(())
}
