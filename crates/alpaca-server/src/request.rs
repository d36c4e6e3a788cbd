use alpaca::api::{Api, ApiGroup};
use alpaca::devices::DeviceType;
use alpaca::http::HttpMethod;
use alpaca::methods::DeviceMethod;
use alpaca::parameters::SensorName;

/// Maximum number of bytes of a decoded [`ShortName`].
pub const SHORT_NAME_CAPACITY: usize = 32;

/// A short UTF-8 string stored inline, such as a switch name sent by a
/// client.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ShortName {
    bytes: [u8; SHORT_NAME_CAPACITY],
    len: u8,
}

impl ShortName {
    /// Creates an empty [`ShortName`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; SHORT_NAME_CAPACITY],
            len: 0,
        }
    }

    /// Creates a [`ShortName`] from a text, if it fits.
    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        let mut name = Self::new();
        for b in text.bytes() {
            name.push(b)?;
        }
        Some(name)
    }

    /// Decodes a form-urlencoded value, where `+` stands for a space and
    /// `%XX` for the byte with hexadecimal value `XX`.
    ///
    /// Returns `None` when the value is malformed, too long, or not UTF-8.
    #[must_use]
    pub fn from_form_value(value: &[u8]) -> Option<Self> {
        let mut name = Self::new();
        let mut bytes = value.iter().copied();
        while let Some(b) = bytes.next() {
            let decoded = match b {
                b'+' => b' ',
                b'%' => {
                    let high = hex_digit(bytes.next()?)?;
                    let low = hex_digit(bytes.next()?)?;
                    (high << 4) | low
                }
                b => b,
            };
            name.push(decoded)?;
        }
        let _ = core::str::from_utf8(name.as_bytes()).ok()?;
        Some(name)
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only valid UTF-8 ever reaches the buffer.
        core::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Returns the name bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// Whether the name is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn push(&mut self, b: u8) -> Option<()> {
        let slot = self.bytes.get_mut(usize::from(self.len))?;
        *slot = b;
        self.len += 1;
        Some(())
    }
}

impl Default for ShortName {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for ShortName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self.as_str(), f)
    }
}

impl core::fmt::Display for ShortName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// An Alpaca request, filled in while decoding.
///
/// Every field is meaningful only when present. A request is cleared at the
/// start of each decoding and then read once to produce the response.
#[derive(Debug, Clone, PartialEq)]
pub struct AlpacaRequest {
    http_method: Option<HttpMethod>,
    api_group: Option<ApiGroup>,
    api: Option<Api>,
    device_type: Option<DeviceType>,
    device_number: Option<u32>,
    device_method: Option<DeviceMethod>,

    client_id: Option<u32>,
    client_transaction_id: Option<u32>,
    server_transaction_id: Option<u32>,

    connected: Option<bool>,
    state: Option<bool>,
    value: Option<f64>,
    average_period: Option<f64>,
    id: Option<u32>,
    brightness: Option<i32>,
    sensor_name: Option<SensorName>,
    name: Option<ShortName>,

    do_close: bool,
    accepts_json: bool,
}

impl Default for AlpacaRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl AlpacaRequest {
    /// Creates an empty [`AlpacaRequest`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            http_method: None,
            api_group: None,
            api: None,
            device_type: None,
            device_number: None,
            device_method: None,
            client_id: None,
            client_transaction_id: None,
            server_transaction_id: None,
            connected: None,
            state: None,
            value: None,
            average_period: None,
            id: None,
            brightness: None,
            sensor_name: None,
            name: None,
            do_close: false,
            accepts_json: true,
        }
    }

    /// Clears every field.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Returns the `HTTP` method.
    #[must_use]
    pub const fn http_method(&self) -> Option<HttpMethod> {
        self.http_method
    }

    /// Returns the [`ApiGroup`] of the path.
    #[must_use]
    pub const fn api_group(&self) -> Option<ApiGroup> {
        self.api_group
    }

    /// Returns the [`Api`] addressed by the path.
    #[must_use]
    pub const fn api(&self) -> Option<Api> {
        self.api
    }

    /// Returns the device type of a device path.
    #[must_use]
    pub const fn device_type(&self) -> Option<DeviceType> {
        self.device_type
    }

    /// Returns the device number of a device path.
    #[must_use]
    pub const fn device_number(&self) -> Option<u32> {
        self.device_number
    }

    /// Returns the method of a device path.
    #[must_use]
    pub const fn device_method(&self) -> Option<DeviceMethod> {
        self.device_method
    }

    /// Returns the `ClientID` parameter.
    #[must_use]
    pub const fn client_id(&self) -> Option<u32> {
        self.client_id
    }

    /// Returns the `ClientTransactionID` parameter.
    #[must_use]
    pub const fn client_transaction_id(&self) -> Option<u32> {
        self.client_transaction_id
    }

    /// Returns the transaction number assigned by the server.
    #[must_use]
    pub const fn server_transaction_id(&self) -> Option<u32> {
        self.server_transaction_id
    }

    /// Returns the `Connected` parameter.
    #[must_use]
    pub const fn connected(&self) -> Option<bool> {
        self.connected
    }

    /// Returns the `State` parameter.
    #[must_use]
    pub const fn state(&self) -> Option<bool> {
        self.state
    }

    /// Returns the `Value` parameter.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        self.value
    }

    /// Returns the `AveragePeriod` parameter.
    #[must_use]
    pub const fn average_period(&self) -> Option<f64> {
        self.average_period
    }

    /// Returns the `Id` parameter.
    #[must_use]
    pub const fn id(&self) -> Option<u32> {
        self.id
    }

    /// Returns the `Brightness` parameter.
    #[must_use]
    pub const fn brightness(&self) -> Option<i32> {
        self.brightness
    }

    /// Returns the `SensorName` parameter.
    #[must_use]
    pub const fn sensor_name(&self) -> Option<SensorName> {
        self.sensor_name
    }

    /// Returns the `Name` parameter.
    #[must_use]
    pub const fn name(&self) -> Option<&ShortName> {
        self.name.as_ref()
    }

    /// Whether the client asked to close the connection after the response.
    #[must_use]
    pub const fn do_close(&self) -> bool {
        self.do_close
    }

    /// Whether the client accepts an `application/json` response.
    #[must_use]
    pub const fn accepts_json(&self) -> bool {
        self.accepts_json
    }

    /// Whether the method only reads state.
    #[must_use]
    pub fn is_read(&self) -> bool {
        self.http_method.is_some_and(|method| method.is_read())
    }

    pub(crate) fn set_http_method(&mut self, method: HttpMethod) {
        self.http_method = Some(method);
    }

    pub(crate) fn set_api(&mut self, api: Api) {
        self.api_group = api.group();
        self.api = Some(api);
    }

    pub(crate) fn set_device_type(&mut self, device_type: DeviceType) {
        self.device_type = Some(device_type);
    }

    pub(crate) fn set_device_number(&mut self, device_number: u32) {
        self.device_number = Some(device_number);
    }

    pub(crate) fn set_device_method(&mut self, device_method: DeviceMethod) {
        self.device_method = Some(device_method);
    }

    pub(crate) fn set_client_id(&mut self, client_id: u32) {
        self.client_id = Some(client_id);
    }

    pub(crate) fn set_client_transaction_id(&mut self, id: u32) {
        self.client_transaction_id = Some(id);
    }

    pub(crate) fn set_server_transaction_id(&mut self, id: u32) {
        self.server_transaction_id = Some(id);
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = Some(connected);
    }

    pub(crate) fn set_state(&mut self, state: bool) {
        self.state = Some(state);
    }

    pub(crate) fn set_value(&mut self, value: f64) {
        self.value = Some(value);
    }

    pub(crate) fn set_average_period(&mut self, average_period: f64) {
        self.average_period = Some(average_period);
    }

    pub(crate) fn set_id(&mut self, id: u32) {
        self.id = Some(id);
    }

    pub(crate) fn set_brightness(&mut self, brightness: i32) {
        self.brightness = Some(brightness);
    }

    pub(crate) fn set_sensor_name(&mut self, sensor_name: SensorName) {
        self.sensor_name = Some(sensor_name);
    }

    pub(crate) fn set_name(&mut self, name: ShortName) {
        self.name = Some(name);
    }

    pub(crate) fn set_do_close(&mut self) {
        self.do_close = true;
    }

    pub(crate) fn set_accepts_json(&mut self, accepts_json: bool) {
        self.accepts_json = accepts_json;
    }
}

#[cfg(test)]
mod tests {
    use alpaca::api::{Api, ApiGroup};
    use alpaca::http::HttpMethod;

    use super::{AlpacaRequest, SHORT_NAME_CAPACITY, ShortName};

    #[test]
    fn test_short_name() {
        let name = ShortName::from_form_value(b"Roof+relay%20%231").unwrap();
        assert_eq!(name.as_str(), "Roof relay #1");

        let name = ShortName::from_form_value(b"Caf%C3%A9").unwrap();
        assert_eq!(name.as_str(), "Café");

        // Bad escapes.
        assert!(ShortName::from_form_value(b"100%").is_none());
        assert!(ShortName::from_form_value(b"%G0").is_none());

        // Invalid UTF-8.
        assert!(ShortName::from_form_value(b"%FF").is_none());

        // Too long.
        let long = [b'a'; SHORT_NAME_CAPACITY + 1];
        assert!(ShortName::from_form_value(&long[..SHORT_NAME_CAPACITY]).is_some());
        assert!(ShortName::from_form_value(&long).is_none());
    }

    #[test]
    fn test_request_clear() {
        let mut request = AlpacaRequest::new();
        request.set_http_method(HttpMethod::Put);
        request.set_api(Api::DeviceApi);
        request.set_id(3);
        request.set_do_close();
        request.set_accepts_json(false);

        assert_eq!(request.api_group(), Some(ApiGroup::Device));
        assert!(!request.is_read());

        request.clear();
        assert_eq!(request, AlpacaRequest::new());
        assert!(request.accepts_json());
        assert_eq!(request.id(), None);
    }
}
