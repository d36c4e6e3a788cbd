use core::fmt::Write;

use alloc::borrow::Cow;

use alpaca::devices::DeviceType;
use alpaca::error::AscomError;
use alpaca::methods::DeviceMethod;
use alpaca::parameters::Parameter;
use alpaca::response::Value;

use crate::request::AlpacaRequest;

/// The outcome of a device method: an optional value or an ASCOM error.
pub type MethodResult = Result<Option<Value>, AscomError>;

/// Static description of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Device type.
    pub device_type: DeviceType,
    /// Device number, unique among the devices of the same type.
    pub device_number: u32,
    /// Device name.
    pub name: &'static str,
    /// Device description.
    pub description: &'static str,
    /// Driver information.
    pub driver_info: &'static str,
    /// Driver version.
    pub driver_version: &'static str,
    /// Version of the ASCOM interface implemented by the device.
    pub interface_version: u32,
    /// Names of the actions accepted by the `action` method.
    pub supported_actions: &'static [&'static str],
    /// Number identifying the current device configuration, used to derive
    /// the device unique identifier.
    pub config_id: u32,
}

impl DeviceInfo {
    /// Creates a [`DeviceInfo`].
    #[must_use]
    #[inline]
    pub const fn new(device_type: DeviceType, device_number: u32, name: &'static str) -> Self {
        Self {
            device_type,
            device_number,
            name,
            description: "",
            driver_info: "",
            driver_version: "",
            interface_version: 1,
            supported_actions: &[],
            config_id: 0,
        }
    }

    /// Sets the device description.
    #[must_use]
    #[inline]
    pub const fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the driver information.
    #[must_use]
    #[inline]
    pub const fn driver_info(mut self, driver_info: &'static str) -> Self {
        self.driver_info = driver_info;
        self
    }

    /// Sets the driver version.
    #[must_use]
    #[inline]
    pub const fn driver_version(mut self, driver_version: &'static str) -> Self {
        self.driver_version = driver_version;
        self
    }

    /// Sets the version of the implemented ASCOM interface.
    #[must_use]
    #[inline]
    pub const fn interface_version(mut self, interface_version: u32) -> Self {
        self.interface_version = interface_version;
        self
    }

    /// Sets the names of the supported actions.
    #[must_use]
    #[inline]
    pub const fn supported_actions(mut self, supported_actions: &'static [&'static str]) -> Self {
        self.supported_actions = supported_actions;
        self
    }

    /// Sets the configuration identifier.
    #[must_use]
    #[inline]
    pub const fn config_id(mut self, config_id: u32) -> Self {
        self.config_id = config_id;
        self
    }
}

/// A device served through the Alpaca device API.
///
/// The methods shared by every device type are answered by
/// [`handle_common_get`] and [`handle_common_put`], which an implementation
/// calls for the methods it does not handle itself.
pub trait Device {
    /// Returns the device description.
    fn info(&self) -> &DeviceInfo;

    /// Prepares the device before the server starts.
    fn initialize(&mut self) {}

    /// Performs periodic work, called once per server loop.
    fn maintain(&mut self) {}

    /// Whether the device is connected.
    fn connected(&self) -> bool {
        true
    }

    /// Connects or disconnects the device.
    ///
    /// # Errors
    ///
    /// Fails when the connection state cannot be changed.
    fn set_connected(&mut self, _connected: bool) -> Result<(), AscomError> {
        Ok(())
    }

    /// Answers a `GET` or `HEAD` request.
    fn handle_get(&mut self, request: &AlpacaRequest) -> MethodResult {
        handle_common_get(self, request)
    }

    /// Answers a `PUT` request.
    fn handle_put(&mut self, request: &AlpacaRequest) -> MethodResult {
        handle_common_put(self, request)
    }

    /// Writes the device setup page.
    ///
    /// # Errors
    ///
    /// Fails when the output cannot take the page.
    fn write_setup_page(&self, out: &mut dyn Write, unique_id: &str) -> core::fmt::Result {
        write_setup_page(out, self.info(), unique_id)
    }
}

/// Answers the read methods shared by every device type.
///
/// # Errors
///
/// Fails with a not implemented error for any other method.
pub fn handle_common_get<D: Device + ?Sized>(device: &D, request: &AlpacaRequest) -> MethodResult {
    let info = device.info();
    let value = match request.device_method() {
        Some(DeviceMethod::Connected) => Value::from(device.connected()),
        Some(DeviceMethod::Description) => Value::from(info.description),
        Some(DeviceMethod::DriverInfo) => Value::from(info.driver_info),
        Some(DeviceMethod::DriverVersion) => Value::from(info.driver_version),
        Some(DeviceMethod::InterfaceVersion) => Value::from(info.interface_version),
        Some(DeviceMethod::Name) => Value::from(info.name),
        Some(DeviceMethod::SupportedActions) => Value::TextList(
            info.supported_actions
                .iter()
                .map(|action| Cow::Borrowed(*action))
                .collect(),
        ),
        _ => return Err(not_implemented(request)),
    };
    Ok(Some(value))
}

/// Answers the write methods shared by every device type.
///
/// # Errors
///
/// Fails when a parameter is missing, when the device refuses the change,
/// or with a not implemented error for any other method.
pub fn handle_common_put<D: Device + ?Sized>(
    device: &mut D,
    request: &AlpacaRequest,
) -> MethodResult {
    match request.device_method() {
        Some(DeviceMethod::Connected) => {
            let connected = request
                .connected()
                .ok_or_else(|| AscomError::missing_parameter(Parameter::Connected.name()))?;
            device.set_connected(connected)?;
            Ok(None)
        }
        // Without any supported action, the method itself is missing.
        Some(DeviceMethod::Action) if !device.info().supported_actions.is_empty() => {
            Err(AscomError::action_not_implemented())
        }
        _ => Err(not_implemented(request)),
    }
}

/// Creates the error answered to a method the device does not implement.
#[must_use]
pub fn not_implemented(request: &AlpacaRequest) -> AscomError {
    AscomError::not_implemented(request.device_method().map_or("", |method| method.name()))
}

/// Returns the `Id` parameter, checked against the number of addressable
/// items.
///
/// # Errors
///
/// Fails when the parameter is missing or out of range.
pub fn checked_id(request: &AlpacaRequest, count: u32) -> Result<u32, AscomError> {
    let id = request
        .id()
        .ok_or_else(|| AscomError::missing_parameter(Parameter::Id.name()))?;
    if id >= count {
        return Err(AscomError::invalid_parameter(Parameter::Id.name()));
    }
    Ok(id)
}

/// Writes the default setup page of a device.
///
/// # Errors
///
/// Fails when the output cannot take the page.
pub fn write_setup_page(
    out: &mut dyn Write,
    info: &DeviceInfo,
    unique_id: &str,
) -> core::fmt::Result {
    write!(
        out,
        "<html><body>\
         <h1>{name} Setup</h1>\n\
         Type: {device_type}<br>\
         Number: {number}<br>\
         Name: {name}<br>\
         Description: {description}<br>\
         Unique ID: {unique_id}<br>\
         Driver Info: {driver_info}<br>\
         Driver Version: {driver_version}<br>\
         Interface Version: {interface_version}<br>\
         </body></html>",
        name = info.name,
        device_type = info.device_type,
        number = info.device_number,
        description = info.description,
        driver_info = info.driver_info,
        driver_version = info.driver_version,
        interface_version = info.interface_version,
    )
}
