use alloc::borrow::Cow;

use alpaca::error::AscomError;
use alpaca::methods::{DeviceMethod, SWITCH_METHODS};
use alpaca::parameters::Parameter;
use alpaca::response::Value;

use crate::device::{
    Device, DeviceInfo, MethodResult, checked_id, handle_common_get, handle_common_put,
    not_implemented,
};
use crate::request::AlpacaRequest;

/// Hardware behind a [`Switch`] device: a bank of `max_switch` switches
/// addressed by an identifier starting at zero.
///
/// Identifiers are always checked before reaching the bank.
pub trait SwitchBank {
    /// Returns the number of switches.
    fn max_switch(&self) -> u32;

    /// Whether a switch can be written.
    fn can_write(&self, id: u32) -> bool;

    /// Returns the name of a switch.
    fn name(&self, id: u32) -> Cow<'static, str>;

    /// Renames a switch.
    ///
    /// # Errors
    ///
    /// Fails when names cannot be changed.
    fn set_name(&mut self, _id: u32, _name: &str) -> Result<(), AscomError> {
        Err(AscomError::not_implemented(DeviceMethod::SetSwitchName.name()))
    }

    /// Returns the description of a switch.
    fn description(&self, id: u32) -> Cow<'static, str>;

    /// Returns the minimum value of a switch.
    fn min_value(&self, _id: u32) -> f64 {
        0.0
    }

    /// Returns the maximum value of a switch.
    fn max_value(&self, _id: u32) -> f64 {
        1.0
    }

    /// Returns the step between two values of a switch.
    fn step(&self, _id: u32) -> f64 {
        1.0
    }

    /// Returns the current value of a switch.
    ///
    /// # Errors
    ///
    /// Fails when the value cannot be read.
    fn value(&mut self, id: u32) -> Result<f64, AscomError>;

    /// Sets the value of a writable switch.
    ///
    /// # Errors
    ///
    /// Fails when the value cannot be written.
    fn set_value(&mut self, id: u32, value: f64) -> Result<(), AscomError>;
}

/// A `Switch` device serving a [`SwitchBank`].
pub struct Switch<B: SwitchBank> {
    info: DeviceInfo,
    bank: B,
}

impl<B: SwitchBank> Switch<B> {
    /// Creates a [`Switch`].
    #[must_use]
    #[inline]
    pub const fn new(info: DeviceInfo, bank: B) -> Self {
        Self { info, bank }
    }

    /// Returns the switch bank.
    #[must_use]
    pub const fn bank(&self) -> &B {
        &self.bank
    }

    fn writable_id(&self, request: &AlpacaRequest) -> Result<u32, AscomError> {
        let id = checked_id(request, self.bank.max_switch())?;
        if !self.bank.can_write(id) {
            return Err(not_implemented(request));
        }
        Ok(id)
    }
}

impl<B: SwitchBank> Device for Switch<B> {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn handle_get(&mut self, request: &AlpacaRequest) -> MethodResult {
        let Some(method) = request
            .device_method()
            .filter(|method| SWITCH_METHODS.contains(method))
        else {
            return handle_common_get(self, request);
        };
        match method {
            DeviceMethod::MaxSwitch => return Ok(Some(Value::from(self.bank.max_switch()))),
            DeviceMethod::SetSwitch
            | DeviceMethod::SetSwitchName
            | DeviceMethod::SetSwitchValue => return Err(not_implemented(request)),
            _ => {}
        }

        // Every other switch method addresses a single switch.
        let id = checked_id(request, self.bank.max_switch())?;
        let value = match method {
            DeviceMethod::CanWrite => Value::from(self.bank.can_write(id)),
            DeviceMethod::GetSwitch => Value::from(self.bank.value(id)? > self.bank.min_value(id)),
            DeviceMethod::GetSwitchDescription => Value::Text(self.bank.description(id)),
            DeviceMethod::GetSwitchName => Value::Text(self.bank.name(id)),
            DeviceMethod::GetSwitchValue => Value::from(self.bank.value(id)?),
            DeviceMethod::MinSwitchValue => Value::from(self.bank.min_value(id)),
            DeviceMethod::MaxSwitchValue => Value::from(self.bank.max_value(id)),
            DeviceMethod::SwitchStep => Value::from(self.bank.step(id)),
            _ => return Err(not_implemented(request)),
        };
        Ok(Some(value))
    }

    fn handle_put(&mut self, request: &AlpacaRequest) -> MethodResult {
        match request.device_method() {
            Some(DeviceMethod::SetSwitch) => {
                let id = self.writable_id(request)?;
                let state = request
                    .state()
                    .ok_or_else(|| AscomError::missing_parameter(Parameter::State.name()))?;
                let value = if state {
                    self.bank.max_value(id)
                } else {
                    self.bank.min_value(id)
                };
                self.bank.set_value(id, value)?;
            }
            Some(DeviceMethod::SetSwitchValue) => {
                let id = self.writable_id(request)?;
                let value = request
                    .value()
                    .ok_or_else(|| AscomError::missing_parameter(Parameter::Value.name()))?;
                if value < self.bank.min_value(id) || value > self.bank.max_value(id) {
                    return Err(AscomError::invalid_parameter(Parameter::Value.name()));
                }
                self.bank.set_value(id, value)?;
            }
            Some(DeviceMethod::SetSwitchName) => {
                let id = checked_id(request, self.bank.max_switch())?;
                let name = request
                    .name()
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| AscomError::missing_parameter(Parameter::Name.name()))?;
                self.bank.set_name(id, name.as_str())?;
            }
            _ => return handle_common_put(self, request),
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;
    use alloc::format;
    use alloc::string::String;

    use alpaca::devices::DeviceType;
    use alpaca::error::{AscomError, AscomErrorCode};
    use alpaca::methods::DeviceMethod;
    use alpaca::response::Value;

    use crate::device::{Device, DeviceInfo};
    use crate::request::{AlpacaRequest, ShortName};

    use super::{Switch, SwitchBank};

    // Switch 0 is a relay, switch 1 a dimmer, switch 2 a read-only sensor.
    struct Bank {
        values: [f64; 3],
        relay_name: String,
    }

    impl SwitchBank for Bank {
        fn max_switch(&self) -> u32 {
            3
        }

        fn can_write(&self, id: u32) -> bool {
            id != 2
        }

        fn name(&self, id: u32) -> Cow<'static, str> {
            match id {
                0 => Cow::Owned(self.relay_name.clone()),
                _ => Cow::Owned(format!("Switch {id}")),
            }
        }

        fn set_name(&mut self, id: u32, name: &str) -> Result<(), AscomError> {
            if id != 0 {
                return Err(AscomError::invalid_operation("Fixed name"));
            }
            self.relay_name = name.into();
            Ok(())
        }

        fn description(&self, _id: u32) -> Cow<'static, str> {
            Cow::Borrowed("Test switch")
        }

        fn max_value(&self, id: u32) -> f64 {
            if id == 1 { 255.0 } else { 1.0 }
        }

        fn value(&mut self, id: u32) -> Result<f64, AscomError> {
            Ok(self.values[id as usize])
        }

        fn set_value(&mut self, id: u32, value: f64) -> Result<(), AscomError> {
            self.values[id as usize] = value;
            Ok(())
        }
    }

    fn switch() -> Switch<Bank> {
        Switch::new(
            DeviceInfo::new(DeviceType::Switch, 0, "Relays"),
            Bank {
                values: [0.0, 0.0, 1.0],
                relay_name: "Relay".into(),
            },
        )
    }

    fn request(method: DeviceMethod, id: Option<u32>) -> AlpacaRequest {
        let mut request = AlpacaRequest::new();
        request.set_device_method(method);
        if let Some(id) = id {
            request.set_id(id);
        }
        request
    }

    #[test]
    fn test_switch_get() {
        let mut switch = switch();

        assert_eq!(
            switch.handle_get(&request(DeviceMethod::MaxSwitch, None)),
            Ok(Some(Value::from(3u32)))
        );
        assert_eq!(
            switch.handle_get(&request(DeviceMethod::GetSwitch, Some(2))),
            Ok(Some(Value::from(true)))
        );
        assert_eq!(
            switch.handle_get(&request(DeviceMethod::CanWrite, Some(2))),
            Ok(Some(Value::from(false)))
        );
        assert_eq!(
            switch.handle_get(&request(DeviceMethod::MaxSwitchValue, Some(1))),
            Ok(Some(Value::from(255.0)))
        );
        assert_eq!(
            switch.handle_get(&request(DeviceMethod::GetSwitchName, Some(1))),
            Ok(Some(Value::from("Switch 1")))
        );
        assert_eq!(
            switch.handle_get(&request(DeviceMethod::Name, None)),
            Ok(Some(Value::from("Relays")))
        );

        let error = switch
            .handle_get(&request(DeviceMethod::GetSwitchValue, None))
            .unwrap_err();
        assert_eq!(error.code, AscomErrorCode::ValueNotSet);
        assert_eq!(error.message, "Missing parameter: Id");

        let error = switch
            .handle_get(&request(DeviceMethod::GetSwitchValue, Some(3)))
            .unwrap_err();
        assert_eq!(error.code, AscomErrorCode::InvalidValue);
        assert_eq!(error.message, "Invalid parameter: Id");
    }

    #[test]
    fn test_set_switch() {
        let mut switch = switch();

        let error = switch
            .handle_put(&request(DeviceMethod::SetSwitch, Some(0)))
            .unwrap_err();
        assert_eq!(error.message, "Missing parameter: State");

        let mut set = request(DeviceMethod::SetSwitch, Some(0));
        set.set_state(true);
        assert_eq!(switch.handle_put(&set), Ok(None));
        assert_eq!(switch.bank().values[0], 1.0);

        // Read-only switch.
        let mut set = request(DeviceMethod::SetSwitch, Some(2));
        set.set_state(false);
        let error = switch.handle_put(&set).unwrap_err();
        assert_eq!(error.code, AscomErrorCode::NotImplemented);
        assert_eq!(switch.bank().values[2], 1.0);
    }

    #[test]
    fn test_set_switch_value() {
        let mut switch = switch();

        let error = switch
            .handle_put(&request(DeviceMethod::SetSwitchValue, Some(1)))
            .unwrap_err();
        assert_eq!(error.message, "Missing parameter: Value");

        let mut set = request(DeviceMethod::SetSwitchValue, Some(1));
        set.set_value(256.0);
        let error = switch.handle_put(&set).unwrap_err();
        assert_eq!(error.code, AscomErrorCode::InvalidValue);
        assert_eq!(error.message, "Invalid parameter: Value");

        set.set_value(128.0);
        assert_eq!(switch.handle_put(&set), Ok(None));
        assert_eq!(switch.bank().values[1], 128.0);
    }

    #[test]
    fn test_set_switch_name() {
        let mut switch = switch();

        let error = switch
            .handle_put(&request(DeviceMethod::SetSwitchName, Some(0)))
            .unwrap_err();
        assert_eq!(error.message, "Missing parameter: Name");

        let mut rename = request(DeviceMethod::SetSwitchName, Some(0));
        rename.set_name(ShortName::from_text("Dome fan").unwrap());
        assert_eq!(switch.handle_put(&rename), Ok(None));
        assert_eq!(
            switch.handle_get(&request(DeviceMethod::GetSwitchName, Some(0))),
            Ok(Some(Value::from("Dome fan")))
        );
    }

    #[test]
    fn test_write_methods_on_get() {
        let mut switch = switch();

        for method in [
            DeviceMethod::SetSwitch,
            DeviceMethod::SetSwitchName,
            DeviceMethod::SetSwitchValue,
        ] {
            // Rejected before the missing identifier is noticed.
            let error = switch.handle_get(&request(method, None)).unwrap_err();
            assert_eq!(error.code, AscomErrorCode::NotImplemented);
            assert_eq!(
                error.message,
                format!("Alpaca method not implemented: {}", method.name())
            );
        }
    }
}
