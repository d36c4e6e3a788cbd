use crate::devices::DeviceType;
use crate::macros::wire_names;

wire_names! {
    /// Methods addressed by the last segment of a device path.
    ///
    /// Names are lowercase, as they appear in request paths.
    ALL_DEVICE_METHODS => DeviceMethod {
        /// The only method of a device setup path.
        Setup => "setup",

        /// Invokes a named device-specific action.
        Action => "action",
        /// Transmits an arbitrary string without waiting for a response.
        CommandBlind => "commandblind",
        /// Transmits an arbitrary string and waits for a boolean response.
        CommandBool => "commandbool",
        /// Transmits an arbitrary string and waits for a string response.
        CommandString => "commandstring",
        /// Connected state of the device.
        Connected => "connected",
        /// Description of the device.
        Description => "description",
        /// Description of the driver.
        DriverInfo => "driverinfo",
        /// Version of the driver.
        DriverVersion => "driverversion",
        /// Version of the device interface.
        InterfaceVersion => "interfaceversion",
        /// Short name of the device.
        Name => "name",
        /// Names of the supported actions.
        SupportedActions => "supportedactions",

        /// Calibrator brightness.
        Brightness => "brightness",
        /// Calibrator state.
        CalibratorState => "calibratorstate",
        /// Cover state.
        CoverState => "coverstate",
        /// Maximum calibrator brightness.
        MaxBrightness => "maxbrightness",
        /// Turns the calibrator off.
        CalibratorOff => "calibratoroff",
        /// Turns the calibrator on.
        CalibratorOn => "calibratoron",
        /// Closes the cover.
        CloseCover => "closecover",
        /// Stops any cover movement.
        HaltCover => "haltcover",
        /// Opens the cover.
        OpenCover => "opencover",

        /// Period over which sensor readings are averaged.
        AveragePeriod => "averageperiod",
        /// Cloud cover.
        CloudCover => "cloudcover",
        /// Dew point.
        DewPoint => "dewpoint",
        /// Relative humidity.
        Humidity => "humidity",
        /// Atmospheric pressure.
        Pressure => "pressure",
        /// Rain rate.
        RainRate => "rainrate",
        /// Forces the sensors to be read.
        Refresh => "refresh",
        /// Description of a sensor.
        SensorDescription => "sensordescription",
        /// Sky brightness.
        SkyBrightness => "skybrightness",
        /// Sky quality.
        SkyQuality => "skyquality",
        /// Sky temperature.
        SkyTemperature => "skytemperature",
        /// Seeing.
        StarFwhm => "starfwhm",
        /// Ambient temperature.
        Temperature => "temperature",
        /// Time since a sensor was last updated.
        TimeSinceLastUpdate => "timesincelastupdate",
        /// Wind direction.
        WindDirection => "winddirection",
        /// Peak wind gust.
        WindGust => "windgust",
        /// Wind speed.
        WindSpeed => "windspeed",

        /// Whether the monitored conditions are safe.
        IsSafe => "issafe",

        /// Number of switches.
        MaxSwitch => "maxswitch",
        /// Whether a switch can be written.
        CanWrite => "canwrite",
        /// Boolean state of a switch.
        GetSwitch => "getswitch",
        /// Description of a switch.
        GetSwitchDescription => "getswitchdescription",
        /// Name of a switch.
        GetSwitchName => "getswitchname",
        /// Value of a switch.
        GetSwitchValue => "getswitchvalue",
        /// Minimum value of a switch.
        MinSwitchValue => "minswitchvalue",
        /// Maximum value of a switch.
        MaxSwitchValue => "maxswitchvalue",
        /// Sets the boolean state of a switch.
        SetSwitch => "setswitch",
        /// Sets the name of a switch.
        SetSwitchName => "setswitchname",
        /// Sets the value of a switch.
        SetSwitchValue => "setswitchvalue",
        /// Step size of a switch value.
        SwitchStep => "switchstep",
    }
}

/// Methods every device type exposes.
pub const COMMON_METHODS: &[DeviceMethod] = &[
    DeviceMethod::Action,
    DeviceMethod::CommandBlind,
    DeviceMethod::CommandBool,
    DeviceMethod::CommandString,
    DeviceMethod::Connected,
    DeviceMethod::Description,
    DeviceMethod::DriverInfo,
    DeviceMethod::DriverVersion,
    DeviceMethod::InterfaceVersion,
    DeviceMethod::Name,
    DeviceMethod::SupportedActions,
];

/// Methods specific to [`DeviceType::CoverCalibrator`].
pub const COVER_CALIBRATOR_METHODS: &[DeviceMethod] = &[
    DeviceMethod::Brightness,
    DeviceMethod::CalibratorState,
    DeviceMethod::CoverState,
    DeviceMethod::MaxBrightness,
    DeviceMethod::CalibratorOff,
    DeviceMethod::CalibratorOn,
    DeviceMethod::CloseCover,
    DeviceMethod::HaltCover,
    DeviceMethod::OpenCover,
];

/// Methods specific to [`DeviceType::ObservingConditions`].
pub const OBSERVING_CONDITIONS_METHODS: &[DeviceMethod] = &[
    DeviceMethod::AveragePeriod,
    DeviceMethod::CloudCover,
    DeviceMethod::DewPoint,
    DeviceMethod::Humidity,
    DeviceMethod::Pressure,
    DeviceMethod::RainRate,
    DeviceMethod::Refresh,
    DeviceMethod::SensorDescription,
    DeviceMethod::SkyBrightness,
    DeviceMethod::SkyQuality,
    DeviceMethod::SkyTemperature,
    DeviceMethod::StarFwhm,
    DeviceMethod::Temperature,
    DeviceMethod::TimeSinceLastUpdate,
    DeviceMethod::WindDirection,
    DeviceMethod::WindGust,
    DeviceMethod::WindSpeed,
];

/// Methods specific to [`DeviceType::SafetyMonitor`].
pub const SAFETY_MONITOR_METHODS: &[DeviceMethod] = &[DeviceMethod::IsSafe];

/// Methods specific to [`DeviceType::Switch`].
pub const SWITCH_METHODS: &[DeviceMethod] = &[
    DeviceMethod::MaxSwitch,
    DeviceMethod::CanWrite,
    DeviceMethod::GetSwitch,
    DeviceMethod::GetSwitchDescription,
    DeviceMethod::GetSwitchName,
    DeviceMethod::GetSwitchValue,
    DeviceMethod::MinSwitchValue,
    DeviceMethod::MaxSwitchValue,
    DeviceMethod::SetSwitch,
    DeviceMethod::SetSwitchName,
    DeviceMethod::SetSwitchValue,
    DeviceMethod::SwitchStep,
];

/// Returns the methods specific to a [`DeviceType`].
///
/// Device types without a method table only expose [`COMMON_METHODS`].
#[must_use]
pub const fn type_methods(device_type: DeviceType) -> &'static [DeviceMethod] {
    match device_type {
        DeviceType::CoverCalibrator => COVER_CALIBRATOR_METHODS,
        DeviceType::ObservingConditions => OBSERVING_CONDITIONS_METHODS,
        DeviceType::SafetyMonitor => SAFETY_MONITOR_METHODS,
        DeviceType::Switch => SWITCH_METHODS,
        _ => &[],
    }
}

impl DeviceMethod {
    /// Whether the method is exposed by every device type.
    #[must_use]
    pub fn is_common(&self) -> bool {
        COMMON_METHODS.contains(self)
    }

    /// Whether the method is part of the device API of `device_type`.
    ///
    /// [`DeviceMethod::Setup`] is never part of a device API.
    #[must_use]
    pub fn applies_to(&self, device_type: DeviceType) -> bool {
        self.is_common() || type_methods(device_type).contains(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{ALL_DEVICE_METHODS, DeviceMethod};
    use crate::devices::DeviceType;

    #[test]
    fn test_method_names() {
        for method in ALL_DEVICE_METHODS {
            assert!(!method.name().bytes().any(|b| b.is_ascii_uppercase()));
            assert_eq!(DeviceMethod::from_name(method.name()), Some(*method));
        }
    }

    #[test]
    fn test_applies_to() {
        assert!(DeviceMethod::Connected.applies_to(DeviceType::Camera));
        assert!(DeviceMethod::SetSwitch.applies_to(DeviceType::Switch));
        assert!(!DeviceMethod::SetSwitch.applies_to(DeviceType::CoverCalibrator));
        assert!(DeviceMethod::OpenCover.applies_to(DeviceType::CoverCalibrator));
        assert!(DeviceMethod::IsSafe.applies_to(DeviceType::SafetyMonitor));
        assert!(!DeviceMethod::Setup.applies_to(DeviceType::Switch));
    }
}
