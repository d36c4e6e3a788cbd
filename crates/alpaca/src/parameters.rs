use crate::macros::wire_names;

wire_names! {
    /// Parameters of an Alpaca request, sent in the query string of a `GET`
    /// or in the form body of a `PUT`.
    ///
    /// Names are matched ignoring ASCII case.
    ALL_PARAMETERS => Parameter {
        /// Name of a device-specific action.
        Action => "Action",
        /// Identifier of the client.
        ClientId => "ClientID",
        /// Transaction number chosen by the client.
        ClientTransactionId => "ClientTransactionID",
        /// Command string of the `command*` methods.
        Command => "Command",
        /// Requested connected state.
        Connected => "Connected",
        /// Parameters of a device-specific action.
        Parameters => "Parameters",
        /// Whether a command string is sent raw.
        Raw => "Raw",

        /// Calibrator brightness.
        Brightness => "Brightness",

        /// Sensor averaging period, in hours.
        AveragePeriod => "AveragePeriod",
        /// Name of an observing-conditions sensor.
        SensorName => "SensorName",

        /// Switch index.
        Id => "Id",
        /// Switch name.
        Name => "Name",
        /// Switch boolean state.
        State => "State",
        /// Switch value.
        Value => "Value",
    }
}

impl Parameter {
    /// Whether a request records the value of the parameter.
    ///
    /// Values of other parameters are skipped while decoding.
    #[must_use]
    pub const fn is_recorded(&self) -> bool {
        !matches!(
            self,
            Self::Action | Self::Command | Self::Parameters | Self::Raw
        )
    }
}

wire_names! {
    /// Sensors of an observing-conditions device.
    ///
    /// Names are matched ignoring ASCII case.
    ALL_SENSOR_NAMES => SensorName {
        /// Cloud cover, in percent.
        CloudCover => "CloudCover",
        /// Dew point, in degrees Celsius.
        DewPoint => "DewPoint",
        /// Relative humidity, in percent.
        Humidity => "Humidity",
        /// Atmospheric pressure, in hectopascals.
        Pressure => "Pressure",
        /// Rain rate, in millimeters per hour.
        RainRate => "RainRate",
        /// Sky brightness, in lux.
        SkyBrightness => "SkyBrightness",
        /// Sky quality, in magnitudes per square arc-second.
        SkyQuality => "SkyQuality",
        /// Sky temperature, in degrees Celsius.
        SkyTemperature => "SkyTemperature",
        /// Seeing, in arc-seconds.
        StarFwhm => "StarFWHM",
        /// Ambient temperature, in degrees Celsius.
        Temperature => "Temperature",
        /// Wind direction, in degrees.
        WindDirection => "WindDirection",
        /// Peak wind gust, in meters per second.
        WindGust => "WindGust",
        /// Wind speed, in meters per second.
        WindSpeed => "WindSpeed",
    }
}

#[cfg(test)]
mod tests {
    use super::{ALL_SENSOR_NAMES, Parameter, SensorName};

    #[test]
    fn test_parameter() {
        assert_eq!(
            Parameter::from_name_ignore_case("clienttransactionid"),
            Some(Parameter::ClientTransactionId)
        );
        assert_eq!(Parameter::from_name_ignore_case("ID"), Some(Parameter::Id));
        assert_eq!(Parameter::from_name_ignore_case("Foo"), None);

        assert!(Parameter::Brightness.is_recorded());
        assert!(!Parameter::Raw.is_recorded());
    }

    #[test]
    fn test_sensor_name() {
        for sensor in ALL_SENSOR_NAMES {
            assert_eq!(
                SensorName::from_name_ignore_case(&sensor.name().to_ascii_uppercase()),
                Some(*sensor)
            );
        }
        assert_eq!(SensorName::StarFwhm.name(), "StarFWHM");
    }
}
