use alloc::borrow::Cow;
use alloc::format;

use alpaca::error::{AscomError, AscomErrorCode};
use alpaca::methods::DeviceMethod;
use alpaca::parameters::{Parameter, SensorName};
use alpaca::response::Value;

use crate::device::{Device, DeviceInfo, MethodResult, handle_common_get, handle_common_put};
use crate::request::AlpacaRequest;

/// Creates the error answered for a sensor the device does not have.
#[must_use]
pub fn sensor_not_implemented(sensor: SensorName) -> AscomError {
    AscomError::new(
        AscomErrorCode::NotImplemented,
        format!("Sensor not implemented: {sensor}"),
    )
}

/// Hardware behind an [`ObservingConditions`] device.
///
/// Every sensor is unimplemented unless the hardware reads it.
pub trait WeatherSensors {
    /// Returns the value of a sensor, averaged over the average period.
    ///
    /// # Errors
    ///
    /// Fails when the sensor is missing or cannot be read.
    fn value(&mut self, sensor: SensorName) -> Result<f64, AscomError> {
        Err(sensor_not_implemented(sensor))
    }

    /// Returns the description of a sensor.
    ///
    /// # Errors
    ///
    /// Fails when the sensor is missing.
    fn description(&self, sensor: SensorName) -> Result<Cow<'static, str>, AscomError> {
        Err(sensor_not_implemented(sensor))
    }

    /// Returns the seconds elapsed since a sensor was last read.
    ///
    /// # Errors
    ///
    /// Fails when the sensor is missing.
    fn time_since_last_update(&mut self, sensor: SensorName) -> Result<f64, AscomError> {
        Err(sensor_not_implemented(sensor))
    }

    /// Changes the period, in hours, over which values are averaged.
    ///
    /// # Errors
    ///
    /// Fails when the period cannot be applied.
    fn set_average_period(&mut self, _hours: f64) -> Result<(), AscomError> {
        Ok(())
    }

    /// Reads every sensor immediately.
    ///
    /// # Errors
    ///
    /// Fails when the sensors cannot be refreshed on demand.
    fn refresh(&mut self) -> Result<(), AscomError> {
        Err(AscomError::not_implemented(DeviceMethod::Refresh.name()))
    }

    /// Samples the sensors.
    fn maintain(&mut self) {}
}

/// An `ObservingConditions` device serving [`WeatherSensors`].
pub struct ObservingConditions<S: WeatherSensors> {
    info: DeviceInfo,
    sensors: S,
    average_period: f64,
    max_average_period: f64,
}

impl<S: WeatherSensors> ObservingConditions<S> {
    /// Creates an [`ObservingConditions`] device reporting instantaneous
    /// values.
    #[must_use]
    #[inline]
    pub const fn new(info: DeviceInfo, sensors: S) -> Self {
        Self {
            info,
            sensors,
            average_period: 0.0,
            max_average_period: 0.0,
        }
    }

    /// Sets the longest average period, in hours, accepted from clients.
    #[must_use]
    #[inline]
    pub const fn max_average_period(mut self, hours: f64) -> Self {
        self.max_average_period = hours;
        self
    }

    /// Returns the sensors.
    #[must_use]
    pub const fn sensors(&self) -> &S {
        &self.sensors
    }

    fn sensor_name(request: &AlpacaRequest) -> Result<SensorName, AscomError> {
        request
            .sensor_name()
            .ok_or_else(|| AscomError::missing_parameter(Parameter::SensorName.name()))
    }

    fn set_average_period(&mut self, request: &AlpacaRequest) -> Result<(), AscomError> {
        let hours = request
            .average_period()
            .ok_or_else(|| AscomError::missing_parameter(Parameter::AveragePeriod.name()))?;
        if !(0.0..=self.max_average_period).contains(&hours) {
            return Err(AscomError::invalid_parameter(Parameter::AveragePeriod.name()));
        }
        self.sensors.set_average_period(hours)?;
        self.average_period = hours;
        Ok(())
    }
}

impl<S: WeatherSensors> Device for ObservingConditions<S> {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn maintain(&mut self) {
        self.sensors.maintain();
    }

    fn handle_get(&mut self, request: &AlpacaRequest) -> MethodResult {
        let Some(method) = request.device_method() else {
            return handle_common_get(self, request);
        };

        // Sensor methods share the sensor name.
        if let Some(sensor) = SensorName::from_name_ignore_case(method.name()) {
            return Ok(Some(Value::from(self.sensors.value(sensor)?)));
        }

        let value = match method {
            DeviceMethod::AveragePeriod => Value::from(self.average_period),
            DeviceMethod::SensorDescription => {
                Value::Text(self.sensors.description(Self::sensor_name(request)?)?)
            }
            DeviceMethod::TimeSinceLastUpdate => Value::from(
                self.sensors
                    .time_since_last_update(Self::sensor_name(request)?)?,
            ),
            _ => return handle_common_get(self, request),
        };
        Ok(Some(value))
    }

    fn handle_put(&mut self, request: &AlpacaRequest) -> MethodResult {
        match request.device_method() {
            Some(DeviceMethod::AveragePeriod) => self.set_average_period(request)?,
            Some(DeviceMethod::Refresh) => self.sensors.refresh()?,
            _ => return handle_common_put(self, request),
        }
        Ok(None)
    }
}
