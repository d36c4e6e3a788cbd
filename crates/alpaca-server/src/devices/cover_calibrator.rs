use alpaca::error::AscomError;
use alpaca::methods::DeviceMethod;
use alpaca::parameters::Parameter;
use alpaca::response::Value;

use crate::device::{Device, DeviceInfo, MethodResult, handle_common_get, handle_common_put};
use crate::request::AlpacaRequest;

/// State of the light source of a calibrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibratorStatus {
    /// The device has no calibrator.
    NotPresent = 0,
    /// The calibrator is off.
    Off = 1,
    /// The calibrator is stabilizing.
    NotReady = 2,
    /// The calibrator is ready.
    Ready = 3,
    /// The state is unknown.
    Unknown = 4,
    /// The calibrator reported an error.
    Error = 5,
}

/// State of the cover of a calibrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverStatus {
    /// The device has no cover.
    NotPresent = 0,
    /// The cover is closed.
    Closed = 1,
    /// The cover is moving.
    Moving = 2,
    /// The cover is open.
    Open = 3,
    /// The state is unknown.
    Unknown = 4,
    /// The cover reported an error.
    Error = 5,
}

/// Hardware behind a [`CoverCalibrator`] device.
///
/// A device without a cover keeps the cover methods unimplemented, and the
/// same holds for a device without a calibrator.
pub trait CoverCalibratorHardware {
    /// Returns the calibrator state.
    ///
    /// # Errors
    ///
    /// Fails when the state cannot be read.
    fn calibrator_state(&mut self) -> Result<CalibratorStatus, AscomError> {
        Ok(CalibratorStatus::NotPresent)
    }

    /// Returns the cover state.
    ///
    /// # Errors
    ///
    /// Fails when the state cannot be read.
    fn cover_state(&mut self) -> Result<CoverStatus, AscomError> {
        Ok(CoverStatus::NotPresent)
    }

    /// Returns the current calibrator brightness.
    ///
    /// # Errors
    ///
    /// Fails when the device has no calibrator.
    fn brightness(&mut self) -> Result<u32, AscomError> {
        Err(AscomError::not_implemented(DeviceMethod::Brightness.name()))
    }

    /// Returns the maximum calibrator brightness.
    ///
    /// # Errors
    ///
    /// Fails when the device has no calibrator.
    fn max_brightness(&self) -> Result<u32, AscomError> {
        Err(AscomError::not_implemented(DeviceMethod::MaxBrightness.name()))
    }

    /// Turns the calibrator on at a brightness not above the maximum.
    ///
    /// # Errors
    ///
    /// Fails when the device has no calibrator.
    fn calibrator_on(&mut self, _brightness: u32) -> Result<(), AscomError> {
        Err(AscomError::not_implemented(DeviceMethod::CalibratorOn.name()))
    }

    /// Turns the calibrator off.
    ///
    /// # Errors
    ///
    /// Fails when the device has no calibrator.
    fn calibrator_off(&mut self) -> Result<(), AscomError> {
        Err(AscomError::not_implemented(DeviceMethod::CalibratorOff.name()))
    }

    /// Starts opening or closing the cover.
    ///
    /// # Errors
    ///
    /// Fails when the device has no cover.
    fn move_cover(&mut self, open: bool) -> Result<(), AscomError> {
        let method = if open {
            DeviceMethod::OpenCover
        } else {
            DeviceMethod::CloseCover
        };
        Err(AscomError::not_implemented(method.name()))
    }

    /// Stops a moving cover.
    ///
    /// # Errors
    ///
    /// Fails when the device has no cover.
    fn halt_cover(&mut self) -> Result<(), AscomError> {
        Err(AscomError::not_implemented(DeviceMethod::HaltCover.name()))
    }

    /// Advances a cover motion or a calibrator warm-up.
    fn maintain(&mut self) {}
}

/// A `CoverCalibrator` device serving a [`CoverCalibratorHardware`].
pub struct CoverCalibrator<H: CoverCalibratorHardware> {
    info: DeviceInfo,
    hardware: H,
}

impl<H: CoverCalibratorHardware> CoverCalibrator<H> {
    /// Creates a [`CoverCalibrator`].
    #[must_use]
    #[inline]
    pub const fn new(info: DeviceInfo, hardware: H) -> Self {
        Self { info, hardware }
    }

    /// Returns the hardware.
    #[must_use]
    pub const fn hardware(&self) -> &H {
        &self.hardware
    }

    fn calibrator_on(&mut self, request: &AlpacaRequest) -> Result<(), AscomError> {
        let brightness = request
            .brightness()
            .ok_or_else(|| AscomError::missing_parameter(Parameter::Brightness.name()))?;
        let max_brightness = self.hardware.max_brightness()?;
        let brightness = u32::try_from(brightness)
            .ok()
            .filter(|brightness| *brightness <= max_brightness)
            .ok_or_else(|| AscomError::invalid_parameter(Parameter::Brightness.name()))?;
        self.hardware.calibrator_on(brightness)
    }
}

impl<H: CoverCalibratorHardware> Device for CoverCalibrator<H> {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn maintain(&mut self) {
        self.hardware.maintain();
    }

    fn handle_get(&mut self, request: &AlpacaRequest) -> MethodResult {
        let value = match request.device_method() {
            Some(DeviceMethod::Brightness) => Value::from(self.hardware.brightness()?),
            Some(DeviceMethod::CalibratorState) => {
                Value::from(self.hardware.calibrator_state()? as u32)
            }
            Some(DeviceMethod::CoverState) => Value::from(self.hardware.cover_state()? as u32),
            Some(DeviceMethod::MaxBrightness) => Value::from(self.hardware.max_brightness()?),
            _ => return handle_common_get(self, request),
        };
        Ok(Some(value))
    }

    fn handle_put(&mut self, request: &AlpacaRequest) -> MethodResult {
        match request.device_method() {
            Some(DeviceMethod::CalibratorOff) => self.hardware.calibrator_off()?,
            Some(DeviceMethod::CalibratorOn) => self.calibrator_on(request)?,
            Some(DeviceMethod::CloseCover) => self.hardware.move_cover(false)?,
            Some(DeviceMethod::HaltCover) => self.hardware.halt_cover()?,
            Some(DeviceMethod::OpenCover) => self.hardware.move_cover(true)?,
            _ => return handle_common_put(self, request),
        }
        Ok(None)
    }
}
