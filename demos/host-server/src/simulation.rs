use std::borrow::Cow;
use std::time::{Duration, Instant};

use alpaca::error::AscomError;
use alpaca::parameters::SensorName;

use alpaca_server::devices::cover_calibrator::{
    CalibratorStatus, CoverCalibratorHardware, CoverStatus,
};
use alpaca_server::devices::observing_conditions::{WeatherSensors, sensor_not_implemented};
use alpaca_server::devices::switch::SwitchBank;

use log::info;

const RELAYS: u32 = 4;
const COVER_TRAVEL: Duration = Duration::from_secs(5);
const WARM_UP: Duration = Duration::from_secs(2);
const SAMPLE_PERIOD: Duration = Duration::from_secs(10);

/// Four relays followed by a dew heater driven in percent.
pub(crate) struct PowerBox {
    names: Vec<String>,
    relays: [bool; RELAYS as usize],
    heater: f64,
}

impl PowerBox {
    pub(crate) fn new() -> Self {
        let mut names: Vec<String> = (0..RELAYS).map(|id| format!("Relay {id}")).collect();
        names.push("Dew heater".into());
        Self {
            names,
            relays: [false; RELAYS as usize],
            heater: 0.0,
        }
    }
}

impl SwitchBank for PowerBox {
    fn max_switch(&self) -> u32 {
        RELAYS + 1
    }

    fn can_write(&self, _id: u32) -> bool {
        true
    }

    fn name(&self, id: u32) -> Cow<'static, str> {
        Cow::Owned(self.names[id as usize].clone())
    }

    fn set_name(&mut self, id: u32, name: &str) -> Result<(), AscomError> {
        self.names[id as usize] = name.into();
        Ok(())
    }

    fn description(&self, id: u32) -> Cow<'static, str> {
        if id < RELAYS {
            Cow::Borrowed("12V output")
        } else {
            Cow::Borrowed("PWM output, in percent")
        }
    }

    fn max_value(&self, id: u32) -> f64 {
        if id < RELAYS { 1.0 } else { 100.0 }
    }

    fn value(&mut self, id: u32) -> Result<f64, AscomError> {
        Ok(match self.relays.get(id as usize) {
            Some(state) => f64::from(u8::from(*state)),
            None => self.heater,
        })
    }

    fn set_value(&mut self, id: u32, value: f64) -> Result<(), AscomError> {
        match self.relays.get_mut(id as usize) {
            Some(state) => *state = value > 0.0,
            None => self.heater = value.round(),
        }
        info!("{} set to {value}", self.names[id as usize]);
        Ok(())
    }
}

enum Motion {
    Still(CoverStatus),
    Moving { open: bool, since: Instant },
}

/// A flat panel with a motorized cover.
pub(crate) struct FlatPanel {
    cover: Motion,
    brightness: u32,
    lit_since: Option<Instant>,
}

impl FlatPanel {
    pub(crate) const MAX_BRIGHTNESS: u32 = 255;

    pub(crate) const fn new() -> Self {
        Self {
            cover: Motion::Still(CoverStatus::Closed),
            brightness: 0,
            lit_since: None,
        }
    }
}

impl CoverCalibratorHardware for FlatPanel {
    fn calibrator_state(&mut self) -> Result<CalibratorStatus, AscomError> {
        Ok(match self.lit_since {
            None => CalibratorStatus::Off,
            Some(since) if since.elapsed() < WARM_UP => CalibratorStatus::NotReady,
            Some(_) => CalibratorStatus::Ready,
        })
    }

    fn cover_state(&mut self) -> Result<CoverStatus, AscomError> {
        Ok(match self.cover {
            Motion::Still(status) => status,
            Motion::Moving { .. } => CoverStatus::Moving,
        })
    }

    fn brightness(&mut self) -> Result<u32, AscomError> {
        Ok(self.brightness)
    }

    fn max_brightness(&self) -> Result<u32, AscomError> {
        Ok(Self::MAX_BRIGHTNESS)
    }

    fn calibrator_on(&mut self, brightness: u32) -> Result<(), AscomError> {
        self.brightness = brightness;
        self.lit_since = Some(Instant::now());
        Ok(())
    }

    fn calibrator_off(&mut self) -> Result<(), AscomError> {
        self.brightness = 0;
        self.lit_since = None;
        Ok(())
    }

    fn move_cover(&mut self, open: bool) -> Result<(), AscomError> {
        self.cover = Motion::Moving {
            open,
            since: Instant::now(),
        };
        Ok(())
    }

    fn halt_cover(&mut self) -> Result<(), AscomError> {
        if let Motion::Moving { .. } = self.cover {
            self.cover = Motion::Still(CoverStatus::Unknown);
        }
        Ok(())
    }

    fn maintain(&mut self) {
        if let Motion::Moving { open, since } = self.cover
            && since.elapsed() >= COVER_TRAVEL
        {
            let status = if open {
                CoverStatus::Open
            } else {
                CoverStatus::Closed
            };
            info!("Cover {status:?}");
            self.cover = Motion::Still(status);
        }
    }
}

/// A weather station reading temperature, humidity, and pressure.
pub(crate) struct WeatherStation {
    started: Instant,
    sampled: Instant,
    temperature: f64,
    humidity: f64,
    pressure: f64,
}

impl WeatherStation {
    pub(crate) fn new() -> Self {
        let now = Instant::now();
        let mut station = Self {
            started: now,
            sampled: now,
            temperature: 0.0,
            humidity: 0.0,
            pressure: 0.0,
        };
        station.sample();
        station
    }

    fn sample(&mut self) {
        let hours = self.started.elapsed().as_secs_f64() / 3600.0;
        self.temperature = 8.0 + 3.0 * (hours * std::f64::consts::PI / 12.0).sin();
        self.humidity = 70.0 - 2.0 * (self.temperature - 8.0);
        self.pressure = 1013.25;
        self.sampled = Instant::now();
    }

    // Magnus formula.
    fn dew_point(&self) -> f64 {
        let gamma = (self.humidity / 100.0).ln() + 17.62 * self.temperature / (243.12 + self.temperature);
        243.12 * gamma / (17.62 - gamma)
    }
}

impl WeatherSensors for WeatherStation {
    fn value(&mut self, sensor: SensorName) -> Result<f64, AscomError> {
        match sensor {
            SensorName::Temperature => Ok(self.temperature),
            SensorName::Humidity => Ok(self.humidity),
            SensorName::Pressure => Ok(self.pressure),
            SensorName::DewPoint => Ok(self.dew_point()),
            _ => Err(sensor_not_implemented(sensor)),
        }
    }

    fn description(&self, sensor: SensorName) -> Result<Cow<'static, str>, AscomError> {
        match sensor {
            SensorName::Temperature | SensorName::Humidity | SensorName::Pressure => {
                Ok(Cow::Borrowed("Simulated BME280"))
            }
            SensorName::DewPoint => Ok(Cow::Borrowed("Computed from temperature and humidity")),
            _ => Err(sensor_not_implemented(sensor)),
        }
    }

    fn time_since_last_update(&mut self, sensor: SensorName) -> Result<f64, AscomError> {
        let _ = self.value(sensor)?;
        Ok(self.sampled.elapsed().as_secs_f64())
    }

    fn refresh(&mut self) -> Result<(), AscomError> {
        self.sample();
        Ok(())
    }

    fn maintain(&mut self) {
        if self.sampled.elapsed() >= SAMPLE_PERIOD {
            self.sample();
        }
    }
}
