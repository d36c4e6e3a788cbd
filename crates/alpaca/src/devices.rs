use crate::macros::wire_names;

wire_names! {
    /// Kinds of Alpaca devices.
    ///
    /// The name is the one reported in management responses, such as
    /// `CoverCalibrator`. Request paths spell it in lowercase, see
    /// [`DeviceType::from_path_segment`].
    ALL_DEVICE_TYPES => DeviceType {
        /// A camera.
        Camera => "Camera",
        /// A telescope cover and flat-field calibrator.
        CoverCalibrator => "CoverCalibrator",
        /// A dome.
        Dome => "Dome",
        /// A filter wheel.
        FilterWheel => "FilterWheel",
        /// A focuser.
        Focuser => "Focuser",
        /// A weather station.
        ObservingConditions => "ObservingConditions",
        /// A field rotator.
        Rotator => "Rotator",
        /// A safety monitor.
        SafetyMonitor => "SafetyMonitor",
        /// A bank of switches.
        Switch => "Switch",
        /// A telescope mount.
        Telescope => "Telescope",
    }
}

impl DeviceType {
    /// Finds the [`DeviceType`] whose lowercase name is exactly `segment`.
    ///
    /// A path segment containing uppercase letters never matches.
    #[must_use]
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        if segment.bytes().any(|b| b.is_ascii_uppercase()) {
            return None;
        }
        Self::from_name_ignore_case(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::{ALL_DEVICE_TYPES, DeviceType};

    use crate::serialize;

    #[cfg(feature = "deserialize")]
    use crate::deserialize;

    #[test]
    fn test_path_segment() {
        for device_type in ALL_DEVICE_TYPES {
            let segment = device_type.name().to_ascii_lowercase();
            assert_eq!(DeviceType::from_path_segment(&segment), Some(*device_type));
        }

        assert_eq!(DeviceType::from_path_segment("Switch"), None);
        assert_eq!(DeviceType::from_path_segment("covercalibrators"), None);
    }

    #[test]
    fn test_device_type_serde() {
        assert_eq!(
            serialize(DeviceType::ObservingConditions),
            serde_json::json!("ObservingConditions")
        );

        #[cfg(feature = "deserialize")]
        assert_eq!(
            deserialize::<DeviceType>(serde_json::json!("CoverCalibrator")),
            DeviceType::CoverCalibrator
        );
    }
}
