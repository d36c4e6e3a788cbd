//! Devices built on hardware traits.
//!
//! Each device answers the methods of its type and leaves the shared
//! methods to the common handling of [`crate::device`].

/// `CoverCalibrator` device.
pub mod cover_calibrator;
/// `ObservingConditions` device.
pub mod observing_conditions;
/// `Switch` device.
pub mod switch;
