use alloc::format;
use alloc::string::String;

use crate::device::DeviceInfo;
use crate::error::Result;

/// Source of the unique identifiers of the configured devices.
///
/// An identifier must remain the same across restarts for as long as the
/// device configuration does not change.
pub trait UniqueIdStore {
    /// Loads the unique identifier of a device, or creates it when the
    /// device has none.
    ///
    /// # Errors
    ///
    /// Fails when an identifier can be neither loaded nor created.
    fn unique_id(&mut self, info: &DeviceInfo) -> Result<String>;
}

/// Unique identifiers derived from the interface `MAC` address.
///
/// Identifiers are formatted as `UUID`s mixing the device type, number, and
/// configuration identifier with the `MAC` address, so they need no
/// persistent storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacUniqueIds {
    mac: [u8; 6],
}

impl MacUniqueIds {
    /// Creates a [`MacUniqueIds`] from a `MAC` address.
    #[must_use]
    #[inline]
    pub const fn new(mac: [u8; 6]) -> Self {
        Self { mac }
    }
}

impl UniqueIdStore for MacUniqueIds {
    fn unique_id(&mut self, info: &DeviceInfo) -> Result<String> {
        // FNV-1a of the device type name.
        let type_hash = info
            .device_type
            .name()
            .bytes()
            .fold(0x811c_9dc5_u32, |hash, b| {
                (hash ^ u32::from(b)).wrapping_mul(0x0100_0193)
            });
        let [m0, m1, m2, m3, m4, m5] = self.mac;

        Ok(format!(
            "{type_hash:08x}-{:04x}-4{:03x}-8{:03x}-{m0:02x}{m1:02x}{m2:02x}{m3:02x}{m4:02x}{m5:02x}",
            info.device_number & 0xffff,
            (info.config_id >> 12) & 0xfff,
            info.config_id & 0xfff,
        ))
    }
}
