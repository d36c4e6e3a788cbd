use core::fmt::{Display, Formatter};

use alloc::format;
use alloc::vec::Vec;

use alpaca::api::{Api, SUPPORTED_API_VERSIONS};
use alpaca::description::{ConfiguredDevice, ServerDescription};
use alpaca::devices::DeviceType;
use alpaca::http::HttpStatus;
use alpaca::response::MethodResponse;

use log::{error, info, warn};

use crate::device::Device;
use crate::error::{Error, ErrorKind, Result};
use crate::request::AlpacaRequest;
use crate::response::ResponseWriter;
use crate::storage::UniqueIdStore;

/// Routes decoded requests to the configured devices and answers the
/// management and setup requests.
pub struct DeviceRouter<'d> {
    description: ServerDescription,
    devices: &'d mut [&'d mut dyn Device],
    configured: Vec<ConfiguredDevice>,
}

impl<'d> DeviceRouter<'d> {
    /// Creates a [`DeviceRouter`] and initializes every device.
    ///
    /// # Errors
    ///
    /// Fails when two devices share the same type and number, or when the
    /// unique identifier of a device cannot be obtained or is not unique.
    pub fn new<S: UniqueIdStore>(
        description: ServerDescription,
        devices: &'d mut [&'d mut dyn Device],
        unique_ids: &mut S,
    ) -> Result<Self> {
        let mut configured: Vec<ConfiguredDevice> = Vec::with_capacity(devices.len());
        for device in devices.iter() {
            let info = device.info();
            if configured.iter().any(|other| {
                other.device_type == info.device_type && other.device_number == info.device_number
            }) {
                return Err(Error::new(
                    ErrorKind::Configuration,
                    format!("Duplicate device {}/{}", info.device_type, info.device_number),
                ));
            }

            let unique_id = unique_ids.unique_id(info)?;
            if configured.iter().any(|other| other.unique_id == unique_id) {
                return Err(Error::new(
                    ErrorKind::UniqueId,
                    format!("Duplicate unique identifier {unique_id}"),
                )
                .with_info(format!("{}/{}", info.device_type, info.device_number)));
            }

            configured.push(ConfiguredDevice {
                device_name: info.name.into(),
                device_type: info.device_type,
                device_number: info.device_number,
                unique_id: unique_id.into(),
            });
        }

        for device in devices.iter_mut() {
            device.initialize();
        }
        info!("Serving {} devices", devices.len());

        Ok(Self {
            description,
            devices,
            configured,
        })
    }

    /// Returns the devices advertised by `/management/v1/configureddevices`.
    #[must_use]
    pub fn configured_devices(&self) -> &[ConfiguredDevice] {
        &self.configured
    }

    /// Lets every device perform its periodic work.
    pub fn maintain_devices(&mut self) {
        for device in self.devices.iter_mut() {
            device.maintain();
        }
    }

    /// Writes the response to a decoded request.
    ///
    /// Returns whether the connection can stay open afterwards.
    pub fn dispatch(&mut self, request: &AlpacaRequest, writer: &mut ResponseWriter<'_>) -> bool {
        let Some(api) = request.api() else {
            error!("Dispatching a request without API");
            let written = writer.http_error(
                HttpStatus::InternalServerError,
                HttpStatus::InternalServerError.reason(),
            );
            return finish(written, true);
        };

        if api.is_json() && !request.accepts_json() {
            let written = writer.http_error(
                HttpStatus::NotAcceptable,
                "Only application/json responses are available",
            );
            return finish(written, true);
        }

        let close = request.do_close();
        let client_transaction_id = request.client_transaction_id();
        let server_transaction_id = request.server_transaction_id().unwrap_or_default();

        let written = match api {
            Api::DeviceApi | Api::DeviceSetup => {
                return self.dispatch_device(api, request, writer);
            }
            Api::ManagementApiVersions => writer.json(
                &MethodResponse::ok(
                    Some(SUPPORTED_API_VERSIONS),
                    client_transaction_id,
                    server_transaction_id,
                ),
                close,
            ),
            Api::ManagementDescription => writer.json(
                &MethodResponse::ok(
                    Some(&self.description),
                    client_transaction_id,
                    server_transaction_id,
                ),
                close,
            ),
            Api::ManagementConfiguredDevices => writer.json(
                &MethodResponse::ok(
                    Some(self.configured.as_slice()),
                    client_transaction_id,
                    server_transaction_id,
                ),
                close,
            ),
            Api::ServerSetup => writer.html(ServerSetupPage(&self.description), close),
            Api::ServerStatus => writer.html(
                StatusPage {
                    description: &self.description,
                    configured: &self.configured,
                },
                close,
            ),
        };

        finish(written, close)
    }

    fn dispatch_device(
        &mut self,
        api: Api,
        request: &AlpacaRequest,
        writer: &mut ResponseWriter<'_>,
    ) -> bool {
        let close = request.do_close();
        let (Some(device_type), Some(device_number)) =
            (request.device_type(), request.device_number())
        else {
            error!("Dispatching a device request without device");
            let written = writer.http_error(
                HttpStatus::InternalServerError,
                HttpStatus::InternalServerError.reason(),
            );
            return finish(written, true);
        };

        let Some(index) = self.find(device_type, device_number) else {
            warn!("Request for unknown device {device_type}/{device_number}");
            let written = writer.http_error(
                HttpStatus::BadRequest,
                format_args!("{api} {device_type}/{device_number}: Unknown device"),
            );
            return finish(written, true);
        };

        let device = &mut self.devices[index];
        let written = if api == Api::DeviceSetup {
            writer.html(
                SetupPage {
                    device: &**device,
                    unique_id: &self.configured[index].unique_id,
                },
                close,
            )
        } else {
            let result = if request.is_read() {
                device.handle_get(request)
            } else {
                device.handle_put(request)
            };
            if let Err(e) = &result {
                info!(
                    "{device_type}/{device_number} {:?}: {e}",
                    request.device_method()
                );
            }
            writer.json(
                &MethodResponse::from_result(
                    result,
                    request.client_transaction_id(),
                    request.server_transaction_id().unwrap_or_default(),
                ),
                close,
            )
        };

        finish(written, close)
    }

    fn find(&self, device_type: DeviceType, device_number: u32) -> Option<usize> {
        self.configured.iter().position(|device| {
            device.device_type == device_type && device.device_number == device_number
        })
    }
}

struct ServerSetupPage<'a>(&'a ServerDescription);

impl Display for ServerSetupPage<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "<html><body><h1>{} Setup</h1>\nNo setup</body></html>",
            self.0.server_name
        )
    }
}

struct StatusPage<'a> {
    description: &'a ServerDescription,
    configured: &'a [ConfiguredDevice],
}

impl Display for StatusPage<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "<html><body><h1>{}</h1>\n\
             Manufacturer: {} {}<br>\
             Location: {}<br>\n\
             <table><tr><th>Type</th><th>Number</th><th>Name</th><th>Unique ID</th></tr>",
            self.description.server_name,
            self.description.manufacturer,
            self.description.manufacturer_version,
            self.description.location,
        )?;
        for device in self.configured {
            write!(
                f,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                device.device_type, device.device_number, device.device_name, device.unique_id
            )?;
        }
        f.write_str("</table></body></html>")
    }
}

struct SetupPage<'a> {
    device: &'a dyn Device,
    unique_id: &'a str,
}

impl Display for SetupPage<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        self.device.write_setup_page(f, self.unique_id)
    }
}

fn finish(written: Result<()>, close: bool) -> bool {
    match written {
        Ok(()) => !close,
        Err(e) => {
            error!("Cannot write the response: {e}");
            false
        }
    }
}
