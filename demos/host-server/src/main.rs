//! An Alpaca server running on a host, serving a simulated power box, a
//! flat panel, and a weather station.
//!
//! The host sockets emulate a network interface with four hardware sockets,
//! so the server runs exactly as it would on a microcontroller.

mod driver;
mod simulation;

use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use alpaca::description::ServerDescription;
use alpaca::devices::DeviceType;

use alpaca_server::device::{Device, DeviceInfo};
use alpaca_server::devices::cover_calibrator::CoverCalibrator;
use alpaca_server::devices::observing_conditions::ObservingConditions;
use alpaca_server::devices::switch::Switch;
use alpaca_server::server::Server;
use alpaca_server::storage::MacUniqueIds;

use clap::Parser;

use log::{error, info};

use driver::HostDriver;
use simulation::{FlatPanel, PowerBox, WeatherStation};

const SOCKETS: usize = 4;
const POLL_PERIOD: Duration = Duration::from_millis(2);

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Server port.
    #[arg(short, long, default_value_t = 11111)]
    port: u16,

    /// Closes connections without progress for this number of milliseconds.
    #[arg(long)]
    idle_timeout: Option<u64>,

    /// Does not answer Alpaca discovery requests.
    #[arg(long)]
    no_discovery: bool,

    /// Last byte of the MAC address mixed into the device unique identifiers.
    #[arg(long, default_value_t = 1)]
    instance: u8,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();

    let mut power_box = Switch::new(
        DeviceInfo::new(DeviceType::Switch, 0, "Power Box")
            .description("Four relays and a dew heater")
            .driver_info("Simulated power box")
            .driver_version("1.0")
            .interface_version(2),
        PowerBox::new(),
    );
    let mut flat_panel = CoverCalibrator::new(
        DeviceInfo::new(DeviceType::CoverCalibrator, 0, "Flat Panel")
            .description("Flat panel with a motorized cover")
            .driver_info("Simulated flat panel")
            .driver_version("1.0"),
        FlatPanel::new(),
    );
    let mut weather = ObservingConditions::new(
        DeviceInfo::new(DeviceType::ObservingConditions, 0, "Weather Station")
            .description("Temperature, humidity, and pressure")
            .driver_info("Simulated weather station")
            .driver_version("1.0"),
        WeatherStation::new(),
    )
    .max_average_period(24.0);

    let mut devices: [&mut dyn Device; 3] = [&mut power_box, &mut flat_panel, &mut weather];

    let description = ServerDescription::new("Host Alpaca Server")
        .manufacturer("Alpaca Labs")
        .manufacturer_version(env!("CARGO_PKG_VERSION"))
        .location("Host");
    let mut unique_ids = MacUniqueIds::new([0x02, 0x00, 0x00, 0x00, 0x00, cli.instance]);

    let server: Server<'_, SOCKETS> =
        match Server::new(description, &mut devices, &mut unique_ids) {
            Ok(server) => server,
            Err(e) => {
                error!("Cannot start the server: {e}");
                return ExitCode::FAILURE;
            }
        };
    let mut server = server.port(cli.port).discovery(!cli.no_discovery);
    if let Some(timeout_ms) = cli.idle_timeout {
        server = server.idle_timeout(timeout_ms);
    }

    for device in server.router().configured_devices() {
        info!(
            "{}/{} \"{}\" {}",
            device.device_type, device.device_number, device.device_name, device.unique_id
        );
    }
    info!("Listening on port {}", cli.port);

    let mut driver = HostDriver::<SOCKETS>::new();
    let started = Instant::now();
    loop {
        let now_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        server.perform_io(&mut driver, now_ms);
        thread::sleep(POLL_PERIOD);
    }
}
