use alpaca::description::ServerDescription;
use alpaca::http::HttpStatus;

use log::{error, info};

use crate::connection::{ConnectionHandler, RequestListener};
use crate::device::Device;
use crate::discovery::{DatagramDriver, DiscoveryResponder};
use crate::error::Result;
use crate::pool::ConnectionPool;
use crate::request::AlpacaRequest;
use crate::response::ResponseWriter;
use crate::router::DeviceRouter;
use crate::socket::{SocketDriver, SocketId};
use crate::storage::UniqueIdStore;

// Default port.
const DEFAULT_SERVER_PORT: u16 = 80;

/// Default number of hardware sockets serving clients.
pub const DEFAULT_SOCKETS: usize = 4;
/// Default size of the input buffer of each connection.
pub const DEFAULT_RX_SIZE: usize = 1024;
/// Default size of the output buffer of each connection.
pub const DEFAULT_TX_SIZE: usize = 2048;

struct Dispatcher<'d> {
    router: DeviceRouter<'d>,
    last_server_transaction_id: u32,
}

impl RequestListener for Dispatcher<'_> {
    fn on_start_decoding(&mut self, request: &mut AlpacaRequest) {
        self.last_server_transaction_id = self.last_server_transaction_id.wrapping_add(1).max(1);
        request.set_server_transaction_id(self.last_server_transaction_id);
    }

    fn on_request_decoded(
        &mut self,
        request: &AlpacaRequest,
        writer: &mut ResponseWriter<'_>,
    ) -> bool {
        info!(
            "Request {}: {:?} {:?} {:?}",
            request.server_transaction_id().unwrap_or_default(),
            request.http_method(),
            request.api(),
            request.device_method()
        );
        self.router.dispatch(request, writer)
    }

    fn on_request_decoding_error(
        &mut self,
        request: &AlpacaRequest,
        status: HttpStatus,
        writer: &mut ResponseWriter<'_>,
    ) {
        error!(
            "Request {} rejected with {status}",
            request.server_transaction_id().unwrap_or_default()
        );
        // An overflow is handled by the connection.
        let _ = writer.http_error(status, status.reason());
    }
}

/// An Alpaca server driving `SOCKETS` hardware sockets.
///
/// Each socket owns an input buffer of `RX_SIZE` bytes and an output buffer
/// of `TX_SIZE` bytes. The server never blocks: the firmware main loop calls
/// [`Server::perform_io`] repeatedly, passing the current time.
pub struct Server<
    'd,
    const SOCKETS: usize = DEFAULT_SOCKETS,
    const RX_SIZE: usize = DEFAULT_RX_SIZE,
    const TX_SIZE: usize = DEFAULT_TX_SIZE,
> {
    pool: ConnectionPool<SOCKETS, RX_SIZE, TX_SIZE>,
    dispatcher: Dispatcher<'d>,
    discovery: Option<DiscoveryResponder>,
}

impl<'d, const SOCKETS: usize, const RX_SIZE: usize, const TX_SIZE: usize>
    Server<'d, SOCKETS, RX_SIZE, TX_SIZE>
{
    /// Creates a [`Server`] for a list of devices.
    ///
    /// The unique identifier of each device is obtained from `unique_ids`,
    /// then every device is initialized.
    ///
    /// # Errors
    ///
    /// Fails when the device list cannot be served, for example when two
    /// devices share the same type and number.
    pub fn new<S: UniqueIdStore>(
        description: ServerDescription,
        devices: &'d mut [&'d mut dyn Device],
        unique_ids: &mut S,
    ) -> Result<Self> {
        let router = DeviceRouter::new(description, devices, unique_ids)?;
        Ok(Self {
            pool: ConnectionPool::new(DEFAULT_SERVER_PORT),
            dispatcher: Dispatcher {
                router,
                last_server_transaction_id: 0,
            },
            discovery: Some(DiscoveryResponder::new(DEFAULT_SERVER_PORT)),
        })
    }

    /// Sets the server port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.pool.set_port(port);
        if let Some(discovery) = &mut self.discovery {
            discovery.set_port(port);
        }
        self
    }

    /// Closes connections that do not progress for the given time.
    ///
    /// By default, connections are never closed for inactivity.
    #[must_use]
    pub const fn idle_timeout(mut self, timeout_ms: u64) -> Self {
        self.pool.set_idle_timeout(Some(timeout_ms));
        self
    }

    /// Enables or disables the answers to Alpaca discovery requests.
    ///
    /// Discovery is enabled by default.
    #[must_use]
    pub const fn discovery(mut self, enabled: bool) -> Self {
        self.discovery = if enabled {
            Some(DiscoveryResponder::new(self.pool.port()))
        } else {
            None
        };
        self
    }

    /// Returns the device router.
    #[must_use]
    pub const fn router(&self) -> &DeviceRouter<'d> {
        &self.dispatcher.router
    }

    /// Returns the handler of a socket connection.
    #[must_use]
    pub fn connection(&self, socket: SocketId) -> Option<&ConnectionHandler<RX_SIZE, TX_SIZE>> {
        self.pool.handler(socket)
    }

    /// Performs one round of work: device maintenance, discovery, and the
    /// input and output of every socket.
    pub fn perform_io<D>(&mut self, driver: &mut D, now_ms: u64)
    where
        D: SocketDriver + DatagramDriver,
    {
        self.dispatcher.router.maintain_devices();
        if let Some(discovery) = &mut self.discovery {
            discovery.perform_io(driver);
        }
        self.pool.perform_io(driver, &mut self.dispatcher, now_ms);
    }
}

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;
    use alloc::collections::VecDeque;
    use alloc::string::String;
    use alloc::vec::Vec;

    use core::convert::Infallible;
    use core::net::{IpAddr, Ipv4Addr, SocketAddr};

    use alpaca::description::ServerDescription;
    use alpaca::devices::DeviceType;
    use alpaca::error::AscomError;

    use embedded_io::ErrorType;

    use serde_json::{Value, json};

    use crate::connection::ConnectionState;
    use crate::device::{Device, DeviceInfo};
    use crate::devices::switch::{Switch, SwitchBank};
    use crate::discovery::DatagramDriver;
    use crate::error::ErrorKind;
    use crate::socket::{SocketDriver, SocketId, SocketStatus};
    use crate::storage::MacUniqueIds;

    use super::Server;

    const MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];

    struct MockSocket {
        status: SocketStatus,
        input: VecDeque<u8>,
        output: Vec<u8>,
        closes: usize,
    }

    struct MockDriver {
        sockets: Vec<MockSocket>,
        now_ms: u64,
        datagrams: VecDeque<(Vec<u8>, SocketAddr)>,
        sent: Vec<(SocketAddr, Vec<u8>)>,
    }

    impl MockDriver {
        fn new(sockets: usize) -> Self {
            Self {
                sockets: (0..sockets)
                    .map(|_| MockSocket {
                        status: SocketStatus::Closed,
                        input: VecDeque::new(),
                        output: Vec::new(),
                        closes: 0,
                    })
                    .collect(),
                now_ms: 0,
                datagrams: VecDeque::new(),
                sent: Vec::new(),
            }
        }

        fn socket(&mut self, socket: SocketId) -> &mut MockSocket {
            &mut self.sockets[usize::from(socket)]
        }

        fn connect(&mut self, socket: SocketId, input: &[u8]) {
            let socket = self.socket(socket);
            socket.status = SocketStatus::Established;
            socket.input.extend(input);
            socket.output.clear();
        }

        fn send(&mut self, socket: SocketId, input: &[u8]) {
            self.socket(socket).input.extend(input);
        }

        fn output(&mut self, socket: SocketId) -> String {
            let output = core::mem::take(&mut self.socket(socket).output);
            String::from_utf8(output).unwrap()
        }
    }

    impl ErrorType for MockDriver {
        type Error = Infallible;
    }

    impl SocketDriver for MockDriver {
        fn status(&mut self, socket: SocketId) -> SocketStatus {
            self.socket(socket).status
        }

        fn listen(&mut self, socket: SocketId, _port: u16) -> Result<(), Infallible> {
            self.socket(socket).status = SocketStatus::Listen;
            Ok(())
        }

        fn available(&mut self, socket: SocketId) -> usize {
            self.socket(socket).input.len()
        }

        fn read(&mut self, socket: SocketId, buf: &mut [u8]) -> Result<usize, Infallible> {
            let input = &mut self.socket(socket).input;
            let count = buf.len().min(input.len());
            for (slot, b) in buf.iter_mut().zip(input.drain(..count)) {
                *slot = b;
            }
            Ok(count)
        }

        fn write(&mut self, socket: SocketId, buf: &[u8]) -> Result<usize, Infallible> {
            self.socket(socket).output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn disconnect(&mut self, socket: SocketId) {
            let socket = self.socket(socket);
            socket.status = match socket.status {
                SocketStatus::CloseWait => SocketStatus::LastAck,
                _ => SocketStatus::FinWait,
            };
        }

        fn close(&mut self, socket: SocketId) {
            let socket = self.socket(socket);
            socket.status = SocketStatus::Closed;
            socket.closes += 1;
        }
    }

    impl DatagramDriver for MockDriver {
        fn bind(&mut self, _port: u16) -> Result<(), Infallible> {
            Ok(())
        }

        fn receive(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, Infallible> {
            Ok(self.datagrams.pop_front().map(|(datagram, remote)| {
                buf[..datagram.len()].copy_from_slice(&datagram);
                (datagram.len(), remote)
            }))
        }

        fn send_to(&mut self, remote: SocketAddr, data: &[u8]) -> Result<(), Infallible> {
            self.sent.push((remote, data.to_vec()));
            Ok(())
        }
    }

    struct Relays {
        states: [bool; 2],
    }

    impl SwitchBank for Relays {
        fn max_switch(&self) -> u32 {
            2
        }

        fn can_write(&self, _id: u32) -> bool {
            true
        }

        fn name(&self, _id: u32) -> Cow<'static, str> {
            Cow::Borrowed("Relay")
        }

        fn description(&self, _id: u32) -> Cow<'static, str> {
            Cow::Borrowed("Roof relay")
        }

        fn value(&mut self, id: u32) -> Result<f64, AscomError> {
            Ok(if self.states[id as usize] { 1.0 } else { 0.0 })
        }

        fn set_value(&mut self, id: u32, value: f64) -> Result<(), AscomError> {
            self.states[id as usize] = value > 0.0;
            Ok(())
        }
    }

    fn relays(device_number: u32) -> Switch<Relays> {
        Switch::new(
            DeviceInfo::new(DeviceType::Switch, device_number, "Relays"),
            Relays {
                states: [false; 2],
            },
        )
    }

    fn description() -> ServerDescription {
        ServerDescription::new("Test Server").manufacturer("Test")
    }

    fn poll<const S: usize, const RX: usize, const TX: usize>(
        server: &mut Server<'_, S, RX, TX>,
        driver: &mut MockDriver,
        times: u64,
    ) {
        for _ in 0..times {
            driver.now_ms += 10;
            let now_ms = driver.now_ms;
            server.perform_io(driver, now_ms);
        }
    }

    // Splits a response into its head and its body.
    fn split(response: &str) -> (&str, &str) {
        response.split_once("\r\n\r\n").unwrap()
    }

    fn json_body(response: &str) -> Value {
        let (head, body) = split(response);
        assert!(head.contains("Content-Type: application/json\r\n"));
        assert!(head.contains(&alloc::format!("Content-Length: {}\r\n", body.len())));
        assert!(body.ends_with("\r\n"));
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_configured_devices_without_devices() {
        let mut devices: [&mut dyn Device; 0] = [];
        let mut server: Server<'_> =
            Server::new(description(), &mut devices, &mut MacUniqueIds::new(MAC)).unwrap();
        let mut driver = MockDriver::new(4);

        poll(&mut server, &mut driver, 1);
        assert_eq!(driver.socket(0).status, SocketStatus::Listen);

        driver.connect(
            0,
            b"GET /management/v1/configureddevices?ClientTransactionID=5 HTTP/1.1\r\n\r\n",
        );
        poll(&mut server, &mut driver, 2);

        let response = driver.output(0);
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(!response.contains("Connection: close"));
        let body = json_body(&response);
        assert_eq!(body["Value"], json!([]));
        assert_eq!(body["ClientTransactionID"], json!(5));
        assert_eq!(body["ServerTransactionID"], json!(1));
        assert_eq!(body["ErrorNumber"], json!(0));

        // The connection stays open for the next request.
        assert_eq!(
            server.connection(0).unwrap().state(),
            ConnectionState::Decoding
        );
    }

    #[test]
    fn test_unknown_device() {
        let mut switch = relays(0);
        let mut devices: [&mut dyn Device; 1] = [&mut switch];
        let mut server: Server<'_> =
            Server::new(description(), &mut devices, &mut MacUniqueIds::new(MAC)).unwrap();
        let mut driver = MockDriver::new(4);

        poll(&mut server, &mut driver, 1);
        driver.connect(1, b"GET /api/v1/camera/0/connected HTTP/1.1\r\n\r\n");
        poll(&mut server, &mut driver, 2);

        let response = driver.output(1);
        let (head, body) = split(&response);
        assert!(head.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(head.contains("Connection: close\r\n"));
        assert!(head.contains("Content-Type: text/plain\r\n"));
        assert!(body.ends_with("Unknown device"));
        assert_eq!(driver.socket(1).status, SocketStatus::FinWait);
    }

    #[test]
    fn test_header_section_too_large() {
        let mut devices: [&mut dyn Device; 0] = [];
        let mut server: Server<'_, 1, 256, 1024> =
            Server::new(description(), &mut devices, &mut MacUniqueIds::new(MAC)).unwrap();
        let mut driver = MockDriver::new(1);

        let mut request = Vec::from(&b"GET /management/v1/description HTTP/1.1\r\nX-Padding: "[..]);
        request.extend(core::iter::repeat_n(b'a', 300));
        request.extend_from_slice(b"\r\n\r\n");

        poll(&mut server, &mut driver, 1);
        driver.connect(0, &request);
        poll(&mut server, &mut driver, 4);

        let response = driver.output(0);
        assert!(response.starts_with("HTTP/1.1 431 Request Header Fields Too Large\r\n"));
        assert!(response.contains("Connection: close\r\n"));
        assert!(!response.contains("application/json"));
        assert_ne!(driver.socket(0).status, SocketStatus::Established);
    }

    #[test]
    fn test_missing_state() {
        let mut switch = relays(0);
        let mut devices: [&mut dyn Device; 1] = [&mut switch];
        let mut server: Server<'_> =
            Server::new(description(), &mut devices, &mut MacUniqueIds::new(MAC)).unwrap();
        let mut driver = MockDriver::new(4);

        poll(&mut server, &mut driver, 1);
        driver.connect(
            2,
            b"PUT /api/v1/switch/0/setswitch HTTP/1.1\r\n\
              Content-Type: application/x-www-form-urlencoded\r\n\
              Content-Length: 4\r\n\r\nId=0",
        );
        poll(&mut server, &mut driver, 2);

        let response = driver.output(2);
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        let body = json_body(&response);
        assert_eq!(body["ErrorMessage"], json!("Missing parameter: State"));
        assert_ne!(body["ErrorNumber"], json!(0));
        assert!(body.get("Value").is_none());
    }

    #[test]
    fn test_duplicate_devices() {
        let mut first = relays(0);
        let mut second = relays(0);
        let mut devices: [&mut dyn Device; 2] = [&mut first, &mut second];

        let server: Result<Server<'_>, _> =
            Server::new(description(), &mut devices, &mut MacUniqueIds::new(MAC));
        let error = server.err().unwrap();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_transaction_ids() {
        let mut switch = relays(0);
        let mut devices: [&mut dyn Device; 1] = [&mut switch];
        let mut server: Server<'_> =
            Server::new(description(), &mut devices, &mut MacUniqueIds::new(MAC)).unwrap();
        let mut driver = MockDriver::new(4);

        poll(&mut server, &mut driver, 1);
        driver.connect(
            0,
            b"PUT /api/v1/switch/0/setswitch HTTP/1.1\r\n\
              Content-Type: application/x-www-form-urlencoded\r\n\
              Content-Length: 38\r\n\r\nId=1&State=true&ClientTransactionID=41",
        );
        poll(&mut server, &mut driver, 2);

        let body = json_body(&driver.output(0));
        assert_eq!(body["ErrorNumber"], json!(0));
        assert_eq!(body["ClientTransactionID"], json!(41));
        assert_eq!(body["ServerTransactionID"], json!(1));

        // Same connection, without a client transaction number.
        driver.send(0, b"GET /api/v1/switch/0/getswitch?Id=1 HTTP/1.1\r\n\r\n");
        poll(&mut server, &mut driver, 1);

        let body = json_body(&driver.output(0));
        assert_eq!(body["Value"], json!(true));
        assert!(body.get("ClientTransactionID").is_none());
        assert_eq!(body["ServerTransactionID"], json!(2));

        // Another connection continues the sequence.
        driver.connect(1, b"GET /api/v1/switch/0/maxswitch HTTP/1.1\r\n\r\n");
        poll(&mut server, &mut driver, 2);
        let body = json_body(&driver.output(1));
        assert_eq!(body["Value"], json!(2));
        assert_eq!(body["ServerTransactionID"], json!(3));
    }

    #[test]
    fn test_request_split_across_reads() {
        let mut switch = relays(0);
        let mut devices: [&mut dyn Device; 1] = [&mut switch];
        let mut server: Server<'_> =
            Server::new(description(), &mut devices, &mut MacUniqueIds::new(MAC)).unwrap();
        let mut driver = MockDriver::new(4);

        poll(&mut server, &mut driver, 1);
        driver.connect(3, b"GET /api/v1/switch/0/name HTTP/1.1\r\nConnection: close\r\n");
        poll(&mut server, &mut driver, 2);
        assert!(driver.socket(3).output.is_empty());

        // The request completes in a later read.
        driver.send(3, b"\r\n");
        poll(&mut server, &mut driver, 1);

        let response = driver.output(3);
        assert!(response.contains("Connection: close\r\n"));
        assert_eq!(json_body(&response)["Value"], json!("Relays"));
        assert_eq!(driver.socket(3).status, SocketStatus::FinWait);

        // Closing sockets are released after a while.
        poll(&mut server, &mut driver, 600);
        assert_eq!(driver.socket(3).status, SocketStatus::Listen);
    }

    #[test]
    fn test_head_request() {
        let mut switch = relays(0);
        let mut devices: [&mut dyn Device; 1] = [&mut switch];
        let mut server: Server<'_> =
            Server::new(description(), &mut devices, &mut MacUniqueIds::new(MAC)).unwrap();
        let mut driver = MockDriver::new(4);

        poll(&mut server, &mut driver, 1);
        driver.connect(0, b"HEAD /api/v1/switch/0/name HTTP/1.1\r\n\r\n");
        poll(&mut server, &mut driver, 2);

        let response = driver.output(0);
        let (head, body) = split(&response);
        assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(!head.contains("Content-Length: 0\r\n"));
        assert!(body.is_empty());
    }

    #[test]
    fn test_response_too_large() {
        let mut devices: [&mut dyn Device; 0] = [];
        let mut server: Server<'_, 1, 256, 192> =
            Server::new(description(), &mut devices, &mut MacUniqueIds::new(MAC)).unwrap();
        let mut driver = MockDriver::new(1);

        poll(&mut server, &mut driver, 1);
        driver.connect(0, b"GET /management/v1/description HTTP/1.1\r\n\r\n");
        poll(&mut server, &mut driver, 2);

        let response = driver.output(0);
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(response.contains("Connection: close\r\n"));
    }

    #[test]
    fn test_error_response_too_large() {
        let mut devices: [&mut dyn Device; 0] = [];
        let mut server: Server<'_, 1, 256, 48> =
            Server::new(description(), &mut devices, &mut MacUniqueIds::new(MAC)).unwrap();
        let mut driver = MockDriver::new(1);

        poll(&mut server, &mut driver, 1);
        driver.connect(0, b"GET /management/v1/description HTTP/1.1\r\n\r\n");
        poll(&mut server, &mut driver, 2);

        // Not even the error fits, so nothing is sent.
        assert!(driver.output(0).is_empty());
        assert_eq!(driver.socket(0).status, SocketStatus::FinWait);
        assert_eq!(
            server.connection(0).unwrap().state(),
            ConnectionState::Closed
        );
    }

    #[test]
    fn test_disconnect_timeout() {
        let mut devices: [&mut dyn Device; 0] = [];
        let mut server: Server<'_> =
            Server::new(description(), &mut devices, &mut MacUniqueIds::new(MAC)).unwrap();
        let mut driver = MockDriver::new(4);

        poll(&mut server, &mut driver, 1);
        driver.connect(
            0,
            b"GET /management/apiversions HTTP/1.1\r\nConnection: close\r\n\r\n",
        );
        poll(&mut server, &mut driver, 2);
        assert!(driver.output(0).starts_with("HTTP/1.1 200 OK\r\n"));

        // The peer never acknowledges the close.
        let t0 = driver.now_ms + 10;
        server.perform_io(&mut driver, t0);
        assert_eq!(driver.socket(0).status, SocketStatus::FinWait);

        server.perform_io(&mut driver, t0 + 5000);
        assert_eq!(driver.socket(0).status, SocketStatus::FinWait);
        assert_eq!(driver.socket(0).closes, 0);

        server.perform_io(&mut driver, t0 + 5001);
        assert_eq!(driver.socket(0).status, SocketStatus::Closed);
        assert_eq!(driver.socket(0).closes, 1);

        // The socket is armed again.
        server.perform_io(&mut driver, t0 + 5011);
        assert_eq!(driver.socket(0).status, SocketStatus::Listen);
    }

    #[test]
    fn test_half_closed_connection() {
        let mut devices: [&mut dyn Device; 0] = [];
        let mut server: Server<'_> =
            Server::new(description(), &mut devices, &mut MacUniqueIds::new(MAC)).unwrap();
        let mut driver = MockDriver::new(4);

        poll(&mut server, &mut driver, 1);
        driver.connect(0, b"GET /management/apiversions HTTP/1.1\r\n");
        poll(&mut server, &mut driver, 2);
        driver.socket(0).status = SocketStatus::CloseWait;
        poll(&mut server, &mut driver, 1);

        let response = driver.output(0);
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert_eq!(driver.socket(0).status, SocketStatus::LastAck);
    }

    #[test]
    fn test_idle_timeout() {
        let mut devices: [&mut dyn Device; 0] = [];
        let mut server: Server<'_> =
            Server::new(description(), &mut devices, &mut MacUniqueIds::new(MAC))
                .unwrap()
                .idle_timeout(100);
        let mut driver = MockDriver::new(4);

        poll(&mut server, &mut driver, 1);
        driver.connect(0, b"GET /management");
        poll(&mut server, &mut driver, 5);
        assert_eq!(driver.socket(0).status, SocketStatus::Established);

        poll(&mut server, &mut driver, 20);
        assert_eq!(driver.socket(0).status, SocketStatus::FinWait);
        assert!(driver.output(0).is_empty());
    }

    #[test]
    fn test_discovery() {
        let mut devices: [&mut dyn Device; 0] = [];
        let mut server: Server<'_> =
            Server::new(description(), &mut devices, &mut MacUniqueIds::new(MAC))
                .unwrap()
                .port(8080);
        let mut driver = MockDriver::new(4);

        let remote = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)), 40000);
        driver
            .datagrams
            .push_back((b"alpacadiscovery1".to_vec(), remote));
        driver.datagrams.push_back((b"hello".to_vec(), remote));
        poll(&mut server, &mut driver, 1);

        assert_eq!(driver.sent, [(remote, br#"{"alpacaport":8080}"#.to_vec())]);

        let mut server = server.discovery(false);
        driver
            .datagrams
            .push_back((b"alpacadiscovery1".to_vec(), remote));
        poll(&mut server, &mut driver, 1);
        assert_eq!(driver.sent.len(), 1);
    }
}
