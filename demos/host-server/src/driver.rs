use std::io::{ErrorKind, Read, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpListener, TcpStream, UdpSocket};

use alpaca_server::discovery::DatagramDriver;
use alpaca_server::socket::{SocketDriver, SocketId, SocketStatus};

use embedded_io::ErrorType;

use log::{debug, warn};

#[derive(Default)]
struct HostSocket {
    stream: Option<TcpStream>,
    status: Option<SocketStatus>,
    // Bytes received but not yet read by the server.
    pending: Vec<u8>,
}

impl HostSocket {
    fn status(&self) -> SocketStatus {
        self.status.unwrap_or(SocketStatus::Closed)
    }

    fn reset(&mut self) {
        self.stream = None;
        self.status = None;
        self.pending.clear();
    }
}

/// Emulates a network interface with a fixed number of hardware sockets
/// on top of non-blocking standard library sockets.
pub(crate) struct HostDriver<const SOCKETS: usize> {
    listener: Option<TcpListener>,
    sockets: [HostSocket; SOCKETS],
    discovery: Option<UdpSocket>,
}

impl<const SOCKETS: usize> HostDriver<SOCKETS> {
    pub(crate) fn new() -> Self {
        Self {
            listener: None,
            sockets: std::array::from_fn(|_| HostSocket::default()),
            discovery: None,
        }
    }

    fn socket(&mut self, socket: SocketId) -> &mut HostSocket {
        &mut self.sockets[usize::from(socket)]
    }

    fn accept(&mut self, socket: SocketId) {
        let Some(listener) = &self.listener else {
            return;
        };
        match listener.accept() {
            Ok((stream, remote)) => {
                if let Err(e) = stream.set_nonblocking(true) {
                    warn!("Socket {socket}: cannot accept {remote}: {e}");
                    return;
                }
                debug!("Socket {socket}: accepted {remote}");
                let host = self.socket(socket);
                host.stream = Some(stream);
                host.status = Some(SocketStatus::Established);
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => warn!("Socket {socket}: accept failed: {e}"),
        }
    }

    fn receive(&mut self, socket: SocketId) {
        let host = self.socket(socket);
        let Some(stream) = &mut host.stream else {
            return;
        };
        let mut buffer = [0; 512];
        loop {
            match stream.read(&mut buffer) {
                Ok(0) => {
                    host.status = Some(SocketStatus::CloseWait);
                    return;
                }
                Ok(count) => host.pending.extend_from_slice(&buffer[..count]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => return,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("Socket {socket}: receive failed: {e}");
                    host.reset();
                    return;
                }
            }
        }
    }
}

impl<const SOCKETS: usize> ErrorType for HostDriver<SOCKETS> {
    type Error = std::io::Error;
}

impl<const SOCKETS: usize> SocketDriver for HostDriver<SOCKETS> {
    fn status(&mut self, socket: SocketId) -> SocketStatus {
        match self.socket(socket).status() {
            SocketStatus::Listen => self.accept(socket),
            SocketStatus::Established => self.receive(socket),
            _ => {}
        }
        self.socket(socket).status()
    }

    fn listen(&mut self, socket: SocketId, port: u16) -> Result<(), std::io::Error> {
        if self.listener.is_none() {
            let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))?;
            listener.set_nonblocking(true)?;
            self.listener = Some(listener);
        }
        self.socket(socket).status = Some(SocketStatus::Listen);
        Ok(())
    }

    fn available(&mut self, socket: SocketId) -> usize {
        self.socket(socket).pending.len()
    }

    fn read(&mut self, socket: SocketId, buf: &mut [u8]) -> Result<usize, std::io::Error> {
        let pending = &mut self.socket(socket).pending;
        let count = buf.len().min(pending.len());
        buf[..count].copy_from_slice(&pending[..count]);
        let _ = pending.drain(..count);
        Ok(count)
    }

    fn write(&mut self, socket: SocketId, buf: &[u8]) -> Result<usize, std::io::Error> {
        let Some(stream) = &mut self.socket(socket).stream else {
            return Err(ErrorKind::NotConnected.into());
        };
        match stream.write(buf) {
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            result => result,
        }
    }

    fn disconnect(&mut self, socket: SocketId) {
        let host = self.socket(socket);
        if let Some(stream) = &host.stream {
            let _ = stream.shutdown(Shutdown::Both);
        }
        host.reset();
    }

    fn close(&mut self, socket: SocketId) {
        self.socket(socket).reset();
    }
}

impl<const SOCKETS: usize> DatagramDriver for HostDriver<SOCKETS> {
    fn bind(&mut self, port: u16) -> Result<(), std::io::Error> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port))?;
        socket.set_nonblocking(true)?;
        socket.set_broadcast(true)?;
        self.discovery = Some(socket);
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, std::io::Error> {
        let Some(socket) = &self.discovery else {
            return Err(ErrorKind::NotConnected.into());
        };
        match socket.recv_from(buf) {
            Ok(datagram) => Ok(Some(datagram)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn send_to(&mut self, remote: SocketAddr, data: &[u8]) -> Result<(), std::io::Error> {
        let Some(socket) = &self.discovery else {
            return Err(ErrorKind::NotConnected.into());
        };
        socket.send_to(data, remote).map(|_| ())
    }
}
