//! Blocking, single-peer channel.
//!
//! The listener binds a port and accepts exactly one connection; the initiator
//! connects to it. Without `io_timeout` every call blocks until the peer acts, so a
//! stalled peer stalls the whole exchange.

use std::io::{BufReader, Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use log::info;
use num_bigint_dig::BigUint;

use super::wire;
use crate::config::SessionConfig;
use crate::error::{Error, Result};

pub struct Channel<S: Read + Write> {
    stream: BufReader<S>,
    max_value_len: usize,
    max_payload: u64,
}

impl<S: Read + Write> Channel<S> {
    /// Wrap an already connected stream.
    pub fn new(stream: S, config: &SessionConfig) -> Self {
        Self {
            stream: BufReader::new(stream),
            max_value_len: config.max_value_len,
            max_payload: config.max_payload,
        }
    }

    pub fn send_value(&mut self, value: &BigUint, during: &'static str) -> Result<()> {
        wire::write_value(self.stream.get_mut(), value, during)
    }

    pub fn receive_value(&mut self, during: &'static str) -> Result<BigUint> {
        wire::read_value(&mut self.stream, self.max_value_len, during)
    }

    pub fn send_blob(&mut self, data: &[u8], during: &'static str) -> Result<()> {
        wire::write_blob(self.stream.get_mut(), data, during)
    }

    pub fn receive_blob(&mut self, during: &'static str) -> Result<Vec<u8>> {
        wire::read_blob(&mut self.stream, self.max_payload, during)
    }

    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }
}

impl Channel<TcpStream> {
    /// Bind `0.0.0.0:<port>` and wait for one peer.
    pub fn listen(config: &SessionConfig) -> Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
        let listener =
            TcpListener::bind(addr).map_err(|e| Error::transport("binding the listener", e))?;
        info!("listening on port {}", config.port);
        Self::accept_one(&listener, config)
    }

    /// Accept exactly one connection from an existing listener.
    pub fn accept_one(listener: &TcpListener, config: &SessionConfig) -> Result<Self> {
        let (stream, peer) = listener
            .accept()
            .map_err(|e| Error::transport("accepting a connection", e))?;
        info!("peer connected from {}", peer);
        Self::from_tcp(stream, config)
    }

    /// Connect to a listener.
    pub fn connect(addr: impl ToSocketAddrs, config: &SessionConfig) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| Error::transport("connecting to the listener", e))?;
        if let Ok(peer) = stream.peer_addr() {
            info!("connected to {}", peer);
        }
        Self::from_tcp(stream, config)
    }

    fn from_tcp(stream: TcpStream, config: &SessionConfig) -> Result<Self> {
        stream
            .set_read_timeout(config.io_timeout)
            .and_then(|_| stream.set_write_timeout(config.io_timeout))
            .and_then(|_| stream.set_nodelay(true))
            .map_err(|e| Error::transport("configuring the socket", e))?;
        Ok(Self::new(stream, config))
    }
}
