use bytes::Bytes;

use crate::protocol::Message;

pub use correlator::{QueryCorrelator, QueryHandle};
pub use tcp::StreamProtocol;
pub use udp::DatagramProtocol;

mod correlator;
mod tcp;
mod udp;

pub mod defaults {
    pub use super::correlator::MAX_TIMEOUT;
    pub use super::tcp::DEFAULT_TIMEOUT as STREAM_TIMEOUT;
    pub use super::udp::DEFAULT_TIMEOUT as DATAGRAM_TIMEOUT;
}

/// A connected byte stream the protocol writes framed messages into.
pub trait Transport {
    fn write(&mut self, payload: Bytes) -> crate::Result<()>;
}

/// A connectionless transport addressing every datagram to `target`.
pub trait DatagramTransport<A> {
    fn send_to(&mut self, payload: Bytes, target: &A) -> crate::Result<()>;
}

/// Receives whatever the correlator cannot match with a pending query.
pub trait Dispatcher<S> {
    /// An unsolicited message, `source` tells where it came from.
    fn message_received(&mut self, message: Message, source: S);

    fn connection_made(&mut self) {}

    fn connection_lost(&mut self) {}
}

impl DatagramTransport<std::net::SocketAddr> for tokio::net::UdpSocket {
    fn send_to(&mut self, payload: Bytes, target: &std::net::SocketAddr) -> crate::Result<()> {
        let n = self.try_send_to(&payload[..], *target)?;
        if n != payload.len() {
            bail!("short datagram write: {} of {} bytes", n, payload.len());
        }
        Ok(())
    }
}
