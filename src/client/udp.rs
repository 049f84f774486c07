use std::fmt::Debug;
use std::task::{Context, Poll};
use std::time::Duration;

use crate::protocol::{Message, Query};
use crate::Error;

use super::{DatagramTransport, Dispatcher, QueryCorrelator, QueryHandle};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Queries over a connectionless transport, one message per datagram.
pub struct DatagramProtocol<D, A> {
    correlator: QueryCorrelator<D, A>,
    timeout: Duration,
}

impl<D, A> DatagramProtocol<D, A>
where
    D: Dispatcher<A>,
    A: Debug,
{
    pub fn new(dispatcher: D) -> Self {
        Self {
            correlator: QueryCorrelator::new(dispatcher),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Timeout of queries sent without an explicit one.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn correlator(&self) -> &QueryCorrelator<D, A> {
        &self.correlator
    }

    pub fn correlator_mut(&mut self) -> &mut QueryCorrelator<D, A> {
        &mut self.correlator
    }

    /// Decodes one datagram. Anything undecodable is logged and dropped.
    pub fn datagram_received(&mut self, payload: &[u8], source: A) {
        if payload.is_empty() {
            debug!("drop empty datagram from {:?}", source);
            return;
        }
        match Message::decode(payload) {
            Ok(message) => self.correlator.on_message_decoded(message, source),
            Err(e) => warn!(
                "drop {} bytes datagram from {:?}: {:?}",
                payload.len(),
                source,
                e
            ),
        }
    }

    pub fn query<T>(
        &mut self,
        transport: &mut T,
        target: &A,
        queries: Vec<Query>,
        timeout: Option<Duration>,
        id: Option<u16>,
    ) -> crate::Result<QueryHandle>
    where
        T: DatagramTransport<A> + ?Sized,
    {
        let timeout = timeout.unwrap_or(self.timeout);
        self.correlator.send(queries, timeout, id, |message| {
            Self::write(transport, target, message)
        })
    }

    /// Sends a message nobody waits a reply for.
    pub fn write_message<T>(
        &self,
        transport: &mut T,
        target: &A,
        message: &Message,
    ) -> crate::Result<()>
    where
        T: DatagramTransport<A> + ?Sized,
    {
        Self::write(transport, target, message)
    }

    fn write<T>(transport: &mut T, target: &A, message: &Message) -> crate::Result<()>
    where
        T: DatagramTransport<A> + ?Sized,
    {
        let b = message.to_bytes()?;
        transport
            .send_to(b, target)
            .map_err(|e| anyhow!(Error::Transport(e)))
    }

    pub fn poll_expired(&mut self, cx: &mut Context<'_>) -> Poll<Option<u16>> {
        self.correlator.poll_expired(cx)
    }
}
