use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use smallvec::SmallVec;

use crate::protocol::{LengthPrefixedFramer, Message, PrefixWidth, Query};
use crate::Error;

use super::{Dispatcher, QueryCorrelator, QueryHandle, Transport};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[inline]
fn framer() -> LengthPrefixedFramer {
    LengthPrefixedFramer::new(PrefixWidth::U16).with_max_length(u16::MAX as usize)
}

/// Queries over a byte stream, every message behind a 2-byte length.
pub struct StreamProtocol<D> {
    correlator: QueryCorrelator<D, ()>,
    framer: LengthPrefixedFramer,
    timeout: Duration,
    connected: bool,
}

impl<D> StreamProtocol<D>
where
    D: Dispatcher<()>,
{
    pub fn new(dispatcher: D) -> Self {
        Self {
            correlator: QueryCorrelator::new(dispatcher),
            framer: framer(),
            timeout: DEFAULT_TIMEOUT,
            connected: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn correlator(&self) -> &QueryCorrelator<D, ()> {
        &self.correlator
    }

    pub fn correlator_mut(&mut self) -> &mut QueryCorrelator<D, ()> {
        &mut self.correlator
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn connection_made(&mut self) {
        self.connected = true;
        self.correlator.dispatcher_mut().connection_made();
    }

    /// Fails every pending query with [`Error::ConnectionLost`].
    pub fn connection_lost(&mut self) {
        self.connected = false;
        let dropped = self.framer.buffered();
        if dropped > 0 {
            debug!("discard {} bytes of unfinished frame", dropped);
        }
        self.framer = framer();
        self.correlator.cancel_all(|_| Error::ConnectionLost);
        self.correlator.dispatcher_mut().connection_lost();
    }

    /// Feeds stream bytes. A frame which is no valid message is logged and
    /// skipped; an error returned here means the connection has to go.
    pub fn data_received(&mut self, data: &[u8]) -> crate::Result<()> {
        let mut frames = SmallVec::<[Bytes; 2]>::new();
        let res = self.framer.feed(data, |frame| frames.push(frame));

        for frame in frames {
            match Message::decode(&frame[..]) {
                Ok(message) => self.correlator.on_message_decoded(message, ()),
                Err(e) => warn!("drop {} bytes frame: {:?}", frame.len(), e),
            }
        }

        res
    }

    pub fn query<T>(
        &mut self,
        transport: &mut T,
        queries: Vec<Query>,
        timeout: Option<Duration>,
        id: Option<u16>,
    ) -> crate::Result<QueryHandle>
    where
        T: Transport + ?Sized,
    {
        let timeout = timeout.unwrap_or(self.timeout);
        let framer = &self.framer;
        self.correlator.send(queries, timeout, id, |message| {
            Self::write(framer, transport, message)
        })
    }

    /// Sends a message nobody waits a reply for.
    pub fn write_message<T>(&self, transport: &mut T, message: &Message) -> crate::Result<()>
    where
        T: Transport + ?Sized,
    {
        Self::write(&self.framer, transport, message)
    }

    fn write<T>(
        framer: &LengthPrefixedFramer,
        transport: &mut T,
        message: &Message,
    ) -> crate::Result<()>
    where
        T: Transport + ?Sized,
    {
        let b = framer.wrap(&message.to_bytes()?)?;
        transport
            .write(b)
            .map_err(|e| anyhow!(Error::Transport(e)))
    }

    pub fn poll_expired(&mut self, cx: &mut Context<'_>) -> Poll<Option<u16>> {
        self.correlator.poll_expired(cx)
    }
}
