use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use std::time::Duration;

use futures::future::poll_fn;
use hashbrown::{HashMap, HashSet};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tokio_util::time::{delay_queue, DelayQueue};

use super::Dispatcher;
use crate::protocol::{Flags, Header, Message, OpCode, Query};
use crate::Error;

type Reply = crate::Result<Message>;

/// Longest timeout a query may wait, well below the timer wheel's range.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

struct Pending {
    queries: Vec<Query>,
    created: Instant,
    tx: oneshot::Sender<Reply>,
    timer: delay_queue::Key,
}

/// Resolves exactly once: with the matching reply, or with
/// [`Error::QueryTimeout`] / [`Error::QueryCancelled`] / whatever error the
/// query was cancelled with.
#[derive(Debug)]
pub struct QueryHandle {
    id: u16,
    rx: oneshot::Receiver<Reply>,
}

impl QueryHandle {
    pub fn id(&self) -> u16 {
        self.id
    }
}

impl Future for QueryHandle {
    type Output = Reply;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let id = self.id;
        match ready!(Pin::new(&mut self.rx).poll(cx)) {
            Ok(reply) => Poll::Ready(reply),
            // the correlator went away
            Err(_) => Poll::Ready(Err(anyhow!(Error::QueryCancelled(id)))),
        }
    }
}

/// Matches replies with outstanding queries by message id.
///
/// Every pending query owns a timer in the correlator's [`DelayQueue`]; the
/// owner has to drive them with [`QueryCorrelator::poll_expired`] or
/// [`QueryCorrelator::next_expired`]. Messages matching nothing go to the
/// dispatcher, unless their id was used for an explicit resend.
pub struct QueryCorrelator<D, S> {
    dispatcher: D,
    pending: HashMap<u16, Pending>,
    resends: HashSet<u16>,
    timers: DelayQueue<u16>,
    _source: PhantomData<fn(S)>,
}

impl<D, S> QueryCorrelator<D, S>
where
    D: Dispatcher<S>,
{
    pub fn new(dispatcher: D) -> Self {
        Self {
            dispatcher,
            pending: Default::default(),
            resends: Default::default(),
            timers: DelayQueue::new(),
            _source: PhantomData,
        }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: u16) -> bool {
        self.pending.contains_key(&id)
    }

    /// The questions sent with the pending query `id`.
    pub fn pending_queries(&self, id: u16) -> Option<&[Query]> {
        self.pending.get(&id).map(|it| &it.queries[..])
    }

    /// How long the pending query `id` has been waiting.
    pub fn pending_elapsed(&self, id: u16) -> Option<Duration> {
        self.pending.get(&id).map(|it| it.created.elapsed())
    }

    /// Builds a recursive query for `queries` and hands it to `write`.
    ///
    /// With an explicit `id` the query counts as a resend: replies carrying
    /// that id which arrive after the query is settled are dropped silently.
    /// If `write` fails, nothing stays registered and the error goes to this
    /// caller only. A `timeout` above [`MAX_TIMEOUT`] is refused up front.
    pub fn send<W>(
        &mut self,
        queries: Vec<Query>,
        timeout: Duration,
        id: Option<u16>,
        write: W,
    ) -> crate::Result<QueryHandle>
    where
        W: FnOnce(&Message) -> crate::Result<()>,
    {
        if timeout > MAX_TIMEOUT {
            bail!(Error::InvalidTimeout(timeout));
        }

        let resend = id.is_some();
        let id = match id {
            Some(id) => {
                if self.pending.contains_key(&id) {
                    bail!("query 0x{:04x} is already pending", id);
                }
                id
            }
            None => self.next_id()?,
        };

        let message = Message {
            header: Header {
                id,
                flags: Flags::builder()
                    .request()
                    .opcode(OpCode::StandardQuery)
                    .recursive_query(true)
                    .build(),
            },
            queries,
            ..Default::default()
        };

        let (tx, rx) = oneshot::channel();
        let timer = self.timers.insert(id, timeout);
        self.pending.insert(
            id,
            Pending {
                queries: message.queries.clone(),
                created: Instant::now(),
                tx,
                timer,
            },
        );

        if let Err(e) = write(&message) {
            if let Some(pending) = self.pending.remove(&id) {
                self.timers.remove(&pending.timer);
            }
            return Err(e);
        }

        if resend {
            self.resends.insert(id);
        }

        debug!("query 0x{:04x} sent, timeout={:?}", id, timeout);

        Ok(QueryHandle { id, rx })
    }

    /// Routes one decoded message.
    pub fn on_message_decoded(&mut self, message: Message, source: S) {
        let id = message.id();
        if let Some(pending) = self.pending.remove(&id) {
            self.timers.remove(&pending.timer);
            let elapsed = pending.created.elapsed();
            if pending.tx.send(Ok(message)).is_err() {
                debug!(
                    "reply 0x{:04x} to {:?} arrived after {:?} but nobody is waiting",
                    id, &pending.queries, elapsed
                );
            }
        } else if self.resends.contains(&id) {
            debug!("drop late reply 0x{:04x} of a resent query", id);
        } else {
            self.dispatcher.message_received(message, source);
        }
    }

    /// Stops waiting for `id`. The handle resolves with [`Error::QueryCancelled`].
    pub fn cancel(&mut self, id: u16) -> bool {
        match self.pending.remove(&id) {
            Some(pending) => {
                self.timers.remove(&pending.timer);
                let _ = pending.tx.send(Err(anyhow!(Error::QueryCancelled(id))));
                true
            }
            None => false,
        }
    }

    /// Fails every pending query with the error built by `reason`.
    pub fn cancel_all<F>(&mut self, mut reason: F)
    where
        F: FnMut(u16) -> Error,
    {
        self.timers.clear();
        for (id, pending) in self.pending.drain() {
            let _ = pending.tx.send(Err(reason(id).into()));
        }
    }

    pub fn remove_resend(&mut self, id: u16) -> bool {
        self.resends.remove(&id)
    }

    /// Fires the next due timer, failing its query with [`Error::QueryTimeout`].
    ///
    /// Returns `Ready(None)` when no timer is armed at all.
    pub fn poll_expired(&mut self, cx: &mut Context<'_>) -> Poll<Option<u16>> {
        match ready!(self.timers.poll_expired(cx)) {
            Some(expired) => {
                let id = expired.into_inner();
                if let Some(pending) = self.pending.remove(&id) {
                    warn!(
                        "query 0x{:04x} {:?} timed out after {:?}",
                        id,
                        &pending.queries,
                        pending.created.elapsed()
                    );
                    let _ = pending.tx.send(Err(anyhow!(Error::QueryTimeout(id))));
                }
                Poll::Ready(Some(id))
            }
            None => Poll::Ready(None),
        }
    }

    /// Waits for the next timeout, see [`QueryCorrelator::poll_expired`].
    pub async fn next_expired(&mut self) -> Option<u16> {
        poll_fn(|cx| self.poll_expired(cx)).await
    }

    // random start, then the first free id after it
    fn next_id(&self) -> crate::Result<u16> {
        let start = rand::random::<u16>();
        (0..=u16::MAX)
            .map(|i| start.wrapping_add(i))
            .find(|id| !self.pending.contains_key(id))
            .ok_or_else(|| anyhow!(Error::IdsExhausted))
    }
}
