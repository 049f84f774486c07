use std::fmt::{Display, Formatter};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::Error;

pub const DEFAULT_MAX_LENGTH: usize = 99999;

/// Width of the big-endian length prefix in front of every payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrefixWidth {
    U8 = 1,
    U16 = 2,
    U32 = 4,
}

impl PrefixWidth {
    #[inline]
    pub fn bytes(self) -> usize {
        self as usize
    }

    /// Smallest payload length that no longer fits in the prefix.
    #[inline]
    fn limit(self) -> u64 {
        1u64 << (8 * self.bytes())
    }
}

impl TryFrom<u8> for PrefixWidth {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => PrefixWidth::U8,
            2 => PrefixWidth::U16,
            4 => PrefixWidth::U32,
            other => bail!(Error::InvalidConfig(
                format!("invalid prefix width {}", other).into()
            )),
        })
    }
}

impl Display for PrefixWidth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "u{}", 8 * self.bytes())
    }
}

/// Splits a byte stream into payloads, each preceded by its length.
///
/// As a [`Decoder`] it reads from the buffer handed in by `FramedRead`; the
/// [`LengthPrefixedFramer::feed`] entry point keeps its own buffer instead.
#[derive(Debug)]
pub struct LengthPrefixedFramer {
    width: PrefixWidth,
    max_length: usize,
    paused: bool,
    buf: BytesMut,
}

impl LengthPrefixedFramer {
    pub fn new(width: PrefixWidth) -> Self {
        Self {
            width,
            max_length: DEFAULT_MAX_LENGTH,
            paused: false,
            buf: Default::default(),
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn width(&self) -> PrefixWidth {
        self.width
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Stops parsing. Fed bytes are still buffered.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes parsing. Call [`LengthPrefixedFramer::feed`] (with no data at
    /// all if nothing new arrived) to drain what was buffered while paused.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Number of bytes buffered but not yet emitted.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Appends `data` and hands every completed payload to `on_payload`, in order.
    ///
    /// Payloads completed before a failure are still delivered. On
    /// [`Error::LengthLimitExceeded`] the connection is not recoverable and the
    /// caller is expected to drop it.
    pub fn feed<F>(&mut self, data: &[u8], mut on_payload: F) -> crate::Result<()>
    where
        F: FnMut(Bytes),
    {
        self.buf.extend_from_slice(data);

        let mut buf = std::mem::take(&mut self.buf);
        let res = loop {
            match self.decode(&mut buf) {
                Ok(Some(payload)) => on_payload(payload),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.buf = buf;
        res
    }

    /// Prefixes `payload` with its length.
    pub fn wrap(&self, payload: &[u8]) -> crate::Result<Bytes> {
        let mut b = BytesMut::with_capacity(self.width.bytes() + payload.len());
        self.put(payload, &mut b)?;
        Ok(b.freeze())
    }

    fn put(&self, payload: &[u8], dst: &mut BytesMut) -> crate::Result<()> {
        if payload.len() as u64 >= self.width.limit() {
            bail!(Error::StringTooLong {
                length: payload.len(),
                width: self.width.bytes(),
            });
        }
        dst.reserve(self.width.bytes() + payload.len());
        dst.put_uint(payload.len() as u64, self.width.bytes());
        dst.put_slice(payload);
        Ok(())
    }
}

impl<T> Encoder<T> for LengthPrefixedFramer
where
    T: AsRef<[u8]>,
{
    type Error = anyhow::Error;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.put(item.as_ref(), dst)
    }
}

impl Decoder for LengthPrefixedFramer {
    type Item = Bytes;
    type Error = anyhow::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let w = self.width.bytes();
        if self.paused || src.len() < w {
            return Ok(None);
        }

        let size = (&src[..w]).get_uint(w);
        if size > self.max_length as u64 {
            bail!(Error::LengthLimitExceeded(size));
        }

        let size = size as usize;
        if src.len() < w + size {
            src.reserve(w + size - src.len());
            return Ok(None);
        }

        src.advance(w);
        Ok(Some(src.split_to(size).freeze()))
    }
}
