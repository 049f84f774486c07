use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::Error;

pub const DEFAULT_DELIMITER: &[u8] = b"\r\n";
pub const DEFAULT_MAX_LENGTH: usize = 16384;

/// One unit produced by the [`LineFramer`] decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A line without its delimiter.
    Line(Bytes),
    /// Everything buffered while the framer is in raw mode.
    Raw(Bytes),
}

/// Receives the units drained by [`LineFramer::feed`].
///
/// Both callbacks get a [`ModeSwitch`]; a mode change requested through it
/// applies to the rest of the data still buffered.
pub trait LineReceiver {
    fn line_received(&mut self, line: Bytes, mode: &mut ModeSwitch);

    fn raw_data_received(&mut self, data: Bytes, mode: &mut ModeSwitch) {
        warn!(
            "{} bytes of raw data dropped: no raw data handler",
            data.len()
        );
        mode.set_line_mode(Bytes::new());
    }
}

/// Mode change requests made from inside a [`LineReceiver`] callback.
#[derive(Debug, Default)]
pub struct ModeSwitch {
    raw: bool,
    extra: Option<Bytes>,
}

impl ModeSwitch {
    fn new(raw: bool) -> Self {
        Self { raw, extra: None }
    }

    pub fn set_raw_mode(&mut self) {
        self.raw = true;
    }

    /// Back to line mode. `extra` is the part of the last raw chunk that was not
    /// consumed; it is parsed before anything else still buffered.
    pub fn set_line_mode(&mut self, extra: impl Into<Bytes>) {
        self.raw = false;
        let extra = extra.into();
        if !extra.is_empty() {
            self.extra = Some(extra);
        }
    }

    pub fn is_raw_mode(&self) -> bool {
        self.raw
    }
}

/// Splits a byte stream on a delimiter, with a raw mode which passes the bytes
/// through untouched.
#[derive(Debug)]
pub struct LineFramer {
    delimiter: Bytes,
    max_length: usize,
    raw: bool,
    // where the next delimiter search starts
    next_index: usize,
    buf: BytesMut,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self {
            delimiter: Bytes::from_static(DEFAULT_DELIMITER),
            max_length: DEFAULT_MAX_LENGTH,
            raw: false,
            next_index: 0,
            buf: Default::default(),
        }
    }
}

impl LineFramer {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_delimiter<B>(mut self, delimiter: B) -> crate::Result<Self>
    where
        B: Into<Bytes>,
    {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            bail!(Error::InvalidConfig("empty line delimiter".into()));
        }
        self.delimiter = delimiter;
        self.next_index = 0;
        Ok(self)
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn delimiter(&self) -> &[u8] {
        &self.delimiter[..]
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn is_raw_mode(&self) -> bool {
        self.raw
    }

    pub fn set_raw_mode(&mut self) {
        self.raw = true;
    }

    /// Leaves raw mode. `extra` is queued in front of the buffered data and
    /// parsed by the next [`LineFramer::feed`].
    pub fn set_line_mode(&mut self, extra: &[u8]) {
        self.raw = false;
        self.next_index = 0;
        if !extra.is_empty() {
            let mut b = BytesMut::with_capacity(extra.len() + self.buf.len());
            b.put_slice(extra);
            b.put_slice(&self.buf[..]);
            self.buf = b;
        }
    }

    /// Takes away whatever is buffered.
    pub fn clear_buffer(&mut self) -> Bytes {
        self.next_index = 0;
        self.buf.split().freeze()
    }

    /// Appends `data` and drains the buffer into `receiver`.
    ///
    /// Returns [`Error::LineTooLong`] carrying all unconsumed bytes once a line
    /// runs over the maximum length; the connection should be closed then.
    pub fn feed<R>(&mut self, data: &[u8], receiver: &mut R) -> crate::Result<()>
    where
        R: LineReceiver + ?Sized,
    {
        self.buf.extend_from_slice(data);

        let mut buf = std::mem::take(&mut self.buf);
        let res = self.drain(&mut buf, receiver);
        self.buf = buf;
        res
    }

    fn drain<R>(&mut self, buf: &mut BytesMut, receiver: &mut R) -> crate::Result<()>
    where
        R: LineReceiver + ?Sized,
    {
        while let Some(frame) = self.decode(buf)? {
            let mut mode = ModeSwitch::new(self.raw);
            match frame {
                Frame::Line(line) => receiver.line_received(line, &mut mode),
                Frame::Raw(data) => receiver.raw_data_received(data, &mut mode),
            }

            if mode.raw != self.raw {
                self.raw = mode.raw;
                self.next_index = 0;
            }
            if let Some(extra) = mode.extra.take() {
                let mut b = BytesMut::with_capacity(extra.len() + buf.len());
                b.put_slice(&extra[..]);
                b.put_slice(&buf[..]);
                *buf = b;
                self.next_index = 0;
            }
        }
        Ok(())
    }

    /// Appends the delimiter to `line`.
    pub fn wrap(&self, line: &[u8]) -> Bytes {
        let mut b = BytesMut::with_capacity(line.len() + self.delimiter.len());
        b.put_slice(line);
        b.put_slice(&self.delimiter[..]);
        b.freeze()
    }

    fn find_delimiter(&self, src: &[u8]) -> Option<usize> {
        let start = self.next_index.min(src.len());
        src[start..]
            .windows(self.delimiter.len())
            .position(|it| it == &self.delimiter[..])
            .map(|i| start + i)
    }
}

impl<T> Encoder<T> for LineFramer
where
    T: AsRef<[u8]>,
{
    type Error = anyhow::Error;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let line = item.as_ref();
        dst.reserve(line.len() + self.delimiter.len());
        dst.put_slice(line);
        dst.put_slice(&self.delimiter[..]);
        Ok(())
    }
}

impl Decoder for LineFramer {
    type Item = Frame;
    type Error = anyhow::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.raw {
            self.next_index = 0;
            if src.is_empty() {
                return Ok(None);
            }
            return Ok(Some(Frame::Raw(src.split().freeze())));
        }

        match self.find_delimiter(&src[..]) {
            Some(end) => {
                self.next_index = 0;
                if end > self.max_length {
                    bail!(Error::LineTooLong {
                        excess: src.split().freeze()
                    });
                }
                let line = src.split_to(end).freeze();
                src.advance(self.delimiter.len());
                Ok(Some(Frame::Line(line)))
            }
            None => {
                // a line of max_length may still be waiting for the rest of its delimiter
                if src.len() > self.max_length + self.delimiter.len() - 1 {
                    self.next_index = 0;
                    bail!(Error::LineTooLong {
                        excess: src.split().freeze()
                    });
                }
                self.next_index = (src.len() + 1).saturating_sub(self.delimiter.len());
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(frame) => Ok(Some(frame)),
            None => {
                if !buf.is_empty() {
                    debug!("discard {} bytes of unterminated line at eof", buf.len());
                    buf.clear();
                    self.next_index = 0;
                }
                Ok(None)
            }
        }
    }
}
