use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;

use super::name::Name;
use crate::Error;

/// A cursor over one whole message buffer.
///
/// Names may point anywhere before the current position, so the reader always
/// keeps the full buffer around and only moves `pos`.
#[derive(Debug, Clone)]
pub(crate) struct Reader<'a> {
    raw: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(raw: &'a [u8]) -> Self {
        Self { raw, pos: 0 }
    }

    #[cfg(test)]
    pub(crate) fn at(raw: &'a [u8], pos: usize) -> Self {
        Self { raw, pos }
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn raw(&self) -> &'a [u8] {
        self.raw
    }

    pub(crate) fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.raw.len().saturating_sub(self.pos)
    }

    #[inline]
    fn ensure(&self, n: usize) -> crate::Result<()> {
        if self.remaining() < n {
            bail!(Error::Truncated {
                offset: self.pos,
                wanted: n,
            });
        }
        Ok(())
    }

    pub(crate) fn u8(&mut self) -> crate::Result<u8> {
        self.ensure(1)?;
        let b = self.raw[self.pos];
        self.pos += 1;
        Ok(b)
    }

    pub(crate) fn u16(&mut self) -> crate::Result<u16> {
        self.ensure(2)?;
        let n = BigEndian::read_u16(&self.raw[self.pos..]);
        self.pos += 2;
        Ok(n)
    }

    pub(crate) fn u32(&mut self) -> crate::Result<u32> {
        self.ensure(4)?;
        let n = BigEndian::read_u32(&self.raw[self.pos..]);
        self.pos += 4;
        Ok(n)
    }

    pub(crate) fn slice(&mut self, n: usize) -> crate::Result<&'a [u8]> {
        self.ensure(n)?;
        let b = &self.raw[self.pos..self.pos + n];
        self.pos += n;
        Ok(b)
    }

    pub(crate) fn bytes(&mut self, n: usize) -> crate::Result<Bytes> {
        self.slice(n).map(Bytes::copy_from_slice)
    }

    pub(crate) fn array<const N: usize>(&mut self) -> crate::Result<[u8; N]> {
        let mut b = [0u8; N];
        b.copy_from_slice(self.slice(N)?);
        Ok(b)
    }

    /// A character-string: one length byte followed by that many bytes.
    pub(crate) fn character_string(&mut self) -> crate::Result<Bytes> {
        let n = self.u8()? as usize;
        self.bytes(n)
    }

    pub(crate) fn name(&mut self) -> crate::Result<Name> {
        let (name, next) = Name::decode(self.raw, self.pos)?;
        self.pos = next;
        Ok(name)
    }
}
