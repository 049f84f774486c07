use std::fmt::{Display, Formatter};
use std::str::FromStr;

use bytes::{BufMut, Bytes, BytesMut};
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::misc::is_valid_domain;
use crate::Error;

pub const MAX_LABEL_LENGTH: usize = 63;

const POINTER_MASK: u8 = 0xc0;
const MAX_POINTER: usize = 0x3fff;

/// Remembers where every name suffix was written within one message, so later
/// occurrences can be replaced with a pointer.
#[derive(Debug, Default)]
pub(crate) struct Compressor {
    base: usize,
    offsets: HashMap<SmallVec<[Bytes; 4]>, u16>,
}

impl Compressor {
    /// `base` is the position of the message start in the output buffer.
    pub(crate) fn new(base: usize) -> Self {
        Self {
            base,
            offsets: Default::default(),
        }
    }
}

/// A domain name, kept as the sequence of its raw labels.
///
/// Labels are stored byte for byte as they appear on the wire; no case folding
/// or other normalization is applied. The root name has no labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Name {
    labels: SmallVec<[Bytes; 4]>,
}

impl Name {
    pub fn root() -> Self {
        Default::default()
    }

    /// Builds a name from a dotted byte string without any validation, e.g. `b"foo.bar"`.
    pub fn from_dotted(dotted: &[u8]) -> Self {
        let labels = dotted
            .split(|b| *b == b'.')
            .filter(|it| !it.is_empty())
            .map(Bytes::copy_from_slice)
            .collect();
        Self { labels }
    }

    pub fn from_labels<I, B>(labels: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &[u8]> {
        self.labels.iter().map(|it| &it[..])
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// The dot-joined label bytes.
    pub fn to_dotted(&self) -> Vec<u8> {
        let mut b = Vec::with_capacity(self.labels.iter().map(|it| it.len() + 1).sum());
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                b.push(b'.');
            }
            b.extend_from_slice(label);
        }
        b
    }

    /// Number of bytes written by [`Name::encode`].
    pub fn encoded_len(&self) -> usize {
        self.labels.iter().map(|it| it.len() + 1).sum::<usize>() + 1
    }

    /// Decodes the name starting at `offset` of the whole message `raw`.
    ///
    /// Returns the name and the offset right after it in the original byte
    /// sequence: the terminating zero label, or the first pointer met.
    pub fn decode(raw: &[u8], offset: usize) -> crate::Result<(Self, usize)> {
        let mut labels = SmallVec::new();
        let mut visited = HashSet::new();
        visited.insert(offset);

        let mut pos = offset;
        let mut next = None;

        loop {
            let first = *raw.get(pos).ok_or(Error::Truncated {
                offset: pos,
                wanted: 1,
            })?;

            if first == 0 {
                pos += 1;
                break;
            }

            match first & POINTER_MASK {
                POINTER_MASK => {
                    let low = *raw.get(pos + 1).ok_or(Error::Truncated {
                        offset: pos + 1,
                        wanted: 1,
                    })?;
                    let target = ((first & !POINTER_MASK) as usize) << 8 | low as usize;
                    next.get_or_insert(pos + 2);
                    if !visited.insert(target) {
                        bail!(Error::CompressionLoop(target));
                    }
                    pos = target;
                }
                0 => {
                    let size = first as usize;
                    let label = raw.get(pos + 1..pos + 1 + size).ok_or(Error::Truncated {
                        offset: pos + 1,
                        wanted: size,
                    })?;
                    labels.push(Bytes::copy_from_slice(label));
                    pos += 1 + size;
                }
                _ => bail!(Error::InvalidLabel {
                    offset: pos,
                    byte: first
                }),
            }
        }

        Ok((Self { labels }, next.unwrap_or(pos)))
    }

    #[inline]
    fn put_label(&self, dst: &mut BytesMut, label: &[u8]) -> crate::Result<()> {
        if label.is_empty() || label.len() > MAX_LABEL_LENGTH {
            bail!(Error::InvalidName(self.to_string()));
        }
        dst.put_u8(label.len() as u8);
        dst.put_slice(label);
        Ok(())
    }

    /// Writes the fully expanded label sequence and the zero terminator.
    pub fn encode(&self, dst: &mut BytesMut) -> crate::Result<()> {
        for label in self.labels.iter() {
            self.put_label(dst, label)?;
        }
        dst.put_u8(0);
        Ok(())
    }

    /// Like [`Name::encode`], but the longest suffix already written in the
    /// same message is replaced with a pointer.
    pub(crate) fn encode_compressed(
        &self,
        dst: &mut BytesMut,
        compressor: &mut Compressor,
    ) -> crate::Result<()> {
        for i in 0..self.labels.len() {
            // keyed by labels: a raw label may contain dots
            let suffix = &self.labels[i..];
            if let Some(pointer) = compressor.offsets.get(suffix) {
                dst.put_u16(0xc000 | *pointer);
                return Ok(());
            }
            let offset = dst.len() - compressor.base;
            if offset <= MAX_POINTER {
                compressor
                    .offsets
                    .insert(suffix.iter().cloned().collect(), offset as u16);
            }
            self.put_label(dst, &self.labels[i])?;
        }
        dst.put_u8(0);
        Ok(())
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.to_dotted()))
    }
}

impl FromStr for Name {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_empty() && !is_valid_domain(s) {
            bail!(Error::InvalidName(s.into()));
        }
        Ok(Self::from_dotted(s.as_bytes()))
    }
}

impl From<&[u8]> for Name {
    fn from(value: &[u8]) -> Self {
        Self::from_dotted(value)
    }
}
