use std::borrow::Cow;

/// Conditions raised by the framers, the wire codec and the query correlator.
///
/// Functions return [`crate::Result`], so a caller that needs to react to a
/// specific condition downcasts: `e.downcast_ref::<Error>()`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("line length exceeded: {} bytes buffered", .excess.len())]
    LineTooLong { excess: bytes::Bytes },

    #[error("length prefix {0} exceeds the limit")]
    LengthLimitExceeded(u64),

    #[error("string of {length} bytes cannot fit in a {width}-byte prefix")]
    StringTooLong { length: usize, width: usize },

    #[error("compression loop in compressed name at offset {0}")]
    CompressionLoop(usize),

    #[error("truncated buffer: {wanted} bytes wanted at offset {offset}")]
    Truncated { offset: usize, wanted: usize },

    #[error("invalid label length 0x{byte:02x} at offset {offset}")]
    InvalidLabel { offset: usize, byte: u8 },

    #[error("invalid domain name '{0}'")]
    InvalidName(String),

    #[error("rdata at offset {offset} declares {declared} bytes but {consumed} were consumed")]
    RdataLengthMismatch {
        offset: usize,
        declared: u16,
        consumed: usize,
    },

    #[error("invalid record data: {0}")]
    InvalidRdata(String),

    #[error("query timeout {0:?} is out of range")]
    InvalidTimeout(std::time::Duration),

    #[error("query 0x{0:04x} timed out")]
    QueryTimeout(u16),

    #[error("query 0x{0:04x} is cancelled")]
    QueryCancelled(u16),

    #[error("connection lost")]
    ConnectionLost,

    #[error("no free query identifier")]
    IdsExhausted,

    #[error("invalid configuration '{0}'")]
    InvalidConfig(Cow<'static, str>),

    #[error("transport failure: {0}")]
    Transport(anyhow::Error),
}

impl Error {
    /// Conditions after which the stream can no longer be trusted, the
    /// connection has to be closed.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            Error::LineTooLong { .. } | Error::LengthLimitExceeded(_) | Error::StringTooLong { .. }
        )
    }

    /// Conditions which only spoil a single message.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::CompressionLoop(_)
                | Error::Truncated { .. }
                | Error::InvalidLabel { .. }
                | Error::InvalidName(_)
                | Error::RdataLengthMismatch { .. }
                | Error::InvalidRdata(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert!(Error::LengthLimitExceeded(11).is_framing());
        assert!(!Error::LengthLimitExceeded(11).is_structural());
        assert!(Error::CompressionLoop(0).is_structural());
        assert!(!Error::QueryTimeout(1).is_framing());
        assert!(!Error::QueryTimeout(1).is_structural());

        let e: anyhow::Error = Error::Truncated {
            offset: 12,
            wanted: 4,
        }
        .into();
        assert!(e.downcast_ref::<Error>().is_some_and(|e| e.is_structural()));
    }
}
