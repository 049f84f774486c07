mod frame;
mod line;
mod name;
mod prefixed;
mod rdata;
mod reader;

pub use frame::*;
pub use line::{Frame, LineFramer, LineReceiver, ModeSwitch};
pub use name::{Name, MAX_LABEL_LENGTH};
pub use prefixed::{LengthPrefixedFramer, PrefixWidth};
pub use rdata::{RData, A6, AFSDB, HINFO, MINFO, MX, NAPTR, RP, SOA, SRV, WKS};

pub mod defaults {
    pub use super::line::{
        DEFAULT_DELIMITER as LINE_DELIMITER, DEFAULT_MAX_LENGTH as LINE_MAX_LENGTH,
    };
    pub use super::prefixed::DEFAULT_MAX_LENGTH as PREFIXED_MAX_LENGTH;
}
