#![allow(clippy::upper_case_acronyms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! Incremental framers for chunked byte streams, a DNS wire codec and a
//! correlator matching replies with outstanding queries.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

pub mod client;
pub mod config;
mod error;
pub(crate) mod misc;
pub mod protocol;

pub use error::Error;

pub type Result<T> = anyhow::Result<T>;
