#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

mod error;

pub mod config;
pub mod device;
pub mod fifo;
pub mod interface;
pub mod params;
pub mod poll;
pub mod registers;

#[cfg(test)]
mod testing;

pub use crate::config::{Config, ConfigBuilder};
pub use crate::device::Max30102;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::fifo::{FifoState, Sample};
pub use crate::poll::{Monotonic, PollConfig, PollEvent, PollState, Poller};
