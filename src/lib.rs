#![no_std]

mod error;

pub mod config;
pub mod cpi;
pub mod device;
pub mod dual;
pub mod engine;
pub mod firmware;
pub mod interface;
mod log;
#[cfg(test)]
mod mock;
pub mod motion;
pub mod registers;

pub use crate::device::Pmw3360;
pub use crate::dual::{Channel, DualPmw3360};
pub use crate::error::{Error, Result};
pub use crate::motion::Motion;
