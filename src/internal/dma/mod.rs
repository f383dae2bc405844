//! DMA data path: descriptors, rings and the per-channel engine.

pub mod context;
pub mod descriptor;
pub mod ring;

mod completion;
mod engine;
mod init;
mod transmit;

pub(crate) use engine::{DmaChannel, Runtime};
pub(crate) use transmit::needs_context;
