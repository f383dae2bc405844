//! Core driver components for the DWMAC DMA data path.
//!
//! This module contains the public engine and its supporting types:
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`dma`] - The [`OsiDma`] engine and the [`BufferProvider`] seam
//! - [`error`] - Error types and result aliases
//! - [`interrupt`] - Per-channel interrupt gating
//! - [`stats`] - Packet and error counters
//!
//! # Example
//!
//! ```ignore
//! use ph_dwmac_dma::driver::{DmaConfig, HW_TYPE_CLASS_B};
//!
//! let config = DmaConfig::new()
//!     .with_hw_type(HW_TYPE_CLASS_B)
//!     .with_channels(&[0, 1])
//!     .with_rx_watchdog(100);
//! ```

// Submodules
pub mod config;
pub mod dma;
pub mod error;
pub mod interrupt;
pub mod stats;

// Re-exports for convenience
pub use config::{CoalesceConfig, DmaConfig, HW_TYPE_CLASS_A, HW_TYPE_CLASS_B, PtpMode};
pub use dma::{BufferProvider, OsiDma, OsiDmaDefault, OsiDmaSmall, RxPollResult};
pub use error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, ErrorKind, IoError, IoResult, Result,
};
pub use interrupt::IntrDirection;
pub use stats::{DmaStats, PktErrStats};
