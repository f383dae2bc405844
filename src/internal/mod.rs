//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`dma`]: Descriptors, rings and the per-channel engine
//! - [`register`]: Register access seam and per-generation channel layouts
//! - [`retry`]: Bounded polling helpers
//! - `fmt`: Logging shim over `log` and `defmt`
//!
//! # Stability
//!
//! **WARNING:** Only the items re-exported from the crate root are public API.
//! Everything else here is subject to change without notice.

pub mod dma;
pub(crate) mod fmt;
pub mod register;
pub(crate) mod retry;
