//! Synchronization Support
//!
//! This module provides ISR-safe access to the DMA engine. Completion
//! processing usually runs from an interrupt bottom half while submission
//! runs from thread context; both go through the same wrapper.
//!
//! - **Primitives** (`primitives`): [`CriticalSectionCell`] for ISR-safe
//!   interior mutability
//! - **Shared Wrappers** (`shared`): [`SharedDma`], a critical-section
//!   protected [`OsiDma`](crate::OsiDma)
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables this module
//!
//! # Example
//!
//! ```ignore
//! use ph_dwmac_dma::{Mmio, sync::SharedDma};
//!
//! static DMA: SharedDma<Mmio, 1, 256> = SharedDma::new(unsafe { Mmio::new(MAC_BASE) });
//!
//! fn main() {
//!     DMA.with(|dma| {
//!         dma.dma_init(config).unwrap();
//!         dma.hw_dma_init().unwrap();
//!     });
//! }
//!
//! #[interrupt]
//! fn ETH_DMA_CH0() {
//!     DMA.with(|dma| {
//!         dma.process_rx_completions(0, 64, &mut stack, &mut delay).ok();
//!     });
//! }
//! ```

mod primitives;
mod shared;

pub use primitives::CriticalSectionCell;
pub use shared::SharedDma;
