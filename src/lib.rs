//! DWMAC DMA Data Path
//!
//! A `no_std`, `no_alloc` descriptor-ring engine for the Synopsys DesignWare
//! MAC family. Two controller generations are supported behind one facade:
//!
//! - **Class-A** (EQOS): 16-bit ring length registers, Class-A timestamp and
//!   slot-function support
//! - **Class-B** (MGBE): wider ring length fields, split RX tail registers
//!   and delayed transmit timestamps addressed by packet id
//!
//! # Architecture
//!
//! The crate is organized into three layers:
//!
//! 1. **Engine** ([`driver::dma`]): [`OsiDma`] validates configuration,
//!    brings channels up and down and exposes the per-channel data path
//! 2. **Variant** ([`variant`]): [`VariantOps`] isolates everything that
//!    differs between the two generations
//! 3. **Register seam** ([`RegisterIo`]): every register access goes through
//!    a trait so the engine can run against [`Mmio`] or a test double
//!
//! Packet buffers are never owned by the engine. A caller supplied
//! [`BufferProvider`] receives completed RX frames and released TX buffers.
//!
//! # Features
//!
//! - `defmt`: defmt formatting for public types and defmt log output
//! - `log`: log facade output
//! - `critical-section`: ISR-safe [`sync::SharedDma`] wrapper
//!
//! # Example
//!
//! ```ignore
//! use ph_dwmac_dma::{DmaConfig, Mmio, OsiDma, TxPacketContext, HW_TYPE_CLASS_A};
//!
//! static mut DMA: OsiDma<Mmio, 1, 256> = OsiDma::new(unsafe { Mmio::new(MAC_BASE) });
//!
//! let dma = unsafe { &mut *core::ptr::addr_of_mut!(DMA) };
//!
//! let config = DmaConfig::new()
//!     .with_hw_type(HW_TYPE_CLASS_A)
//!     .with_channels(&[0])
//!     .with_mtu(1500);
//!
//! dma.dma_init(config)?;
//!
//! // Post RX buffers before the channel starts
//! let len = dma.rx_buf_len().unwrap_or(2048);
//! let ring = dma.rx_ring_mut(0)?;
//! for i in 0..ring.slots().size() {
//!     ring.set_buffer(i, pool.addr(i), len)?;
//! }
//! dma.hw_dma_init()?;
//!
//! // Transmit one linear frame
//! dma.stage_tx_packet(0, TxPacketContext::new(1), &[(frame_addr, frame_len)])?;
//! dma.hw_transmit(0)?;
//!
//! // Bottom half
//! dma.process_tx_completions(0, 64, &mut pool)?;
//! let poll = dma.process_rx_completions(0, 64, &mut pool, &mut delay)?;
//! dma.rx_refill(0)?;
//! ```
//!
//! # Memory Requirements
//!
//! Each channel carries one TX and one RX ring of `N` descriptors plus
//! their software contexts. [`OsiDma::memory_usage`] reports the total.

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; the mirrored table is in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod constants;
pub mod driver;
pub mod variant;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{CoalesceConfig, DmaConfig, HW_TYPE_CLASS_A, HW_TYPE_CLASS_B, PtpMode};
pub use driver::dma::{BufferProvider, OsiDma, OsiDmaDefault, OsiDmaSmall, RxPollResult};
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, ErrorKind, IoError, IoResult, Result,
};
pub use driver::interrupt::IntrDirection;
pub use driver::stats::{DmaStats, PktErrStats};

pub use internal::dma::context::{
    ChecksumFlags, RssHashType, RxPacketContext, RxPktFlags, RxSwContext, RxSwcxFlags,
    TxDoneContext, TxDoneFlags, TxPacketContext, TxPktFlags, TxSwContext, TxSwcxFlags,
};
pub use internal::dma::descriptor::{RxDescriptor, TxDescriptor};
pub use internal::dma::ring::{RxRing, SlotArena, SlotState, TxRing};
pub use internal::register::{ChannelRegMap, Mmio, RegisterIo};

pub use variant::{ClassA, ClassB, FieldWidths, HwVariant, RingBounds, VariantOps};

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::{CriticalSectionCell, SharedDma};

/// Low-level register accessors for advanced use.
///
/// These are intentionally separated from the primary facade. Most users should
/// prefer the engine APIs instead of touching registers directly.
///
/// # Safety
///
/// Direct register access bypasses engine invariants. Use only if you fully
/// understand the DWMAC DMA block and accept responsibility for correct
/// sequencing and synchronization.
pub mod unsafe_registers {
    pub use crate::internal::register::{
        class_a, class_b, ctrl, intr_ena, read_reg, rx_ctrl, rx_wdt, slot_ctrl, status, tx_ctrl,
        virt_intr, write_reg,
    };
}

/// Descriptor word bit definitions.
///
/// Useful when inspecting [`TxDescriptor::words`] or [`RxDescriptor::words`]
/// from diagnostics code.
pub mod descriptor_bits {
    pub use crate::internal::dma::descriptor::bits::*;
}

// =============================================================================
// Macro Helpers
// =============================================================================

/// Declare a static, ISR-safe engine instance.
///
/// Expands to a [`sync::SharedDma`] static over memory-mapped registers at
/// `$base`. The channel count defaults to 1 and the ring capacity to 256.
///
/// # Examples
///
/// ```ignore
/// ph_dwmac_dma::dma_static_sync!(DMA, 0x2490_0000);
///
/// DMA.with(|dma| {
///     dma.dma_init(config).unwrap();
///     dma.hw_dma_init().unwrap();
/// });
/// ```
#[cfg(feature = "critical-section")]
#[macro_export]
macro_rules! dma_static_sync {
    ($name:ident, $base:expr) => {
        $crate::dma_static_sync!($name, $base, 1, 256);
    };
    ($name:ident, $base:expr, $ch:expr, $n:expr) => {
        static $name: $crate::sync::SharedDma<$crate::Mmio, $ch, $n> =
            // SAFETY: the caller names the register block of this controller
            $crate::sync::SharedDma::new(unsafe { $crate::Mmio::new($base) });
    };
}
