//! Per-channel, per-direction interrupt gate.
//!
//! Interrupts are gated through the virtual interrupt control register.
//! Every change is verified by reading the register back, with a bounded
//! number of attempts.

use crate::constants::INTR_WRITE_RETRY;
use crate::driver::error::{IoError, IoResult};
use crate::internal::fmt::dma_warn;
use crate::internal::register::{ChannelRegMap, RegisterIo, status, virt_intr};
use crate::internal::retry::bounded_retry;

// =============================================================================
// Direction
// =============================================================================

/// Data direction of a DMA channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntrDirection {
    /// Transmit
    Tx,
    /// Receive
    Rx,
}

impl IntrDirection {
    /// Bit of this direction in the virtual interrupt registers.
    #[inline]
    #[must_use]
    pub const fn virt_bit(self) -> u32 {
        match self {
            IntrDirection::Tx => virt_intr::TX,
            IntrDirection::Rx => virt_intr::RX,
        }
    }

    /// Value that clears this direction's pending bits in the channel
    /// status register.
    #[inline]
    #[must_use]
    pub const fn status_clear(self) -> u32 {
        match self {
            IntrDirection::Tx => status::TX_CLEAR,
            IntrDirection::Rx => status::RX_CLEAR,
        }
    }
}

// =============================================================================
// Gate
// =============================================================================

/// Enable or disable one direction's interrupt on a channel.
///
/// Disabling first acknowledges a pending interrupt of that direction so it
/// does not fire once re-enabled.
pub(crate) fn set_channel_interrupt<R: RegisterIo + ?Sized>(
    regs: &mut R,
    map: &ChannelRegMap,
    dir: IntrDirection,
    enable: bool,
) -> IoResult<()> {
    let bit = dir.virt_bit();

    if !enable && regs.read(map.virt_status) & bit != 0 {
        regs.write(map.status, dir.status_clear());
        regs.write(map.virt_status, bit);
    }

    let verified = bounded_retry(INTR_WRITE_RETRY, || {
        if enable {
            regs.set_bits(map.virt_ctrl, bit);
        } else {
            regs.clear_bits(map.virt_ctrl, bit);
        }
        let now_set = regs.read(map.virt_ctrl) & bit != 0;
        (now_set == enable).then_some(())
    });

    verified.ok_or_else(|| {
        dma_warn!(
            "interrupt gate did not converge: reg={:#x} bit={:#x} enable={}",
            map.virt_ctrl,
            bit,
            enable
        );
        IoError::RegisterWriteFailed
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
