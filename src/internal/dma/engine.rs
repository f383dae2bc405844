//! Per-channel engine state.
//!
//! A [`DmaChannel`] owns the TX and RX rings of one hardware channel. The
//! ring algorithms live in `init`, `transmit` and `completion` as `impl`
//! blocks on this type; they all borrow the register file and the shared
//! [`Runtime`] from the caller.

use super::ring::{RxRing, TxRing};
use crate::driver::config::{CoalesceConfig, PtpMode};
use crate::internal::register::ChannelRegMap;
use crate::variant::VariantOps;

/// Settings fixed at `dma_init` and shared by every channel.
#[derive(Clone, Copy)]
pub(crate) struct Runtime {
    pub(crate) ops: &'static dyn VariantOps,
    pub(crate) ptp_mode: PtpMode,
    pub(crate) coalesce: CoalesceConfig,
    pub(crate) rx_buf_len: u32,
    pub(crate) rx_reserved_buf: Option<u64>,
    pub(crate) use_virtualization: bool,
}

impl Runtime {
    /// RX slot `idx` requests an interrupt on completion.
    ///
    /// With the watchdog timer on, only every `rx_frames`-th slot does, and
    /// only if frame coalescing is enabled as well.
    pub(crate) fn rx_ioc(&self, idx: usize) -> bool {
        let c = &self.coalesce;
        if !c.use_riwt {
            return true;
        }
        c.use_rx_frames && c.rx_frames != 0 && idx % c.rx_frames as usize == 0
    }
}

/// Rings and interrupt state of one hardware channel.
pub(crate) struct DmaChannel<const N: usize> {
    pub(crate) id: u32,
    pub(crate) tx: TxRing<N>,
    pub(crate) rx: RxRing<N>,
    pub(crate) tx_intr_enabled: bool,
    pub(crate) rx_intr_enabled: bool,
}

impl<const N: usize> DmaChannel<N> {
    pub(crate) const fn new() -> Self {
        Self {
            id: 0,
            tx: TxRing::new(),
            rx: RxRing::new(),
            tx_intr_enabled: false,
            rx_intr_enabled: false,
        }
    }

    #[inline]
    pub(crate) fn map(&self, rt: &Runtime) -> ChannelRegMap {
        rt.ops.channel_map(self.id)
    }
}
