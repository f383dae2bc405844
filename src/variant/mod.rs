//! Hardware generation dispatch.
//!
//! The two supported DMA generations share one descriptor layout and one
//! ring model but disagree on write-back status decoding, timestamp
//! handling and register placement. Everything that differs sits behind
//! [`VariantOps`], selected once from [`HwVariant`] at `dma_init`.

mod class_a;
mod class_b;

pub use class_a::ClassA;
pub use class_b::ClassB;

use embedded_hal::delay::DelayNs;

use crate::constants::{INVALID_VALUE, NSEC_PER_SEC, TIMESTAMP_POLL_US, TIMESTAMP_RETRY};
use crate::driver::config::{HW_TYPE_CLASS_A, HW_TYPE_CLASS_B, PtpMode};
use crate::driver::error::{ConfigError, ConfigResult, IoError, IoResult};
use crate::driver::stats::PktErrStats;
use crate::internal::dma::context::{ChecksumFlags, RssHashType, TxDoneContext, TxSwContext};
use crate::internal::dma::descriptor::{RxDescriptor, TxDescriptor};
use crate::internal::register::ChannelRegMap;
use crate::internal::retry::bounded_retry_with_delay;

/// Supported DMA hardware generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HwVariant {
    /// EQOS-style controller, up to 8 channels
    ClassA,
    /// MGBE-style controller, up to 10 channels
    ClassB,
}

impl HwVariant {
    /// Decode a hardware type code.
    pub const fn from_code(code: u32) -> ConfigResult<Self> {
        match code {
            HW_TYPE_CLASS_A => Ok(HwVariant::ClassA),
            HW_TYPE_CLASS_B => Ok(HwVariant::ClassB),
            _ => Err(ConfigError::UnknownHardware),
        }
    }

    /// Operation table of this generation.
    #[must_use]
    pub fn ops(self) -> &'static dyn VariantOps {
        match self {
            HwVariant::ClassA => &ClassA,
            HwVariant::ClassB => &ClassB,
        }
    }
}

/// Allowed ring sizes of a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingBounds {
    /// Smallest ring
    pub min: usize,
    /// Largest ring
    pub max: usize,
    /// Size used when none is configured
    pub default: usize,
}

impl RingBounds {
    /// `size` is a power of two within bounds.
    #[must_use]
    pub const fn accepts(&self, size: usize) -> bool {
        size.is_power_of_two() && size >= self.min && size <= self.max
    }
}

/// Bit widths of the TX descriptor length fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldWidths {
    /// TCP header length in 32-bit words
    pub thl: u32,
    /// TCP payload length
    pub tpl: u32,
    /// Packet length
    pub pl: u32,
    /// Maximum segment size
    pub mss: u32,
    /// VLAN tag
    pub vlan: u32,
}

impl FieldWidths {
    /// Widths shared by both generations.
    pub const STANDARD: Self = Self {
        thl: 4,
        tpl: 18,
        pl: 15,
        mss: 14,
        vlan: 16,
    };

    /// `value` fits in a field `bits` wide.
    #[inline(always)]
    #[must_use]
    pub const fn fits(value: u32, bits: u32) -> bool {
        bits >= 32 || value < (1 << bits)
    }
}

/// Generation-specific descriptor and register behaviour.
pub trait VariantOps: Sync {
    /// Which generation this is.
    fn variant(&self) -> HwVariant;

    /// Ring size bounds.
    fn ring_bounds(&self) -> RingBounds;

    /// Number of DMA channels.
    fn max_channels(&self) -> u32;

    /// Mask applied to the ring length register value.
    fn ring_len_mask(&self) -> u32;

    /// AXI clock in MHz, for watchdog conversion.
    fn axi_clk_mhz(&self) -> u32;

    /// AXI bus width in bytes, for RX buffer alignment.
    fn axi_bus_width(&self) -> u32;

    /// Per-channel register offsets.
    fn channel_map(&self, chan: u32) -> ChannelRegMap;

    /// TX descriptor field widths.
    fn field_widths(&self) -> FieldWidths {
        FieldWidths::STANDARD
    }

    /// RX arming also sets buffer-1-valid.
    fn rx_sets_buf1_valid(&self) -> bool;

    /// Received frame carries an error.
    fn rx_error(&self, rdes3: u32) -> bool;

    /// Completed TX descriptor reports an error to the caller.
    fn tx_status_is_error(&self, tdes3: u32) -> bool;

    /// Decode receive checksum offload status.
    fn get_rx_checksum(&self, desc: &RxDescriptor) -> ChecksumFlags;

    /// Stripped VLAN tag, if any.
    fn get_rx_vlan(&self, desc: &RxDescriptor) -> Option<u16>;

    /// RSS hash and its type, if reported.
    fn get_rx_hash(&self, _desc: &RxDescriptor) -> Option<(u32, RssHashType)> {
        None
    }

    /// Update receive error counters from a completed descriptor.
    fn update_rx_err_stats(&self, _desc: &RxDescriptor, _stats: &mut PktErrStats) {}

    /// Whether a timestamp is expected in the following context descriptor.
    fn rx_timestamp_expected(&self, desc: &RxDescriptor) -> bool;

    /// Whether the context descriptor has been released with a timestamp.
    fn rx_context_ready(&self, context: &RxDescriptor) -> bool;

    /// Read the receive timestamp from the context descriptor following
    /// `desc`, polling it a bounded number of times.
    fn get_rx_hardware_timestamp(
        &self,
        desc: &RxDescriptor,
        context: &RxDescriptor,
        delay: &mut dyn DelayNs,
    ) -> IoResult<u64> {
        if !self.rx_timestamp_expected(desc) {
            return Err(IoError::TimestampUnavailable);
        }
        let words = bounded_retry_with_delay(TIMESTAMP_RETRY, delay, TIMESTAMP_POLL_US, || {
            self.rx_context_ready(context)
                .then(|| (context.rdes0(), context.rdes1()))
        });
        match words {
            Some((lo, hi)) if lo == INVALID_VALUE && hi == INVALID_VALUE => {
                Err(IoError::TimestampUnavailable)
            }
            Some((lo, hi)) => timestamp_ns(lo, hi).ok_or(IoError::TimestampUnavailable),
            None => Err(IoError::TimestampUnavailable),
        }
    }

    /// Fill timestamp fields of a TX completion.
    fn tx_completion_timestamp(
        &self,
        desc: &TxDescriptor,
        swcx: &TxSwContext,
        ptp_mode: PtpMode,
        done: &mut TxDoneContext,
    );

    /// A PTP packet needs a context descriptor in this mode.
    fn ptp_needs_context(&self, ptp_mode: PtpMode) -> bool;

    /// Context descriptors carry a packet id for delayed timestamps.
    fn uses_packet_id(&self) -> bool;

    /// Ring length is programmed with read-modify-write.
    fn ring_len_is_rmw(&self) -> bool;
}

/// `seconds * 1e9 + nanoseconds`, `None` on overflow.
#[inline]
pub(crate) fn timestamp_ns(ns: u32, sec: u32) -> Option<u64> {
    u64::from(sec)
        .checked_mul(NSEC_PER_SEC)
        .and_then(|s| s.checked_add(u64::from(ns)))
}
