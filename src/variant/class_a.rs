//! Class-A (EQOS) descriptor decoding.

use super::{HwVariant, RingBounds, VariantOps, timestamp_ns};
use crate::driver::config::PtpMode;
use crate::driver::stats::{PktErrStats, bump};
use crate::internal::dma::context::{ChecksumFlags, TxDoneContext, TxDoneFlags, TxSwContext};
use crate::internal::dma::descriptor::bits::{rdes0, rdes1, rdes3, tdes3};
use crate::internal::dma::descriptor::{RxDescriptor, TxDescriptor};
use crate::internal::register::{ChannelRegMap, class_a};

/// EQOS-style controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassA;

impl VariantOps for ClassA {
    fn variant(&self) -> HwVariant {
        HwVariant::ClassA
    }

    fn ring_bounds(&self) -> RingBounds {
        RingBounds {
            min: 4,
            max: 1024,
            default: 1024,
        }
    }

    fn max_channels(&self) -> u32 {
        8
    }

    fn ring_len_mask(&self) -> u32 {
        0x3FF
    }

    fn axi_clk_mhz(&self) -> u32 {
        125
    }

    fn axi_bus_width(&self) -> u32 {
        8
    }

    fn channel_map(&self, chan: u32) -> ChannelRegMap {
        class_a::channel_map(chan)
    }

    fn rx_sets_buf1_valid(&self) -> bool {
        true
    }

    fn rx_error(&self, rdes3: u32) -> bool {
        rdes3 & rdes3::ES_BITS != 0
    }

    fn tx_status_is_error(&self, tdes3: u32) -> bool {
        tdes3 & tdes3::ES_BITS != 0
    }

    fn get_rx_checksum(&self, desc: &RxDescriptor) -> ChecksumFlags {
        let mut csum = ChecksumFlags::empty();
        if desc.rdes3() & rdes3::RS1V == 0 {
            return csum;
        }

        let status = desc.rdes1();
        if status & (rdes1::IPCE | rdes1::IPCB | rdes1::IPHE) == 0 {
            csum |= ChecksumFlags::UNNECESSARY;
        }
        if status & rdes1::IPCB != 0 {
            return csum;
        }

        csum |= ChecksumFlags::IPV4;
        if status & rdes1::IPHE != 0 {
            csum |= ChecksumFlags::IPV4_BAD;
        }

        let pt = status & rdes1::PT_MASK;
        if status & rdes1::IPV4 != 0 {
            match pt {
                rdes1::PT_TCP => csum |= ChecksumFlags::TCPV4,
                rdes1::PT_UDP => csum |= ChecksumFlags::UDPV4,
                _ => {}
            }
        } else if status & rdes1::IPV6 != 0 {
            match pt {
                rdes1::PT_TCP => csum |= ChecksumFlags::TCPV6,
                rdes1::PT_UDP => csum |= ChecksumFlags::UDPV6,
                _ => {}
            }
        }

        if status & rdes1::IPCE != 0 {
            csum |= ChecksumFlags::TCP_UDP_BAD;
        }
        csum
    }

    fn get_rx_vlan(&self, desc: &RxDescriptor) -> Option<u16> {
        let status = desc.rdes3();
        if status & rdes3::RS0V == 0 {
            return None;
        }
        let lt = status & rdes3::LT_MASK;
        if lt == rdes3::LT_VT || lt == rdes3::LT_DVT {
            Some((desc.rdes0() & rdes0::OVT_MASK) as u16)
        } else {
            None
        }
    }

    fn update_rx_err_stats(&self, desc: &RxDescriptor, stats: &mut PktErrStats) {
        let status = desc.rdes3();
        if status & rdes3::CRC_ERR != 0 {
            bump(&mut stats.rx_crc_error);
        }
        if status & (rdes3::GP | rdes3::WD | rdes3::RE | rdes3::DRIB) != 0 {
            bump(&mut stats.rx_frame_error);
        }
        if status & rdes3::ORUN != 0 {
            bump(&mut stats.rx_overrun_error);
        }
    }

    fn rx_timestamp_expected(&self, desc: &RxDescriptor) -> bool {
        desc.rdes3() & rdes3::RS1V != 0
            && desc.rdes1() & rdes1::TSA != 0
            && desc.rdes1() & rdes1::TD == 0
    }

    fn rx_context_ready(&self, context: &RxDescriptor) -> bool {
        let status = context.rdes3();
        status & rdes3::OWN == 0 && status & rdes3::CTXT != 0
    }

    fn tx_completion_timestamp(
        &self,
        desc: &TxDescriptor,
        _swcx: &TxSwContext,
        _ptp_mode: PtpMode,
        done: &mut TxDoneContext,
    ) {
        let status = desc.tdes3();
        if status & tdes3::LD == 0 || status & tdes3::CTXT != 0 || status & tdes3::TTSS == 0 {
            return;
        }
        if let Some(ns) = timestamp_ns(desc.tdes0(), desc.tdes1()) {
            done.ns = ns;
            done.flags |= TxDoneFlags::TS;
        }
    }

    fn ptp_needs_context(&self, ptp_mode: PtpMode) -> bool {
        !ptp_mode.contains(PtpMode::TWOSTEP)
    }

    fn uses_packet_id(&self) -> bool {
        false
    }

    fn ring_len_is_rmw(&self) -> bool {
        false
    }
}

// =============================================================================
// Tests
// =============================================================================
