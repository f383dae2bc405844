//! Class-B (MGBE) descriptor decoding.

use super::{HwVariant, RingBounds, VariantOps};
use crate::driver::config::PtpMode;
use crate::internal::dma::context::{
    ChecksumFlags, RssHashType, TxDoneContext, TxDoneFlags, TxSwContext, TxSwcxFlags,
};
use crate::internal::dma::descriptor::bits::{rdes0, rdes3, rdes3_ctx, tdes3};
use crate::internal::dma::descriptor::{RxDescriptor, TxDescriptor};
use crate::internal::register::{ChannelRegMap, class_b};

/// MGBE-style controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassB;

impl VariantOps for ClassB {
    fn variant(&self) -> HwVariant {
        HwVariant::ClassB
    }

    fn ring_bounds(&self) -> RingBounds {
        RingBounds {
            min: 4,
            max: 16384,
            default: 4096,
        }
    }

    fn max_channels(&self) -> u32 {
        10
    }

    fn ring_len_mask(&self) -> u32 {
        0x3FFF
    }

    fn axi_clk_mhz(&self) -> u32 {
        62
    }

    fn axi_bus_width(&self) -> u32 {
        16
    }

    fn channel_map(&self, chan: u32) -> ChannelRegMap {
        class_b::channel_map(chan)
    }

    fn rx_sets_buf1_valid(&self) -> bool {
        false
    }

    fn rx_error(&self, rdes3: u32) -> bool {
        rdes3 & rdes3::ES_MGBE != 0
    }

    fn tx_status_is_error(&self, _tdes3: u32) -> bool {
        false
    }

    fn get_rx_checksum(&self, desc: &RxDescriptor) -> ChecksumFlags {
        let status = desc.rdes3();
        let ellt = status & rdes3::ELLT_MASK;
        let mut csum = ChecksumFlags::empty();

        if ellt != rdes3::ELLT_IPHE && ellt != rdes3::ELLT_CSUM_ERR {
            csum |= ChecksumFlags::UNNECESSARY;
        }
        csum |= ChecksumFlags::IPV4;
        if ellt == rdes3::ELLT_IPHE {
            csum |= ChecksumFlags::IPV4_BAD;
        }

        match status & rdes3::L34T_MASK {
            rdes3::L34T_IPV4_TCP => csum |= ChecksumFlags::TCPV4,
            rdes3::L34T_IPV4_UDP => csum |= ChecksumFlags::UDPV4,
            rdes3::L34T_IPV6_TCP => csum |= ChecksumFlags::TCPV6,
            rdes3::L34T_IPV6_UDP => csum |= ChecksumFlags::UDPV6,
            _ => {}
        }

        if ellt == rdes3::ELLT_CSUM_ERR {
            csum |= ChecksumFlags::TCP_UDP_BAD;
        }
        csum
    }

    fn get_rx_vlan(&self, desc: &RxDescriptor) -> Option<u16> {
        if desc.rdes3() & rdes3::ELLT_MASK == rdes3::ELLT_CVLAN {
            Some((desc.rdes0() & rdes0::OVT_MASK) as u16)
        } else {
            None
        }
    }

    fn get_rx_hash(&self, desc: &RxDescriptor) -> Option<(u32, RssHashType)> {
        let status = desc.rdes3();
        if status & rdes3::RSV == 0 {
            return None;
        }
        let hash_type = match status & rdes3::L34T_MASK {
            rdes3::L34T_IPV4_TCP | rdes3::L34T_IPV4_UDP | rdes3::L34T_IPV6_TCP
            | rdes3::L34T_IPV6_UDP => RssHashType::L4,
            _ => RssHashType::L3,
        };
        Some((desc.rdes1(), hash_type))
    }

    fn rx_timestamp_expected(&self, desc: &RxDescriptor) -> bool {
        desc.rdes3() & rdes3::CDA != 0
    }

    fn rx_context_ready(&self, context: &RxDescriptor) -> bool {
        let mask = rdes3::OWN | rdes3::CTXT | rdes3_ctx::TSA | rdes3_ctx::TSD;
        context.rdes3() & mask == rdes3::CTXT | rdes3_ctx::TSA
    }

    fn tx_completion_timestamp(
        &self,
        desc: &TxDescriptor,
        swcx: &TxSwContext,
        ptp_mode: PtpMode,
        done: &mut TxDoneContext,
    ) {
        if swcx.flags.contains(TxSwcxFlags::PTP)
            && ptp_mode.intersects(PtpMode::SLAVE | PtpMode::TWOSTEP)
            && desc.tdes3() & tdes3::CTXT == 0
        {
            done.pktid = swcx.pktid;
            done.flags |= TxDoneFlags::TS_DELAYED;
        }
    }

    fn ptp_needs_context(&self, _ptp_mode: PtpMode) -> bool {
        true
    }

    fn uses_packet_id(&self) -> bool {
        true
    }

    fn ring_len_is_rmw(&self) -> bool {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
