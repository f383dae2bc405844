//! TX descriptor assembly and posting.
//!
//! A packet is posted from the software contexts staged at `cur`: an
//! optional context descriptor followed by `desc_cnt` data descriptors.
//! Everything is validated before the first descriptor word is written,
//! and ownership of the first descriptor is handed over last.

use core::sync::atomic::{Ordering, fence};

use super::context::{TxPacketContext, TxPktFlags, TxSwcxFlags};
use super::descriptor::bits::{tdes2, tdes3};
use super::descriptor::{lower_32, upper_32};
use super::engine::{DmaChannel, Runtime};
use super::ring::{SlotState, TxRing};
use crate::constants::{INVALID_VALUE, PKT_ID_BITS, SLOT_NUM_MAX};
use crate::driver::config::PtpMode;
use crate::driver::error::{DmaError, DmaResult};
use crate::driver::stats::{DmaStats, bump};
use crate::internal::register::RegisterIo;
use crate::variant::{FieldWidths, VariantOps};

/// Mask applied to the per-channel packet id counter.
const PKT_ID_MASK: u32 = (1 << PKT_ID_BITS) - 1;

/// A packet with these parameters needs a context descriptor.
pub(crate) fn needs_context(ops: &dyn VariantOps, ptp_mode: PtpMode, flags: TxPktFlags) -> bool {
    flags.intersects(TxPktFlags::VLAN | TxPktFlags::TSO)
        || (flags.contains(TxPktFlags::PTP) && ops.ptp_needs_context(ptp_mode))
}

/// Check the packet against the descriptor field widths.
fn validate_fields(widths: FieldWidths, pkt: &TxPacketContext) -> DmaResult<()> {
    let fits = FieldWidths::fits;
    if pkt.flags.contains(TxPktFlags::TSO) {
        if !fits(pkt.tcp_udp_hdrlen / 4, widths.thl)
            || !fits(pkt.payload_len, widths.tpl)
            || !fits(pkt.mss, widths.mss)
        {
            return Err(DmaError::InvalidPacketParams);
        }
    } else if pkt.flags.contains(TxPktFlags::LEN) && !fits(pkt.payload_len, widths.pl) {
        return Err(DmaError::InvalidPacketParams);
    }
    if pkt.flags.contains(TxPktFlags::VLAN) && !fits(pkt.vtag_id, widths.vlan) {
        return Err(DmaError::InvalidPacketParams);
    }
    Ok(())
}

impl<const N: usize> DmaChannel<N> {
    /// Post the staged packet to the hardware.
    pub(crate) fn transmit<R: RegisterIo>(
        &mut self,
        regs: &mut R,
        rt: &Runtime,
        stats: &mut DmaStats,
    ) -> DmaResult<()> {
        let chan = self.id;
        let tail_reg = self.map(rt).tx_tail;
        let ring = &mut self.tx;
        if !ring.slots.is_configured() {
            return Err(DmaError::InvalidState);
        }

        let size = ring.slots.size();
        let pkt = ring.pkt;
        let ops = rt.ops;
        let with_ctx = needs_context(ops, rt.ptp_mode, pkt.flags);

        if pkt.desc_cnt == 0 {
            return Err(DmaError::InvalidPacketParams);
        }
        let total = pkt.desc_cnt as usize + usize::from(with_ctx);
        if total > size - 1 {
            return Err(DmaError::InvalidPacketParams);
        }
        if ring.cur >= size {
            return Err(DmaError::InvalidState);
        }
        validate_fields(ops.field_widths(), &pkt)?;
        if total > ring.free_slots() {
            return Err(DmaError::NoDescriptorsAvailable);
        }

        let first_data = (ring.cur + usize::from(with_ctx)) & (size - 1);
        let fragments_fit = (0..pkt.desc_cnt as usize).all(|i| {
            let len = ring.slots.swcx((first_data + i) & (size - 1)).len;
            len != 0 && len <= tdes2::B1L_MASK
        });
        if !fragments_fit {
            return Err(DmaError::InvalidPacketParams);
        }

        let new_cur = (ring.cur + total) & (size - 1);
        let tail = ring.slots.desc_addr(new_cur)?;

        // Validation done; descriptors are written from here on
        let ctx_idx = with_ctx.then_some(ring.cur);
        let pkt_id = match ctx_idx {
            Some(idx) => fill_context(ring, idx, &pkt, ops, rt.ptp_mode, chan),
            None => 0,
        };
        fill_data(ring, first_data, &pkt, rt, pkt_id, stats);

        fence(Ordering::Release);
        ring.slots.desc(first_data).set_owned();
        if let Some(idx) = ctx_idx {
            ring.slots.desc(idx).set_owned();
        }

        let mut idx = ring.cur;
        while idx != new_cur {
            ring.slots.set_state(idx, SlotState::ArmedForHw);
            idx = ring.slots.next(idx);
        }
        ring.cur = new_cur;
        regs.write(tail_reg, lower_32(tail));
        ring.pkt = TxPacketContext::new(0);
        Ok(())
    }
}

/// Write the context descriptor at `idx` and return the packet id it carries.
fn fill_context<const N: usize>(
    ring: &mut TxRing<N>,
    idx: usize,
    pkt: &TxPacketContext,
    ops: &dyn VariantOps,
    ptp_mode: PtpMode,
    chan: u32,
) -> u32 {
    let mut words = [0u32; 4];
    let mut pkt_id = 0;

    if pkt.flags.contains(TxPktFlags::VLAN) {
        words[3] |= tdes3::CTXT | (pkt.vtag_id & tdes3::VT_MASK) | tdes3::VLTV;
    }

    if pkt.flags.contains(TxPktFlags::TSO) {
        words[3] |= tdes3::CTXT | tdes3::TCMSSV;
        words[2] |= pkt.mss & tdes2::MSS_MASK;
    }

    if pkt.flags.contains(TxPktFlags::PTP) && ops.ptp_needs_context(ptp_mode) {
        words[3] |= tdes3::CTXT;
        let onestep = ptp_mode.contains(PtpMode::ONESTEP);
        if onestep {
            words[3] |= tdes3::OSTC;
            words[3] &= !tdes3::TCMSSV;
        }
        if ops.uses_packet_id() {
            words[3] |= tdes3::PIDV;
            if !onestep {
                pkt_id = (ring.pkt_id & PKT_ID_MASK) | (chan << PKT_ID_BITS);
                ring.pkt_id = ring.pkt_id.wrapping_add(1);
            }
            words[0] = pkt_id;
        }
    }

    let (desc, swcx) = ring.slots.slot_mut(idx);
    desc.set_words(words);
    swcx.len = INVALID_VALUE;
    pkt_id
}

/// Write the data descriptors starting at `first`, leaving OWN clear on
/// the first one only.
fn fill_data<const N: usize>(
    ring: &mut TxRing<N>,
    first: usize,
    pkt: &TxPacketContext,
    rt: &Runtime,
    pkt_id: u32,
    stats: &mut DmaStats,
) {
    let flags = pkt.flags;
    let paged = flags.contains(TxPktFlags::PAGED_BUF);
    let mut idx = first;

    for i in 0..pkt.desc_cnt {
        let is_first = i == 0;
        let is_last = i + 1 == pkt.desc_cnt;
        let swcx = ring.slots.swcx_mut(idx);
        if paged {
            swcx.flags.insert(TxSwcxFlags::PAGED_BUF);
        }
        let mut tdes2_v = swcx.len & tdes2::B1L_MASK;
        let mut tdes3_v = if is_first { tdes3::FD } else { tdes3::OWN };

        if is_first {
            if flags.contains(TxPktFlags::CSUM) {
                tdes3_v |= tdes3::HW_CIC_ALL;
            } else if flags.contains(TxPktFlags::IP_CSUM) {
                tdes3_v |= tdes3::HW_CIC_IP_ONLY;
            }

            if flags.contains(TxPktFlags::VLAN) {
                tdes2_v |= tdes2::VTIR;
                bump(&mut stats.tx_vlan_pkt_n);
            }

            if flags.contains(TxPktFlags::PTP) {
                if !rt.ptp_mode.is_onestep_master() {
                    tdes2_v |= tdes2::TTSE;
                }
                let swcx = ring.slots.swcx_mut(idx);
                swcx.flags.insert(TxSwcxFlags::PTP);
                if rt.ops.uses_packet_id() {
                    swcx.pktid = pkt_id;
                }
            }

            if flags.contains(TxPktFlags::TSO) {
                let thl = (pkt.tcp_udp_hdrlen / 4) & tdes3::THL_MASK;
                tdes3_v |= tdes3::TSE | (thl << tdes3::THL_SHIFT) | (pkt.payload_len & tdes3::TPL_MASK);
                bump(&mut stats.tx_tso_pkt_n);
            } else {
                if flags.contains(TxPktFlags::LEN) {
                    tdes3_v |= pkt.payload_len & tdes3::PL_MASK;
                }
                if ring.slot_check {
                    tdes3_v |= ring.slot_number << tdes3::SLOT_NUM_SHIFT;
                    ring.slot_number = (ring.slot_number + 1) % SLOT_NUM_MAX;
                }
            }
        }

        if is_last {
            tdes3_v |= tdes3::LD;
            tdes2_v |= tdes2::IOC;
            ring.frame_count = ring.frame_count.wrapping_add(1);
            let c = &rt.coalesce;
            if c.use_tx_usecs {
                tdes2_v &= !tdes2::IOC;
            }
            if c.use_tx_frames && c.tx_frames != 0 && ring.frame_count % c.tx_frames == 0 {
                tdes2_v |= tdes2::IOC;
            }
        }

        let addr = ring.slots.swcx(idx).buf_phy_addr;
        ring.slots
            .desc(idx)
            .set_words([lower_32(addr), upper_32(addr), tdes2_v, tdes3_v]);
        idx = ring.slots.next(idx);
    }
}

// =============================================================================
// Tests
// =============================================================================
