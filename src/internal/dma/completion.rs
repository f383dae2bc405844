//! TX and RX completion processing.

use core::sync::atomic::{Ordering, fence};

use embedded_hal::delay::DelayNs;

use super::context::{
    RxPacketContext, RxPktFlags, RxSwContext, RxSwcxFlags, TxDoneContext, TxDoneFlags,
    TxSwContext, TxSwcxFlags,
};
use super::descriptor::bits::{rdes3, tdes3};
use super::engine::{DmaChannel, Runtime};
use super::ring::{RxRing, SlotState};
use crate::constants::INVALID_VALUE;
use crate::driver::dma::{BufferProvider, RxPollResult};
use crate::driver::error::{DmaError, DmaResult};
use crate::driver::stats::{DmaStats, PktErrStats, bump};
use crate::internal::fmt::{dma_debug, dma_warn};

impl<const N: usize> DmaChannel<N> {
    /// Reclaim completed TX descriptors, at most `budget` packets.
    pub(crate) fn complete_tx<P: BufferProvider + ?Sized>(
        &mut self,
        rt: &Runtime,
        budget: usize,
        provider: &mut P,
        stats: &mut DmaStats,
        errs: &mut PktErrStats,
    ) -> DmaResult<usize> {
        let chan = self.id;
        let ring = &mut self.tx;
        let size = ring.slots.size();
        if size == 0 || ring.clean >= size || ring.cur >= size {
            return Err(DmaError::InvalidState);
        }

        bump(&mut stats.tx_clean_n);
        let ops = rt.ops;
        let mut processed = 0;
        while ring.clean != ring.cur && processed < budget {
            let idx = ring.clean;
            let desc = ring.slots.desc(idx);
            if desc.is_owned() {
                break;
            }
            fence(Ordering::Acquire);

            let status = desc.tdes3();
            let swcx = *ring.slots.swcx(idx);
            let mut done = TxDoneContext::default();

            if status & tdes3::LD != 0 {
                if ops.tx_status_is_error(status) {
                    done.flags.insert(TxDoneFlags::ERROR);
                    done.status = status & tdes3::ES_BITS;
                    errs.record_tx_status(done.status);
                    dma_warn!("tx error on channel {}: tdes3={:#x}", chan, status);
                } else {
                    stats.inc_tx_pkt(chan);
                }
                processed += 1;
            }

            ops.tx_completion_timestamp(desc, &swcx, rt.ptp_mode, &mut done);

            if swcx.flags.contains(TxSwcxFlags::PAGED_BUF) {
                done.flags.insert(TxDoneFlags::PAGED_BUF);
            }
            let reported = TxSwContext {
                len: if swcx.len == INVALID_VALUE { 0 } else { swcx.len },
                ..swcx
            };
            provider.transmit_complete(&reported, &done);

            desc.clear();
            *ring.slots.swcx_mut(idx) = TxSwContext::EMPTY;
            ring.slots.set_state(idx, SlotState::Free);
            ring.clean = ring.slots.next(idx);
        }

        Ok(processed)
    }

    /// Deliver completed RX frames, at most `budget` of them.
    pub(crate) fn complete_rx<P, D>(
        &mut self,
        rt: &Runtime,
        budget: usize,
        provider: &mut P,
        delay: &mut D,
        stats: &mut DmaStats,
        errs: &mut PktErrStats,
    ) -> DmaResult<RxPollResult>
    where
        P: BufferProvider + ?Sized,
        D: DelayNs,
    {
        let chan = self.id;
        let ring = &mut self.rx;
        let size = ring.slots.size();
        if size == 0 || ring.cur >= size {
            return Err(DmaError::InvalidState);
        }

        let ops = rt.ops;
        let mut received = 0;
        let mut received_resv = 0;

        while received < budget && received_resv < budget {
            let idx = ring.cur;
            if !rx_slot_ready(ring, idx) {
                break;
            }
            fence(Ordering::Acquire);

            ring.pkt = RxPacketContext::EMPTY;
            ring.cur = ring.slots.next(idx);
            ring.slots.set_state(idx, SlotState::CompletedByHw);

            let swcx = *ring.slots.swcx(idx);
            if rt.rx_reserved_buf == Some(swcx.buf_phy_addr) {
                *ring.slots.swcx_mut(idx) = RxSwContext::EMPTY;
                received_resv += 1;
                provider.realloc_buf(chan);
                continue;
            }

            let desc = ring.slots.desc(idx);
            let status = desc.rdes3();
            if !desc.is_first_and_last() {
                ring.slots.swcx_mut(idx).flags.insert(RxSwcxFlags::REUSE);
                ring.slots.set_state(idx, SlotState::PendingReuse);
                continue;
            }

            let mut pkt = RxPacketContext::EMPTY;
            pkt.pkt_len = status & rdes3::PKT_LEN_MASK;
            pkt.flags.insert(RxPktFlags::VALID);

            // Errored frames still carry their metadata and timestamp context
            if ops.rx_error(status) {
                pkt.flags.remove(RxPktFlags::VALID);
                ops.update_rx_err_stats(desc, errs);
                dma_warn!("rx frame error on channel {}: rdes3={:#x}", chan, status);
            }
            pkt.rxcsum = ops.get_rx_checksum(desc);
            if let Some(tag) = ops.get_rx_vlan(desc) {
                pkt.flags.insert(RxPktFlags::VLAN);
                pkt.vlan_tag = tag;
                bump(&mut stats.rx_vlan_pkt_n);
            }
            if let Some((hash, hash_type)) = ops.get_rx_hash(desc) {
                pkt.flags.insert(RxPktFlags::RSS);
                pkt.rx_hash = hash;
                pkt.rx_hash_type = Some(hash_type);
            }
            if ops.rx_timestamp_expected(desc) {
                let ctx_idx = ring.cur;
                let context = ring.slots.desc(ctx_idx);
                match ops.get_rx_hardware_timestamp(desc, context, delay) {
                    Ok(ns) => {
                        pkt.flags.insert(RxPktFlags::PTP);
                        pkt.ns = ns;
                        ring.slots.swcx_mut(ctx_idx).flags.insert(RxSwcxFlags::REUSE);
                        ring.slots.set_state(ctx_idx, SlotState::PendingReuse);
                        ring.cur = ring.slots.next(ctx_idx);
                    }
                    Err(e) => {
                        dma_debug!("rx timestamp on channel {}: {}", chan, e.as_str());
                    }
                }
            }

            ring.pkt = pkt;
            provider.receive_packet(chan, size, rt.rx_buf_len, &pkt, ring.slots.swcx_mut(idx));
            stats.inc_rx_pkt(chan);
            received += 1;
        }

        let next = ring.cur;
        let more_data = received + received_resv >= budget && rx_slot_ready(ring, next);

        Ok(RxPollResult {
            received,
            more_data,
        })
    }
}

/// The slot at `idx` was armed and the hardware has since released it.
///
/// Slots consumed on an earlier pass stay unready until `refill_rx` arms
/// them again, whatever the provider did with their buffer.
fn rx_slot_ready<const N: usize>(ring: &RxRing<N>, idx: usize) -> bool {
    ring.slots.state(idx) == SlotState::ArmedForHw
        && !ring.slots.desc(idx).is_owned()
        && !ring.slots.swcx(idx).flags.contains(RxSwcxFlags::PROCESSED)
}

// =============================================================================
// Tests
// =============================================================================
