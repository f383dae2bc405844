//! Channel configuration, ring arming and runtime RX refill.

use super::context::RxSwcxFlags;
use super::descriptor::{lower_32, upper_32};
use super::engine::{DmaChannel, Runtime};
use super::ring::SlotState;
use crate::driver::error::{DmaError, DmaResult};
use crate::internal::register::{
    ChannelRegMap, RegisterIo, ctrl, intr_ena, rx_ctrl, rx_wdt, slot_ctrl, tx_ctrl,
};
use crate::variant::VariantOps;

/// Watchdog count unit in AXI clock cycles.
const RWT_UNIT_CYCLES: u64 = 512;

impl<const N: usize> DmaChannel<N> {
    /// Program interrupt enables, burst lengths, buffer size and the RX
    /// watchdog of this channel.
    pub(crate) fn configure<R: RegisterIo>(&self, regs: &mut R, rt: &Runtime) {
        let map = self.map(rt);

        regs.modify(map.intr_ena, |v| {
            let mut v = v;
            if !rt.use_virtualization {
                v |= intr_ena::TBUE | intr_ena::RBUE;
            }
            // Normal summary stays off so that TX and RX raise separate lines
            (v | intr_ena::TIE | intr_ena::RIE | intr_ena::FBEE | intr_ena::AIE) & !intr_ena::NIE
        });

        regs.set_bits(map.ctrl, ctrl::PBLX8);
        regs.set_bits(map.tx_ctrl, tx_ctrl::OSF | tx_ctrl::TXPBL | tx_ctrl::TSE);

        let rbsz = (rt.rx_buf_len << rx_ctrl::RBSZ_SHIFT) & rx_ctrl::RBSZ_MASK;
        regs.modify(map.rx_ctrl, |v| (v & !rx_ctrl::RBSZ_MASK) | rbsz | rx_ctrl::RXPBL);

        if rt.coalesce.use_riwt {
            let cycles = u64::from(rt.coalesce.rx_riwt) * u64::from(rt.ops.axi_clk_mhz());
            let rwt = (cycles / RWT_UNIT_CYCLES) as u32 & rx_wdt::RWT_MASK;
            regs.modify(map.rx_wdt, |v| {
                (v & !(rx_wdt::RWT_MASK | rx_wdt::RWTU_MASK)) | rwt | rx_wdt::RWTU_512
            });
        }
    }

    /// Zero the TX ring and point the hardware at it.
    pub(crate) fn init_tx_ring<R: RegisterIo>(&mut self, regs: &mut R, rt: &Runtime) -> DmaResult<()> {
        if !self.tx.slots.is_configured() {
            return Err(DmaError::InvalidState);
        }
        let map = self.map(rt);
        self.tx.reset();

        let size = self.tx.slots.size();
        program_ring_len(regs, rt.ops, map.tx_ring_len, size);
        let base = self.tx.slots.base_addr();
        regs.write(map.tx_list_hi, upper_32(base));
        regs.write(map.tx_list_lo, lower_32(base));
        Ok(())
    }

    /// Arm every RX slot holding a valid buffer and point the hardware at
    /// the ring, with the tail one past the last descriptor.
    pub(crate) fn init_rx_ring<R: RegisterIo>(&mut self, regs: &mut R, rt: &Runtime) -> DmaResult<()> {
        if !self.rx.slots.is_configured() {
            return Err(DmaError::InvalidState);
        }
        let size = self.rx.slots.size();
        let tail = self.rx.slots.desc_addr(size)?;
        let map = self.map(rt);
        let buf1_valid = rt.ops.rx_sets_buf1_valid();

        self.rx.reset();
        for idx in 0..size {
            let (desc, swcx) = self.rx.slots.slot_mut(idx);
            if !swcx.flags.contains(RxSwcxFlags::BUF_VALID) {
                continue;
            }
            desc.arm(swcx.buf_phy_addr, rt.rx_ioc(idx), buf1_valid);
            self.rx.slots.set_state(idx, SlotState::ArmedForHw);
        }

        program_ring_len(regs, rt.ops, map.rx_ring_len, size);
        let base = self.rx.slots.base_addr();
        regs.write(map.rx_list_hi, upper_32(base));
        regs.write(map.rx_list_lo, lower_32(base));
        write_rx_tail(regs, &map, tail);
        Ok(())
    }

    /// Re-arm consumed RX slots from `refill` up to `cur`, or the whole
    /// ring when every slot has been consumed.
    ///
    /// Stops at the first slot without a valid buffer. Re-armed slots keep
    /// only their buffer. The tail pointer is rewritten one past the ring
    /// end even when nothing was armed, which resumes a suspended DMA.
    pub(crate) fn refill_rx<R: RegisterIo>(&mut self, regs: &mut R, rt: &Runtime) -> DmaResult<usize> {
        if !self.rx.slots.is_configured() {
            return Err(DmaError::InvalidState);
        }
        let buf1_valid = rt.ops.rx_sets_buf1_valid();
        let mut armed = 0;

        for _ in 0..self.rx.refill_count() {
            let idx = self.rx.refill;
            let (desc, swcx) = self.rx.slots.slot_mut(idx);
            if !swcx.flags.contains(RxSwcxFlags::BUF_VALID) {
                break;
            }
            swcx.flags = RxSwcxFlags::BUF_VALID;
            desc.arm(swcx.buf_phy_addr, rt.rx_ioc(idx), buf1_valid);
            self.rx.slots.set_state(idx, SlotState::ArmedForHw);
            self.rx.refill = self.rx.slots.next(idx);
            armed += 1;
        }

        let tail = self.rx.slots.desc_addr(self.rx.slots.size())?;
        write_rx_tail(regs, &self.map(rt), tail);
        Ok(armed)
    }

    /// Set the TX and RX start bits.
    pub(crate) fn start<R: RegisterIo>(&self, regs: &mut R, rt: &Runtime) {
        let map = self.map(rt);
        regs.set_bits(map.tx_ctrl, tx_ctrl::ST);
        regs.modify(map.rx_ctrl, |v| (v | rx_ctrl::SR) & !rx_ctrl::RPF);
    }

    /// Clear the TX and RX start bits and flush pending RX packets.
    pub(crate) fn stop<R: RegisterIo>(&self, regs: &mut R, rt: &Runtime) {
        let map = self.map(rt);
        regs.clear_bits(map.tx_ctrl, tx_ctrl::ST);
        regs.modify(map.rx_ctrl, |v| (v & !rx_ctrl::SR) | rx_ctrl::RPF);
    }

    /// Turn TX slot-number checking on or off.
    ///
    /// Returns `false` when the channel has no slot control register.
    pub(crate) fn config_slot<R: RegisterIo>(
        &mut self,
        regs: &mut R,
        rt: &Runtime,
        enable: bool,
        interval_us: u32,
    ) -> bool {
        let Some(offset) = self.map(rt).slot_ctrl else {
            return false;
        };
        if enable {
            let siv = (interval_us & slot_ctrl::SIV_MASK) << slot_ctrl::SIV_SHIFT;
            regs.modify(offset, |v| {
                (v & !(slot_ctrl::SIV_MASK << slot_ctrl::SIV_SHIFT)) | siv | slot_ctrl::ESC
            });
        } else {
            regs.clear_bits(offset, slot_ctrl::ESC);
        }
        self.tx.slot_check = enable;
        true
    }

    /// Zero both rings after the channel has been stopped.
    pub(crate) fn reset_rings(&mut self) {
        self.tx.reset();
        self.rx.reset();
        self.tx_intr_enabled = false;
        self.rx_intr_enabled = false;
    }

    /// Return the channel to its freshly created state under `id`, in place.
    ///
    /// Ring sizes are kept; RX buffers are dropped.
    pub(crate) fn reinit(&mut self, id: u32) {
        self.id = id;
        self.reset_rings();
        self.rx.drop_buffers();
        self.tx.slot_check = false;
    }
}

fn program_ring_len<R: RegisterIo>(regs: &mut R, ops: &dyn VariantOps, offset: usize, size: usize) {
    let len = (size as u32 - 1) & ops.ring_len_mask();
    if ops.ring_len_is_rmw() {
        regs.set_bits(offset, len);
    } else {
        regs.write(offset, len);
    }
}

fn write_rx_tail<R: RegisterIo>(regs: &mut R, map: &ChannelRegMap, tail: u64) {
    if let Some(hi) = map.rx_tail_hi {
        regs.write(hi, upper_32(tail));
    }
    regs.write(map.rx_tail_lo, lower_32(tail));
}

// =============================================================================
// Tests
// =============================================================================
