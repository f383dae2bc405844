//! Descriptor rings backed by a fixed-capacity slot arena.
//!
//! Each ring owns `N` descriptor slots, a software context per slot and a
//! per-slot [`SlotState`]. Only the first `size` slots are in use; `size` is
//! a power of two chosen at configuration time and never exceeds `N`.

use super::context::{RxPacketContext, RxSwContext, RxSwcxFlags, TxPacketContext, TxSwContext};
use super::descriptor::{RxDescriptor, TxDescriptor};
use crate::driver::error::{DmaError, DmaResult};

/// Ownership state of one ring slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotState {
    /// Owned by software and holds nothing the hardware needs
    #[default]
    Free,
    /// OWN is set and the hardware may write the slot at any time
    ArmedForHw,
    /// Hardware cleared OWN and software is consuming the slot
    CompletedByHw,
    /// Buffer kept for re-arming without a new allocation
    PendingReuse,
}

impl SlotState {
    /// Handed back by the hardware and waiting to be re-armed.
    #[must_use]
    pub const fn is_consumed(self) -> bool {
        matches!(self, Self::CompletedByHw | Self::PendingReuse)
    }
}

// =============================================================================
// Slot arena
// =============================================================================

/// Descriptors, software contexts and slot states in parallel arrays.
pub struct SlotArena<D, S, const N: usize> {
    desc: [D; N],
    swcx: [S; N],
    state: [SlotState; N],
    size: usize,
}

impl<D, S, const N: usize> SlotArena<D, S, N> {
    const fn from_parts(desc: [D; N], swcx: [S; N]) -> Self {
        Self {
            desc,
            swcx,
            state: [SlotState::Free; N],
            size: 0,
        }
    }

    /// Number of slots in use; 0 while unconfigured.
    #[inline(always)]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Slot capacity of the arena.
    #[inline(always)]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Ring has been given a size.
    #[inline(always)]
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.size != 0
    }

    /// Set the ring size. Must be a power of two no larger than `N`.
    pub(crate) fn set_size(&mut self, size: usize) -> DmaResult<()> {
        if size == 0 || !size.is_power_of_two() || size > N {
            return Err(DmaError::InvalidState);
        }
        self.size = size;
        Ok(())
    }

    /// Index after `idx`, wrapping at `size`.
    #[inline(always)]
    pub(crate) const fn next(&self, idx: usize) -> usize {
        (idx + 1) & (self.size - 1)
    }

    /// Number of slots from `from` forward to `to`.
    #[inline(always)]
    pub(crate) const fn distance(&self, from: usize, to: usize) -> usize {
        to.wrapping_sub(from) & (self.size - 1)
    }

    /// Descriptor at `idx`.
    #[inline(always)]
    #[must_use]
    pub fn desc(&self, idx: usize) -> &D {
        &self.desc[idx]
    }

    /// Software context at `idx`.
    #[inline(always)]
    #[must_use]
    pub fn swcx(&self, idx: usize) -> &S {
        &self.swcx[idx]
    }

    #[inline(always)]
    pub(crate) fn swcx_mut(&mut self, idx: usize) -> &mut S {
        &mut self.swcx[idx]
    }

    /// Descriptor and software context at `idx`.
    #[inline(always)]
    pub(crate) fn slot_mut(&mut self, idx: usize) -> (&D, &mut S) {
        (&self.desc[idx], &mut self.swcx[idx])
    }

    /// Ownership state of slot `idx`.
    #[inline(always)]
    #[must_use]
    pub fn state(&self, idx: usize) -> SlotState {
        self.state[idx]
    }

    #[inline(always)]
    pub(crate) fn set_state(&mut self, idx: usize, state: SlotState) {
        self.state[idx] = state;
    }

    /// Bus address of the first descriptor.
    #[inline(always)]
    #[must_use]
    pub fn base_addr(&self) -> u64 {
        self.desc.as_ptr() as usize as u64
    }

    /// Bus address of descriptor `idx`, which may be one past the end.
    pub(crate) fn desc_addr(&self, idx: usize) -> DmaResult<u64> {
        let stride = core::mem::size_of::<D>() as u64;
        (idx as u64)
            .checked_mul(stride)
            .and_then(|off| self.base_addr().checked_add(off))
            .ok_or(DmaError::TailPointerOverflow)
    }
}

// =============================================================================
// TX ring
// =============================================================================

/// Transmit ring: producer `cur`, consumer `clean`.
pub struct TxRing<const N: usize> {
    pub(crate) slots: SlotArena<TxDescriptor, TxSwContext, N>,
    pub(crate) cur: usize,
    pub(crate) clean: usize,
    pub(crate) frame_count: u32,
    pub(crate) pkt_id: u32,
    pub(crate) slot_check: bool,
    pub(crate) slot_number: u32,
    pub(crate) pkt: TxPacketContext,
}

impl<const N: usize> TxRing<N> {
    /// Create an unconfigured ring. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: SlotArena::from_parts(
                [const { TxDescriptor::new() }; N],
                [TxSwContext::EMPTY; N],
            ),
            cur: 0,
            clean: 0,
            frame_count: 0,
            pkt_id: 0,
            slot_check: false,
            slot_number: 0,
            pkt: TxPacketContext::new(0),
        }
    }

    /// Ring slots.
    #[must_use]
    pub fn slots(&self) -> &SlotArena<TxDescriptor, TxSwContext, N> {
        &self.slots
    }

    /// Producer index.
    #[inline(always)]
    #[must_use]
    pub const fn cur(&self) -> usize {
        self.cur
    }

    /// Consumer index.
    #[inline(always)]
    #[must_use]
    pub const fn clean(&self) -> usize {
        self.clean
    }

    /// Packets posted with IOC bookkeeping since the ring was reset.
    #[must_use]
    pub const fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Every posted packet has been completed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cur == self.clean
    }

    /// Slots that may be staged without overtaking `clean`.
    ///
    /// One slot is always left unused so that a full ring is distinguishable
    /// from an empty one.
    #[must_use]
    pub fn free_slots(&self) -> usize {
        if !self.slots.is_configured() {
            return 0;
        }
        let in_flight = self.slots.distance(self.clean, self.cur);
        self.slots.size() - 1 - in_flight
    }

    /// Staged parameters of the next packet.
    #[must_use]
    pub fn packet(&self) -> &TxPacketContext {
        &self.pkt
    }

    /// Stage parameters for the next packet.
    pub fn set_packet(&mut self, pkt: TxPacketContext) {
        self.pkt = pkt;
    }

    /// Stage a software context `offset` slots past the producer index.
    pub fn stage(&mut self, offset: usize, swcx: TxSwContext) -> DmaResult<()> {
        if !self.slots.is_configured() {
            return Err(DmaError::InvalidState);
        }
        if offset >= self.free_slots() {
            return Err(DmaError::NoDescriptorsAvailable);
        }
        let idx = (self.cur + offset) & (self.slots.size() - 1);
        if self.slots.state(idx) != SlotState::Free {
            return Err(DmaError::NoDescriptorsAvailable);
        }
        *self.slots.swcx_mut(idx) = swcx;
        Ok(())
    }

    /// Zero every slot and reset all cursors.
    pub(crate) fn reset(&mut self) {
        for idx in 0..N {
            self.slots.desc[idx].clear();
            self.slots.swcx[idx] = TxSwContext::EMPTY;
            self.slots.state[idx] = SlotState::Free;
        }
        self.cur = 0;
        self.clean = 0;
        self.frame_count = 0;
        self.pkt_id = 0;
        self.slot_number = 0;
        self.pkt = TxPacketContext::new(0);
    }
}

impl<const N: usize> Default for TxRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// RX ring
// =============================================================================

/// Receive ring: consumer `cur`, producer `refill`.
pub struct RxRing<const N: usize> {
    pub(crate) slots: SlotArena<RxDescriptor, RxSwContext, N>,
    pub(crate) cur: usize,
    pub(crate) refill: usize,
    pub(crate) pkt: RxPacketContext,
}

impl<const N: usize> RxRing<N> {
    /// Create an unconfigured ring. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: SlotArena::from_parts(
                [const { RxDescriptor::new() }; N],
                [RxSwContext::EMPTY; N],
            ),
            cur: 0,
            refill: 0,
            pkt: RxPacketContext::EMPTY,
        }
    }

    /// Ring slots.
    #[must_use]
    pub fn slots(&self) -> &SlotArena<RxDescriptor, RxSwContext, N> {
        &self.slots
    }

    /// Consumer index.
    #[inline(always)]
    #[must_use]
    pub const fn cur(&self) -> usize {
        self.cur
    }

    /// Refill index.
    #[inline(always)]
    #[must_use]
    pub const fn refill(&self) -> usize {
        self.refill
    }

    /// Slots consumed but not yet re-armed.
    ///
    /// `cur == refill` is either an idle ring or a fully consumed one; the
    /// state of the slot at `refill` tells them apart.
    #[must_use]
    pub fn refill_count(&self) -> usize {
        if !self.slots.is_configured() {
            return 0;
        }
        match self.slots.distance(self.refill, self.cur) {
            0 if self.slots.state(self.refill).is_consumed() => self.slots.size(),
            n => n,
        }
    }

    /// Metadata of the most recently processed packet.
    #[must_use]
    pub fn packet(&self) -> &RxPacketContext {
        &self.pkt
    }

    /// Hand a buffer to slot `idx` so the next arm pass can use it.
    ///
    /// Slots the hardware owns cannot be given a new buffer.
    pub fn set_buffer(&mut self, idx: usize, buf_phy_addr: u64, len: u32) -> DmaResult<()> {
        if idx >= self.slots.size() {
            return Err(DmaError::InvalidState);
        }
        if self.slots.state(idx) == SlotState::ArmedForHw {
            return Err(DmaError::InvalidState);
        }
        *self.slots.swcx_mut(idx) = RxSwContext::with_buffer(buf_phy_addr, len);
        Ok(())
    }

    /// Give every consumed slot between `refill` and `cur` a buffer.
    ///
    /// Slots flagged for reuse keep their buffer. For the others `alloc` is
    /// asked for a `(bus address, length)` pair; returning `None` stops the
    /// walk. Returns the number of slots that now hold a valid buffer.
    pub fn restock<F>(&mut self, mut alloc: F) -> usize
    where
        F: FnMut(usize) -> Option<(u64, u32)>,
    {
        if !self.slots.is_configured() {
            return 0;
        }
        let mut idx = self.refill;
        let mut stocked = 0;
        for _ in 0..self.refill_count() {
            let swcx = self.slots.swcx_mut(idx);
            if swcx.flags.contains(RxSwcxFlags::REUSE) {
                swcx.flags.insert(RxSwcxFlags::BUF_VALID);
            } else if !swcx.flags.contains(RxSwcxFlags::BUF_VALID) {
                match alloc(idx) {
                    Some((addr, len)) => *swcx = RxSwContext::with_buffer(addr, len),
                    None => break,
                }
            }
            stocked += 1;
            idx = self.slots.next(idx);
        }
        stocked
    }

    /// Zero descriptors and reset cursors. Software contexts keep their
    /// buffers so the ring can be re-armed.
    pub(crate) fn reset(&mut self) {
        for idx in 0..N {
            self.slots.desc[idx].clear();
            self.slots.swcx[idx].flags.remove(RxSwcxFlags::PROCESSED | RxSwcxFlags::REUSE);
            self.slots.state[idx] = SlotState::Free;
        }
        self.cur = 0;
        self.refill = 0;
        self.pkt = RxPacketContext::EMPTY;
    }

    /// Forget every staged buffer.
    pub(crate) fn drop_buffers(&mut self) {
        self.slots.swcx.fill(RxSwContext::EMPTY);
    }
}

impl<const N: usize> Default for RxRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tx_ring<const N: usize>(size: usize) -> TxRing<N> {
        let mut ring = TxRing::new();
        ring.slots.set_size(size).unwrap();
        ring
    }

    // =========================================================================
    // Arena Tests
    // =========================================================================

    #[test]
    fn set_size_rejects_non_power_of_two_and_overflow() {
        let mut ring: TxRing<16> = TxRing::new();
        assert_eq!(ring.slots.set_size(0), Err(DmaError::InvalidState));
        assert_eq!(ring.slots.set_size(12), Err(DmaError::InvalidState));
        assert_eq!(ring.slots.set_size(32), Err(DmaError::InvalidState));
        assert!(ring.slots.set_size(8).is_ok());
        assert_eq!(ring.slots.size(), 8);
        assert_eq!(ring.slots.capacity(), 16);
    }

    #[test]
    fn next_wraps_at_runtime_size() {
        let ring: TxRing<16> = tx_ring(8);
        assert_eq!(ring.slots.next(6), 7);
        assert_eq!(ring.slots.next(7), 0);
    }

    #[test]
    fn distance_wraps() {
        let ring: TxRing<8> = tx_ring(8);
        assert_eq!(ring.slots.distance(6, 1), 3);
        assert_eq!(ring.slots.distance(2, 2), 0);
    }

    #[test]
    fn desc_addr_is_base_plus_stride() {
        let ring: TxRing<8> = tx_ring(8);
        let base = ring.slots.base_addr();
        assert_eq!(ring.slots.desc_addr(0).unwrap(), base);
        assert_eq!(ring.slots.desc_addr(8).unwrap(), base + 128);
    }

    #[test]
    fn desc_addr_overflow_is_reported() {
        let ring: TxRing<8> = tx_ring(8);
        assert_eq!(ring.slots.desc_addr(usize::MAX), Err(DmaError::TailPointerOverflow));
    }

    // =========================================================================
    // TX Ring Tests
    // =========================================================================

    #[test]
    fn unconfigured_tx_ring_has_no_free_slots() {
        let ring: TxRing<8> = TxRing::new();
        assert_eq!(ring.free_slots(), 0);
        assert!(ring.is_empty());
    }

    #[test]
    fn free_slots_keeps_one_gap() {
        let mut ring: TxRing<8> = tx_ring(8);
        assert_eq!(ring.free_slots(), 7);
        ring.cur = 5;
        ring.clean = 1;
        assert_eq!(ring.free_slots(), 3);
    }

    #[test]
    fn stage_writes_relative_to_cur() {
        let mut ring: TxRing<8> = tx_ring(8);
        ring.cur = 7;
        ring.clean = 7;
        ring.stage(1, TxSwContext::fragment(0x1000, 64)).unwrap();
        assert_eq!(ring.slots.swcx(0).buf_phy_addr, 0x1000);
    }

    #[test]
    fn stage_refuses_past_free_space() {
        let mut ring: TxRing<4> = tx_ring(4);
        assert_eq!(
            ring.stage(3, TxSwContext::fragment(0x1000, 64)),
            Err(DmaError::NoDescriptorsAvailable)
        );
    }

    #[test]
    fn reset_clears_cursors_and_contexts() {
        let mut ring: TxRing<4> = tx_ring(4);
        ring.stage(0, TxSwContext::fragment(0x1000, 64)).unwrap();
        ring.cur = 2;
        ring.frame_count = 9;
        ring.reset();
        assert_eq!(ring.cur(), 0);
        assert_eq!(ring.frame_count(), 0);
        assert_eq!(*ring.slots.swcx(0), TxSwContext::EMPTY);
    }

    // =========================================================================
    // RX Ring Tests
    // =========================================================================

    #[test]
    fn refill_count_wraps() {
        let mut ring: RxRing<8> = RxRing::new();
        ring.slots.set_size(8).unwrap();
        ring.refill = 6;
        ring.cur = 2;
        assert_eq!(ring.refill_count(), 4);
    }

    #[test]
    fn refill_count_tells_full_ring_from_idle_ring() {
        let mut ring: RxRing<4> = RxRing::new();
        ring.slots.set_size(4).unwrap();
        ring.refill = 2;
        ring.cur = 2;
        ring.slots.set_state(2, SlotState::ArmedForHw);
        assert_eq!(ring.refill_count(), 0);

        for idx in 0..4 {
            ring.slots.set_state(idx, SlotState::CompletedByHw);
        }
        assert_eq!(ring.refill_count(), 4);
        ring.slots.set_state(2, SlotState::PendingReuse);
        assert_eq!(ring.refill_count(), 4);
    }

    #[test]
    fn restock_covers_a_fully_consumed_ring() {
        let mut ring: RxRing<4> = RxRing::new();
        ring.slots.set_size(4).unwrap();
        ring.refill = 1;
        ring.cur = 1;
        for idx in 0..4 {
            ring.slots.set_state(idx, SlotState::CompletedByHw);
        }

        let stocked = ring.restock(|idx| Some((0x1000 * idx as u64, 2048)));
        assert_eq!(stocked, 4);
        assert!((0..4).all(|idx| ring.slots.swcx(idx).flags.contains(RxSwcxFlags::BUF_VALID)));
    }

    #[test]
    fn set_buffer_refuses_armed_slot() {
        let mut ring: RxRing<4> = RxRing::new();
        ring.slots.set_size(4).unwrap();
        ring.slots.set_state(1, SlotState::ArmedForHw);
        assert_eq!(ring.set_buffer(1, 0x2000, 2048), Err(DmaError::InvalidState));
        assert!(ring.set_buffer(0, 0x2000, 2048).is_ok());
        assert!(ring.slots.swcx(0).flags.contains(RxSwcxFlags::BUF_VALID));
    }

    #[test]
    fn restock_keeps_reused_buffers_and_stops_on_failure() {
        let mut ring: RxRing<8> = RxRing::new();
        ring.slots.set_size(8).unwrap();
        ring.cur = 4;
        ring.slots.swcx_mut(1).buf_phy_addr = 0xAAAA;
        ring.slots.swcx_mut(1).flags = RxSwcxFlags::REUSE;

        let mut calls = 0;
        let stocked = ring.restock(|idx| {
            calls += 1;
            if idx < 3 { Some((0x1000 * idx as u64 + 0x1000, 2048)) } else { None }
        });

        assert_eq!(stocked, 3);
        assert_eq!(calls, 3);
        assert_eq!(ring.slots.swcx(1).buf_phy_addr, 0xAAAA);
        assert!(ring.slots.swcx(1).flags.contains(RxSwcxFlags::BUF_VALID));
        assert_eq!(ring.slots.swcx(2).buf_phy_addr, 0x3000);
        assert!(!ring.slots.swcx(3).flags.contains(RxSwcxFlags::BUF_VALID));
    }
}
