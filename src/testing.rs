//! Testing utilities and mock implementations
//!
//! This module provides mock implementations for exercising the DMA engine
//! on the host without hardware access.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::RefCell;
use std::collections::HashMap;
use std::vec::Vec;

use crate::driver::dma::BufferProvider;
use crate::internal::dma::context::{
    RxPacketContext, RxSwContext, RxSwcxFlags, TxDoneContext, TxSwContext,
};
use crate::internal::dma::descriptor::bits::{rdes1, rdes3, tdes3};
use crate::internal::dma::descriptor::{RxDescriptor, TxDescriptor};
use crate::internal::register::RegisterIo;

// =============================================================================
// Mock Register File
// =============================================================================

/// Mock register file for testing register sequences without hardware
///
/// Unset registers read as zero. Every write is logged in order. Bits can be
/// pinned with [`MockRegisters::stick_bits`] to simulate a register that
/// ignores writes.
///
/// # Example
///
/// ```ignore
/// let mut regs = MockRegisters::new();
/// regs.preset(0x1100, 0x1);
/// regs.set_bits(0x1100, 0x4);
/// assert_eq!(regs.get(0x1100), 0x5);
/// ```
#[derive(Debug, Default)]
pub struct MockRegisters {
    /// Register values: offset -> value
    registers: RefCell<HashMap<usize, u32>>,
    /// Record of writes: (offset, value as written by software)
    write_log: RefCell<Vec<(usize, u32)>>,
    /// Pinned bits: offset -> (mask, level)
    stuck: RefCell<HashMap<usize, (u32, u32)>>,
}

impl MockRegisters {
    /// Create an empty register file
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register value without logging a write
    pub fn preset(&self, offset: usize, value: u32) {
        self.registers.borrow_mut().insert(offset, value);
    }

    /// Current value of a register
    pub fn get(&self, offset: usize) -> u32 {
        self.registers.borrow().get(&offset).copied().unwrap_or(0)
    }

    /// All writes in order
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.write_log.borrow().clone()
    }

    /// Values written to one register, in order
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.write_log
            .borrow()
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Position of the first write to `offset` in the write log
    pub fn first_write_index(&self, offset: usize) -> Option<usize> {
        self.write_log.borrow().iter().position(|(o, _)| *o == offset)
    }

    /// Clear the write log
    pub fn clear_writes(&self) {
        self.write_log.borrow_mut().clear();
    }

    /// Pin the bits in `mask` of `offset` to the matching bits of `level`
    pub fn stick_bits(&self, offset: usize, mask: u32, level: u32) {
        self.stuck.borrow_mut().insert(offset, (mask, level & mask));
        let current = self.get(offset);
        self.preset(offset, (current & !mask) | (level & mask));
    }
}

impl RegisterIo for MockRegisters {
    fn read(&self, offset: usize) -> u32 {
        self.get(offset)
    }

    fn write(&mut self, offset: usize, value: u32) {
        self.write_log.borrow_mut().push((offset, value));
        let stored = match self.stuck.borrow().get(&offset) {
            Some(&(mask, level)) => (value & !mask) | level,
            None => value,
        };
        self.registers.borrow_mut().insert(offset, stored);
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
    /// Number of delay calls
    calls: RefCell<u32>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }

    /// Number of times a delay was requested
    pub fn calls(&self) -> u32 {
        *self.calls.borrow()
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += ns as u64;
        *self.calls.borrow_mut() += 1;
    }

    fn delay_us(&mut self, us: u32) {
        *self.total_ns.borrow_mut() += us as u64 * 1_000;
        *self.calls.borrow_mut() += 1;
    }
}

// =============================================================================
// Mock Buffer Provider
// =============================================================================

/// One packet handed to [`MockBufferProvider::receive_packet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceivedPacket {
    pub chan: u32,
    pub ring_size: usize,
    pub rx_buf_len: u32,
    pub pkt: RxPacketContext,
    pub buf_phy_addr: u64,
}

/// Buffer provider that records every callback
///
/// By default a delivered buffer is consumed: the slot is marked
/// processed and loses its buffer, as a network stack taking the data
/// would do. Set `keep_buffers` to leave slots untouched.
#[derive(Debug, Default)]
pub struct MockBufferProvider {
    pub received: Vec<ReceivedPacket>,
    pub completed: Vec<(TxSwContext, TxDoneContext)>,
    pub reallocs: Vec<u32>,
    pub keep_buffers: bool,
}

impl MockBufferProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BufferProvider for MockBufferProvider {
    fn receive_packet(
        &mut self,
        chan: u32,
        ring_size: usize,
        rx_buf_len: u32,
        pkt: &RxPacketContext,
        swcx: &mut RxSwContext,
    ) {
        self.received.push(ReceivedPacket {
            chan,
            ring_size,
            rx_buf_len,
            pkt: *pkt,
            buf_phy_addr: swcx.buf_phy_addr,
        });
        if !self.keep_buffers {
            swcx.flags.remove(RxSwcxFlags::BUF_VALID);
            swcx.flags.insert(RxSwcxFlags::PROCESSED);
        }
    }

    fn transmit_complete(&mut self, swcx: &TxSwContext, done: &TxDoneContext) {
        self.completed.push((*swcx, *done));
    }

    fn realloc_buf(&mut self, chan: u32) {
        self.reallocs.push(chan);
    }
}

// =============================================================================
// Descriptor Simulation
// =============================================================================

/// Class-A RX write-back of a complete frame announcing a timestamp.
pub fn class_a_rx_with_timestamp() -> RxDescriptor {
    let desc = RxDescriptor::new();
    desc.set_words([0, rdes1::TSA, 0, rdes3::RS1V | rdes3::FD | rdes3::LD | 64]);
    desc
}

/// Simulate the DMA writing back an RX descriptor and releasing it.
pub fn rx_writeback(desc: &RxDescriptor, rdes0: u32, rdes1: u32, rdes3: u32) {
    desc.set_words([rdes0, rdes1, 0, rdes3 & !rdes3::OWN]);
}

/// Simulate the DMA completing a single-fragment frame of `len` bytes.
pub fn rx_complete_frame(desc: &RxDescriptor, len: u32) {
    rx_writeback(desc, 0, 0, rdes3::FD | rdes3::LD | (len & rdes3::PKT_LEN_MASK));
}

/// Simulate the DMA finishing a TX descriptor with `status` bits.
///
/// TDES2 and the control bits are kept; TDES0/TDES1 take the given
/// timestamp words.
pub fn tx_writeback(desc: &TxDescriptor, tdes0: u32, tdes1: u32, status: u32) {
    let ctrl = desc.tdes3() & (tdes3::CTXT | tdes3::FD | tdes3::LD);
    desc.set_words([tdes0, tdes1, desc.tdes2(), ctrl | status]);
}

/// Simulate the DMA finishing a TX descriptor without error.
pub fn tx_release(desc: &TxDescriptor) {
    let words = desc.words();
    desc.set_words([words[0], words[1], words[2], words[3] & !tdes3::OWN]);
}

// =============================================================================
// Test Assertions
// =============================================================================

/// Assert that a register was written with a specific value
#[macro_export]
macro_rules! assert_reg_written {
    ($regs:expr, $offset:expr, $value:expr) => {
        let writes = $regs.writes_to($offset);
        assert!(
            writes.iter().any(|w| *w == $value),
            "Expected write of {:#x} to register {:#x}, but got: {:x?}",
            $value,
            $offset,
            writes
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::delay::DelayNs;

    #[test]
    fn mock_registers_log_and_store() {
        let mut regs = MockRegisters::new();
        regs.write(0x10, 0xAB);
        regs.write(0x14, 0xCD);
        assert_eq!(regs.get(0x10), 0xAB);
        assert_eq!(regs.writes(), std::vec![(0x10, 0xAB), (0x14, 0xCD)]);
        assert_eq!(regs.first_write_index(0x14), Some(1));
    }

    #[test]
    fn stuck_bits_ignore_writes() {
        let mut regs = MockRegisters::new();
        regs.stick_bits(0x20, 0x1, 0);
        regs.write(0x20, 0x3);
        assert_eq!(regs.get(0x20), 0x2);
        assert_eq!(regs.writes_to(0x20), std::vec![0x3]);
    }

    #[test]
    fn mock_delay_counts_calls() {
        let mut delay = MockDelay::new();
        delay.delay_us(2);
        delay.delay_ns(500);
        assert_eq!(delay.calls(), 2);
        assert_eq!(delay.total_ns(), 2_500);
    }

    #[test]
    fn provider_consumes_buffers_by_default() {
        let mut provider = MockBufferProvider::new();
        let mut swcx = RxSwContext::with_buffer(0x8000, 2048);
        provider.receive_packet(0, 16, 1536, &RxPacketContext::EMPTY, &mut swcx);
        assert!(swcx.flags.contains(RxSwcxFlags::PROCESSED));
        assert!(!swcx.flags.contains(RxSwcxFlags::BUF_VALID));
        assert_eq!(provider.received[0].buf_phy_addr, 0x8000);
    }
}
