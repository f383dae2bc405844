//! Register access seam for the MAC DMA block
//!
//! All register traffic in this crate goes through [`RegisterIo`], which
//! takes offsets relative to the MAC base. [`Mmio`] implements it with
//! volatile pointer access; host tests substitute a mock register file.
//!
//! The per-channel DMA register layout of each hardware generation lives in
//! [`class_a`] and [`class_b`] as a [`ChannelRegMap`].

pub mod class_a;
pub mod class_b;

/// Read a 32-bit register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn read_reg(addr: usize) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Write a 32-bit value to a register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn write_reg(addr: usize, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

// =============================================================================
// RegisterIo
// =============================================================================

/// 32-bit register file addressed by byte offset from the MAC base.
pub trait RegisterIo {
    /// Read the register at `offset`.
    fn read(&self, offset: usize) -> u32;

    /// Write `value` to the register at `offset`.
    fn write(&mut self, offset: usize, value: u32);

    /// Read-modify-write the register at `offset`.
    #[inline(always)]
    fn modify<F>(&mut self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(offset);
        self.write(offset, f(value));
    }

    /// Set bits (read-modify-write).
    #[inline(always)]
    fn set_bits(&mut self, offset: usize, bits: u32) {
        self.modify(offset, |v| v | bits);
    }

    /// Clear bits (read-modify-write).
    #[inline(always)]
    fn clear_bits(&mut self, offset: usize, bits: u32) {
        self.modify(offset, |v| v & !bits);
    }
}

impl<R: RegisterIo + ?Sized> RegisterIo for &mut R {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    #[inline(always)]
    fn write(&mut self, offset: usize, value: u32) {
        (**self).write(offset, value);
    }
}

/// Memory-mapped register file at a fixed base address.
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Wrap the register block at `base`.
    ///
    /// # Safety
    /// `base` must be the mapped, 4-byte aligned base of the MAC register
    /// block and no other code may drive the DMA channel registers while
    /// this value is alive.
    #[must_use]
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the register block.
    #[must_use]
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl RegisterIo for Mmio {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: validity of base is guaranteed by `Mmio::new`
        unsafe { read_reg(self.base + offset) }
    }

    #[inline(always)]
    fn write(&mut self, offset: usize, value: u32) {
        // SAFETY: validity of base is guaranteed by `Mmio::new`
        unsafe { write_reg(self.base + offset, value) }
    }
}

// =============================================================================
// Channel register map
// =============================================================================

/// Per-channel DMA register offsets of one hardware generation.
///
/// Every field is `base + chan * stride`; the virtual interrupt registers
/// use their own stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRegMap {
    /// Channel control
    pub ctrl: usize,
    /// TX control
    pub tx_ctrl: usize,
    /// RX control
    pub rx_ctrl: usize,
    /// TX descriptor list address high
    pub tx_list_hi: usize,
    /// TX descriptor list address low
    pub tx_list_lo: usize,
    /// RX descriptor list address high
    pub rx_list_hi: usize,
    /// RX descriptor list address low
    pub rx_list_lo: usize,
    /// TX tail pointer (low word)
    pub tx_tail: usize,
    /// RX tail pointer high word, if the generation has one
    pub rx_tail_hi: Option<usize>,
    /// RX tail pointer low word
    pub rx_tail_lo: usize,
    /// TX ring length
    pub tx_ring_len: usize,
    /// RX ring length
    pub rx_ring_len: usize,
    /// Interrupt enable
    pub intr_ena: usize,
    /// RX interrupt watchdog timer
    pub rx_wdt: usize,
    /// Slot function control and status, if supported
    pub slot_ctrl: Option<usize>,
    /// Channel status
    pub status: usize,
    /// Virtual interrupt control
    pub virt_ctrl: usize,
    /// Virtual interrupt status
    pub virt_status: usize,
}

/// Offset of register `base` for channel `chan` with a per-channel stride.
#[inline(always)]
pub(crate) const fn chan_reg(base: usize, stride: usize, chan: u32) -> usize {
    base + stride * chan as usize
}

// =============================================================================
// Register bit definitions shared by both generations
// =============================================================================

/// DMA_CHx_CTRL bits
pub mod ctrl {
    /// 8x programmable burst length
    pub const PBLX8: u32 = 1 << 16;
}

/// DMA_CHx_TX_CTRL bits
pub mod tx_ctrl {
    /// Start transmission
    pub const ST: u32 = 1 << 0;
    /// Operate on second frame
    pub const OSF: u32 = 1 << 4;
    /// TCP segmentation enable
    pub const TSE: u32 = 1 << 12;
    /// TX programmable burst length
    pub const TXPBL: u32 = 32 << 16;
}

/// DMA_CHx_RX_CTRL bits
pub mod rx_ctrl {
    /// Start receive
    pub const SR: u32 = 1 << 0;
    /// Receive buffer size shift
    pub const RBSZ_SHIFT: u32 = 1;
    /// Receive buffer size mask
    pub const RBSZ_MASK: u32 = 0x7FFE;
    /// RX programmable burst length
    pub const RXPBL: u32 = 12 << 16;
    /// DMA packet flush
    pub const RPF: u32 = 1 << 31;
}

/// DMA_CHx_INTR_ENA bits
pub mod intr_ena {
    /// TX interrupt
    pub const TIE: u32 = 1 << 0;
    /// TX buffer unavailable
    pub const TBUE: u32 = 1 << 2;
    /// RX interrupt
    pub const RIE: u32 = 1 << 6;
    /// RX buffer unavailable
    pub const RBUE: u32 = 1 << 7;
    /// Fatal bus error
    pub const FBEE: u32 = 1 << 12;
    /// Abnormal interrupt summary
    pub const AIE: u32 = 1 << 14;
    /// Normal interrupt summary
    pub const NIE: u32 = 1 << 15;
}

/// DMA_CHx_STATUS clear values
pub mod status {
    /// Clears TI, TBU and NIS
    pub const TX_CLEAR: u32 = (1 << 0) | (1 << 2) | (1 << 15);
    /// Clears RI, RBU and NIS
    pub const RX_CLEAR: u32 = (1 << 6) | (1 << 7) | (1 << 15);
}

/// Virtual interrupt control and status bits
pub mod virt_intr {
    /// TX direction
    pub const TX: u32 = 1 << 0;
    /// RX direction
    pub const RX: u32 = 1 << 1;
}

/// DMA_CHx_RX_WDT fields
pub mod rx_wdt {
    /// Watchdog count mask
    pub const RWT_MASK: u32 = 0xFF;
    /// Watchdog unit mask
    pub const RWTU_MASK: u32 = 0x3 << 16;
    /// Watchdog unit: 512 clock cycles
    pub const RWTU_512: u32 = 1 << 16;
}

/// DMA_CHx_SLOT_CTRL bits (Class-A)
pub mod slot_ctrl {
    /// Enable slot number checking
    pub const ESC: u32 = 1 << 0;
    /// Advance slot check
    pub const ASC: u32 = 1 << 1;
    /// Slot interval value shift
    pub const SIV_SHIFT: u32 = 4;
    /// Slot interval value mask (before shift)
    pub const SIV_MASK: u32 = 0xFFF;
}
