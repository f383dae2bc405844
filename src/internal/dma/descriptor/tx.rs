//! TX DMA descriptor for frame transmission.

use super::VolatileCell;
use super::bits::tdes3;

/// TX DMA descriptor (16 bytes).
///
/// Used both as a normal data descriptor and as a context descriptor
/// (CTXT set) carrying VLAN, MSS or PTP parameters for the next packet.
#[repr(C, align(16))]
pub struct TxDescriptor {
    /// TDES0: Buffer address low / timestamp low / packet id
    tdes0: VolatileCell<u32>,
    /// TDES1: Buffer address high / timestamp high
    tdes1: VolatileCell<u32>,
    /// TDES2: Length and per-packet control / MSS
    tdes2: VolatileCell<u32>,
    /// TDES3: Control and status
    tdes3: VolatileCell<u32>,
}

impl TxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 16;

    /// Create a new zeroed TX descriptor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tdes0: VolatileCell::new(0),
            tdes1: VolatileCell::new(0),
            tdes2: VolatileCell::new(0),
            tdes3: VolatileCell::new(0),
        }
    }

    /// Raw TDES0.
    #[inline(always)]
    #[must_use]
    pub fn tdes0(&self) -> u32 {
        self.tdes0.get()
    }

    /// Raw TDES1.
    #[inline(always)]
    #[must_use]
    pub fn tdes1(&self) -> u32 {
        self.tdes1.get()
    }

    /// Raw TDES2.
    #[inline(always)]
    #[must_use]
    pub fn tdes2(&self) -> u32 {
        self.tdes2.get()
    }

    /// Raw TDES3.
    #[inline(always)]
    #[must_use]
    pub fn tdes3(&self) -> u32 {
        self.tdes3.get()
    }

    /// All four words, TDES0 first.
    #[must_use]
    pub fn words(&self) -> [u32; 4] {
        [self.tdes0(), self.tdes1(), self.tdes2(), self.tdes3()]
    }

    /// Overwrite all four words. TDES3 is written last.
    pub(crate) fn set_words(&self, words: [u32; 4]) {
        self.tdes0.set(words[0]);
        self.tdes1.set(words[1]);
        self.tdes2.set(words[2]);
        self.tdes3.set(words[3]);
    }

    #[inline(always)]
    pub(crate) fn set_tdes0(&self, value: u32) {
        self.tdes0.set(value);
    }

    #[inline(always)]
    pub(crate) fn set_tdes1(&self, value: u32) {
        self.tdes1.set(value);
    }

    #[inline(always)]
    pub(crate) fn update_tdes2<F: FnOnce(u32) -> u32>(&self, f: F) {
        self.tdes2.update(f);
    }

    #[inline(always)]
    pub(crate) fn update_tdes3<F: FnOnce(u32) -> u32>(&self, f: F) {
        self.tdes3.update(f);
    }

    /// Check if descriptor is owned by DMA.
    #[inline(always)]
    #[must_use]
    pub fn is_owned(&self) -> bool {
        (self.tdes3.get() & tdes3::OWN) != 0
    }

    /// Context descriptor (no payload).
    #[inline(always)]
    #[must_use]
    pub fn is_context(&self) -> bool {
        (self.tdes3.get() & tdes3::CTXT) != 0
    }

    /// First descriptor of a packet.
    #[inline(always)]
    #[must_use]
    pub fn is_first(&self) -> bool {
        (self.tdes3.get() & tdes3::FD) != 0
    }

    /// Last descriptor of a packet.
    #[inline(always)]
    #[must_use]
    pub fn is_last(&self) -> bool {
        (self.tdes3.get() & tdes3::LD) != 0
    }

    /// Give ownership to DMA.
    #[inline(always)]
    pub(crate) fn set_owned(&self) {
        self.tdes3.update(|v| v | tdes3::OWN);
    }

    /// Zero all words.
    pub(crate) fn clear(&self) {
        self.set_words([0; 4]);
    }
}

impl Default for TxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
