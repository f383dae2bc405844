//! RX DMA descriptor for frame reception.

use core::sync::atomic::{Ordering, fence};

use super::bits::rdes3;
use super::{VolatileCell, lower_32, upper_32};

/// RX DMA descriptor (16 bytes).
///
/// In read format software writes the buffer address into RDES0/RDES1 and
/// the control bits into RDES3. After the DMA clears OWN the same words hold
/// write-back status, whose meaning depends on the hardware generation.
#[repr(C, align(16))]
pub struct RxDescriptor {
    /// RDES0: Buffer address low / outer VLAN tag
    rdes0: VolatileCell<u32>,
    /// RDES1: Buffer address high / extended status or RSS hash
    rdes1: VolatileCell<u32>,
    /// RDES2: Buffer 2 address / filter status
    rdes2: VolatileCell<u32>,
    /// RDES3: Control and status
    rdes3: VolatileCell<u32>,
}

impl RxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 16;

    /// Create a new zeroed RX descriptor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rdes0: VolatileCell::new(0),
            rdes1: VolatileCell::new(0),
            rdes2: VolatileCell::new(0),
            rdes3: VolatileCell::new(0),
        }
    }

    /// Raw RDES0.
    #[inline(always)]
    #[must_use]
    pub fn rdes0(&self) -> u32 {
        self.rdes0.get()
    }

    /// Raw RDES1.
    #[inline(always)]
    #[must_use]
    pub fn rdes1(&self) -> u32 {
        self.rdes1.get()
    }

    /// Raw RDES2.
    #[inline(always)]
    #[must_use]
    pub fn rdes2(&self) -> u32 {
        self.rdes2.get()
    }

    /// Raw RDES3.
    #[inline(always)]
    #[must_use]
    pub fn rdes3(&self) -> u32 {
        self.rdes3.get()
    }

    /// All four words, RDES0 first.
    #[must_use]
    pub fn words(&self) -> [u32; 4] {
        [self.rdes0(), self.rdes1(), self.rdes2(), self.rdes3()]
    }

    /// Overwrite all four words. RDES3 is written last.
    pub(crate) fn set_words(&self, words: [u32; 4]) {
        self.rdes0.set(words[0]);
        self.rdes1.set(words[1]);
        self.rdes2.set(words[2]);
        self.rdes3.set(words[3]);
    }

    /// Check if descriptor is owned by DMA.
    #[inline(always)]
    #[must_use]
    pub fn is_owned(&self) -> bool {
        (self.rdes3.get() & rdes3::OWN) != 0
    }

    /// First descriptor of a packet.
    #[inline(always)]
    #[must_use]
    pub fn is_first(&self) -> bool {
        (self.rdes3.get() & rdes3::FD) != 0
    }

    /// Last descriptor of a packet.
    #[inline(always)]
    #[must_use]
    pub fn is_last(&self) -> bool {
        (self.rdes3.get() & rdes3::LD) != 0
    }

    /// Whole packet fits in this descriptor.
    #[inline(always)]
    #[must_use]
    pub fn is_first_and_last(&self) -> bool {
        let v = self.rdes3.get();
        (v & (rdes3::FD | rdes3::LD)) == (rdes3::FD | rdes3::LD)
    }

    /// Received packet length from write-back status.
    #[inline(always)]
    #[must_use]
    pub fn packet_len(&self) -> u32 {
        self.rdes3.get() & rdes3::PKT_LEN_MASK
    }

    /// Zero all words.
    pub(crate) fn clear(&self) {
        self.set_words([0; 4]);
    }

    /// Point the descriptor at `buf_addr` and hand it to the DMA.
    ///
    /// The control bits in RDES3 are written together with OWN, after the
    /// address words are visible.
    pub(crate) fn arm(&self, buf_addr: u64, ioc: bool, buf1_valid: bool) {
        self.rdes0.set(lower_32(buf_addr));
        self.rdes1.set(upper_32(buf_addr));
        self.rdes2.set(0);

        let mut ctrl = rdes3::OWN;
        if ioc {
            ctrl |= rdes3::IOC;
        }
        if buf1_valid {
            ctrl |= rdes3::B1V;
        }
        fence(Ordering::Release);
        self.rdes3.set(ctrl);
    }
}

impl Default for RxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
