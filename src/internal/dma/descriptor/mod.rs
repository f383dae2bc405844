//! TX and RX DMA descriptor structures.
//!
//! Each descriptor is four 32-bit words shared with the DMA engine. The
//! OWN bit in word 3 decides which side may touch the rest of the words.

pub mod bits;
pub mod rx;
pub mod tx;

pub use rx::RxDescriptor;
pub use tx::TxDescriptor;

/// Volatile cell wrapper for descriptor fields
///
/// Ensures all accesses are volatile to prevent compiler optimization
/// from reordering or caching descriptor field accesses.
#[repr(transparent)]
pub(crate) struct VolatileCell<T: Copy> {
    value: core::cell::UnsafeCell<T>,
}

// Safety: all access is through volatile operations on aligned 32-bit words.
unsafe impl<T: Copy> Sync for VolatileCell<T> {}

impl<T: Copy> VolatileCell<T> {
    /// Create a new volatile cell with the given initial value
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self {
            value: core::cell::UnsafeCell::new(value),
        }
    }

    /// Read the value (volatile read)
    #[inline(always)]
    pub fn get(&self) -> T {
        // SAFETY: the pointer comes from a live UnsafeCell
        unsafe { core::ptr::read_volatile(self.value.get()) }
    }

    /// Write a value (volatile write)
    #[inline(always)]
    pub fn set(&self, value: T) {
        // SAFETY: the pointer comes from a live UnsafeCell
        unsafe { core::ptr::write_volatile(self.value.get(), value) }
    }

    /// Update the value using a function (read-modify-write)
    #[inline(always)]
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        let old = self.get();
        self.set(f(old));
    }
}

impl<T: Copy + Default> Default for VolatileCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Low 32 bits of a bus address.
#[inline(always)]
pub(crate) const fn lower_32(addr: u64) -> u32 {
    (addr & 0xFFFF_FFFF) as u32
}

/// High 32 bits of a bus address.
#[inline(always)]
pub(crate) const fn upper_32(addr: u64) -> u32 {
    (addr >> 32) as u32
}
