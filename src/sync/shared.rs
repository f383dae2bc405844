//! ISR-safe engine wrapper using critical sections.

use super::primitives::CriticalSectionCell;
use crate::driver::dma::OsiDma;
use crate::internal::register::RegisterIo;

/// ISR-safe DMA engine wrapper.
///
/// All access goes through `critical_section::with()`, disabling interrupts
/// for the duration of the closure. Keep completion budgets small so the
/// critical section stays short.
///
/// # Example
///
/// ```ignore
/// static DMA: SharedDma<Mmio, 2, 512> = SharedDma::new(unsafe { Mmio::new(MAC_BASE) });
///
/// DMA.with(|dma| dma.hw_transmit(0)).ok();
/// ```
pub struct SharedDma<R: RegisterIo, const CH: usize, const N: usize> {
    inner: CriticalSectionCell<OsiDma<R, CH, N>>,
}

impl<R: RegisterIo, const CH: usize, const N: usize> SharedDma<R, CH, N> {
    /// Create a new shared engine (const, suitable for static initialization).
    pub const fn new(regs: R) -> Self {
        Self {
            inner: CriticalSectionCell::new(OsiDma::new(regs)),
        }
    }

    /// Execute a closure with exclusive access to the engine.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut OsiDma<R, CH, N>) -> T,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<T, F>(&self, f: F) -> Option<T>
    where
        F: FnOnce(&mut OsiDma<R, CH, N>) -> T,
    {
        self.inner.try_with(f)
    }
}

impl<R: RegisterIo + Default, const CH: usize, const N: usize> Default for SharedDma<R, CH, N> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::config::DmaConfig;
    use crate::driver::error::{DmaError, Error};
    use crate::internal::register::Mmio;
    use crate::testing::MockRegisters;

    type Shared = SharedDma<MockRegisters, 1, 16>;

    fn config() -> DmaConfig {
        DmaConfig::new().with_tx_ring_size(16).with_rx_ring_size(16)
    }

    #[test]
    fn static_construction() {
        // SAFETY: the register block is never accessed
        static _DMA: SharedDma<Mmio, 1, 8> = SharedDma::new(unsafe { Mmio::new(0x4000_0000) });
    }

    #[test]
    fn with_gives_mutable_access() {
        let shared = Shared::default();
        shared.with(|dma| dma.dma_init(config())).unwrap();
        assert!(shared.with(|dma| dma.variant().is_some()));
    }

    #[test]
    fn try_with_returns_some_when_free() {
        let shared = Shared::default();
        assert_eq!(shared.try_with(|dma| dma.is_initialized()), Some(false));
    }

    #[test]
    fn try_with_inside_with_is_refused() {
        let shared = Shared::default();
        let nested = shared.with(|_| shared.try_with(|_| ()));
        assert_eq!(nested, None);
    }

    #[test]
    fn errors_pass_through() {
        let shared = Shared::default();
        let result = shared.with(|dma| dma.hw_transmit(0));
        assert_eq!(result, Err(Error::Dma(DmaError::InvalidState)));
    }
}
