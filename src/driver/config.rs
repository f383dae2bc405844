//! Configuration types for the DMA data path

use bitflags::bitflags;

use crate::constants::MAX_DMA_CHANNELS;

bitflags! {
    /// PTP role and timestamping mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PtpMode: u32 {
        /// Clock master
        const MASTER = 1 << 0;
        /// Clock slave
        const SLAVE = 1 << 1;
        /// One-step timestamp insertion
        const ONESTEP = 1 << 2;
        /// Two-step timestamp reporting
        const TWOSTEP = 1 << 3;
    }
}

impl PtpMode {
    /// Mode applied when none is configured.
    pub const DEFAULT: Self = Self::SLAVE.union(Self::TWOSTEP);

    /// One-step timestamping as a clock master.
    #[must_use]
    pub const fn is_onestep_master(self) -> bool {
        self.contains(Self::ONESTEP) && self.contains(Self::MASTER)
    }
}

/// Hardware type code of the Class-A (EQOS) controller
pub const HW_TYPE_CLASS_A: u32 = 0;
/// Hardware type code of the Class-B (MGBE) controller
pub const HW_TYPE_CLASS_B: u32 = 1;

/// Interrupt coalescing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoalesceConfig {
    /// Use the RX interrupt watchdog timer instead of per-packet IOC
    pub use_riwt: bool,
    /// RX watchdog timeout in microseconds
    pub rx_riwt: u32,
    /// With the watchdog on, still request IOC every `rx_frames` slots
    pub use_rx_frames: bool,
    /// RX frame coalescing count
    pub rx_frames: u32,
    /// TX completion is driven by a software timer; IOC is suppressed
    pub use_tx_usecs: bool,
    /// Request IOC every `tx_frames` packets
    pub use_tx_frames: bool,
    /// TX frame coalescing count
    pub tx_frames: u32,
}

impl CoalesceConfig {
    /// No coalescing: every packet interrupts.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            use_riwt: false,
            rx_riwt: 0,
            use_rx_frames: false,
            rx_frames: 0,
            use_tx_usecs: false,
            use_tx_frames: false,
            tx_frames: 0,
        }
    }
}

/// DMA engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaConfig {
    /// Hardware type code (0 = Class-A, 1 = Class-B)
    pub hw_type: u32,
    /// Hardware channel ids in use
    pub channels: [u32; MAX_DMA_CHANNELS],
    /// Number of valid entries in `channels`
    pub num_channels: usize,
    /// TX ring size; 0 selects the controller default
    pub tx_ring_size: usize,
    /// RX ring size; 0 selects the controller default
    pub rx_ring_size: usize,
    /// MTU used to size receive buffers
    pub mtu: u32,
    /// Interrupt coalescing
    pub coalesce: CoalesceConfig,
    /// PTP mode; empty selects [`PtpMode::DEFAULT`] at `dma_init`
    pub ptp_mode: PtpMode,
    /// Bus address of the reserved RX buffer used when allocation fails
    pub rx_reserved_buf: Option<u64>,
    /// Channel interrupts are routed through the virtualization wrapper
    pub use_virtualization: bool,
}

impl Default for DmaConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DmaConfig {
    /// Create a new configuration with defaults
    ///
    /// Class-A hardware, channel 0 only, default ring sizes and a
    /// 1500 byte MTU.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hw_type: HW_TYPE_CLASS_A,
            channels: [0; MAX_DMA_CHANNELS],
            num_channels: 1,
            tx_ring_size: 0,
            rx_ring_size: 0,
            mtu: 1500,
            coalesce: CoalesceConfig::new(),
            ptp_mode: PtpMode::empty(),
            rx_reserved_buf: None,
            use_virtualization: false,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the hardware type code
    #[must_use]
    pub const fn with_hw_type(mut self, hw_type: u32) -> Self {
        self.hw_type = hw_type;
        self
    }

    /// Set the channel list
    ///
    /// Ids beyond [`MAX_DMA_CHANNELS`] entries are ignored and the
    /// count is recorded as given so that `dma_init` rejects it.
    #[must_use]
    pub const fn with_channels(mut self, channels: &[u32]) -> Self {
        let mut i = 0;
        while i < channels.len() && i < MAX_DMA_CHANNELS {
            self.channels[i] = channels[i];
            i += 1;
        }
        self.num_channels = channels.len();
        self
    }

    /// Set the TX ring size
    #[must_use]
    pub const fn with_tx_ring_size(mut self, size: usize) -> Self {
        self.tx_ring_size = size;
        self
    }

    /// Set the RX ring size
    #[must_use]
    pub const fn with_rx_ring_size(mut self, size: usize) -> Self {
        self.rx_ring_size = size;
        self
    }

    /// Set the MTU
    #[must_use]
    pub const fn with_mtu(mut self, mtu: u32) -> Self {
        self.mtu = mtu;
        self
    }

    /// Enable the RX watchdog with a timeout in microseconds
    #[must_use]
    pub const fn with_rx_watchdog(mut self, riwt_us: u32) -> Self {
        self.coalesce.use_riwt = true;
        self.coalesce.rx_riwt = riwt_us;
        self
    }

    /// Request an RX interrupt every `frames` slots
    #[must_use]
    pub const fn with_rx_frames(mut self, frames: u32) -> Self {
        self.coalesce.use_rx_frames = true;
        self.coalesce.rx_frames = frames;
        self
    }

    /// Suppress per-packet TX interrupts in favour of a software timer
    #[must_use]
    pub const fn with_tx_usecs(mut self, enabled: bool) -> Self {
        self.coalesce.use_tx_usecs = enabled;
        self
    }

    /// Request a TX interrupt every `frames` packets
    #[must_use]
    pub const fn with_tx_frames(mut self, frames: u32) -> Self {
        self.coalesce.use_tx_frames = true;
        self.coalesce.tx_frames = frames;
        self
    }

    /// Set the PTP mode
    #[must_use]
    pub const fn with_ptp_mode(mut self, mode: PtpMode) -> Self {
        self.ptp_mode = mode;
        self
    }

    /// Set the reserved RX buffer address
    #[must_use]
    pub const fn with_rx_reserved_buf(mut self, addr: u64) -> Self {
        self.rx_reserved_buf = Some(addr);
        self
    }

    /// Route channel interrupts through the virtualization wrapper
    #[must_use]
    pub const fn with_virtualization(mut self, enabled: bool) -> Self {
        self.use_virtualization = enabled;
        self
    }

    /// Configured channel ids.
    #[must_use]
    pub fn channel_ids(&self) -> &[u32] {
        let n = if self.num_channels < MAX_DMA_CHANNELS {
            self.num_channels
        } else {
            MAX_DMA_CHANNELS
        };
        &self.channels[..n]
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PtpMode {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PtpMode({=u32:#x})", self.bits());
    }
}
