//! DMA data-path engine.
//!
//! [`OsiDma`] owns the register file, the per-channel descriptor rings and
//! the statistics of one controller. It is configured in two phases:
//!
//! 1. [`OsiDma::dma_init`] validates a [`DmaConfig`] and sizes the rings
//!    without touching hardware.
//! 2. [`OsiDma::hw_dma_init`] programs every channel, arms the RX rings,
//!    enables interrupts and starts DMA.
//!
//! Buffers are owned by the caller. They are staged into ring slots through
//! [`OsiDma::stage_tx_packet`] and [`RxRing::set_buffer`] /
//! [`RxRing::restock`], and handed back through a [`BufferProvider`] when
//! the hardware is done with them.
//!
//! # Example
//!
//! ```ignore
//! let mut dma: OsiDma<Mmio, 1, 256> = OsiDma::new(unsafe { Mmio::new(MAC_BASE) });
//! dma.dma_init(DmaConfig::new().with_tx_ring_size(256).with_rx_ring_size(256))?;
//! for idx in 0..256 {
//!     dma.rx_ring_mut(0)?.set_buffer(idx, pool.addr(idx), 2048)?;
//! }
//! dma.hw_dma_init()?;
//!
//! dma.stage_tx_packet(0, TxPacketContext::new(1), &[(frame_addr, frame_len)])?;
//! dma.hw_transmit(0)?;
//!
//! // Interrupt bottom half
//! dma.process_tx_completions(0, 64, &mut stack)?;
//! let poll = dma.process_rx_completions(0, 64, &mut stack, &mut delay)?;
//! dma.rx_ring_mut(0)?.restock(|idx| pool.alloc(idx));
//! dma.rx_refill(0)?;
//! ```

use embedded_hal::delay::DelayNs;

use super::config::{DmaConfig, PtpMode};
use super::error::{ConfigError, DmaError, DmaResult, Result};
use super::interrupt::{IntrDirection, set_channel_interrupt};
use super::stats::{DmaStats, PktErrStats};
use crate::constants::{ETH_HLEN, MAX_DMA_CHANNELS, MAX_MTU, NET_IP_ALIGN, SLOT_INTVL_MAX, VLAN_HLEN};
use crate::internal::dma::context::{
    RxPacketContext, RxSwContext, TxDoneContext, TxPacketContext, TxPktFlags, TxSwContext,
};
use crate::internal::dma::ring::{RxRing, TxRing};
use crate::internal::dma::{DmaChannel, Runtime, needs_context};
use crate::internal::fmt::{dma_debug, dma_warn};
use crate::internal::register::RegisterIo;
use crate::variant::{HwVariant, VariantOps};

// =============================================================================
// Buffer Provider
// =============================================================================

/// Consumer of completed buffers.
///
/// Called from the completion paths with the slot's software context. The
/// provider owns the buffers; the engine only ever sees bus addresses.
pub trait BufferProvider {
    /// A frame landed in the buffer of `swcx`.
    ///
    /// The provider takes the buffer by clearing `BUF_VALID` and setting
    /// `PROCESSED` on `swcx`, or flags it `REUSE` to have it re-armed as is.
    /// Either way the slot is not offered again until it has been re-armed.
    fn receive_packet(
        &mut self,
        chan: u32,
        ring_size: usize,
        rx_buf_len: u32,
        pkt: &RxPacketContext,
        swcx: &mut RxSwContext,
    );

    /// The hardware released the TX buffer of `swcx`.
    fn transmit_complete(&mut self, swcx: &TxSwContext, done: &TxDoneContext);

    /// The reserved RX buffer was consumed and slots need fresh buffers.
    fn realloc_buf(&mut self, _chan: u32) {}
}

/// Outcome of one RX completion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxPollResult {
    /// Frames handed to the provider
    pub received: usize,
    /// Budget ran out while completed frames were still waiting
    pub more_data: bool,
}

// =============================================================================
// Engine
// =============================================================================

/// DMA data-path engine for up to `CH` channels with rings of at most `N`
/// descriptors.
///
/// # Type Parameters
/// * `R` - Register file, usually [`Mmio`](crate::Mmio)
/// * `CH` - Channel capacity
/// * `N` - Ring capacity; configured ring sizes must not exceed it
pub struct OsiDma<R: RegisterIo, const CH: usize, const N: usize> {
    regs: R,
    config: DmaConfig,
    runtime: Option<Runtime>,
    running: bool,
    channels: [DmaChannel<N>; CH],
    num_channels: usize,
    stats: DmaStats,
    pkt_err: PktErrStats,
}

impl<R: RegisterIo, const CH: usize, const N: usize> OsiDma<R, CH, N> {
    /// Create an unconfigured engine over `regs`.
    pub const fn new(regs: R) -> Self {
        Self {
            regs,
            config: DmaConfig::new(),
            runtime: None,
            running: false,
            channels: [const { DmaChannel::new() }; CH],
            num_channels: 0,
            stats: DmaStats::new(),
            pkt_err: PktErrStats::new(),
        }
    }

    // =========================================================================
    // State Accessors
    // =========================================================================

    /// Hardware generation, once configured.
    #[inline]
    pub fn variant(&self) -> Option<HwVariant> {
        self.runtime.map(|rt| rt.ops.variant())
    }

    /// Channels have been programmed and started.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.running
    }

    /// Accepted configuration.
    #[inline]
    pub fn config(&self) -> &DmaConfig {
        &self.config
    }

    /// Effective PTP mode, once configured.
    #[inline]
    pub fn ptp_mode(&self) -> Option<PtpMode> {
        self.runtime.map(|rt| rt.ptp_mode)
    }

    /// Current RX buffer length, once configured.
    #[inline]
    pub fn rx_buf_len(&self) -> Option<u32> {
        self.runtime.map(|rt| rt.rx_buf_len)
    }

    /// Register file.
    #[inline]
    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// Register file, mutably.
    #[inline]
    pub fn regs_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Validate `config` and size the rings.
    ///
    /// No register is touched. A ring size of 0 selects the generation's
    /// default. Staged RX buffers are dropped.
    ///
    /// # Errors
    /// - `UnknownHardware` - the hardware type code is not recognised
    /// - `InvalidChannel` - channel count or an id is out of range, or an id
    ///   is repeated
    /// - `InvalidRingSize` - a ring size is not a power of two within the
    ///   generation's bounds, or exceeds `N`
    /// - `InvalidConfig` - a coalescing count or timeout is zero
    /// - `DmaError::InvalidState` - the engine is running
    pub fn dma_init(&mut self, config: DmaConfig) -> Result<()> {
        if self.running {
            return Err(DmaError::InvalidState.into());
        }

        let variant = HwVariant::from_code(config.hw_type)?;
        let ops = variant.ops();
        validate_channels(&config, ops, CH)?;
        let tx_size = resolve_ring_size(ops, config.tx_ring_size, N)?;
        let rx_size = resolve_ring_size(ops, config.rx_ring_size, N)?;
        validate_coalescing(&config)?;

        for (ch, &id) in self.channels.iter_mut().zip(config.channel_ids()) {
            ch.reinit(id);
            ch.tx.slots.set_size(tx_size)?;
            ch.rx.slots.set_size(rx_size)?;
        }
        self.num_channels = config.num_channels;

        let ptp_mode = if config.ptp_mode.is_empty() {
            PtpMode::DEFAULT
        } else {
            config.ptp_mode
        };
        self.runtime = Some(Runtime {
            ops,
            ptp_mode,
            coalesce: config.coalesce,
            rx_buf_len: rx_buf_len_for(config.mtu, ops.axi_bus_width()),
            rx_reserved_buf: config.rx_reserved_buf,
            use_virtualization: config.use_virtualization,
        });
        self.config = config;
        Ok(())
    }

    /// Program, arm and start every configured channel.
    ///
    /// Per channel: DMA configuration, TX ring, RX ring (arming the slots
    /// that already hold a buffer), TX and RX interrupts, then the run
    /// bits.
    ///
    /// On failure every channel touched so far is stopped and its rings
    /// reset, leaving the engine not running.
    ///
    /// # Errors
    /// - `DmaError::InvalidState` - `dma_init` has not succeeded
    /// - `IoError::RegisterWriteFailed` - an interrupt could not be enabled
    pub fn hw_dma_init(&mut self) -> Result<()> {
        let rt = self.runtime.ok_or(DmaError::InvalidState)?;

        for pos in 0..self.num_channels {
            let ch = &mut self.channels[pos];
            if let Err(err) = bring_up(ch, &mut self.regs, &rt) {
                dma_warn!("dma channel {} failed to start", ch.id);
                for ch in &mut self.channels[..=pos] {
                    ch.stop(&mut self.regs, &rt);
                    ch.reset_rings();
                }
                return Err(err);
            }
            dma_debug!(
                "dma channel {} started: tx ring {} rx ring {}",
                ch.id,
                ch.tx.slots.size(),
                ch.rx.slots.size()
            );
        }

        self.running = true;
        Ok(())
    }

    /// Stop every channel and reset its rings.
    ///
    /// Staged RX buffers stay in their slots and are re-armed by the next
    /// `hw_dma_init`.
    pub fn hw_dma_deinit(&mut self) -> Result<()> {
        let rt = self.runtime.ok_or(DmaError::InvalidState)?;

        for ch in &mut self.channels[..self.num_channels] {
            ch.stop(&mut self.regs, &rt);
            ch.reset_rings();
            dma_debug!("dma channel {} stopped", ch.id);
        }

        self.running = false;
        Ok(())
    }

    // =========================================================================
    // Channel Control
    // =========================================================================

    /// Start TX and RX DMA on one channel.
    pub fn start_dma(&mut self, chan: u32) -> Result<()> {
        let (rt, idx) = self.lookup(chan)?;
        self.channels[idx].start(&mut self.regs, &rt);
        Ok(())
    }

    /// Stop TX and RX DMA on one channel and flush pending RX data.
    pub fn stop_dma(&mut self, chan: u32) -> Result<()> {
        let (rt, idx) = self.lookup(chan)?;
        self.channels[idx].stop(&mut self.regs, &rt);
        Ok(())
    }

    /// Gate one direction's interrupt on a channel.
    ///
    /// # Errors
    /// - `DmaError::InvalidState` - unknown channel
    /// - `IoError::RegisterWriteFailed` - the control register did not take
    ///   the change within the retry budget
    pub fn set_interrupt(&mut self, chan: u32, dir: IntrDirection, enable: bool) -> Result<()> {
        let (rt, idx) = self.lookup(chan)?;
        let ch = &mut self.channels[idx];
        set_channel_interrupt(&mut self.regs, &ch.map(&rt), dir, enable)?;
        match dir {
            IntrDirection::Tx => ch.tx_intr_enabled = enable,
            IntrDirection::Rx => ch.rx_intr_enabled = enable,
        }
        Ok(())
    }

    /// Interrupt of one direction is currently enabled.
    pub fn interrupt_enabled(&self, chan: u32, dir: IntrDirection) -> Result<bool> {
        let (_, idx) = self.lookup(chan)?;
        let ch = &self.channels[idx];
        Ok(match dir {
            IntrDirection::Tx => ch.tx_intr_enabled,
            IntrDirection::Rx => ch.rx_intr_enabled,
        })
    }

    /// Recompute the RX buffer length from an MTU.
    ///
    /// The MTU is capped at [`MAX_MTU`]. The new length applies to buffers
    /// reported from now on; the buffer size field programmed at
    /// `hw_dma_init` is not rewritten.
    pub fn set_rx_buf_len(&mut self, mtu: u32) -> Result<u32> {
        let rt = self.runtime.as_mut().ok_or(DmaError::InvalidState)?;
        rt.rx_buf_len = rx_buf_len_for(mtu, rt.ops.axi_bus_width());
        self.config.mtu = mtu;
        Ok(rt.rx_buf_len)
    }

    /// Enable or disable TX slot-number checking on a channel.
    ///
    /// # Errors
    /// - `ConfigError::InvalidConfig` - the interval exceeds
    ///   [`SLOT_INTVL_MAX`] or the generation has no slot function
    pub fn config_slot(&mut self, chan: u32, enable: bool, interval_us: u32) -> Result<()> {
        let (rt, idx) = self.lookup(chan)?;
        if interval_us > SLOT_INTVL_MAX {
            return Err(ConfigError::InvalidConfig.into());
        }
        if !self.channels[idx].config_slot(&mut self.regs, &rt, enable, interval_us) {
            return Err(ConfigError::InvalidConfig.into());
        }
        Ok(())
    }

    // =========================================================================
    // Transmit
    // =========================================================================

    /// A packet with `flags` is preceded by a context descriptor.
    pub fn needs_context_desc(&self, flags: TxPktFlags) -> Result<bool> {
        let rt = self.runtime.ok_or(DmaError::InvalidState)?;
        Ok(needs_context(rt.ops, rt.ptp_mode, flags))
    }

    /// Stage a packet's fragments at the producer index.
    ///
    /// Each fragment is a `(bus address, length)` pair. A slot is reserved
    /// for the context descriptor when the packet needs one. `desc_cnt` of
    /// `pkt` is taken from `frags`.
    ///
    /// # Errors
    /// - `DmaError::InvalidPacketParams` - no fragments
    /// - `DmaError::NoDescriptorsAvailable` - not enough free slots
    pub fn stage_tx_packet(
        &mut self,
        chan: u32,
        pkt: TxPacketContext,
        frags: &[(u64, u32)],
    ) -> Result<()> {
        let (rt, idx) = self.lookup(chan)?;
        if frags.is_empty() {
            return Err(DmaError::InvalidPacketParams.into());
        }
        let ring = &mut self.channels[idx].tx;
        let ctx = usize::from(needs_context(rt.ops, rt.ptp_mode, pkt.flags));
        if frags.len() + ctx > ring.free_slots() {
            return Err(DmaError::NoDescriptorsAvailable.into());
        }

        if ctx == 1 {
            ring.stage(0, TxSwContext::context_slot())?;
        }
        for (i, &(addr, len)) in frags.iter().enumerate() {
            ring.stage(ctx + i, TxSwContext::fragment(addr, len))?;
        }
        ring.set_packet(TxPacketContext {
            desc_cnt: frags.len() as u32,
            ..pkt
        });
        Ok(())
    }

    /// Post the staged packet to the hardware.
    ///
    /// # Errors
    /// - `DmaError::InvalidPacketParams` - descriptor count or a length
    ///   field out of range; the ring is left untouched
    /// - `DmaError::NoDescriptorsAvailable` - ring full
    /// - `DmaError::InvalidState` - unknown channel or unconfigured ring
    pub fn hw_transmit(&mut self, chan: u32) -> Result<()> {
        let (rt, idx) = self.lookup(chan)?;
        self.channels[idx].transmit(&mut self.regs, &rt, &mut self.stats)?;
        Ok(())
    }

    /// Reclaim up to `budget` transmitted packets.
    ///
    /// Returns the number of packets, not descriptors, completed.
    pub fn process_tx_completions<P: BufferProvider + ?Sized>(
        &mut self,
        chan: u32,
        budget: usize,
        provider: &mut P,
    ) -> Result<usize> {
        let (rt, idx) = self.lookup(chan)?;
        let done = self.channels[idx].complete_tx(
            &rt,
            budget,
            provider,
            &mut self.stats,
            &mut self.pkt_err,
        )?;
        Ok(done)
    }

    /// No transmitted packet is awaiting completion.
    pub fn tx_ring_empty(&self, chan: u32) -> Result<bool> {
        let (_, idx) = self.lookup(chan)?;
        Ok(self.channels[idx].tx.is_empty())
    }

    // =========================================================================
    // Receive
    // =========================================================================

    /// Deliver up to `budget` received frames.
    ///
    /// `delay` paces the bounded wait for a receive timestamp.
    pub fn process_rx_completions<P, D>(
        &mut self,
        chan: u32,
        budget: usize,
        provider: &mut P,
        delay: &mut D,
    ) -> Result<RxPollResult>
    where
        P: BufferProvider + ?Sized,
        D: DelayNs,
    {
        let (rt, idx) = self.lookup(chan)?;
        let result = self.channels[idx].complete_rx(
            &rt,
            budget,
            provider,
            delay,
            &mut self.stats,
            &mut self.pkt_err,
        )?;
        Ok(result)
    }

    /// Re-arm consumed RX slots that hold a buffer again.
    pub fn rx_refill(&mut self, chan: u32) -> Result<usize> {
        let (rt, idx) = self.lookup(chan)?;
        let armed = self.channels[idx].refill_rx(&mut self.regs, &rt)?;
        Ok(armed)
    }

    /// Number of consumed RX slots awaiting refill.
    pub fn rx_refill_count(&self, chan: u32) -> Result<usize> {
        let (_, idx) = self.lookup(chan)?;
        Ok(self.channels[idx].rx.refill_count())
    }

    // =========================================================================
    // Rings
    // =========================================================================

    /// TX ring of a channel.
    pub fn tx_ring(&self, chan: u32) -> DmaResult<&TxRing<N>> {
        let idx = self.channel_index(chan)?;
        Ok(&self.channels[idx].tx)
    }

    /// TX ring of a channel, for staging buffers.
    pub fn tx_ring_mut(&mut self, chan: u32) -> DmaResult<&mut TxRing<N>> {
        let idx = self.channel_index(chan)?;
        Ok(&mut self.channels[idx].tx)
    }

    /// RX ring of a channel.
    pub fn rx_ring(&self, chan: u32) -> DmaResult<&RxRing<N>> {
        let idx = self.channel_index(chan)?;
        Ok(&self.channels[idx].rx)
    }

    /// RX ring of a channel, for staging buffers.
    pub fn rx_ring_mut(&mut self, chan: u32) -> DmaResult<&mut RxRing<N>> {
        let idx = self.channel_index(chan)?;
        Ok(&mut self.channels[idx].rx)
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Packet counters.
    #[inline]
    pub fn dma_stats(&self) -> &DmaStats {
        &self.stats
    }

    /// Per-error-bit packet error counters.
    #[inline]
    pub fn pkt_err_stats(&self) -> &PktErrStats {
        &self.pkt_err
    }

    /// Reset the TX error counters.
    pub fn clear_tx_err_stats(&mut self) {
        self.pkt_err.clear_tx();
    }

    /// Reset the RX error counters.
    pub fn clear_rx_err_stats(&mut self) {
        self.pkt_err.clear_rx();
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn channel_index(&self, chan: u32) -> DmaResult<usize> {
        self.channels[..self.num_channels]
            .iter()
            .position(|ch| ch.id == chan)
            .ok_or(DmaError::InvalidState)
    }

    fn lookup(&self, chan: u32) -> DmaResult<(Runtime, usize)> {
        let rt = self.runtime.ok_or(DmaError::InvalidState)?;
        Ok((rt, self.channel_index(chan)?))
    }

    /// Memory taken by the engine, descriptors included.
    pub const fn memory_usage() -> usize {
        core::mem::size_of::<Self>()
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_channels(config: &DmaConfig, ops: &dyn VariantOps, capacity: usize) -> Result<()> {
    let max = ops.max_channels();
    let n = config.num_channels;
    if n == 0 || n > capacity || n > MAX_DMA_CHANNELS || n > max as usize {
        return Err(ConfigError::InvalidChannel.into());
    }

    let ids = config.channel_ids();
    for (i, &id) in ids.iter().enumerate() {
        if id >= max || ids[..i].contains(&id) {
            return Err(ConfigError::InvalidChannel.into());
        }
    }
    Ok(())
}

fn resolve_ring_size(ops: &dyn VariantOps, requested: usize, capacity: usize) -> Result<usize> {
    let bounds = ops.ring_bounds();
    let size = if requested == 0 { bounds.default } else { requested };
    if !bounds.accepts(size) || size > capacity {
        return Err(ConfigError::InvalidRingSize.into());
    }
    Ok(size)
}

fn validate_coalescing(config: &DmaConfig) -> Result<()> {
    let c = &config.coalesce;
    let bad = (c.use_riwt && c.rx_riwt == 0)
        || (c.use_rx_frames && c.rx_frames == 0)
        || (c.use_tx_frames && c.tx_frames == 0);
    if bad {
        return Err(ConfigError::InvalidConfig.into());
    }
    Ok(())
}

/// RX buffer length for `mtu`: frame plus VLAN tag and IP alignment pad,
/// rounded up to the bus width.
fn rx_buf_len_for(mtu: u32, bus_width: u32) -> u32 {
    let len = mtu.min(MAX_MTU) + ETH_HLEN + VLAN_HLEN + NET_IP_ALIGN;
    len.div_ceil(bus_width) * bus_width
}

/// Program one channel's DMA, rings and interrupts, then start it.
fn bring_up<R: RegisterIo, const N: usize>(
    ch: &mut DmaChannel<N>,
    regs: &mut R,
    rt: &Runtime,
) -> Result<()> {
    ch.configure(regs, rt);
    ch.init_tx_ring(regs, rt)?;
    ch.init_rx_ring(regs, rt)?;

    let map = ch.map(rt);
    set_channel_interrupt(regs, &map, IntrDirection::Tx, true)?;
    ch.tx_intr_enabled = true;
    set_channel_interrupt(regs, &map, IntrDirection::Rx, true)?;
    ch.rx_intr_enabled = true;

    ch.start(regs, rt);
    Ok(())
}

impl<R: RegisterIo + Default, const CH: usize, const N: usize> Default for OsiDma<R, CH, N> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

// =============================================================================
// Type Aliases
// =============================================================================

/// Single channel with rings of up to 256 descriptors
pub type OsiDmaSmall<R> = OsiDma<R, 1, 256>;

/// Class-A sized engine: one channel with the default 1024-entry rings
pub type OsiDmaDefault<R> = OsiDma<R, 1, 1024>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::config::{HW_TYPE_CLASS_A, HW_TYPE_CLASS_B};
    use crate::driver::error::{Error, ErrorKind, IoError};
    use crate::internal::dma::context::{RxSwcxFlags, TxDoneFlags};
    use crate::internal::dma::descriptor::bits::tdes3;
    use crate::internal::register::{class_a, class_b, intr_ena, rx_ctrl, tx_ctrl, virt_intr};
    use crate::testing::{
        MockBufferProvider, MockDelay, MockRegisters, rx_complete_frame, tx_release,
    };

    type Dma = OsiDma<MockRegisters, 2, 16>;

    fn config(hw: u32) -> DmaConfig {
        DmaConfig::new()
            .with_hw_type(hw)
            .with_channels(&[0, 3])
            .with_tx_ring_size(16)
            .with_rx_ring_size(16)
    }

    fn stocked(hw: u32) -> Dma {
        let mut dma = Dma::new(MockRegisters::new());
        dma.dma_init(config(hw)).unwrap();
        for chan in [0, 3] {
            let ring = dma.rx_ring_mut(chan).unwrap();
            for idx in 0..16 {
                ring.set_buffer(idx, 0x8000_0000 + idx as u64 * 0x800, 2048).unwrap();
            }
        }
        dma
    }

    fn running(hw: u32) -> Dma {
        let mut dma = stocked(hw);
        dma.hw_dma_init().unwrap();
        dma
    }

    // =========================================================================
    // Configuration Tests
    // =========================================================================

    #[test]
    fn power_of_two_ring_sizes_within_bounds_are_accepted() {
        let mut dma: OsiDma<MockRegisters, 1, 1024> = OsiDma::new(MockRegisters::new());
        for hw in [HW_TYPE_CLASS_A, HW_TYPE_CLASS_B] {
            for shift in 0..=11u32 {
                let pow = 1usize << shift;
                for size in [pow - 1, pow, pow + 1] {
                    if size == 0 {
                        continue;
                    }
                    let result = dma.dma_init(
                        DmaConfig::new()
                            .with_hw_type(hw)
                            .with_tx_ring_size(size)
                            .with_rx_ring_size(size),
                    );
                    if size.is_power_of_two() && (4..=1024).contains(&size) {
                        assert_eq!(result, Ok(()), "size {size} rejected");
                    } else {
                        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidConfig);
                    }
                }
            }
        }
    }

    #[test]
    fn ring_size_above_capacity_is_rejected() {
        let mut dma = Dma::new(MockRegisters::new());
        let result = dma.dma_init(config(HW_TYPE_CLASS_A).with_rx_ring_size(32));
        assert_eq!(result, Err(Error::Config(ConfigError::InvalidRingSize)));
    }

    #[test]
    fn class_a_rejects_ring_above_1024() {
        let mut dma: OsiDma<MockRegisters, 1, 2048> = OsiDma::new(MockRegisters::new());
        let result = dma.dma_init(DmaConfig::new().with_tx_ring_size(2048));
        assert_eq!(result, Err(Error::Config(ConfigError::InvalidRingSize)));
    }

    #[test]
    fn zero_ring_size_selects_default() {
        let mut dma: OsiDma<MockRegisters, 1, 1024> = OsiDma::new(MockRegisters::new());
        dma.dma_init(DmaConfig::new()).unwrap();
        assert_eq!(dma.tx_ring(0).unwrap().slots().size(), 1024);

        let mut small = Dma::new(MockRegisters::new());
        let result = small.dma_init(DmaConfig::new());
        assert_eq!(result, Err(Error::Config(ConfigError::InvalidRingSize)));
    }

    #[test]
    fn unknown_hardware_is_rejected() {
        let mut dma = Dma::new(MockRegisters::new());
        let result = dma.dma_init(config(7));
        assert_eq!(result, Err(Error::Config(ConfigError::UnknownHardware)));
        assert_eq!(dma.variant(), None);
    }

    #[test]
    fn channel_validation() {
        let mut dma = Dma::new(MockRegisters::new());
        let invalid = Err(Error::Config(ConfigError::InvalidChannel));

        assert_eq!(dma.dma_init(config(HW_TYPE_CLASS_A).with_channels(&[])), invalid);
        assert_eq!(dma.dma_init(config(HW_TYPE_CLASS_A).with_channels(&[0, 1, 2])), invalid);
        assert_eq!(dma.dma_init(config(HW_TYPE_CLASS_A).with_channels(&[8])), invalid);
        assert_eq!(dma.dma_init(config(HW_TYPE_CLASS_A).with_channels(&[2, 2])), invalid);
        assert_eq!(dma.dma_init(config(HW_TYPE_CLASS_B).with_channels(&[9])), Ok(()));
    }

    #[test]
    fn zero_coalescing_counts_are_rejected() {
        let mut dma = Dma::new(MockRegisters::new());
        let invalid = Err(Error::Config(ConfigError::InvalidConfig));

        assert_eq!(dma.dma_init(config(HW_TYPE_CLASS_A).with_rx_watchdog(0)), invalid);
        assert_eq!(dma.dma_init(config(HW_TYPE_CLASS_A).with_rx_frames(0)), invalid);
        assert_eq!(dma.dma_init(config(HW_TYPE_CLASS_A).with_tx_frames(0)), invalid);
        assert_eq!(
            dma.dma_init(config(HW_TYPE_CLASS_A).with_rx_watchdog(100).with_rx_frames(4)),
            Ok(())
        );
    }

    #[test]
    fn dma_init_touches_no_register() {
        let mut dma = Dma::new(MockRegisters::new());
        dma.dma_init(config(HW_TYPE_CLASS_B)).unwrap();
        assert!(dma.regs().writes().is_empty());
        assert_eq!(dma.variant(), Some(HwVariant::ClassB));
        assert!(!dma.is_initialized());
    }

    #[test]
    fn unset_ptp_mode_defaults_to_slave_two_step() {
        let dma = stocked(HW_TYPE_CLASS_A);
        assert_eq!(dma.ptp_mode(), Some(PtpMode::SLAVE | PtpMode::TWOSTEP));

        let mut dma = Dma::new(MockRegisters::new());
        dma.dma_init(config(HW_TYPE_CLASS_A).with_ptp_mode(PtpMode::MASTER | PtpMode::ONESTEP))
            .unwrap();
        assert_eq!(dma.ptp_mode(), Some(PtpMode::MASTER | PtpMode::ONESTEP));
    }

    #[test]
    fn rx_buf_len_is_aligned_to_bus_width() {
        let mut dma = stocked(HW_TYPE_CLASS_A);
        assert_eq!(dma.rx_buf_len(), Some(1520));
        assert_eq!(dma.set_rx_buf_len(1501), Ok(1528));
        assert_eq!(dma.set_rx_buf_len(20_000), Ok(9024));

        let mut b = stocked(HW_TYPE_CLASS_B);
        assert_eq!(b.set_rx_buf_len(1501), Ok(1536));
    }

    #[test]
    fn operations_before_init_are_invalid_state() {
        let mut dma = Dma::new(MockRegisters::new());
        let invalid = Err(Error::Dma(DmaError::InvalidState));
        assert_eq!(dma.hw_dma_init(), invalid);
        assert_eq!(dma.hw_transmit(0), invalid);
        assert_eq!(dma.rx_refill(0), Err(Error::Dma(DmaError::InvalidState)));
        assert_eq!(dma.set_rx_buf_len(1500), Err(Error::Dma(DmaError::InvalidState)));
    }

    // =========================================================================
    // Hardware Init Tests
    // =========================================================================

    #[test]
    fn hw_init_programs_and_starts_every_channel() {
        let dma = running(HW_TYPE_CLASS_A);
        assert!(dma.is_initialized());

        for chan in [0, 3] {
            let map = class_a::channel_map(chan);
            let regs = dma.regs();
            assert_ne!(regs.get(map.tx_ctrl) & tx_ctrl::ST, 0);
            assert_ne!(regs.get(map.rx_ctrl) & rx_ctrl::SR, 0);
            assert_ne!(regs.get(map.intr_ena) & intr_ena::TIE, 0);
            assert_eq!(regs.get(map.virt_ctrl), virt_intr::TX | virt_intr::RX);
            assert_eq!(regs.get(map.tx_ring_len), 15);
            assert!(dma.interrupt_enabled(chan, IntrDirection::Rx).unwrap());

            // Interrupts are enabled before DMA starts
            let last_virt = regs.writes().iter().rposition(|(o, _)| *o == map.virt_ctrl);
            let start = regs.writes().iter().rposition(|(o, _)| *o == map.tx_ctrl);
            assert!(last_virt < start);

            let ring = dma.rx_ring(chan).unwrap();
            assert!((0..16).all(|i| ring.slots().desc(i).is_owned()));
        }
    }

    #[test]
    fn hw_init_fails_when_interrupt_does_not_stick() {
        let mut dma = stocked(HW_TYPE_CLASS_B);
        let map = class_b::channel_map(0);
        dma.regs().stick_bits(map.virt_ctrl, virt_intr::RX, 0);

        assert_eq!(dma.hw_dma_init(), Err(Error::Io(IoError::RegisterWriteFailed)));
        assert!(!dma.is_initialized());
    }

    #[test]
    fn failed_hw_init_stops_channels_already_started() {
        let mut dma = stocked(HW_TYPE_CLASS_A);
        dma.regs().stick_bits(class_a::channel_map(3).virt_ctrl, virt_intr::RX, 0);

        assert_eq!(dma.hw_dma_init(), Err(Error::Io(IoError::RegisterWriteFailed)));
        assert!(!dma.is_initialized());
        for chan in [0, 3] {
            let map = class_a::channel_map(chan);
            assert_eq!(dma.regs().get(map.tx_ctrl) & tx_ctrl::ST, 0);
            assert_eq!(dma.regs().get(map.rx_ctrl) & rx_ctrl::SR, 0);
            assert!(!dma.interrupt_enabled(chan, IntrDirection::Tx).unwrap());
            assert!(!dma.rx_ring(chan).unwrap().slots().desc(0).is_owned());
        }
        assert!(dma.dma_init(config(HW_TYPE_CLASS_A)).is_ok());
    }

    #[test]
    fn repeated_dma_init_drops_staged_buffers() {
        let mut dma = stocked(HW_TYPE_CLASS_A);
        dma.dma_init(config(HW_TYPE_CLASS_A).with_channels(&[3])).unwrap();

        let ring = dma.rx_ring(3).unwrap();
        assert_eq!(ring.slots().size(), 16);
        assert!(!ring.slots().swcx(0).flags.contains(RxSwcxFlags::BUF_VALID));
        assert!(dma.rx_ring(0).is_err());
    }

    #[test]
    fn deinit_stops_channels_and_resets_rings() {
        let mut dma = running(HW_TYPE_CLASS_A);
        dma.stage_tx_packet(0, TxPacketContext::new(1), &[(0x9000_0000, 64)]).unwrap();
        dma.hw_transmit(0).unwrap();

        dma.hw_dma_deinit().unwrap();
        assert!(!dma.is_initialized());
        let map = class_a::channel_map(0);
        assert_eq!(dma.regs().get(map.tx_ctrl) & tx_ctrl::ST, 0);
        assert_ne!(dma.regs().get(map.rx_ctrl) & rx_ctrl::RPF, 0);
        assert!(dma.tx_ring_empty(0).unwrap());
        assert_eq!(dma.tx_ring(0).unwrap().cur(), 0);
        assert!(!dma.interrupt_enabled(0, IntrDirection::Tx).unwrap());

        // Buffers survive, so the rings re-arm
        dma.hw_dma_init().unwrap();
        assert!(dma.rx_ring(0).unwrap().slots().desc(0).is_owned());
    }

    #[test]
    fn dma_init_refused_while_running() {
        let mut dma = running(HW_TYPE_CLASS_A);
        assert_eq!(
            dma.dma_init(config(HW_TYPE_CLASS_A)),
            Err(Error::Dma(DmaError::InvalidState))
        );
    }

    // =========================================================================
    // Channel Control Tests
    // =========================================================================

    #[test]
    fn unknown_channel_is_invalid_state() {
        let mut dma = running(HW_TYPE_CLASS_A);
        let invalid = Err(Error::Dma(DmaError::InvalidState));
        assert_eq!(dma.start_dma(1), invalid);
        assert_eq!(dma.set_interrupt(5, IntrDirection::Tx, true), invalid);
        assert_eq!(dma.tx_ring_empty(1), Err(Error::Dma(DmaError::InvalidState)));
        assert!(dma.rx_ring(1).is_err());
    }

    #[test]
    fn set_interrupt_updates_flag() {
        let mut dma = running(HW_TYPE_CLASS_A);
        dma.set_interrupt(3, IntrDirection::Tx, false).unwrap();
        assert!(!dma.interrupt_enabled(3, IntrDirection::Tx).unwrap());
        assert!(dma.interrupt_enabled(3, IntrDirection::Rx).unwrap());
        assert_eq!(dma.regs().get(class_a::channel_map(3).virt_ctrl), virt_intr::RX);
    }

    #[test]
    fn stop_and_start_single_channel() {
        let mut dma = running(HW_TYPE_CLASS_A);
        dma.stop_dma(3).unwrap();
        let map = class_a::channel_map(3);
        assert_eq!(dma.regs().get(map.rx_ctrl) & rx_ctrl::SR, 0);
        assert_ne!(dma.regs().get(class_a::channel_map(0).rx_ctrl) & rx_ctrl::SR, 0);

        dma.start_dma(3).unwrap();
        assert_ne!(dma.regs().get(map.rx_ctrl) & rx_ctrl::SR, 0);
        assert_eq!(dma.regs().get(map.rx_ctrl) & rx_ctrl::RPF, 0);
    }

    #[test]
    fn slot_function_only_on_class_a() {
        let mut a = running(HW_TYPE_CLASS_A);
        assert_eq!(a.config_slot(3, true, 125), Ok(()));
        assert_eq!(
            a.config_slot(3, true, SLOT_INTVL_MAX + 1),
            Err(Error::Config(ConfigError::InvalidConfig))
        );

        let mut b = running(HW_TYPE_CLASS_B);
        assert_eq!(b.config_slot(3, true, 125), Err(Error::Config(ConfigError::InvalidConfig)));
    }

    // =========================================================================
    // Data Path Tests
    // =========================================================================

    #[test]
    fn checksum_offload_round_trip_on_1024_ring() {
        let mut dma: OsiDmaDefault<MockRegisters> = OsiDma::new(MockRegisters::new());
        dma.dma_init(DmaConfig::new().with_tx_ring_size(1024).with_rx_ring_size(1024)).unwrap();
        dma.hw_dma_init().unwrap();

        let pkt = TxPacketContext::new(1).with_flags(TxPktFlags::CSUM);
        dma.stage_tx_packet(0, pkt, &[(0x9000_0000, 1514)]).unwrap();
        dma.hw_transmit(0).unwrap();

        let desc = dma.tx_ring(0).unwrap().slots().desc(0);
        let status = desc.tdes3();
        assert_eq!(status & tdes3::HW_CIC_ALL, tdes3::HW_CIC_ALL);
        assert_ne!(status & tdes3::OWN, 0);
        assert_ne!(status & tdes3::FD, 0);
        assert_ne!(status & tdes3::LD, 0);
        assert_eq!(dma.tx_ring(0).unwrap().cur(), 1);

        tx_release(desc);
        let mut provider = MockBufferProvider::new();
        assert_eq!(dma.process_tx_completions(0, 64, &mut provider), Ok(1));
        let (swcx, done) = provider.completed[0];
        assert!(done.is_success());
        assert_eq!(done.flags & TxDoneFlags::ERROR, TxDoneFlags::empty());
        assert_eq!(swcx.buf_phy_addr, 0x9000_0000);
        assert!(dma.tx_ring_empty(0).unwrap());
        assert_eq!(dma.dma_stats().tx_pkt_n, 1);
    }

    #[test]
    fn staging_reserves_context_slot() {
        let mut dma = running(HW_TYPE_CLASS_A);
        assert!(dma.needs_context_desc(TxPktFlags::VLAN).unwrap());
        assert!(!dma.needs_context_desc(TxPktFlags::CSUM).unwrap());

        let pkt = TxPacketContext::new(0).with_vlan(5);
        dma.stage_tx_packet(0, pkt, &[(0x9000_0000, 100), (0x9000_1000, 200)]).unwrap();
        let ring = dma.tx_ring(0).unwrap();
        assert_eq!(ring.packet().desc_cnt, 2);
        assert_eq!(ring.slots().swcx(0).len, crate::constants::INVALID_VALUE);
        assert_eq!(ring.slots().swcx(2).len, 200);

        dma.hw_transmit(0).unwrap();
        assert_eq!(dma.tx_ring(0).unwrap().cur(), 3);
        assert_eq!(dma.dma_stats().tx_vlan_pkt_n, 1);
    }

    #[test]
    fn staging_rejects_empty_and_oversized_packets() {
        let mut dma = running(HW_TYPE_CLASS_A);
        assert_eq!(
            dma.stage_tx_packet(0, TxPacketContext::new(1), &[]),
            Err(Error::Dma(DmaError::InvalidPacketParams))
        );
        let frags = [(0x9000_0000u64, 64u32); 16];
        assert_eq!(
            dma.stage_tx_packet(0, TxPacketContext::new(16), &frags),
            Err(Error::Dma(DmaError::NoDescriptorsAvailable))
        );
    }

    #[test]
    fn rx_round_trip_through_facade() {
        let mut dma = running(HW_TYPE_CLASS_A);
        {
            let ring = dma.rx_ring(3).unwrap();
            rx_complete_frame(ring.slots().desc(0), 128);
            rx_complete_frame(ring.slots().desc(1), 256);
        }

        let mut provider = MockBufferProvider::new();
        let mut delay = MockDelay::new();
        let poll = dma.process_rx_completions(3, 64, &mut provider, &mut delay).unwrap();
        assert_eq!(poll, RxPollResult { received: 2, more_data: false });
        assert_eq!(provider.received[0].chan, 3);
        assert_eq!(provider.received[1].pkt.pkt_len, 256);
        assert_eq!(dma.rx_refill_count(3), Ok(2));
        assert_eq!(dma.dma_stats().q_rx_pkt_n[3], 2);

        let ring = dma.rx_ring_mut(3).unwrap();
        assert!(ring.slots().swcx(0).flags.contains(RxSwcxFlags::PROCESSED));
        ring.restock(|idx| Some((0xA000_0000 + idx as u64 * 0x800, 2048)));
        assert_eq!(dma.rx_refill(3), Ok(2));
        assert_eq!(dma.rx_refill_count(3), Ok(0));
    }

    #[test]
    fn error_statistics_can_be_cleared() {
        let mut dma = running(HW_TYPE_CLASS_A);
        dma.stage_tx_packet(0, TxPacketContext::new(1), &[(0x9000_0000, 64)]).unwrap();
        dma.hw_transmit(0).unwrap();
        crate::testing::tx_writeback(
            dma.tx_ring(0).unwrap().slots().desc(0),
            0,
            0,
            tdes3::ES | tdes3::JABBER_TIMEO_ERR,
        );

        let mut provider = MockBufferProvider::new();
        dma.process_tx_completions(0, 8, &mut provider).unwrap();
        assert_eq!(dma.pkt_err_stats().jabber_timeout_error, 1);

        dma.clear_tx_err_stats();
        assert_eq!(dma.pkt_err_stats().jabber_timeout_error, 0);
        assert_eq!(dma.pkt_err_stats().clear_tx_err, 1);
    }

    #[test]
    fn memory_usage_covers_descriptors() {
        let descriptors = 2 * 2 * 16 * 16;
        assert!(Dma::memory_usage() >= descriptors);
    }
}
