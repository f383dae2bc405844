//! Class-B (MGBE) per-channel DMA register offsets.

use super::{ChannelRegMap, chan_reg};

/// Stride between channel register blocks
pub const CHAN_STRIDE: usize = 0x80;
/// Stride between virtual interrupt register pairs
pub const VIRT_STRIDE: usize = 0x8;

/// DMA_CH0_CTRL
pub const CTRL: usize = 0x3100;
/// DMA_CH0_TX_CTRL
pub const TX_CTRL: usize = 0x3104;
/// DMA_CH0_RX_CTRL
pub const RX_CTRL: usize = 0x3108;
/// DMA_CH0_TDLH
pub const TDLH: usize = 0x3110;
/// DMA_CH0_TDLA
pub const TDLA: usize = 0x3114;
/// DMA_CH0_RDLH
pub const RDLH: usize = 0x3118;
/// DMA_CH0_RDLA
pub const RDLA: usize = 0x311C;
/// DMA_CH0_TDTLP
pub const TDTLP: usize = 0x3124;
/// DMA_CH0_RDTHP
pub const RDTHP: usize = 0x3128;
/// DMA_CH0_RDTLP
pub const RDTLP: usize = 0x312C;
/// DMA_CH0_TX_CNTRL2 (ring length)
pub const TX_CNTRL2: usize = 0x3130;
/// DMA_CH0_RX_CNTRL2 (ring length)
pub const RX_CNTRL2: usize = 0x3134;
/// DMA_CH0_INTR_ENA
pub const INTR_ENA: usize = 0x3138;
/// DMA_CH0_RX_WDT
pub const RX_WDT: usize = 0x313C;
/// DMA_CH0_STATUS
pub const STATUS: usize = 0x3160;
/// VIRT_INTR_CH0_STATUS
pub const VIRT_STATUS: usize = 0x8700;
/// VIRT_INTR_CH0_CNTRL
pub const VIRT_CNTRL: usize = 0x8704;

/// Register map of channel `chan`.
#[must_use]
pub const fn channel_map(chan: u32) -> ChannelRegMap {
    ChannelRegMap {
        ctrl: chan_reg(CTRL, CHAN_STRIDE, chan),
        tx_ctrl: chan_reg(TX_CTRL, CHAN_STRIDE, chan),
        rx_ctrl: chan_reg(RX_CTRL, CHAN_STRIDE, chan),
        tx_list_hi: chan_reg(TDLH, CHAN_STRIDE, chan),
        tx_list_lo: chan_reg(TDLA, CHAN_STRIDE, chan),
        rx_list_hi: chan_reg(RDLH, CHAN_STRIDE, chan),
        rx_list_lo: chan_reg(RDLA, CHAN_STRIDE, chan),
        tx_tail: chan_reg(TDTLP, CHAN_STRIDE, chan),
        rx_tail_hi: Some(chan_reg(RDTHP, CHAN_STRIDE, chan)),
        rx_tail_lo: chan_reg(RDTLP, CHAN_STRIDE, chan),
        tx_ring_len: chan_reg(TX_CNTRL2, CHAN_STRIDE, chan),
        rx_ring_len: chan_reg(RX_CNTRL2, CHAN_STRIDE, chan),
        intr_ena: chan_reg(INTR_ENA, CHAN_STRIDE, chan),
        rx_wdt: chan_reg(RX_WDT, CHAN_STRIDE, chan),
        slot_ctrl: None,
        status: chan_reg(STATUS, CHAN_STRIDE, chan),
        virt_ctrl: chan_reg(VIRT_CNTRL, VIRT_STRIDE, chan),
        virt_status: chan_reg(VIRT_STATUS, VIRT_STRIDE, chan),
    }
}
