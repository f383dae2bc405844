//! Packet and error counters.
//!
//! All counters saturate instead of wrapping.

use crate::constants::MAX_DMA_CHANNELS;
use crate::internal::dma::descriptor::bits::tdes3;

/// Per-packet error counters decoded from descriptor status words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PktErrStats {
    /// IP header error
    pub ip_header_error: u64,
    /// Jabber timeout
    pub jabber_timeout_error: u64,
    /// Packet flushed
    pub pkt_flush_error: u64,
    /// Payload checksum error
    pub payload_cs_error: u64,
    /// Loss of carrier
    pub loss_of_carrier_error: u64,
    /// No carrier
    pub no_carrier_error: u64,
    /// Late collision
    pub late_collision_error: u64,
    /// Excessive collision
    pub excessive_collision_error: u64,
    /// Excessive deferral
    pub excessive_deferal_error: u64,
    /// Underflow
    pub underflow_error: u64,
    /// Times the TX error counters were cleared
    pub clear_tx_err: u64,
    /// RX CRC error
    pub rx_crc_error: u64,
    /// RX frame error (giant, watchdog, receive or dribble)
    pub rx_frame_error: u64,
    /// RX overflow
    pub rx_overrun_error: u64,
    /// Times the RX error counters were cleared
    pub clear_rx_err: u64,
}

impl PktErrStats {
    /// All counters zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ip_header_error: 0,
            jabber_timeout_error: 0,
            pkt_flush_error: 0,
            payload_cs_error: 0,
            loss_of_carrier_error: 0,
            no_carrier_error: 0,
            late_collision_error: 0,
            excessive_collision_error: 0,
            excessive_deferal_error: 0,
            underflow_error: 0,
            clear_tx_err: 0,
            rx_crc_error: 0,
            rx_frame_error: 0,
            rx_overrun_error: 0,
            clear_rx_err: 0,
        }
    }

    /// Count every error bit set in a completed TX descriptor's TDES3.
    pub fn record_tx_status(&mut self, status: u32) {
        let counters: [(u32, &mut u64); 10] = [
            (tdes3::IP_HEADER_ERR, &mut self.ip_header_error),
            (tdes3::JABBER_TIMEO_ERR, &mut self.jabber_timeout_error),
            (tdes3::PKT_FLUSH_ERR, &mut self.pkt_flush_error),
            (tdes3::PL_CSUM_ERR, &mut self.payload_cs_error),
            (tdes3::LOSS_CARRIER_ERR, &mut self.loss_of_carrier_error),
            (tdes3::NO_CARRIER_ERR, &mut self.no_carrier_error),
            (tdes3::LATE_COL_ERR, &mut self.late_collision_error),
            (tdes3::EXCESSIVE_COL_ERR, &mut self.excessive_collision_error),
            (tdes3::EXCESSIVE_DEF_ERR, &mut self.excessive_deferal_error),
            (tdes3::UNDERFLOW_ERR, &mut self.underflow_error),
        ];
        for (bit, counter) in counters {
            if status & bit != 0 {
                *counter = counter.saturating_add(1);
            }
        }
    }

    /// Zero the TX error counters.
    pub fn clear_tx(&mut self) {
        *self = Self {
            clear_tx_err: self.clear_tx_err.saturating_add(1),
            rx_crc_error: self.rx_crc_error,
            rx_frame_error: self.rx_frame_error,
            rx_overrun_error: self.rx_overrun_error,
            clear_rx_err: self.clear_rx_err,
            ..Self::default()
        };
    }

    /// Zero the RX error counters.
    pub fn clear_rx(&mut self) {
        self.rx_crc_error = 0;
        self.rx_frame_error = 0;
        self.rx_overrun_error = 0;
        self.clear_rx_err = self.clear_rx_err.saturating_add(1);
    }
}

/// Packet counters, total and per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaStats {
    /// Packets completed on TX
    pub tx_pkt_n: u64,
    /// Packets delivered on RX
    pub rx_pkt_n: u64,
    /// TX completion passes
    pub tx_clean_n: u64,
    /// Packets posted with VLAN insertion
    pub tx_vlan_pkt_n: u64,
    /// Packets posted with TSO
    pub tx_tso_pkt_n: u64,
    /// Received packets carrying a VLAN tag
    pub rx_vlan_pkt_n: u64,
    /// Per-channel TX packets
    pub q_tx_pkt_n: [u64; MAX_DMA_CHANNELS],
    /// Per-channel RX packets
    pub q_rx_pkt_n: [u64; MAX_DMA_CHANNELS],
}

impl DmaStats {
    /// All counters zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tx_pkt_n: 0,
            rx_pkt_n: 0,
            tx_clean_n: 0,
            tx_vlan_pkt_n: 0,
            tx_tso_pkt_n: 0,
            rx_vlan_pkt_n: 0,
            q_tx_pkt_n: [0; MAX_DMA_CHANNELS],
            q_rx_pkt_n: [0; MAX_DMA_CHANNELS],
        }
    }

    pub(crate) fn inc_tx_pkt(&mut self, chan: u32) {
        self.tx_pkt_n = self.tx_pkt_n.saturating_add(1);
        if let Some(q) = self.q_tx_pkt_n.get_mut(chan as usize) {
            *q = q.saturating_add(1);
        }
    }

    pub(crate) fn inc_rx_pkt(&mut self, chan: u32) {
        self.rx_pkt_n = self.rx_pkt_n.saturating_add(1);
        if let Some(q) = self.q_rx_pkt_n.get_mut(chan as usize) {
            *q = q.saturating_add(1);
        }
    }
}

/// Saturating increment.
#[inline(always)]
pub(crate) fn bump(counter: &mut u64) {
    *counter = counter.saturating_add(1);
}
