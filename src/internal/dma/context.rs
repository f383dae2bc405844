//! Software-side packet and slot contexts.
//!
//! These types never reach the DMA engine. Software contexts sit next to
//! each descriptor in the ring. Packet contexts describe a single packet
//! being posted or completed.

use bitflags::bitflags;

use crate::constants::INVALID_VALUE;

bitflags! {
    /// Transmit request flags for one packet.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TxPktFlags: u32 {
        /// Insert the VLAN tag carried in the context descriptor
        const VLAN = 1 << 0;
        /// Full IP header and payload checksum offload
        const CSUM = 1 << 1;
        /// TCP segmentation offload
        const TSO = 1 << 2;
        /// Request a transmit timestamp
        const PTP = 1 << 3;
        /// Buffers are paged rather than linear
        const PAGED_BUF = 1 << 4;
        /// Program the total packet length into the first descriptor
        const LEN = 1 << 11;
        /// IP header checksum offload only
        const IP_CSUM = 1 << 12;
    }
}

bitflags! {
    /// Receive completion flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RxPktFlags: u32 {
        /// VLAN tag extracted
        const VLAN = 1 << 0;
        /// Hardware timestamp extracted
        const PTP = 1 << 3;
        /// RSS hash extracted
        const RSS = 1 << 5;
        /// Frame received without errors
        const VALID = 1 << 10;
    }
}

bitflags! {
    /// Transmit completion flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TxDoneFlags: u32 {
        /// Buffer was paged
        const PAGED_BUF = 1 << 0;
        /// Hardware reported a transmit error
        const ERROR = 1 << 1;
        /// Timestamp is valid in `ns`
        const TS = 1 << 2;
        /// Timestamp must be fetched later using `pktid`
        const TS_DELAYED = 1 << 3;
    }
}

bitflags! {
    /// Receive checksum offload result.
    ///
    /// An empty set means the hardware gave no verdict.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChecksumFlags: u32 {
        /// TCP over IPv4
        const TCPV4 = 1 << 0;
        /// UDP over IPv4
        const UDPV4 = 1 << 1;
        /// TCP or UDP checksum failed
        const TCP_UDP_BAD = 1 << 2;
        /// TCP over IPv6
        const TCPV6 = 1 << 4;
        /// UDP over IPv6
        const UDPV6 = 1 << 5;
        /// IPv4 header checked
        const IPV4 = 1 << 6;
        /// IPv4 header checksum failed
        const IPV4_BAD = 1 << 7;
        /// Software need not verify any checksum
        const UNNECESSARY = 1 << 8;
    }
}

bitflags! {
    /// TX slot software flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TxSwcxFlags: u32 {
        /// Buffer is paged
        const PAGED_BUF = 1 << 0;
        /// Slot carries the first descriptor of a timestamped packet
        const PTP = 1 << 1;
    }
}

bitflags! {
    /// RX slot software flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RxSwcxFlags: u32 {
        /// Buffer may be re-armed without a new allocation
        const REUSE = 1 << 0;
        /// Buffer address is valid and may be handed to the DMA
        const BUF_VALID = 1 << 1;
        /// Slot was already delivered and is waiting for refill
        const PROCESSED = 1 << 3;
    }
}

/// RSS hash type reported with a received packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RssHashType {
    /// Hash over L2 fields
    L2 = 1,
    /// Hash over L3 fields
    L3 = 2,
    /// Hash over L3 and L4 fields
    L4 = 3,
}

// =============================================================================
// Slot contexts
// =============================================================================

/// Software context of one TX slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxSwContext {
    /// Bus address of the buffer
    pub buf_phy_addr: u64,
    /// Buffer length; [`INVALID_VALUE`] for a context-descriptor slot
    pub len: u32,
    /// Slot flags
    pub flags: TxSwcxFlags,
    /// Timestamp packet id (Class-B)
    pub pktid: u32,
}

impl TxSwContext {
    /// An empty slot.
    pub const EMPTY: Self = Self {
        buf_phy_addr: 0,
        len: 0,
        flags: TxSwcxFlags::empty(),
        pktid: 0,
    };

    /// Slot reserved for a context descriptor.
    #[must_use]
    pub const fn context_slot() -> Self {
        Self {
            buf_phy_addr: 0,
            len: INVALID_VALUE,
            flags: TxSwcxFlags::empty(),
            pktid: 0,
        }
    }

    /// Slot holding one data fragment.
    #[must_use]
    pub const fn fragment(buf_phy_addr: u64, len: u32) -> Self {
        Self {
            buf_phy_addr,
            len,
            flags: TxSwcxFlags::empty(),
            pktid: 0,
        }
    }
}

/// Software context of one RX slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RxSwContext {
    /// Bus address of the buffer
    pub buf_phy_addr: u64,
    /// Buffer length
    pub len: u32,
    /// Slot flags
    pub flags: RxSwcxFlags,
}

impl RxSwContext {
    /// An empty slot.
    pub const EMPTY: Self = Self {
        buf_phy_addr: 0,
        len: 0,
        flags: RxSwcxFlags::empty(),
    };

    /// Slot holding a freshly allocated buffer.
    #[must_use]
    pub const fn with_buffer(buf_phy_addr: u64, len: u32) -> Self {
        Self {
            buf_phy_addr,
            len,
            flags: RxSwcxFlags::BUF_VALID,
        }
    }
}

// =============================================================================
// Packet contexts
// =============================================================================

/// Transmit parameters for the next packet on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxPacketContext {
    /// Offload and timestamp requests
    pub flags: TxPktFlags,
    /// VLAN tag to insert
    pub vtag_id: u32,
    /// Number of data descriptors, excluding any context descriptor
    pub desc_cnt: u32,
    /// TSO maximum segment size
    pub mss: u32,
    /// TSO or total payload length
    pub payload_len: u32,
    /// TCP/UDP header length in bytes
    pub tcp_udp_hdrlen: u32,
}

impl TxPacketContext {
    /// Context for a plain packet of `desc_cnt` fragments.
    #[must_use]
    pub const fn new(desc_cnt: u32) -> Self {
        Self {
            flags: TxPktFlags::empty(),
            vtag_id: 0,
            desc_cnt,
            mss: 0,
            payload_len: 0,
            tcp_udp_hdrlen: 0,
        }
    }

    /// Add request flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: TxPktFlags) -> Self {
        self.flags = self.flags.union(flags);
        self
    }

    /// Request VLAN tag insertion.
    #[must_use]
    pub const fn with_vlan(mut self, vtag_id: u32) -> Self {
        self.flags = self.flags.union(TxPktFlags::VLAN);
        self.vtag_id = vtag_id;
        self
    }

    /// Request TCP segmentation.
    #[must_use]
    pub const fn with_tso(mut self, mss: u32, tcp_udp_hdrlen: u32, payload_len: u32) -> Self {
        self.flags = self.flags.union(TxPktFlags::TSO);
        self.mss = mss;
        self.tcp_udp_hdrlen = tcp_udp_hdrlen;
        self.payload_len = payload_len;
        self
    }
}

/// Outcome of one transmitted packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxDoneContext {
    /// Completion flags
    pub flags: TxDoneFlags,
    /// Raw error status bits from TDES3
    pub status: u32,
    /// Transmit timestamp in nanoseconds, valid with [`TxDoneFlags::TS`]
    pub ns: u64,
    /// Packet id, valid with [`TxDoneFlags::TS_DELAYED`]
    pub pktid: u32,
}

impl TxDoneContext {
    /// Packet left the wire without error.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.flags.contains(TxDoneFlags::ERROR)
    }
}

/// Metadata for one received packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RxPacketContext {
    /// Completion flags
    pub flags: RxPktFlags,
    /// Checksum offload verdict
    pub rxcsum: ChecksumFlags,
    /// VLAN tag, valid with [`RxPktFlags::VLAN`]
    pub vlan_tag: u16,
    /// RSS hash, valid with [`RxPktFlags::RSS`]
    pub rx_hash: u32,
    /// RSS hash type
    pub rx_hash_type: Option<RssHashType>,
    /// Receive timestamp in nanoseconds, valid with [`RxPktFlags::PTP`]
    pub ns: u64,
    /// Packet length in bytes
    pub pkt_len: u32,
}

impl RxPacketContext {
    /// No metadata.
    pub const EMPTY: Self = Self {
        flags: RxPktFlags::empty(),
        rxcsum: ChecksumFlags::empty(),
        vlan_tag: 0,
        rx_hash: 0,
        rx_hash_type: None,
        ns: 0,
        pkt_len: 0,
    };

    /// Frame passed hardware error checks.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.flags.contains(RxPktFlags::VALID)
    }
}
