//! DMA descriptor bit field constants.
//!
//! Both generations use the same 4-word descriptor, but the write-back
//! status bits differ. Items specific to one generation say so in their docs.
//! Class-A is the EQOS-style controller, Class-B the MGBE-style one.

#![allow(dead_code)]

// =============================================================================
// RDES0 (RX Descriptor Word 0)
// =============================================================================

/// RX Descriptor Word 0 bit field constants
pub mod rdes0 {
    /// Outer VLAN tag (write-back format)
    pub const OVT_MASK: u32 = 0xFFFF;
}

// =============================================================================
// RDES1 (RX Descriptor Word 1) - Class-A extended status
// =============================================================================

/// RX Descriptor Word 1 bit field constants (Class-A write-back)
pub mod rdes1 {
    /// Payload type mask
    pub const PT_MASK: u32 = 0x7;
    /// Payload type: UDP
    pub const PT_UDP: u32 = 0x1;
    /// Payload type: TCP
    pub const PT_TCP: u32 = 0x2;
    /// IP header error
    pub const IPHE: u32 = 1 << 3;
    /// IPv4 header present
    pub const IPV4: u32 = 1 << 4;
    /// IPv6 header present
    pub const IPV6: u32 = 1 << 5;
    /// IP checksum bypassed
    pub const IPCB: u32 = 1 << 6;
    /// IP payload error
    pub const IPCE: u32 = 1 << 7;
    /// Timestamp available in the following context descriptor
    pub const TSA: u32 = 1 << 14;
    /// Timestamp dropped
    pub const TD: u32 = 1 << 15;
}

// =============================================================================
// RDES3 (RX Descriptor Word 3)
// =============================================================================

/// RX Descriptor Word 3 bit field constants
pub mod rdes3 {
    /// OWN - when set, descriptor owned by DMA; when clear, owned by CPU
    pub const OWN: u32 = 1 << 31;
    /// Interrupt on completion (read format)
    pub const IOC: u32 = 1 << 30;
    /// Context descriptor (write-back format)
    pub const CTXT: u32 = 1 << 30;
    /// First descriptor of a packet
    pub const FD: u32 = 1 << 29;
    /// Last descriptor of a packet
    pub const LD: u32 = 1 << 28;
    /// Context descriptor available (Class-B)
    pub const CDA: u32 = 1 << 27;
    /// RDES1 valid
    pub const RS1V: u32 = 1 << 26;
    /// RSS hash valid in RDES1 (Class-B)
    pub const RSV: u32 = 1 << 26;
    /// RDES0 valid
    pub const RS0V: u32 = 1 << 25;
    /// Buffer 1 address valid (Class-A read format)
    pub const B1V: u32 = 1 << 24;
    /// Packet length mask
    pub const PKT_LEN_MASK: u32 = 0x7FFF;

    /// CRC error (Class-A)
    pub const CRC_ERR: u32 = 1 << 24;
    /// Giant packet (Class-A)
    pub const GP: u32 = 1 << 23;
    /// Watchdog timeout (Class-A)
    pub const WD: u32 = 1 << 22;
    /// Overflow error (Class-A)
    pub const ORUN: u32 = 1 << 21;
    /// Receive error (Class-A)
    pub const RE: u32 = 1 << 20;
    /// Dribble bit error (Class-A)
    pub const DRIB: u32 = 1 << 19;
    /// All Class-A receive error bits
    pub const ES_BITS: u32 = CRC_ERR | GP | WD | ORUN | RE | DRIB;

    /// Length/type field mask (Class-A)
    pub const LT_MASK: u32 = 0x7 << 16;
    /// Single VLAN tagged packet (Class-A)
    pub const LT_VT: u32 = 1 << 18;
    /// Double VLAN tagged packet (Class-A)
    pub const LT_DVT: u32 = (1 << 16) | (1 << 18);

    /// Error summary (Class-B)
    pub const ES_MGBE: u32 = 1 << 15;
    /// Extended L2 length/type mask (Class-B)
    pub const ELLT_MASK: u32 = 0xF_0000;
    /// ELLT: IP header error (Class-B)
    pub const ELLT_IPHE: u32 = 0x5_0000;
    /// ELLT: L4 checksum error (Class-B)
    pub const ELLT_CSUM_ERR: u32 = 0x6_0000;
    /// ELLT: C-VLAN tagged (Class-B)
    pub const ELLT_CVLAN: u32 = 0x9_0000;

    /// L3/L4 packet type mask (Class-B)
    pub const L34T_MASK: u32 = 0x00F0_0000;
    /// L34T: IPv4 TCP (Class-B)
    pub const L34T_IPV4_TCP: u32 = 1 << 20;
    /// L34T: IPv4 UDP (Class-B)
    pub const L34T_IPV4_UDP: u32 = 1 << 21;
    /// L34T: IPv6 TCP (Class-B)
    pub const L34T_IPV6_TCP: u32 = (1 << 23) | (1 << 20);
    /// L34T: IPv6 UDP (Class-B)
    pub const L34T_IPV6_UDP: u32 = (1 << 23) | (1 << 21);
}

/// RX context descriptor Word 3 bits (Class-B)
pub mod rdes3_ctx {
    /// Timestamp available
    pub const TSA: u32 = 1 << 4;
    /// Timestamp dropped
    pub const TSD: u32 = 1 << 6;
}

// =============================================================================
// TDES2 (TX Descriptor Word 2)
// =============================================================================

/// TX Descriptor Word 2 bit field constants
pub mod tdes2 {
    /// Interrupt on completion
    pub const IOC: u32 = 1 << 31;
    /// Transmit timestamp enable
    pub const TTSE: u32 = 1 << 30;
    /// VLAN tag insertion from the context descriptor
    pub const VTIR: u32 = 0x2 << 14;
    /// Buffer 1 length mask
    pub const B1L_MASK: u32 = 0x3FFF;
    /// Maximum segment size mask (context descriptor)
    pub const MSS_MASK: u32 = 0x3FFF;
}

// =============================================================================
// TDES3 (TX Descriptor Word 3)
// =============================================================================

/// TX Descriptor Word 3 bit field constants
pub mod tdes3 {
    /// OWN - when set, descriptor owned by DMA; when clear, owned by CPU
    pub const OWN: u32 = 1 << 31;
    /// Context descriptor
    pub const CTXT: u32 = 1 << 30;
    /// First descriptor of a packet
    pub const FD: u32 = 1 << 29;
    /// Last descriptor of a packet
    pub const LD: u32 = 1 << 28;
    /// One-step timestamp correction (context descriptor)
    pub const OSTC: u32 = 1 << 27;
    /// MSS valid (context descriptor)
    pub const TCMSSV: u32 = 1 << 26;
    /// Packet id valid (Class-B context descriptor)
    pub const PIDV: u32 = 1 << 25;
    /// TCP segmentation enable
    pub const TSE: u32 = 1 << 18;
    /// Timestamp status (write-back)
    pub const TTSS: u32 = 1 << 17;
    /// Checksum insertion: IP header and payload
    pub const HW_CIC_ALL: u32 = (1 << 16) | (1 << 17);
    /// Checksum insertion: IP header only
    pub const HW_CIC_IP_ONLY: u32 = 1 << 16;
    /// VLAN tag valid (context descriptor)
    pub const VLTV: u32 = 1 << 16;
    /// VLAN tag mask (context descriptor)
    pub const VT_MASK: u32 = 0xFFFF;
    /// TCP header length shift
    pub const THL_SHIFT: u32 = 19;
    /// TCP header length mask (in 32-bit words, before shift)
    pub const THL_MASK: u32 = 0xF;
    /// TCP payload length mask
    pub const TPL_MASK: u32 = 0x3_FFFF;
    /// Packet length mask
    pub const PL_MASK: u32 = 0x7FFF;
    /// Slot number shift (shares the THL field)
    pub const SLOT_NUM_SHIFT: u32 = 19;

    /// IP header error (write-back)
    pub const IP_HEADER_ERR: u32 = 1 << 0;
    /// Underflow error (write-back)
    pub const UNDERFLOW_ERR: u32 = 1 << 2;
    /// Excessive deferral (write-back)
    pub const EXCESSIVE_DEF_ERR: u32 = 1 << 3;
    /// Excessive collision (write-back)
    pub const EXCESSIVE_COL_ERR: u32 = 1 << 8;
    /// Late collision (write-back)
    pub const LATE_COL_ERR: u32 = 1 << 9;
    /// No carrier (write-back)
    pub const NO_CARRIER_ERR: u32 = 1 << 10;
    /// Loss of carrier (write-back)
    pub const LOSS_CARRIER_ERR: u32 = 1 << 11;
    /// Payload checksum error (write-back)
    pub const PL_CSUM_ERR: u32 = 1 << 12;
    /// Packet flushed (write-back)
    pub const PKT_FLUSH_ERR: u32 = 1 << 13;
    /// Jabber timeout (write-back)
    pub const JABBER_TIMEO_ERR: u32 = 1 << 14;
    /// Error summary (write-back)
    pub const ES: u32 = 1 << 15;

    /// All TX status error bits
    pub const ES_BITS: u32 = IP_HEADER_ERR
        | UNDERFLOW_ERR
        | EXCESSIVE_DEF_ERR
        | EXCESSIVE_COL_ERR
        | LATE_COL_ERR
        | NO_CARRIER_ERR
        | LOSS_CARRIER_ERR
        | PL_CSUM_ERR
        | PKT_FLUSH_ERR
        | JABBER_TIMEO_ERR;
}
