//! Centralized Constants
//!
//! This module provides a single source of truth for the magic numbers
//! shared by the ring, submission and completion code.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Sentinels**: Values with a reserved meaning in contexts and descriptors
//! - **Frame sizes**: Ethernet header and alignment sizes
//! - **Timing**: Retry counts and polling intervals
//! - **Limits**: Channel and MTU ceilings
//!
//! # Note
//!
//! Descriptor bit definitions live in `internal/dma/descriptor/bits.rs` and
//! register offsets in `internal/register/`, as they are specific to each
//! hardware generation.

// =============================================================================
// Sentinels
// =============================================================================

/// Marks a context-descriptor slot's length and an unset timestamp word
pub const INVALID_VALUE: u32 = 0xFFFF_FFFF;

/// Nanoseconds per second
pub const NSEC_PER_SEC: u64 = 1_000_000_000;

// =============================================================================
// Frame Sizes
// =============================================================================

/// Ethernet header size (dst MAC + src MAC + EtherType)
pub const ETH_HLEN: u32 = 14;

/// VLAN tag size
pub const VLAN_HLEN: u32 = 4;

/// Padding in front of the frame so the IP header is 4-byte aligned
pub const NET_IP_ALIGN: u32 = 2;

/// Largest MTU the receive buffer length is sized for
pub const MAX_MTU: u32 = 9000;

// =============================================================================
// Timing
// =============================================================================

/// Attempts made while waiting for the RX timestamp context descriptor
pub const TIMESTAMP_RETRY: u32 = 10;

/// Delay between RX timestamp polls in microseconds
pub const TIMESTAMP_POLL_US: u32 = 1;

/// Attempts made to verify an interrupt-gate register write
pub const INTR_WRITE_RETRY: u32 = 10;

// =============================================================================
// Limits
// =============================================================================

/// Highest channel count of any supported controller
pub const MAX_DMA_CHANNELS: usize = 10;

/// Slot number modulus for slot-function checking
pub const SLOT_NUM_MAX: u32 = 16;

/// Largest slot interval in microseconds
pub const SLOT_INTVL_MAX: u32 = 4095;

/// Packet id width for Class-B delayed timestamps
pub const PKT_ID_BITS: u32 = 10;
