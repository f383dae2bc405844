//! Error types for the DWMAC DMA data path
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Configuration rejected at `dma_init`
//! - [`DmaError`]: Ring state and packet parameter failures
//! - [`IoError`]: Register and timestamp interaction failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most engine methods. [`Error::kind`] folds it onto the five-way
//! [`ErrorKind`] classification callers usually switch on.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration errors
///
/// These errors occur while validating a [`DmaConfig`](super::DmaConfig)
/// and are fatal for the engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Invalid configuration parameter
    InvalidConfig,
    /// Ring size is not a power of two, out of bounds or above capacity
    InvalidRingSize,
    /// Channel count or channel id out of range
    InvalidChannel,
    /// Hardware type code does not name a known controller
    UnknownHardware,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::InvalidRingSize => "invalid ring size",
            ConfigError::InvalidChannel => "invalid channel",
            ConfigError::UnknownHardware => "unknown hardware type",
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// Ring state and packet errors
///
/// These errors relate to descriptor ring management and packet posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Channel unknown, ring not configured or cursor out of range
    InvalidState,
    /// Packet parameters exceed descriptor field widths or ring capacity
    InvalidPacketParams,
    /// Not enough free TX slots to stage the packet
    NoDescriptorsAvailable,
    /// Tail pointer address computation overflowed
    TailPointerOverflow,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::InvalidState => "invalid ring state",
            DmaError::InvalidPacketParams => "invalid packet parameters",
            DmaError::NoDescriptorsAvailable => "no descriptors available",
            DmaError::TailPointerOverflow => "tail pointer overflow",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Hardware interaction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Register did not hold the written value after all retries
    RegisterWriteFailed,
    /// Hardware timestamp not ready, dropped or out of range
    TimestampUnavailable,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::RegisterWriteFailed => "register write not verified",
            IoError::TimestampUnavailable => "timestamp unavailable",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::InvalidRingSize)) => { /* ... */ }
///     Err(Error::Dma(DmaError::InvalidPacketParams)) => { /* ... */ }
///     Err(Error::Io(IoError::RegisterWriteFailed)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA error
    Dma(DmaError),
    /// I/O error
    Io(IoError),
}

/// Coarse error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Configuration rejected
    InvalidConfig,
    /// Engine or ring not in a state that allows the operation
    InvalidState,
    /// Packet cannot be described by the descriptor fields
    InvalidPacketParams,
    /// Register write could not be verified
    RegisterWriteFailed,
    /// Timestamp could not be read
    TimestampUnavailable,
}

impl Error {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::InvalidConfig,
            Error::Dma(DmaError::InvalidPacketParams) => ErrorKind::InvalidPacketParams,
            Error::Dma(_) => ErrorKind::InvalidState,
            Error::Io(IoError::RegisterWriteFailed) => ErrorKind::RegisterWriteFailed,
            Error::Io(IoError::TimestampUnavailable) => ErrorKind::TimestampUnavailable,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for engine operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for ring operations
pub type DmaResult<T> = core::result::Result<T, DmaError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
