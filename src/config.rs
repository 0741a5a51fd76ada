//! Connection parameters.

use crate::tcp::Wrap32;

/// The default capacity of each byte stream.
pub const DEFAULT_CAPACITY: u64 = 64_000;
/// The default largest payload carried by one segment.
pub const MAX_PAYLOAD_SIZE: u64 = 1000;
/// The default initial retransmission timeout in milliseconds.
pub const TIMEOUT_DEFAULT: u64 = 1000;
/// The default number of consecutive retransmissions before giving up.
pub const MAX_RETX_ATTEMPTS: u64 = 8;

/// The parameters of one [`Peer`](crate::tcp::Peer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpConfig {
    /// Capacity of the inbound and outbound byte streams
    pub capacity: u64,
    pub max_payload_size: u64,
    pub initial_rto_ms: u64,
    /// Initial sequence number to use instead of a random one
    pub fixed_isn: Option<Wrap32>,
    /// Consecutive retransmissions after which the connection is abandoned
    pub max_retx_attempts: u64,
}

impl TcpConfig {
    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_max_payload_size(mut self, max_payload_size: u64) -> Self {
        self.max_payload_size = max_payload_size;
        self
    }

    pub fn with_initial_rto(mut self, initial_rto_ms: u64) -> Self {
        self.initial_rto_ms = initial_rto_ms;
        self
    }

    pub fn with_fixed_isn(mut self, isn: Wrap32) -> Self {
        self.fixed_isn = Some(isn);
        self
    }

    pub fn with_max_retx_attempts(mut self, max_retx_attempts: u64) -> Self {
        self.max_retx_attempts = max_retx_attempts;
        self
    }

    /// Checks that the parameters describe a usable connection.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.max_payload_size == 0 {
            return Err(ConfigError::ZeroPayload);
        }
        if self.initial_rto_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_payload_size: MAX_PAYLOAD_SIZE,
            initial_rto_ms: TIMEOUT_DEFAULT,
            fixed_isn: None,
            max_retx_attempts: MAX_RETX_ATTEMPTS,
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Byte streams must have a nonzero capacity")]
    ZeroCapacity,
    #[error("Segments must be able to carry at least one byte")]
    ZeroPayload,
    #[error("The initial retransmission timeout must be nonzero")]
    ZeroTimeout,
}
