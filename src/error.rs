use thiserror::Error;

/// Errors raised by the transport protocol engine.
///
/// Range and configuration errors are returned synchronously from the
/// triggering call. Mid-transfer faults (`SequenceFault`, `Timeout`,
/// `BufferOverflow` on receive) are delivered through the
/// [`TransportCallbacks`](crate::types::TransportCallbacks) failure path
/// instead, because the call that detects them is driven by the bus
/// driver, not by the original requester.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinTpError {
    /// Channel index outside the configured table.
    #[error("channel {0} out of range")]
    InvalidChannel(usize),

    /// The driver pulled a frame but no transfer is open on the channel.
    #[error("nothing to send")]
    NothingToSend,

    /// Unrecognized or inconsistent protocol control information.
    #[error("malformed frame")]
    MalformedFrame,

    /// A consecutive frame arrived without an open reassembly.
    #[error("unexpected frame")]
    UnexpectedFrame,

    /// Frame not addressed to this channel. Normal on a shared bus, so
    /// the frame is dropped without any upward report.
    #[error("node address mismatch")]
    AddressMismatch,

    /// Consecutive-frame numbering violated mid-reassembly.
    #[error("sequence fault: expected SN {expected}, received SN {received}")]
    SequenceFault { expected: u8, received: u8 },

    /// The reception watchdog expired before the transfer completed.
    #[error("reception timed out")]
    Timeout,

    /// Payload does not fit the 12-bit length field or the armed buffer.
    #[error("buffer overflow")]
    BufferOverflow,

    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, LinTpError>;
