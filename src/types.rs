use crate::error::{LinTpError, Result};
use crate::frame::FRAME_LEN;

/// One physical bus frame, always exactly 8 bytes.
pub type PhysicalFrame = [u8; FRAME_LEN];

/// Logical channel index into the context tables.
pub type Channel = usize;

/// Configuration trait implemented by all engine configurations.
pub trait Config: Send + Sync {
    fn validate(&self) -> Result<()>;
}

/// Bus-schedule manager consumed by the engine.
///
/// Starting a transmission or arming a reception requests bus time for
/// the channel's `(network, schedule)` pair. The call is fire-and-forget:
/// it must not block, and the engine does not observe its outcome.
pub trait ScheduleManager: Send + Sync {
    fn request_schedule(&mut self, network: u8, schedule: u8);
}

/// Upward notification sink.
///
/// Transfer outcomes are asynchronous from the requester's point of
/// view: the calls that detect them (`produce_next_frame`,
/// `on_frame_received`, `tick`) are driven by the bus driver and the
/// cyclic scheduler.
pub trait TransportCallbacks: Send + Sync {
    /// The last byte of an outgoing message has been handed to the driver.
    fn transmit_complete(&mut self, channel: Channel);

    /// An incoming message reassembled completely. `data` is the filled
    /// buffer truncated to the actual message length.
    fn reception_complete(&mut self, channel: Channel, data: &[u8]);

    /// An open reception was aborted; the context is idle again.
    fn reception_failed(&mut self, channel: Channel, reason: LinTpError);
}
