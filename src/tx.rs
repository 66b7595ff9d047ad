//! Transmission contexts: per-channel send progress and on-demand frame
//! production. The cadence of frame production is owned by the bus
//! driver; the context only answers each pull.

use tracing::trace;

use crate::error::{LinTpError, Result};
use crate::frame::{
    encode_consecutive, encode_first, encode_single, next_sequence, CF_MAX_PAYLOAD, FF_PAYLOAD,
    MAX_MESSAGE_LEN, SF_MAX_PAYLOAD,
};
use crate::types::PhysicalFrame;

/// Mutable send state of one channel, lifetime = one transfer.
#[derive(Debug, Default)]
pub(crate) struct TxContext {
    /// Outgoing message, owned for the duration of the transfer.
    payload: Vec<u8>,
    /// Bytes already handed to the driver.
    cursor: usize,
    /// Sequence number of the next consecutive frame.
    sequence: u8,
    /// Distinguishes an armed zero-length transfer from an idle context.
    in_flight: bool,
}

impl TxContext {
    /// Arms the context for a new transfer, taking ownership of the
    /// message for its duration.
    pub(crate) fn start(&mut self, payload: Vec<u8>) -> Result<()> {
        if payload.len() > MAX_MESSAGE_LEN {
            return Err(LinTpError::BufferOverflow);
        }
        self.payload = payload;
        self.cursor = 0;
        self.sequence = 1;
        self.in_flight = true;
        Ok(())
    }

    /// True while a transfer is open, including a just-armed zero-length
    /// one.
    pub(crate) fn is_open(&self) -> bool {
        self.in_flight
    }

    /// Bytes not yet handed to the driver.
    pub(crate) fn remaining(&self) -> usize {
        self.payload.len() - self.cursor
    }

    /// Produces the next outgoing frame and advances the transfer.
    ///
    /// Returns the frame and whether it was the final one of the
    /// transfer; the context is idle again once the final frame has been
    /// produced.
    pub(crate) fn produce(&mut self, na: u8) -> Result<(PhysicalFrame, bool)> {
        if !self.in_flight {
            return Err(LinTpError::NothingToSend);
        }

        let remaining = self.remaining();
        let frame = if self.cursor == 0 {
            if remaining <= SF_MAX_PAYLOAD {
                let frame = encode_single(na, &self.payload);
                self.cursor = remaining;
                frame
            } else {
                // The first segment always carries exactly 5 data bytes.
                let frame = encode_first(na, self.payload.len(), &self.payload[..FF_PAYLOAD]);
                self.cursor = FF_PAYLOAD;
                frame
            }
        } else {
            let take = remaining.min(CF_MAX_PAYLOAD);
            let frame = encode_consecutive(
                na,
                self.sequence,
                &self.payload[self.cursor..self.cursor + take],
            );
            self.sequence = next_sequence(self.sequence);
            self.cursor += take;
            frame
        };

        trace!(
            provided = self.cursor,
            left = self.remaining(),
            "frame produced"
        );

        let done = self.cursor >= self.payload.len();
        if done {
            self.reset();
        }
        Ok((frame, done))
    }

    pub(crate) fn reset(&mut self) {
        self.payload = Vec::new();
        self.cursor = 0;
        self.sequence = 0;
        self.in_flight = false;
    }
}
