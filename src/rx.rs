//! Reception contexts: per-channel reassembly state, frame validation
//! and the inter-frame watchdog aged by the supervisory tick.

use crate::error::LinTpError;
use crate::frame::{self, next_sequence, Pci, CF_MAX_PAYLOAD, FF_PAYLOAD};
use crate::types::PhysicalFrame;

/// Result of delivering one frame to a reception context.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum RxOutcome {
    /// Frame ignored; context state and watchdog untouched.
    Dropped(LinTpError),
    /// Frame accepted, reassembly still open, watchdog refreshed.
    InProgress,
    /// Message reassembled completely; context is idle again.
    Complete(Vec<u8>),
    /// Reassembly aborted; context is idle again.
    Fault(LinTpError),
}

/// Mutable receive state of one channel, lifetime = one transfer.
#[derive(Debug, Default)]
pub(crate) struct RxContext {
    /// Destination buffer, owned for the duration of the transfer; its
    /// length bounds every write.
    buffer: Vec<u8>,
    /// Bytes accepted so far.
    cursor: usize,
    /// Total length announced by the first frame; `None` until one has
    /// been accepted.
    expected: Option<usize>,
    /// Sequence number the next consecutive frame must carry.
    sequence: u8,
    /// Watchdog ticks remaining; 0 means idle or supervision disabled.
    timer: u16,
    armed: bool,
}

impl RxContext {
    /// Arms the context to accept inbound frames into `buffer`.
    pub(crate) fn arm(&mut self, buffer: Vec<u8>, timeout: u16) {
        self.buffer = buffer;
        self.cursor = 0;
        self.expected = None;
        self.sequence = 1;
        self.timer = timeout;
        self.armed = true;
    }

    pub(crate) fn is_open(&self) -> bool {
        self.armed
    }

    #[cfg(test)]
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    #[cfg(test)]
    pub(crate) fn timer(&self) -> u16 {
        self.timer
    }

    /// Validates one arriving frame against this context and folds its
    /// payload into the buffer.
    ///
    /// `na` is the channel's expected node address and `timeout` the
    /// watchdog refresh value; the watchdog is refreshed only for frames
    /// accepted as valid for this context.
    pub(crate) fn on_frame(
        &mut self,
        na: u8,
        timeout: u16,
        frame: &PhysicalFrame,
    ) -> RxOutcome {
        if !self.armed {
            return RxOutcome::Dropped(LinTpError::UnexpectedFrame);
        }
        if frame::node_address(frame) != na {
            return RxOutcome::Dropped(LinTpError::AddressMismatch);
        }

        let pci = match frame::decode(frame) {
            Ok(pci) => pci,
            Err(err) => return RxOutcome::Dropped(err),
        };

        match pci {
            Pci::Single { length } => {
                if length > self.buffer.len() {
                    self.reset();
                    return RxOutcome::Fault(LinTpError::BufferOverflow);
                }
                self.buffer[..length].copy_from_slice(&frame[2..2 + length]);
                self.complete(length)
            }
            Pci::First { total_length } => {
                if total_length > self.buffer.len() {
                    self.reset();
                    return RxOutcome::Fault(LinTpError::BufferOverflow);
                }
                self.buffer[..FF_PAYLOAD].copy_from_slice(&frame[3..3 + FF_PAYLOAD]);
                self.cursor = FF_PAYLOAD;
                self.expected = Some(total_length);
                self.sequence = 1;
                self.timer = timeout;
                RxOutcome::InProgress
            }
            Pci::Consecutive { sequence } => {
                let Some(expected) = self.expected else {
                    return RxOutcome::Dropped(LinTpError::UnexpectedFrame);
                };
                if sequence != self.sequence {
                    let fault = LinTpError::SequenceFault {
                        expected: self.sequence,
                        received: sequence,
                    };
                    self.reset();
                    return RxOutcome::Fault(fault);
                }
                let take = (expected - self.cursor).min(CF_MAX_PAYLOAD);
                self.buffer[self.cursor..self.cursor + take]
                    .copy_from_slice(&frame[2..2 + take]);
                self.cursor += take;
                self.sequence = next_sequence(self.sequence);
                if self.cursor >= expected {
                    self.complete(expected)
                } else {
                    self.timer = timeout;
                    RxOutcome::InProgress
                }
            }
        }
    }

    /// Ages the watchdog by one tick. Returns true when it just expired;
    /// the context is then idle again. Idle contexts and channels with
    /// supervision disabled are left untouched.
    pub(crate) fn age(&mut self) -> bool {
        if self.timer == 0 {
            return false;
        }
        self.timer -= 1;
        if self.timer == 0 {
            self.reset();
            return true;
        }
        false
    }

    fn complete(&mut self, length: usize) -> RxOutcome {
        let mut data = std::mem::take(&mut self.buffer);
        data.truncate(length);
        self.reset();
        RxOutcome::Complete(data)
    }

    pub(crate) fn reset(&mut self) {
        self.buffer = Vec::new();
        self.cursor = 0;
        self.expected = None;
        self.sequence = 0;
        self.timer = 0;
        self.armed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{encode_consecutive, encode_first, encode_single};

    const NA: u8 = 0x10;
    const TIMEOUT: u16 = 5;

    fn armed(len: usize) -> RxContext {
        let mut ctx = RxContext::default();
        ctx.arm(vec![0; len], TIMEOUT);
        ctx
    }

    #[test]
    fn single_frame_completes_immediately() {
        let mut ctx = armed(16);
        let outcome = ctx.on_frame(NA, TIMEOUT, &encode_single(NA, &[1, 2, 3]));
        assert_eq!(outcome, RxOutcome::Complete(vec![1, 2, 3]));
        assert!(!ctx.is_open());
        assert_eq!(ctx.cursor(), 0);
        assert_eq!(ctx.timer(), 0);
    }

    #[test]
    fn segmented_message_reassembles_in_order() {
        let payload: Vec<u8> = (0..10u8).collect();
        let mut ctx = armed(10);

        let ff = encode_first(NA, 10, &payload[..5]);
        assert_eq!(ctx.on_frame(NA, TIMEOUT, &ff), RxOutcome::InProgress);
        assert_eq!(ctx.cursor(), 5);
        assert_eq!(ctx.timer(), TIMEOUT);

        let cf = encode_consecutive(NA, 1, &payload[5..10]);
        assert_eq!(
            ctx.on_frame(NA, TIMEOUT, &cf),
            RxOutcome::Complete(payload)
        );
        assert!(!ctx.is_open());
    }

    #[test]
    fn tail_frame_padding_is_not_copied() {
        // 13 bytes: FF(5) + CF(6) + CF(2), the last CF mostly padding.
        let payload: Vec<u8> = (100..113u8).collect();
        let mut ctx = armed(32);

        ctx.on_frame(NA, TIMEOUT, &encode_first(NA, 13, &payload[..5]));
        ctx.on_frame(NA, TIMEOUT, &encode_consecutive(NA, 1, &payload[5..11]));
        let outcome = ctx.on_frame(NA, TIMEOUT, &encode_consecutive(NA, 2, &payload[11..13]));
        assert_eq!(outcome, RxOutcome::Complete(payload));
    }

    #[test]
    fn wrong_sequence_number_aborts_reassembly() {
        let mut ctx = armed(20);
        ctx.on_frame(NA, TIMEOUT, &encode_first(NA, 12, &[0; 5]));

        let outcome = ctx.on_frame(NA, TIMEOUT, &encode_consecutive(NA, 2, &[0; 6]));
        assert_eq!(
            outcome,
            RxOutcome::Fault(LinTpError::SequenceFault {
                expected: 1,
                received: 2,
            })
        );
        assert!(!ctx.is_open());
        assert_eq!(ctx.timer(), 0);
    }

    #[test]
    fn consecutive_frame_without_first_frame_is_dropped() {
        let mut ctx = armed(20);
        let outcome = ctx.on_frame(NA, TIMEOUT, &encode_consecutive(NA, 1, &[1; 6]));
        assert_eq!(outcome, RxOutcome::Dropped(LinTpError::UnexpectedFrame));
        // Drop does not refresh or clear the watchdog.
        assert_eq!(ctx.timer(), TIMEOUT);
        assert!(ctx.is_open());
    }

    #[test]
    fn foreign_node_address_leaves_state_untouched() {
        let mut ctx = armed(20);
        ctx.on_frame(NA, TIMEOUT, &encode_first(NA, 12, &[0; 5]));
        for _ in 0..3 {
            ctx.age();
        }
        assert_eq!(ctx.timer(), TIMEOUT - 3);

        let outcome = ctx.on_frame(NA, TIMEOUT, &encode_single(0x42, &[9, 9]));
        assert_eq!(outcome, RxOutcome::Dropped(LinTpError::AddressMismatch));
        assert_eq!(ctx.cursor(), 5);
        assert_eq!(ctx.timer(), TIMEOUT - 3);
    }

    #[test]
    fn announced_length_beyond_buffer_aborts() {
        let mut ctx = armed(8);
        let outcome = ctx.on_frame(NA, TIMEOUT, &encode_first(NA, 100, &[0; 5]));
        assert_eq!(outcome, RxOutcome::Fault(LinTpError::BufferOverflow));
        assert!(!ctx.is_open());
    }

    #[test]
    fn watchdog_expires_exactly_once() {
        let mut ctx = armed(8);
        for _ in 0..TIMEOUT - 1 {
            assert!(!ctx.age());
        }
        assert!(ctx.age());
        assert!(!ctx.is_open());
        assert_eq!(ctx.cursor(), 0);
        // Idle context is left untouched by further ticks.
        assert!(!ctx.age());
    }

    #[test]
    fn zero_timeout_disables_supervision() {
        let mut ctx = RxContext::default();
        ctx.arm(vec![0; 8], 0);
        for _ in 0..1000 {
            assert!(!ctx.age());
        }
        assert!(ctx.is_open());
    }

    #[test]
    fn accepted_consecutive_frame_refreshes_watchdog() {
        let payload = vec![7u8; 20];
        let mut ctx = armed(20);
        ctx.on_frame(NA, TIMEOUT, &encode_first(NA, 20, &payload[..5]));
        for _ in 0..4 {
            ctx.age();
        }
        assert_eq!(ctx.timer(), 1);

        ctx.on_frame(NA, TIMEOUT, &encode_consecutive(NA, 1, &payload[5..11]));
        assert_eq!(ctx.timer(), TIMEOUT);
    }

    #[test]
    fn unarmed_context_drops_everything() {
        let mut ctx = RxContext::default();
        let outcome = ctx.on_frame(NA, TIMEOUT, &encode_single(NA, &[1]));
        assert_eq!(outcome, RxOutcome::Dropped(LinTpError::UnexpectedFrame));
    }
}
