//! The transport protocol engine: owns the per-channel context tables
//! and drives them from the three external call sites (application
//! requests, driver frame events, periodic tick).
//!
//! The engine is a single explicitly owned state object constructed once
//! at startup. It assumes run-to-completion semantics: the host must not
//! let `produce_next_frame`, `on_frame_received` and `tick` preempt each
//! other over the same channel. Under true parallelism, wrap the engine
//! in the host's mutual-exclusion primitive; nothing here blocks, and
//! every call is bounded in time.

use tracing::{debug, warn};

use crate::config::LinTpConfig;
use crate::error::{LinTpError, Result};
use crate::rx::{RxContext, RxOutcome};
use crate::tx::TxContext;
use crate::types::{Channel, Config, PhysicalFrame, ScheduleManager, TransportCallbacks};

/// ISO 15765-2 style segmentation engine over a fixed-frame bus.
///
/// `S` grants bus time when a transfer starts; `N` receives the
/// asynchronous completion and failure notifications.
pub struct LinTp<S: ScheduleManager, N: TransportCallbacks> {
    config: LinTpConfig,
    tx: Vec<TxContext>,
    rx: Vec<RxContext>,
    schedule: S,
    callbacks: N,
}

impl<S: ScheduleManager, N: TransportCallbacks> LinTp<S, N> {
    /// Builds the engine, preallocating one context per configured
    /// channel.
    pub fn new(config: LinTpConfig, schedule: S, callbacks: N) -> Result<Self> {
        config.validate()?;
        let tx = config.tx.iter().map(|_| TxContext::default()).collect();
        let rx = config.rx.iter().map(|_| RxContext::default()).collect();
        Ok(Self {
            config,
            tx,
            rx,
            schedule,
            callbacks,
        })
    }

    /// Opens a transmission on `channel`, taking ownership of the
    /// message for the duration of the transfer.
    ///
    /// A transfer already open on the channel is silently discarded in
    /// favour of the new one; the discard is logged. Requests bus time
    /// for the channel's schedule before the driver starts pulling
    /// frames.
    pub fn start_send(&mut self, channel: Channel, payload: Vec<u8>) -> Result<()> {
        let cfg = self
            .config
            .tx
            .get(channel)
            .ok_or(LinTpError::InvalidChannel(channel))?;
        let ctx = &mut self.tx[channel];
        if ctx.is_open() {
            warn!(channel, "open transmission discarded by new start request");
        }
        let length = payload.len();
        ctx.start(payload)?;
        self.schedule.request_schedule(cfg.network, cfg.schedule);
        debug!(channel, length, "transmission armed");
        Ok(())
    }

    /// Produces the next outgoing frame for `channel`.
    ///
    /// Pulled by the bus driver; the driver owns the cadence. Fails with
    /// [`LinTpError::NothingToSend`] once the transfer has been fully
    /// produced. Producing the final frame fires `transmit_complete`.
    pub fn produce_next_frame(&mut self, channel: Channel) -> Result<PhysicalFrame> {
        let cfg = self
            .config
            .tx
            .get(channel)
            .ok_or(LinTpError::InvalidChannel(channel))?;
        let (frame, done) = self.tx[channel].produce(cfg.node_address)?;
        if done {
            debug!(channel, "transmission complete");
            self.callbacks.transmit_complete(channel);
        }
        Ok(frame)
    }

    /// Bytes of the open transmission not yet handed to the driver.
    ///
    /// The driver stops pulling once this reaches 0.
    pub fn remaining_to_send(&self, channel: Channel) -> Result<usize> {
        if channel >= self.config.tx.len() {
            return Err(LinTpError::InvalidChannel(channel));
        }
        Ok(self.tx[channel].remaining())
    }

    /// Arms `channel` to accept an inbound message into `buffer`; the
    /// buffer's length bounds the transfer. Starts the inter-frame
    /// watchdog and requests bus time for the channel's schedule.
    ///
    /// A reception already open on the channel is silently discarded.
    pub fn start_receive(&mut self, channel: Channel, buffer: Vec<u8>) -> Result<()> {
        let cfg = self
            .config
            .rx
            .get(channel)
            .ok_or(LinTpError::InvalidChannel(channel))?;
        let ctx = &mut self.rx[channel];
        if ctx.is_open() {
            warn!(channel, "open reception discarded by new start request");
        }
        ctx.arm(buffer, cfg.reception_timeout);
        self.schedule.request_schedule(cfg.network, cfg.schedule);
        debug!(channel, "reception armed");
        Ok(())
    }

    /// Delivers one arriving frame to `channel`.
    ///
    /// Pushed by the bus driver in actual bus arrival order. Only the
    /// channel range is reported synchronously; protocol outcomes reach
    /// the application through the callbacks, and dropped frames are
    /// only logged.
    pub fn on_frame_received(&mut self, channel: Channel, frame: &PhysicalFrame) -> Result<()> {
        let cfg = self
            .config
            .rx
            .get(channel)
            .ok_or(LinTpError::InvalidChannel(channel))?;
        let outcome = self.rx[channel].on_frame(cfg.node_address, cfg.reception_timeout, frame);
        match outcome {
            RxOutcome::Dropped(reason) => {
                warn!(channel, %reason, "frame dropped");
            }
            RxOutcome::InProgress => {}
            RxOutcome::Complete(data) => {
                debug!(channel, length = data.len(), "reception complete");
                self.callbacks.reception_complete(channel, &data);
            }
            RxOutcome::Fault(reason) => {
                warn!(channel, %reason, "reception aborted");
                self.callbacks.reception_failed(channel, reason);
            }
        }
        Ok(())
    }

    /// Supervisory tick, to be invoked once per fixed time unit by the
    /// host's cyclic scheduler.
    ///
    /// Ages every active reception watchdog; an expiry resets the
    /// context and fires exactly one `reception_failed` with
    /// [`LinTpError::Timeout`]. This is the sole mechanism for detecting
    /// a stalled peer.
    pub fn tick(&mut self) {
        for (channel, ctx) in self.rx.iter_mut().enumerate() {
            if ctx.age() {
                warn!(channel, "reception timed out");
                self.callbacks.reception_failed(channel, LinTpError::Timeout);
            }
        }
    }
}
