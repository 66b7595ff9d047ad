//! Transport protocol engine for LIN-style fixed-frame buses.
//!
//! This crate segments and reassembles application messages larger than
//! a single 8-byte bus frame, following the ISO 15765-2 single-frame /
//! first-frame / consecutive-frame scheme. It sits between a
//! diagnostic or messaging service above and a byte-oriented bus driver
//! below:
//!
//! - the application opens transfers with [`LinTp::start_send`] and
//!   [`LinTp::start_receive`] and is notified of outcomes through
//!   [`TransportCallbacks`];
//! - the bus driver pulls outgoing frames with
//!   [`LinTp::produce_next_frame`] and pushes arriving frames with
//!   [`LinTp::on_frame_received`];
//! - the host's cyclic scheduler invokes [`LinTp::tick`] at a fixed
//!   cadence to age the reception watchdogs.
//!
//! All contexts are preallocated and fixed in number; nothing here
//! blocks, suspends, or allocates mid-transfer.
//!
//! # Examples
//!
//! ```text
//! # Conceptual wiring, not actual code:
//! let engine = LinTp::new(config, schedule_manager, callbacks);
//!
//! # Application side:
//! engine.start_send(0, message);
//!
//! # Bus driver side, once the schedule grants a slot:
//! while engine.remaining_to_send(0)? > 0 {
//!     let frame = engine.produce_next_frame(0)?;
//!     bus.write(frame);
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod types;

mod rx;
mod tx;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-exports for convenience
pub use config::{LinTpConfig, RxChannelConfig, TxChannelConfig};
pub use engine::LinTp;
pub use error::{LinTpError, Result};
pub use types::{Channel, PhysicalFrame, ScheduleManager, TransportCallbacks};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
