use crate::error::{LinTpError, Result};
use crate::types::Config;

/// Configuration of one transmission channel.
#[derive(Debug, Clone)]
pub struct TxChannelConfig {
    /// Physical bus segment the channel belongs to.
    pub network: u8,
    /// Bus schedule to request when a transmission starts.
    pub schedule: u8,
    /// Node-address byte carried in byte 0 of every produced frame.
    pub node_address: u8,
}

/// Configuration of one reception channel.
#[derive(Debug, Clone)]
pub struct RxChannelConfig {
    /// Physical bus segment the channel belongs to.
    pub network: u8,
    /// Bus schedule to request when a reception is armed.
    pub schedule: u8,
    /// Expected node-address byte; frames carrying any other value are
    /// ignored for this channel.
    pub node_address: u8,
    /// Inter-frame watchdog, in supervisory ticks. `0` disables the
    /// watchdog for this channel.
    pub reception_timeout: u16,
}

impl Default for TxChannelConfig {
    fn default() -> Self {
        Self {
            network: 0,
            schedule: 0,
            node_address: 0,
        }
    }
}

impl Default for RxChannelConfig {
    fn default() -> Self {
        Self {
            network: 0,
            schedule: 0,
            node_address: 0,
            reception_timeout: 100,
        }
    }
}

/// Engine configuration: one entry per logical channel, loaded once at
/// startup. The tx and rx tables are independent; a channel index is
/// only meaningful within its own table.
#[derive(Debug, Clone, Default)]
pub struct LinTpConfig {
    pub tx: Vec<TxChannelConfig>,
    pub rx: Vec<RxChannelConfig>,
}

impl Config for LinTpConfig {
    fn validate(&self) -> Result<()> {
        if self.tx.is_empty() && self.rx.is_empty() {
            return Err(LinTpError::InvalidConfig("no channels configured"));
        }
        Ok(())
    }
}
