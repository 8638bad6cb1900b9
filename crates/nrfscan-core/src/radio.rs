//! Radio capability trait and configuration.
//!
//! Every transceiver backend implements the [`Radio`] trait, which exposes the
//! handful of operations the scanner needs: channel selection, listen mode,
//! the received-power-detector test, RX FIFO flushing, and power-down.

use std::fmt;
use std::io;

use serde::Serialize;
use thiserror::Error;

/// Number of RF channels the nRF24L01 can tune to (0-125).
pub const TOTAL_CHANNELS: usize = 126;

/// Frequency of channel 0 in MHz. Channels are spaced 1 MHz apart.
pub const BASE_FREQUENCY_MHZ: u16 = 2400;

/// Absolute frequency of a channel in MHz.
pub fn frequency_mhz(channel: usize) -> u16 {
    BASE_FREQUENCY_MHZ + channel as u16
}

/// Over-the-air data rate.
///
/// The data rate changes the receiver bandwidth, so the same band looks
/// different at each setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum DataRate {
    #[default]
    #[serde(rename = "1mbps")]
    Mbps1,
    #[serde(rename = "2mbps")]
    Mbps2,
    #[serde(rename = "250kbps")]
    Kbps250,
}

impl DataRate {
    /// All rates in menu order.
    pub const ALL: [DataRate; 3] = [Self::Mbps1, Self::Mbps2, Self::Kbps250];

    pub fn label(self) -> &'static str {
        match self {
            Self::Mbps1 => "1 Mbps",
            Self::Mbps2 => "2 Mbps",
            Self::Kbps250 => "250 kbps",
        }
    }
}

impl fmt::Display for DataRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors raised by radio backends.
#[derive(Debug, Error)]
pub enum RadioError {
    /// The chip did not answer the startup probe.
    #[error("radio hardware not responding")]
    NotResponding,
    #[error("address width {0} out of range (2..=5)")]
    InvalidAddressWidth(u8),
    #[error("reading pipe {pipe}: {reason}")]
    InvalidPipe { pipe: usize, reason: &'static str },
    #[error("radio I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Receiver configuration applied before scanning.
///
/// The defaults turn the radio into a promiscuous energy detector: no
/// auto-acknowledgement, no CRC, the shortest address width, and two
/// alternating-bit addresses that noise preambles tend to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioConfig {
    pub data_rate: DataRate,
    /// Address width in bytes (2..=5).
    pub address_width: u8,
    pub auto_ack: bool,
    pub crc: bool,
    /// Addresses for reading pipes 0 and 1, in the order they are opened.
    pub reading_pipes: Vec<Vec<u8>>,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            data_rate: DataRate::default(),
            address_width: 2,
            auto_ack: false,
            crc: false,
            reading_pipes: vec![vec![0x55, 0x55], vec![0xAA, 0xAA]],
        }
    }
}

impl RadioConfig {
    pub fn with_data_rate(mut self, data_rate: DataRate) -> Self {
        self.data_rate = data_rate;
        self
    }

    /// Check address width and pipe addresses without touching hardware.
    pub fn validate(&self) -> Result<(), RadioError> {
        if !(2..=5).contains(&self.address_width) {
            return Err(RadioError::InvalidAddressWidth(self.address_width));
        }
        if self.reading_pipes.len() > 2 {
            return Err(RadioError::InvalidPipe {
                pipe: 2,
                reason: "only pipes 0 and 1 carry full addresses",
            });
        }
        for (pipe, addr) in self.reading_pipes.iter().enumerate() {
            if addr.len() != self.address_width as usize {
                return Err(RadioError::InvalidPipe {
                    pipe,
                    reason: "address length does not match address width",
                });
            }
        }
        Ok(())
    }
}

/// Trait that every radio backend must implement.
///
/// Calls are issued from a single thread in strict sequence. Once a backend
/// has been opened successfully, the presence test is expected to succeed;
/// I/O errors are treated as fatal for the running scan.
pub trait Radio {
    /// Short backend name for logs (e.g. `"nrf24"`).
    fn name(&self) -> &'static str;

    /// Apply data rate, addressing, and pipe configuration, then settle the
    /// radio in standby with an empty RX FIFO.
    fn configure(&mut self, config: &RadioConfig) -> Result<(), RadioError>;

    fn select_channel(&mut self, channel: u8) -> Result<(), RadioError>;

    fn start_listening(&mut self) -> Result<(), RadioError>;

    fn stop_listening(&mut self) -> Result<(), RadioError>;

    /// Received power detector: true if the last listen window saw a carrier
    /// above roughly -64 dBm.
    fn test_signal_present(&mut self) -> Result<bool, RadioError>;

    fn flush_rx(&mut self) -> Result<(), RadioError>;

    fn power_down(&mut self) -> Result<(), RadioError>;

    /// Human-readable dump of the backend's current settings.
    fn details(&mut self) -> Result<String, RadioError>;
}

impl<R: Radio + ?Sized> Radio for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }
    fn configure(&mut self, config: &RadioConfig) -> Result<(), RadioError> {
        (**self).configure(config)
    }
    fn select_channel(&mut self, channel: u8) -> Result<(), RadioError> {
        (**self).select_channel(channel)
    }
    fn start_listening(&mut self) -> Result<(), RadioError> {
        (**self).start_listening()
    }
    fn stop_listening(&mut self) -> Result<(), RadioError> {
        (**self).stop_listening()
    }
    fn test_signal_present(&mut self) -> Result<bool, RadioError> {
        (**self).test_signal_present()
    }
    fn flush_rx(&mut self) -> Result<(), RadioError> {
        (**self).flush_rx()
    }
    fn power_down(&mut self) -> Result<(), RadioError> {
        (**self).power_down()
    }
    fn details(&mut self) -> Result<String, RadioError> {
        (**self).details()
    }
}
