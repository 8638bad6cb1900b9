//! Per-channel energy sampling.
//!
//! One sample is a short listen window followed by a read of the received
//! power detector. A negative first read is confirmed with a second read after
//! leaving RX mode, since a carrier arriving just after the first window would
//! otherwise be missed.

use std::time::Duration;

use log::debug;

use crate::radio::{Radio, RadioError};

/// Default listen window before the RPD read. The detector needs at least
/// 130 µs in RX mode before it reflects the channel.
pub const DEFAULT_SETTLE: Duration = Duration::from_micros(130);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Time spent in RX mode before the first presence test.
    pub settle: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            settle: DEFAULT_SETTLE,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChannelSampler {
    config: SamplerConfig,
}

impl ChannelSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Sample one channel. Returns whether energy was detected.
    ///
    /// On a detection the RX FIFO is flushed so noise captured as packets
    /// cannot leak into the next channel's reading.
    pub fn sample<R: Radio + ?Sized>(&self, radio: &mut R, channel: u8) -> Result<bool, RadioError> {
        radio.select_channel(channel)?;
        radio.start_listening()?;
        std::thread::sleep(self.config.settle);
        let first = radio.test_signal_present()?;
        radio.stop_listening()?;

        let detected = first || radio.test_signal_present()?;
        if detected {
            radio.flush_rx()?;
            debug!("signal on channel {channel} (first read: {first})");
        }
        Ok(detected)
    }
}
