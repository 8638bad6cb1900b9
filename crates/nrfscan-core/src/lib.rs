//! # nrfscan-core
//!
//! **Watch the 2.4 GHz band through an nRF24L01.**
//!
//! `nrfscan-core` sweeps the radio's 126 channels, tests each for carrier
//! energy with the received power detector, and keeps a short per-channel
//! history that drives a decaying activity bar alongside a running total.
//!
//! ## Quick Start
//!
//! ```no_run
//! use nrfscan_core::{ActivityTracker, ChannelSampler, Radio, RadioConfig, SimulatedRadio};
//!
//! let mut radio = SimulatedRadio::new(42);
//! radio.configure(&RadioConfig::default()).unwrap();
//!
//! let sampler = ChannelSampler::default();
//! let mut tracker = ActivityTracker::new(nrfscan_core::TOTAL_CHANNELS);
//! for channel in 0..nrfscan_core::TOTAL_CHANNELS {
//!     let detected = sampler.sample(&mut radio, channel as u8).unwrap();
//!     tracker.record(channel, detected);
//! }
//! println!("{} busy channels", tracker.totals().iter().filter(|&&t| t > 0).count());
//! ```
//!
//! ## Architecture
//!
//! Radio → Sampler (double RPD read) → Tracker (history + totals) → Grid → Screen
//!
//! The [`sweep`] driver runs that pipeline one channel per tick until a
//! deadline, with scoped teardown of the radio and the screen. [`report`]
//! offers the same scan as line-oriented text.
//!
//! Every backend implements the [`Radio`] trait: [`Nrf24`] over Linux spidev,
//! or [`SimulatedRadio`] for running without hardware.

pub mod grid;
pub mod guard;
pub mod nrf24;
pub mod radio;
pub mod report;
pub mod sampler;
pub mod screen;
pub mod simulated;
pub mod spi;
pub mod sweep;
pub mod tracker;

pub use grid::{BarRender, GRID_COLS, GRID_ROWS, Grid, Slot, SlotStyle, count_label, layout};
pub use nrf24::Nrf24;
pub use radio::{
    BASE_FREQUENCY_MHZ, DataRate, Radio, RadioConfig, RadioError, TOTAL_CHANNELS, frequency_mhz,
};
pub use report::{PlainConfig, PlainSummary, run_plain};
pub use sampler::{ChannelSampler, DEFAULT_SETTLE, SamplerConfig};
pub use screen::{ScanView, Screen};
pub use simulated::SimulatedRadio;
pub use spi::SpiConfig;
pub use sweep::{
    ChannelTotal, ScanConfig, ScanError, ScanReport, Sweep, SweepEnd, SweepState, run_scan,
};
pub use tracker::{Activity, ActivityTracker, CACHE_MAX, History};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
