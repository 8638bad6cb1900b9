//! Hardware-free radio backend.
//!
//! Presence tests are drawn from a per-channel busy probability. The default
//! band profile has three 22 MHz humps where Wi-Fi channels 1, 6 and 11 sit
//! (2412, 2437 and 2462 MHz) on top of a faint noise floor.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::radio::{DataRate, Radio, RadioConfig, RadioError, TOTAL_CHANNELS};

const NOISE_FLOOR: f64 = 0.01;
const HUMP_PEAK: f64 = 0.35;
const HUMP_HALF_WIDTH: usize = 11;
const WIFI_CENTERS: [usize; 3] = [12, 37, 62];

/// Wi-Fi-like busy probability per channel.
pub fn wifi_profile(channels: usize) -> Vec<f64> {
    (0..channels)
        .map(|ch| {
            let humps: f64 = WIFI_CENTERS
                .iter()
                .map(|&center| {
                    let distance = ch.abs_diff(center);
                    if distance <= HUMP_HALF_WIDTH {
                        HUMP_PEAK * (1.0 - distance as f64 / (HUMP_HALF_WIDTH + 1) as f64)
                    } else {
                        0.0
                    }
                })
                .sum();
            (NOISE_FLOOR + humps).min(0.95)
        })
        .collect()
}

pub struct SimulatedRadio {
    rng: StdRng,
    profile: Vec<f64>,
    channel: u8,
    listening: bool,
    powered: bool,
    data_rate: DataRate,
    flushes: u64,
}

impl SimulatedRadio {
    /// Seeded radio with the Wi-Fi profile.
    pub fn new(seed: u64) -> Self {
        Self::with_profile(seed, wifi_profile(TOTAL_CHANNELS))
    }

    /// Seeded radio with an explicit busy probability per channel.
    pub fn with_profile(seed: u64, profile: Vec<f64>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            profile,
            channel: 0,
            listening: false,
            powered: true,
            data_rate: DataRate::default(),
            flushes: 0,
        }
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn flushes(&self) -> u64 {
        self.flushes
    }
}

impl Radio for SimulatedRadio {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn configure(&mut self, config: &RadioConfig) -> Result<(), RadioError> {
        config.validate()?;
        self.data_rate = config.data_rate;
        self.powered = true;
        self.listening = false;
        Ok(())
    }

    fn select_channel(&mut self, channel: u8) -> Result<(), RadioError> {
        self.channel = channel;
        Ok(())
    }

    fn start_listening(&mut self) -> Result<(), RadioError> {
        self.powered = true;
        self.listening = true;
        Ok(())
    }

    fn stop_listening(&mut self) -> Result<(), RadioError> {
        self.listening = false;
        Ok(())
    }

    fn test_signal_present(&mut self) -> Result<bool, RadioError> {
        let p = self
            .profile
            .get(self.channel as usize)
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        Ok(self.powered && self.rng.random_bool(p))
    }

    fn flush_rx(&mut self) -> Result<(), RadioError> {
        self.flushes += 1;
        Ok(())
    }

    fn power_down(&mut self) -> Result<(), RadioError> {
        self.powered = false;
        self.listening = false;
        Ok(())
    }

    fn details(&mut self) -> Result<String, RadioError> {
        let busiest = self
            .profile
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(ch, p)| format!("channel {ch} ({:.0}% busy)", p * 100.0))
            .unwrap_or_else(|| "none".into());
        Ok(format!(
            "simulated radio, {} channels, {}, busiest {busiest}",
            self.profile.len(),
            self.data_rate
        ))
    }
}
