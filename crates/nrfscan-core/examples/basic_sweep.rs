//! Basic sweep example.
//!
//! Runs ten passes over the band with the simulated radio and prints the
//! busiest channels with their totals.
//!
//! Run: `cargo run --example basic_sweep`

use std::time::Duration;

use nrfscan_core::{
    ActivityTracker, ChannelSampler, Radio, RadioConfig, SamplerConfig, SimulatedRadio,
    TOTAL_CHANNELS, frequency_mhz,
};

fn main() {
    let mut radio = SimulatedRadio::new(2400);
    radio
        .configure(&RadioConfig::default())
        .expect("simulated radio accepts the default config");

    // No real listen window to wait for.
    let sampler = ChannelSampler::new(SamplerConfig {
        settle: Duration::ZERO,
    });
    let mut tracker = ActivityTracker::new(TOTAL_CHANNELS);

    for _ in 0..10 {
        for channel in 0..TOTAL_CHANNELS {
            let detected = sampler
                .sample(&mut radio, channel as u8)
                .expect("simulated radio never fails");
            tracker.record(channel, detected);
        }
    }

    let mut busiest: Vec<(usize, u64)> = tracker.totals().iter().copied().enumerate().collect();
    busiest.sort_by(|a, b| b.1.cmp(&a.1));

    println!("Busiest channels after 10 passes:");
    for (channel, total) in busiest.into_iter().take(8) {
        println!("  {} MHz  {total:>2} hits", frequency_mhz(channel));
    }

    radio.power_down().expect("power down");
}
