use std::io::{self, Write};
use std::time::Duration;

use nrfscan_core::{DataRate, PlainConfig, SweepEnd, run_plain};

use crate::RadioArgs;

pub fn run(data_rate: DataRate, passes: usize, duration: u64, args: &RadioArgs) {
    let mut radio = super::open_radio_or_exit(args, data_rate);

    let config = PlainConfig {
        passes_per_line: passes,
        duration: (duration > 0).then(|| Duration::from_secs(duration)),
        sampler: super::sampler_config(args),
        ..PlainConfig::default()
    };

    let abort = super::abort_flag();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run_plain(radio.as_mut(), &mut out, &config, &abort) {
        Ok(summary) => {
            if summary.end == SweepEnd::Aborted {
                eprintln!("stopped after {} passes", summary.passes);
            }
        }
        Err(e) => {
            // The in-progress line was only \r-terminated.
            let _ = writeln!(out);
            eprintln!("nrfscan: scan failed: {e}");
            std::process::exit(1);
        }
    }
}
