//! Line-oriented scan output.
//!
//! How to read it:
//! - The header lists channel numbers vertically (hundreds, tens, ones),
//!   followed by a `~` divider.
//! - Each line below is one block of passes over the band. Every column is
//!   the number of detections on that channel in hex (`-` for none, clamped
//!   at `f`). The line is rewritten in place after each pass and committed
//!   with a newline when the block completes.
//!
//! ```text
//! 000
//! 111
//! 789
//! ~~~
//! 1-2
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::info;

use crate::guard::RadioGuard;
use crate::radio::{Radio, TOTAL_CHANNELS};
use crate::sampler::{ChannelSampler, SamplerConfig};
use crate::sweep::{ScanError, SweepEnd};

/// Default number of full passes summarised per output line.
pub const DEFAULT_PASSES: usize = 100;

#[derive(Debug, Clone)]
pub struct PlainConfig {
    pub channels: usize,
    pub passes_per_line: usize,
    /// Stop after this long. `None` runs until aborted.
    pub duration: Option<Duration>,
    pub sampler: SamplerConfig,
}

impl Default for PlainConfig {
    fn default() -> Self {
        Self {
            channels: TOTAL_CHANNELS,
            passes_per_line: DEFAULT_PASSES,
            duration: None,
            sampler: SamplerConfig::default(),
        }
    }
}

/// Vertical channel-number header plus the divider line.
pub fn header_lines(channels: usize) -> [String; 4] {
    [
        (0..channels).map(|i| digit(i / 100)).collect(),
        (0..channels).map(|i| digit((i % 100) / 10)).collect(),
        (0..channels).map(|i| digit(i % 10)).collect(),
        "~".repeat(channels),
    ]
}

fn digit(n: usize) -> char {
    char::from_digit((n % 10) as u32, 10).unwrap_or('?')
}

/// Lowercase hex count glyph, `-` for zero, clamped at `f`.
pub fn count_glyph(count: u64) -> char {
    if count == 0 {
        return '-';
    }
    char::from_digit(count.min(0xF) as u32, 16).unwrap_or('f')
}

pub fn counts_line(counts: &[u64]) -> String {
    counts.iter().map(|&c| count_glyph(c)).collect()
}

/// Outcome of a plain run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainSummary {
    pub end: SweepEnd,
    pub passes: u64,
    /// Completed (newline-terminated) lines.
    pub lines: u64,
}

/// Sweep the band continuously, writing one line per block of passes.
///
/// Channel counts outside `1..=TOTAL_CHANNELS` are clamped into it.
///
/// The radio is powered down on every exit path.
pub fn run_plain<R, W>(
    radio: &mut R,
    out: &mut W,
    config: &PlainConfig,
    abort: &AtomicBool,
) -> Result<PlainSummary, ScanError>
where
    R: Radio + ?Sized,
    W: Write + ?Sized,
{
    let mut radio = RadioGuard::new(radio);
    let sampler = ChannelSampler::new(config.sampler);
    let passes_per_line = config.passes_per_line.max(1);
    let deadline = config.duration.map(|d| Instant::now() + d);

    let channels = config.channels.clamp(1, TOTAL_CHANNELS);
    for line in header_lines(channels) {
        writeln!(out, "{line}")?;
    }

    let mut counts = vec![0u64; channels];
    let mut passes = 0u64;
    let mut lines = 0u64;
    let mut in_block = 0usize;

    let end = loop {
        if abort.load(Ordering::Relaxed) {
            break SweepEnd::Aborted;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break SweepEnd::Elapsed;
        }

        for (channel, count) in counts.iter_mut().enumerate() {
            if sampler.sample(radio.radio(), channel as u8)? {
                *count += 1;
            }
        }
        passes += 1;
        in_block += 1;
        write!(out, "{}\r", counts_line(&counts))?;
        out.flush()?;

        if in_block == passes_per_line {
            writeln!(out, "{}", counts_line(&counts))?;
            counts.iter_mut().for_each(|c| *c = 0);
            in_block = 0;
            lines += 1;
        }
    };

    if in_block > 0 {
        writeln!(out)?;
    }
    radio.release();
    info!("plain scan {:?}: {passes} passes, {lines} lines", end);
    Ok(PlainSummary { end, passes, lines })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_for_126_channels() {
        let [hundreds, tens, ones, divider] = header_lines(126);
        assert_eq!(hundreds.len(), 126);
        assert!(hundreds.starts_with(&"0".repeat(100)));
        assert!(hundreds.ends_with(&"1".repeat(26)));
        assert_eq!(&tens[17..20], "111");
        assert_eq!(&ones[17..20], "789");
        assert_eq!(&tens[120..126], "222222");
        assert_eq!(&ones[120..126], "012345");
        assert_eq!(divider, "~".repeat(126));
    }

    #[test]
    fn glyphs_are_lowercase_and_clamped() {
        assert_eq!(count_glyph(0), '-');
        assert_eq!(count_glyph(1), '1');
        assert_eq!(count_glyph(11), 'b');
        assert_eq!(count_glyph(15), 'f');
        assert_eq!(count_glyph(100), 'f');
    }

    #[test]
    fn counts_line_matches_example() {
        assert_eq!(counts_line(&[1, 0, 2]), "1-2");
    }

    #[test]
    fn channel_count_is_clamped() {
        let mut radio = crate::simulated::SimulatedRadio::with_profile(1, vec![1.0]);
        let config = PlainConfig {
            channels: 0,
            passes_per_line: 2,
            duration: Some(Duration::from_millis(20)),
            sampler: SamplerConfig {
                settle: Duration::ZERO,
            },
        };
        let mut out = Vec::new();
        let summary = run_plain(&mut radio, &mut out, &config, &AtomicBool::new(false)).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().take(5).collect();
        assert_eq!(lines[..4], ["0", "0", "0", "~"]);
        assert!(summary.passes > 0);
        assert!(text.contains("2\n"), "one-channel block of two hits");

        let wide = PlainConfig {
            channels: 1000,
            ..PlainConfig::default()
        };
        let mut out = Vec::new();
        run_plain(&mut radio, &mut out, &wide, &AtomicBool::new(true)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().next().map(str::len), Some(TOTAL_CHANNELS));
    }
}
