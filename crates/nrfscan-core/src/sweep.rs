//! Sweep driver: the timed scan loop.
//!
//! ```text
//! Idle ──start──▶ Sweeping ──deadline / abort / error──▶ Draining ──teardown──▶ Finished
//!                  ▲    │
//!                  └tick┘
//! ```
//!
//! Each tick samples the channel under the cursor, records the result, updates
//! that channel's slot, redraws, and advances the cursor. The exit conditions
//! are only checked between ticks.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::grid::{GRID_COLS, GRID_ROWS, Grid};
use crate::guard::{RadioGuard, ScreenGuard};
use crate::radio::{DataRate, Radio, RadioError, TOTAL_CHANNELS, frequency_mhz};
use crate::sampler::{ChannelSampler, SamplerConfig};
use crate::screen::{ScanView, Screen};
use crate::tracker::{Activity, ActivityTracker};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Radio(#[from] RadioError),
    #[error("display error: {0}")]
    Display(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    Idle,
    Sweeping,
    Draining,
    Finished,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepEnd {
    /// The configured duration elapsed.
    Elapsed,
    /// The abort flag was raised (Ctrl-C, `q`).
    Aborted,
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub duration: Duration,
    /// Only used for the countdown line and the report; the radio must
    /// already be configured with it.
    pub data_rate: DataRate,
    pub sampler: SamplerConfig,
    pub channels: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(30),
            data_rate: DataRate::default(),
            sampler: SamplerConfig::default(),
            channels: TOTAL_CHANNELS,
            rows: GRID_ROWS,
            cols: GRID_COLS,
        }
    }
}

/// Channel cursor that wraps after the last channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepCursor {
    channel: usize,
    channels: usize,
}

impl SweepCursor {
    pub fn new(channels: usize) -> Self {
        Self {
            channel: 0,
            channels: channels.max(1),
        }
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Move to the next channel. Returns true when the move wrapped to 0.
    pub fn advance(&mut self) -> bool {
        self.channel += 1;
        if self.channel == self.channels {
            self.channel = 0;
            return true;
        }
        false
    }
}

/// Per-channel total in a [`ScanReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ChannelTotal {
    pub channel: usize,
    pub frequency_mhz: u16,
    pub total: u64,
}

/// Summary of a finished scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub data_rate: DataRate,
    pub duration_secs: u64,
    pub end: SweepEnd,
    pub ticks: u64,
    pub sweeps: u64,
    pub channels: Vec<ChannelTotal>,
}

impl ScanReport {
    /// Channels with at least one detection, busiest first.
    pub fn busiest(&self) -> Vec<&ChannelTotal> {
        let mut active: Vec<&ChannelTotal> = self.channels.iter().filter(|c| c.total > 0).collect();
        active.sort_by(|a, b| b.total.cmp(&a.total).then(a.channel.cmp(&b.channel)));
        active
    }
}

/// All state of one scan run.
#[derive(Debug, Clone)]
pub struct Sweep {
    sampler: ChannelSampler,
    tracker: ActivityTracker,
    grid: Grid,
    cursor: SweepCursor,
    state: SweepState,
    data_rate: DataRate,
    ticks: u64,
    sweeps: u64,
}

impl Sweep {
    /// Channel counts outside `1..=TOTAL_CHANNELS` are clamped into it.
    pub fn new(config: &ScanConfig, width: u16) -> Self {
        let channels = config.channels.clamp(1, TOTAL_CHANNELS);
        if channels != config.channels {
            warn!("{} channels requested, scanning {channels}", config.channels);
        }
        Self {
            sampler: ChannelSampler::new(config.sampler),
            tracker: ActivityTracker::new(channels),
            grid: Grid::new(channels, width, config.rows, config.cols),
            cursor: SweepCursor::new(channels),
            state: SweepState::Idle,
            data_rate: config.data_rate,
            ticks: 0,
            sweeps: 0,
        }
    }

    pub fn start(&mut self) {
        if self.state == SweepState::Idle {
            self.state = SweepState::Sweeping;
        }
    }

    pub fn drain(&mut self) {
        if self.state != SweepState::Finished {
            self.state = SweepState::Draining;
        }
    }

    pub fn finish(&mut self) {
        self.state = SweepState::Finished;
    }

    /// Sample the channel under the cursor, record it, update its slot, and
    /// advance the cursor. Returns the channel visited and its activity.
    pub fn tick<R: Radio + ?Sized>(&mut self, radio: &mut R) -> Result<(usize, Activity), RadioError> {
        let channel = self.cursor.channel();
        let detected = self.sampler.sample(radio, channel as u8)?;
        let activity = self.tracker.record(channel, detected);
        self.grid.update(channel, activity);

        self.ticks += 1;
        if self.cursor.advance() {
            self.sweeps += 1;
        }
        Ok((channel, activity))
    }

    /// Tick and redraw until the deadline passes or `abort` is raised.
    ///
    /// Exit conditions are checked between ticks. The sweep is left in
    /// [`SweepState::Draining`] on every return, including errors.
    pub fn run<R, S>(
        &mut self,
        radio: &mut R,
        screen: &mut S,
        duration: Duration,
        abort: &AtomicBool,
    ) -> Result<SweepEnd, ScanError>
    where
        R: Radio + ?Sized,
        S: Screen + ?Sized,
    {
        self.start();
        let deadline = Instant::now() + duration;
        let outcome = loop {
            if abort.load(Ordering::Relaxed) {
                break Ok(SweepEnd::Aborted);
            }
            let now = Instant::now();
            if now >= deadline {
                break Ok(SweepEnd::Elapsed);
            }
            if let Err(e) = self.step(radio, screen, deadline - now) {
                break Err(e);
            }
        };
        self.drain();
        debug!("draining after {outcome:?}");
        outcome
    }

    fn step<R, S>(&mut self, radio: &mut R, screen: &mut S, remaining: Duration) -> Result<(), ScanError>
    where
        R: Radio + ?Sized,
        S: Screen + ?Sized,
    {
        let (channel, _) = self.tick(radio)?;
        screen.draw(&self.view(channel, remaining))?;
        Ok(())
    }

    pub fn view(&self, channel: usize, remaining: Duration) -> ScanView<'_> {
        ScanView {
            grid: &self.grid,
            data_rate: self.data_rate,
            remaining,
            channel,
            sweeps: self.sweeps,
        }
    }

    pub fn state(&self) -> SweepState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }

    pub fn report(&self, end: SweepEnd, duration: Duration) -> ScanReport {
        ScanReport {
            data_rate: self.data_rate,
            duration_secs: duration.as_secs(),
            end,
            ticks: self.ticks,
            sweeps: self.sweeps,
            channels: self
                .tracker
                .totals()
                .iter()
                .enumerate()
                .map(|(channel, &total)| ChannelTotal {
                    channel,
                    frequency_mhz: frequency_mhz(channel),
                    total,
                })
                .collect(),
        }
    }
}

/// Run a timed scan on an already configured radio.
///
/// The screen is entered here. Whatever happens afterwards (deadline, abort,
/// radio or display error, panic) the radio is powered down and the screen
/// restored exactly once before this function returns or unwinds.
pub fn run_scan<R, S>(
    radio: &mut R,
    screen: &mut S,
    config: &ScanConfig,
    abort: &AtomicBool,
) -> Result<ScanReport, ScanError>
where
    R: Radio + ?Sized,
    S: Screen + ?Sized,
{
    // Declared first so it drops last: the radio powers down before the
    // terminal comes back.
    let mut screen = ScreenGuard::new(screen);
    let mut radio = RadioGuard::new(radio);

    screen.screen().enter()?;
    let mut sweep = Sweep::new(config, screen.screen().width());
    info!(
        "scanning {} channels for {}s at {} ({})",
        config.channels,
        config.duration.as_secs(),
        config.data_rate,
        radio.radio().name()
    );

    let outcome = sweep.run(radio.radio(), screen.screen(), config.duration, abort);
    radio.release();
    screen.release();
    sweep.finish();
    let end = outcome?;

    info!(
        "scan {:?}: {} ticks, {} full sweeps",
        end,
        sweep.ticks(),
        sweep.sweeps()
    );
    Ok(sweep.report(end, config.duration))
}
