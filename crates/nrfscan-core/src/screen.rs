//! Display substrate seen by the sweep driver.

use std::io;
use std::time::Duration;

use crate::grid::Grid;
use crate::radio::DataRate;

/// Everything a screen needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct ScanView<'a> {
    pub grid: &'a Grid,
    pub data_rate: DataRate,
    /// Time left until the scan deadline.
    pub remaining: Duration,
    /// Channel that was just sampled.
    pub channel: usize,
    /// Completed full sweeps of the band.
    pub sweeps: u64,
}

impl ScanView<'_> {
    /// Countdown line drawn above the grid, e.g.
    /// `"Scanning for 12 seconds at 2 Mbps"`.
    pub fn header(&self) -> String {
        format!(
            "Scanning for {} seconds at {}",
            self.remaining.as_secs(),
            self.data_rate
        )
    }
}

/// A terminal-like surface that can show the channel grid.
pub trait Screen {
    /// Take over the output (alternate screen, raw mode, ...).
    fn enter(&mut self) -> io::Result<()>;

    /// Usable width in columns. Valid after [`Screen::enter`].
    fn width(&self) -> u16;

    /// Write the view and refresh.
    fn draw(&mut self, view: &ScanView<'_>) -> io::Result<()>;

    /// Give the output back to the normal terminal. Must be safe to call
    /// even when [`Screen::enter`] failed or was never called.
    fn restore(&mut self) -> io::Result<()>;

    /// Plain text of a row of the last drawn frame, trailing blanks trimmed.
    fn read_line(&self, row: u16) -> Option<String>;
}
