//! Channel grid layout and bar rendering math.
//!
//! ```text
//!  col 0                      col 1                      ...
//!  2400 ══════════──────── 3  2421 ──────────────────── -
//!  2401 ═══════════════════ F  2422 ════──────────────── 1
//!  ...                        ...
//! ```
//!
//! Channels fill the grid column-major: channel `col * rows + row`. Each slot
//! shows the channel frequency, a bar whose fill follows the peak level, and
//! a one-hex-digit total.

use crate::radio::frequency_mhz;
use crate::tracker::{Activity, CACHE_MAX};

pub const GRID_ROWS: usize = 21;
pub const GRID_COLS: usize = 6;

/// Columns taken by the frequency label, including its trailing space.
pub const LABEL_WIDTH: usize = 5;
/// Columns in a slot that are not bar: label plus `" X "` count suffix.
pub const SLOT_CHROME: usize = LABEL_WIDTH + 3;

pub const FILLED_GLYPH: char = '═';
pub const EMPTY_GLYPH: char = '─';

/// Largest total that still has its own count glyph.
pub const COUNT_CLAMP: u64 = 0xF;

/// Visual style of a slot. Alternates per column, for readability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStyle {
    Even,
    Odd,
}

/// Grid position of a channel: `(row, col)`.
pub fn position(channel: usize, rows: usize) -> (usize, usize) {
    (channel % rows, channel / rows)
}

/// Filled bar length for a peak level over `drawable` columns.
pub fn fill_length(peak_level: usize, drawable: usize) -> usize {
    peak_level.min(CACHE_MAX) * drawable / CACHE_MAX
}

/// Count glyph for a total: `-` when zero, otherwise one uppercase hex digit
/// clamped at `F`.
pub fn count_label(total: u64) -> char {
    if total == 0 {
        return '-';
    }
    let digit = total.min(COUNT_CLAMP) as u32;
    char::from_digit(digit, 16)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('F')
}

/// One rendered state of a slot's bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarRender {
    pub filled: usize,
    pub empty: usize,
    pub count: char,
}

impl BarRender {
    pub fn filled_text(&self) -> String {
        std::iter::repeat_n(FILLED_GLYPH, self.filled).collect()
    }

    /// Empty filler plus the count suffix.
    pub fn tail_text(&self) -> String {
        let mut s: String = std::iter::repeat_n(EMPTY_GLYPH, self.empty).collect();
        s.push(' ');
        s.push(self.count);
        s.push(' ');
        s
    }
}

/// Fixed screen slot for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub channel: usize,
    pub row: usize,
    pub col: usize,
    /// Left edge in terminal columns.
    pub x: u16,
    pub width: u16,
    /// Frequency label, e.g. `"2425 "`.
    pub label: String,
    pub style: SlotStyle,
}

impl Slot {
    /// Columns available to the bar itself.
    pub fn drawable_width(&self) -> usize {
        (self.width as usize).saturating_sub(SLOT_CHROME)
    }

    pub fn render(&self, activity: Activity) -> BarRender {
        let drawable = self.drawable_width();
        let filled = fill_length(activity.peak_level, drawable);
        BarRender {
            filled,
            empty: drawable - filled,
            count: count_label(activity.total),
        }
    }

    /// Full slot text for a render: label, bar, filler, and count.
    pub fn text(&self, bar: &BarRender) -> String {
        format!("{}{}{}", self.label, bar.filled_text(), bar.tail_text())
    }
}

/// Lay out `channel_count` slots in a `rows` x `cols` grid spanning
/// `total_width` columns.
///
/// Channels that do not fit in `rows * cols` positions get no slot.
pub fn layout(channel_count: usize, total_width: u16, rows: usize, cols: usize) -> Vec<Slot> {
    let rows = rows.max(1);
    let cols = cols.max(1);
    let width = total_width / cols as u16;

    (0..channel_count.min(rows * cols))
        .map(|channel| {
            let (row, col) = position(channel, rows);
            Slot {
                channel,
                row,
                col,
                x: width * col as u16,
                width,
                label: format!("{} ", frequency_mhz(channel)),
                style: if col % 2 == 1 {
                    SlotStyle::Odd
                } else {
                    SlotStyle::Even
                },
            }
        })
        .collect()
}

/// All slots plus their most recent render.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    slots: Vec<Slot>,
    bars: Vec<BarRender>,
}

impl Grid {
    pub fn new(channel_count: usize, total_width: u16, rows: usize, cols: usize) -> Self {
        let slots = layout(channel_count, total_width, rows, cols);
        let bars = slots.iter().map(|s| s.render(Activity::default())).collect();
        Self {
            rows,
            slots,
            bars,
        }
    }

    /// Re-render the slot for `channel`. Channels without a slot are ignored.
    pub fn update(&mut self, channel: usize, activity: Activity) {
        if let Some(slot) = self.slots.get(channel) {
            self.bars[channel] = slot.render(activity);
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn bar(&self, channel: usize) -> Option<&BarRender> {
        self.bars.get(channel)
    }

    /// Slots paired with their current render.
    pub fn iter(&self) -> impl Iterator<Item = (&Slot, &BarRender)> {
        self.slots.iter().zip(self.bars.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::TOTAL_CHANNELS;

    fn activity(peak_level: usize, total: u64) -> Activity {
        Activity { peak_level, total }
    }

    #[test]
    fn column_major_positions() {
        assert_eq!(position(0, GRID_ROWS), (0, 0));
        assert_eq!(position(1, GRID_ROWS), (1, 0));
        assert_eq!(position(20, GRID_ROWS), (20, 0));
        assert_eq!(position(21, GRID_ROWS), (0, 1));
        assert_eq!(position(25, GRID_ROWS), (4, 1));
        assert_eq!(position(125, GRID_ROWS), (20, 5));
    }

    #[test]
    fn layout_covers_all_channels() {
        let slots = layout(TOTAL_CHANNELS, 120, GRID_ROWS, GRID_COLS);
        assert_eq!(slots.len(), TOTAL_CHANNELS);
        assert!(slots.iter().all(|s| s.width == 20));
        let slot = &slots[25];
        assert_eq!((slot.row, slot.col, slot.x), (4, 1, 20));
        assert_eq!(slot.label, "2425 ");
        assert_eq!(slot.style, SlotStyle::Odd);
        assert_eq!(slots[0].style, SlotStyle::Even);
    }

    #[test]
    fn layout_allows_short_last_column() {
        let slots = layout(30, 60, 21, 2);
        assert_eq!(slots.len(), 30);
        let last_col: Vec<_> = slots.iter().filter(|s| s.col == 1).collect();
        assert_eq!(last_col.len(), 9);
    }

    #[test]
    fn layout_drops_overflow_channels() {
        let slots = layout(10, 40, 2, 2);
        assert_eq!(slots.len(), 4);
    }

    #[test]
    fn count_labels() {
        assert_eq!(count_label(0), '-');
        assert_eq!(count_label(1), '1');
        assert_eq!(count_label(9), '9');
        assert_eq!(count_label(10), 'A');
        assert_eq!(count_label(15), 'F');
        assert_eq!(count_label(16), 'F');
        assert_eq!(count_label(u64::MAX), 'F');
    }

    #[test]
    fn fill_is_monotonic_and_saturates() {
        for drawable in [0, 1, 7, 12, 40] {
            let mut previous = 0;
            for peak in 0..=CACHE_MAX + 2 {
                let filled = fill_length(peak, drawable);
                assert!(filled >= previous, "drawable {drawable} peak {peak}");
                assert!(filled <= drawable);
                previous = filled;
            }
            assert_eq!(fill_length(CACHE_MAX, drawable), drawable);
            assert_eq!(fill_length(CACHE_MAX + 3, drawable), drawable);
        }
    }

    #[test]
    fn fill_rounds_down() {
        // 3/5 of 12 columns is 7.2.
        assert_eq!(fill_length(3, 12), 7);
        assert_eq!(fill_length(1, 4), 0);
    }

    #[test]
    fn slot_render_fills_drawable_width() {
        let slot = &layout(1, 20, GRID_ROWS, 1)[0];
        assert_eq!(slot.drawable_width(), 12);

        let bar = slot.render(activity(3, 2));
        assert_eq!(bar, BarRender { filled: 7, empty: 5, count: '2' });
        assert_eq!(slot.text(&bar), "2400 ═══════───── 2 ");
        assert_eq!(slot.text(&bar).chars().count(), 20);
    }

    #[test]
    fn narrow_slot_has_no_bar() {
        let slot = &layout(1, 6, GRID_ROWS, 1)[0];
        assert_eq!(slot.drawable_width(), 0);
        let bar = slot.render(activity(CACHE_MAX, 40));
        assert_eq!((bar.filled, bar.empty, bar.count), (0, 0, 'F'));
    }

    #[test]
    fn grid_starts_blank_and_updates() {
        let mut grid = Grid::new(TOTAL_CHANNELS, 120, GRID_ROWS, GRID_COLS);
        let blank = *grid.bar(5).unwrap();
        assert_eq!(blank.filled, 0);
        assert_eq!(blank.count, '-');

        grid.update(5, activity(CACHE_MAX, 1));
        let bar = grid.bar(5).unwrap();
        assert_eq!(bar.filled, grid.slots()[5].drawable_width());
        assert_eq!(bar.empty, 0);
        assert_eq!(bar.count, '1');

        // Out-of-range channels are ignored.
        grid.update(TOTAL_CHANNELS + 4, activity(1, 1));
        assert_eq!(grid.iter().count(), TOTAL_CHANNELS);
    }
}
