//! Grid rendering.
//!
//! ```text
//! Scanning for 27 seconds at 1 Mbps                          sweep 14
//! 2400 ═════────────── 2  2421 ─────────────── -  2442 ...
//! 2401 ─────────────── -  2422 ═══════════════ F  2443 ...
//! ...
//! ```
//!
//! Row 0 is the countdown plus the completed sweep count, grid row `r` is
//! drawn on terminal row `r + 1`.

use nrfscan_core::{ScanView, SlotStyle};
use ratatui::{prelude::*, widgets::*};

pub fn draw(f: &mut Frame, view: &ScanView<'_>) {
    let area = f.area();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    f.render_widget(
        Paragraph::new(view.header()).style(Style::default().bold()),
        rows[0],
    );
    f.render_widget(
        Paragraph::new(format!("sweep {}", view.sweeps))
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Right),
        rows[0],
    );
    f.render_widget(ChannelGrid { view }, rows[1]);
}

fn slot_color(style: SlotStyle) -> Color {
    match style {
        SlotStyle::Even => Color::Yellow,
        SlotStyle::Odd => Color::White,
    }
}

/// The channel slots, one fixed cell range each.
pub struct ChannelGrid<'a> {
    pub view: &'a ScanView<'a>,
}

impl Widget for ChannelGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (slot, bar) in self.view.grid.iter() {
            // Terminals too short or narrow for the grid just lose slots.
            let Ok(row) = u16::try_from(slot.row) else {
                continue;
            };
            if row >= area.height || slot.x >= area.width {
                continue;
            }
            let y = area.y + row;
            let x = area.x + slot.x;
            let room = (area.width - slot.x).min(slot.width) as usize;
            let base = Style::default().fg(slot_color(slot.style));

            let (x, room) = put(buf, x, y, &slot.label, room, base);
            let (x, room) = put(
                buf,
                x,
                y,
                &bar.filled_text(),
                room,
                base.fg(Color::Magenta),
            );
            put(buf, x, y, &bar.tail_text(), room, base);
        }
    }
}

/// Write at most `room` columns and return where the text ended.
fn put(buf: &mut Buffer, x: u16, y: u16, text: &str, room: usize, style: Style) -> (u16, usize) {
    if room == 0 {
        return (x, 0);
    }
    let (end, _) = buf.set_stringn(x, y, text, room, style);
    let used = (end - x) as usize;
    (end, room - used)
}
