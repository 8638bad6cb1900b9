//! Terminal screen for the live scan.
//!
//! The scan loop owns the pace: every draw renders one frame, keeps a copy of
//! it for the exit snapshot, and drains pending key presses without waiting.

use std::io;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::buffer::Buffer;
use ratatui::prelude::*;

use nrfscan_core::{ScanView, Screen};

pub struct TerminalScreen {
    terminal: Option<Terminal<CrosstermBackend<io::Stdout>>>,
    /// Set once entering starts, cleared by a completed restore.
    active: bool,
    last_frame: Option<Buffer>,
    abort: Arc<AtomicBool>,
}

impl TerminalScreen {
    /// `abort` is raised when the user presses `q`, Esc or Ctrl+C.
    pub fn new(abort: Arc<AtomicBool>) -> Self {
        Self {
            terminal: None,
            active: false,
            last_frame: None,
            abort,
        }
    }

    fn handle_key(&self, code: KeyCode, modifiers: KeyModifiers) {
        let quit = match code {
            KeyCode::Char('q') | KeyCode::Esc => true,
            KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
            _ => false,
        };
        if quit {
            self.abort.store(true, Ordering::Relaxed);
        }
    }

    fn poll_keys(&self) -> io::Result<()> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key.code, key.modifiers);
            }
        }
        Ok(())
    }
}

impl Screen for TerminalScreen {
    fn enter(&mut self) -> io::Result<()> {
        self.active = true;
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Restore the terminal before the panic message is printed.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        self.terminal = Some(terminal);
        Ok(())
    }

    fn width(&self) -> u16 {
        self.terminal
            .as_ref()
            .and_then(|t| t.size().ok())
            .map(|size| size.width)
            .unwrap_or(0)
    }

    fn draw(&mut self, view: &ScanView<'_>) -> io::Result<()> {
        let Some(terminal) = self.terminal.as_mut() else {
            return Err(io::Error::other("screen not entered"));
        };
        let frame = terminal.draw(|f| super::ui::draw(f, view))?;
        self.last_frame = Some(frame.buffer.clone());
        self.poll_keys()
    }

    fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        // take_hook panics while unwinding, and the hook has already run then.
        if self.terminal.take().is_some() && !std::thread::panicking() {
            let _ = std::panic::take_hook(); // remove our hook
        }
        disable_raw_mode()?;
        execute!(
            io::stdout(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )
    }

    fn read_line(&self, row: u16) -> Option<String> {
        let buf = self.last_frame.as_ref()?;
        if row >= buf.area.height {
            return None;
        }
        let line: String = (0..buf.area.width)
            .filter_map(|x| buf.cell((buf.area.x + x, buf.area.y + row)))
            .map(|cell| cell.symbol())
            .collect();
        Some(line.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nrfscan_core::{DataRate, GRID_COLS, GRID_ROWS, Grid, TOTAL_CHANNELS};
    use ratatui::backend::TestBackend;

    fn screen() -> (TerminalScreen, Arc<AtomicBool>) {
        let abort = Arc::new(AtomicBool::new(false));
        (TerminalScreen::new(Arc::clone(&abort)), abort)
    }

    #[test]
    fn test_quit_keys_raise_abort() {
        for (code, modifiers) in [
            (KeyCode::Char('q'), KeyModifiers::NONE),
            (KeyCode::Esc, KeyModifiers::NONE),
            (KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let (screen, abort) = screen();
            screen.handle_key(code, modifiers);
            assert!(abort.load(Ordering::Relaxed), "{code:?}");
        }
    }

    #[test]
    fn test_other_keys_ignored() {
        let (screen, abort) = screen();
        screen.handle_key(KeyCode::Char('c'), KeyModifiers::NONE);
        screen.handle_key(KeyCode::Char('x'), KeyModifiers::NONE);
        screen.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert!(!abort.load(Ordering::Relaxed));
    }

    #[test]
    fn test_restore_without_enter_is_noop() {
        let (mut screen, _) = screen();
        assert!(screen.restore().is_ok());
        assert!(screen.restore().is_ok());
    }

    #[test]
    fn test_draw_before_enter_fails() {
        let (mut screen, _) = screen();
        let grid = Grid::new(TOTAL_CHANNELS, 120, GRID_ROWS, GRID_COLS);
        let view = ScanView {
            grid: &grid,
            data_rate: DataRate::Mbps1,
            remaining: Duration::from_secs(3),
            channel: 0,
            sweeps: 0,
        };
        assert!(screen.draw(&view).is_err());
        assert_eq!(screen.width(), 0);
    }

    #[test]
    fn test_read_line_from_last_frame() {
        let (mut screen, _) = screen();
        assert_eq!(screen.read_line(0), None);

        let grid = Grid::new(TOTAL_CHANNELS, 120, GRID_ROWS, GRID_COLS);
        let view = ScanView {
            grid: &grid,
            data_rate: DataRate::Kbps250,
            remaining: Duration::from_secs(9),
            channel: 0,
            sweeps: 0,
        };
        let mut terminal = Terminal::new(TestBackend::new(120, 22)).unwrap();
        terminal.draw(|f| super::super::ui::draw(f, &view)).unwrap();
        screen.last_frame = Some(terminal.backend().buffer().clone());

        let header = screen.read_line(0).unwrap();
        assert!(header.starts_with("Scanning for 9 seconds at 250 kbps"), "{header}");
        assert!(screen.read_line(20).unwrap().starts_with("2419 "));
        assert!(screen.read_line(21).unwrap().starts_with("2420 "));
        assert_eq!(screen.read_line(22), None);
    }
}
