//! Scoped release of the radio and the screen.
//!
//! Both guards release exactly once: either explicitly through `release`, or
//! on drop when an error or panic unwinds past them.

use log::warn;

use crate::radio::Radio;
use crate::screen::Screen;

/// Powers the radio down when released or dropped.
pub struct RadioGuard<'a, R: Radio + ?Sized> {
    radio: &'a mut R,
    released: bool,
}

impl<'a, R: Radio + ?Sized> RadioGuard<'a, R> {
    pub fn new(radio: &'a mut R) -> Self {
        Self {
            radio,
            released: false,
        }
    }

    pub fn radio(&mut self) -> &mut R {
        self.radio
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.radio.power_down() {
            warn!("{}: power down failed: {e}", self.radio.name());
        }
    }
}

impl<R: Radio + ?Sized> Drop for RadioGuard<'_, R> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Restores the terminal when released or dropped.
pub struct ScreenGuard<'a, S: Screen + ?Sized> {
    screen: &'a mut S,
    released: bool,
}

impl<'a, S: Screen + ?Sized> ScreenGuard<'a, S> {
    pub fn new(screen: &'a mut S) -> Self {
        Self {
            screen,
            released: false,
        }
    }

    pub fn screen(&mut self) -> &mut S {
        self.screen
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.screen.restore() {
            warn!("failed to restore terminal: {e}");
        }
    }
}

impl<S: Screen + ?Sized> Drop for ScreenGuard<'_, S> {
    fn drop(&mut self) {
        self.release();
    }
}
