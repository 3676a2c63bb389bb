//! Terminal area holding a revealed entry.
//!
//! On a terminal the entry is drawn on the alternate screen, so leaving it
//! takes the secret off the display and out of the scrollback.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};

pub struct RevealScreen<W: Write> {
    out: W,
    alternate: bool,
    shown: bool,
}

impl<W: Write> RevealScreen<W> {
    /// `alternate` must only be set when `out` is a terminal.
    pub fn new(out: W, alternate: bool) -> Self {
        Self {
            out,
            alternate,
            shown: false,
        }
    }

    /// Whether [`hide`](Self::hide) removes what [`show`](Self::show) wrote.
    pub fn can_hide(&self) -> bool {
        self.alternate
    }

    pub fn show(&mut self, lines: &[&str]) -> io::Result<()> {
        if self.alternate && !self.shown {
            execute!(self.out, EnterAlternateScreen, MoveTo(0, 0))?;
            self.shown = true;
        }
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush()
    }

    /// Wipe the alternate screen and return to the normal one.
    pub fn hide(&mut self) -> io::Result<()> {
        if !self.shown {
            return Ok(());
        }
        self.shown = false;
        queue!(self.out, Clear(ClearType::All), LeaveAlternateScreen)?;
        self.out.flush()
    }
}

impl<W: Write> Drop for RevealScreen<W> {
    fn drop(&mut self) {
        let _ = self.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTER: &str = "\u{1b}[?1049h";
    const LEAVE: &str = "\u{1b}[?1049l";
    const CLEAR_ALL: &str = "\u{1b}[2J";

    #[test]
    fn test_hide_clears_and_leaves_alternate_screen() {
        let mut buf = Vec::new();
        let mut screen = RevealScreen::new(&mut buf, true);
        screen.show(&["s3cret", "url: example.com"]).unwrap();
        screen.hide().unwrap();
        drop(screen);

        let out = String::from_utf8(buf).unwrap();
        let shown = out.find("s3cret").unwrap();
        assert!(out.find(ENTER).unwrap() < shown);
        let cleared = out.rfind(CLEAR_ALL).unwrap();
        assert!(cleared > shown);
        assert!(out.ends_with(LEAVE));
        assert_eq!(out.matches(LEAVE).count(), 1);
    }

    #[test]
    fn test_drop_hides_shown_entry() {
        let mut buf = Vec::new();
        {
            let mut screen = RevealScreen::new(&mut buf, true);
            screen.show(&["s3cret"]).unwrap();
        }

        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains(CLEAR_ALL));
        assert!(out.ends_with(LEAVE));
    }

    #[test]
    fn test_plain_output_has_no_escapes() {
        let mut buf = Vec::new();
        {
            let mut screen = RevealScreen::new(&mut buf, false);
            assert!(!screen.can_hide());
            screen.show(&["s3cret"]).unwrap();
            screen.hide().unwrap();
        }

        assert_eq!(String::from_utf8(buf).unwrap(), "s3cret\n");
    }
}
