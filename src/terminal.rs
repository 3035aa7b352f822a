//! Crossterm front-end: raw-mode screen and key decoding.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use asciicraft_input::Key;
use asciicraft_render::{Cell, DepthClass, Frame, RenderSink};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::{cursor, queue, terminal};

/// Rows below the grid: status, examine and message lines.
pub const TEXT_ROWS: u16 = 3;

/// Full-screen sink on stdout. Restores the terminal when dropped.
pub struct TerminalSink {
    out: Stdout,
    message: Option<String>,
}

impl TerminalSink {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        queue!(out, terminal::EnterAlternateScreen, cursor::Hide)?;
        out.flush()?;
        Ok(Self { out, message: None })
    }

    /// Grid size that fits the terminal, forced odd so the view origin has
    /// a centre cell.
    pub fn viewport() -> io::Result<(usize, usize)> {
        let (cols, rows) = terminal::size()?;
        let width = odd(cols as usize);
        let height = odd(rows.saturating_sub(TEXT_ROWS) as usize);
        Ok((width, height))
    }

    /// One-line message shown under the frame until replaced.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Draw a screen with no session.
    pub fn draw_idle(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0),
            Print("no open sessions, press q to quit")
        )?;
        self.draw_message(1)?;
        self.out.flush()
    }

    fn draw_message(&mut self, row: u16) -> io::Result<()> {
        if let Some(message) = &self.message {
            queue!(
                self.out,
                cursor::MoveTo(0, row),
                terminal::Clear(terminal::ClearType::CurrentLine),
                Print(message)
            )?;
        }
        Ok(())
    }
}

impl RenderSink for TerminalSink {
    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        queue!(self.out, terminal::Clear(terminal::ClearType::All))?;
        for (row, cells) in frame.rows().enumerate() {
            queue!(self.out, cursor::MoveTo(0, row as u16))?;
            for cell in cells {
                draw_cell(&mut self.out, cell)?;
            }
        }
        let below = frame.height() as u16;
        queue!(self.out, ResetColor, cursor::MoveTo(0, below), Print(&frame.status))?;
        if let Some(examine) = &frame.examine {
            queue!(self.out, cursor::MoveTo(0, below + 1), Print(examine))?;
        }
        self.draw_message(below + 2)?;
        self.out.flush()
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        let _ = queue!(self.out, ResetColor, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = self.out.flush();
        let _ = terminal::disable_raw_mode();
    }
}

fn draw_cell(out: &mut Stdout, cell: &Cell) -> io::Result<()> {
    let color = match (cell.marker, cell.depth) {
        (Some(_), _) => Color::Yellow,
        (None, DepthClass::Above) => Color::White,
        (None, DepthClass::Level) => Color::Grey,
        (None, DepthClass::Below(1)) => Color::DarkGrey,
        (None, DepthClass::Below(_)) => Color::DarkBlue,
        (None, DepthClass::Void) => Color::Black,
    };
    if cell.cursor {
        queue!(out, SetAttribute(Attribute::Reverse))?;
    }
    queue!(out, SetForegroundColor(color), Print(cell.display_glyph()))?;
    if cell.cursor {
        queue!(out, SetAttribute(Attribute::NoReverse))?;
    }
    Ok(())
}

fn odd(n: usize) -> usize {
    match n {
        0 => 1,
        n if n % 2 == 0 => n - 1,
        n => n,
    }
}

/// Next key press, waiting at most `timeout`.
pub fn poll_key(timeout: Duration) -> io::Result<Option<Key>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) => Ok(decode_key(key)),
        _ => Ok(None),
    }
}

/// Map a crossterm key event onto the bindings' key set.
pub fn decode_key(event: KeyEvent) -> Option<Key> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    match event.code {
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Key::Interrupt)
        }
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Esc => Some(Key::Esc),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_keys() {
        let press = |code, modifiers| KeyEvent::new(code, modifiers);
        assert_eq!(
            decode_key(press(KeyCode::Char('H'), KeyModifiers::SHIFT)),
            Some(Key::Char('H'))
        );
        assert_eq!(
            decode_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Key::Interrupt)
        );
        assert_eq!(decode_key(press(KeyCode::Tab, KeyModifiers::NONE)), Some(Key::Tab));
        assert_eq!(decode_key(press(KeyCode::Enter, KeyModifiers::NONE)), None);

        let mut release = press(KeyCode::Char('h'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(decode_key(release), None);
    }

    #[test]
    fn viewport_dimensions_are_odd() {
        assert_eq!(odd(80), 79);
        assert_eq!(odd(21), 21);
        assert_eq!(odd(0), 1);
    }
}
