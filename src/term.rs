use crate::{TermInt, Coords};
use crate::input::Key;
use crate::screen::ScreenBuffer;
use std::io::{self, Stdout, Write, stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{read, poll};
use log::{debug, error, info, warn};

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    current_msg: Option<Message>,
    active: bool,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;
        info!("Terminal size {}x{}", width, height);
        Ok(TermManager { width, height, stdout: stdout(), current_msg: None, active: false })
    }

    pub fn setup(&mut self) -> Result<()> {
        terminal::enable_raw_mode().context("Error entering raw mode")?;
        self.active = true;
        execute!(self.stdout, EnterAlternateScreen, cursor::Hide, cursor::DisableBlinking)
            .context("Error entering alternate screen")?;
        self.clear().context("Error clearing screen")?;
        Ok(())
    }

    /// Puts the terminal back the way it was found. Safe to call more than once.
    pub fn restore(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        let res = execute!(
            self.stdout,
            style::ResetColor,
            cursor::Show,
            cursor::EnableBlinking,
            LeaveAlternateScreen
        );
        if let Err(e) = res {
            error!("Error leaving alternate screen: {}", e);
        }
        if let Err(e) = terminal::disable_raw_mode() {
            error!("Error leaving raw mode: {}", e);
        }
        debug!("Terminal restored");
    }

    /// Playing field size: the whole terminal minus the status row.
    pub fn board_size(&self) -> Coords {
        (self.width, self.height.saturating_sub(1))
    }

    /// Non-blocking; `Key::None` when nothing is pending.
    pub fn read_key(&self) -> Result<Key> {
        if poll(Duration::ZERO).context("Error polling input")? {
            return Ok(Key::from_event(&read().context("Error reading input")?));
        }

        Ok(Key::None)
    }

    /// Waits up to `timeout` for a key.
    pub fn wait_key(&self, timeout: Duration) -> Result<Key> {
        if poll(timeout).context("Error polling input")? {
            return Ok(Key::from_event(&read().context("Error reading input")?));
        }

        Ok(Key::None)
    }

    /// Erases `to_clear`, draws every visible cell and the status row. An output
    /// failure gets one recovery attempt followed by a full redraw.
    pub fn render(
        &mut self,
        buffer: &ScreenBuffer,
        to_clear: &[Coords],
        status: &str,
    ) -> Result<()> {
        if let Err(e) = self.draw(buffer, to_clear, status) {
            warn!("Render failed ({}), attempting terminal recovery", e);
            self.recover().context("Terminal recovery failed")?;
            self.draw(buffer, &[], status).context("Render failed after recovery")?;
            info!("Terminal recovered");
        }

        Ok(())
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        queue!(self.stdout, style::ResetColor)?;

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            self.print_at((top_left.0, *y), &" ".repeat(msg_width as usize))?;
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            self.print_at((top_left.0, y), &padded_line)?;
        }

        self.current_msg = Some(Message { width: msg_width, height: msg_height, top_left });
        self.flush()
    }

    /// Blanks the message box; the next frame repaints whatever was under it.
    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        queue!(self.stdout, style::ResetColor)?;
        let blank = " ".repeat(msg.width as usize);
        for y_diff in 0..msg.height {
            self.print_at((msg.top_left.0, msg.top_left.1 + y_diff), &blank)?;
        }

        self.flush()
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw(&mut self, buffer: &ScreenBuffer, to_clear: &[Coords], status: &str) -> io::Result<()> {
        queue!(self.stdout, style::ResetColor)?;
        for &pos in to_clear {
            self.print_at(pos, " ")?;
        }

        for (pos, cell) in buffer.visible_cells() {
            let fg = if cell.default_fg { Color::Reset } else { Color::AnsiValue(cell.fg) };
            let bg = if cell.default_bg { Color::Reset } else { Color::AnsiValue(cell.bg) };
            queue!(
                self.stdout,
                cursor::MoveTo(pos.0, pos.1),
                style::SetForegroundColor(fg),
                style::SetBackgroundColor(bg),
                style::Print(cell.ch)
            )?;
        }

        let status_row = buffer.height();
        if status_row < self.height {
            queue!(
                self.stdout,
                style::ResetColor,
                cursor::MoveTo(0, status_row),
                terminal::Clear(ClearType::CurrentLine),
                style::Print(status)
            )?;
        }

        queue!(self.stdout, cursor::Hide)?;
        self.stdout.flush()
    }

    fn recover(&mut self) -> io::Result<()> {
        execute!(
            self.stdout,
            style::ResetColor,
            terminal::Clear(ClearType::All),
            EnterAlternateScreen,
            cursor::Hide
        )
    }

    fn clear(&mut self) -> io::Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))
    }

    fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing")
    }

    fn print_at(&mut self, pos: Coords, text: &str) -> io::Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(text))
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        self.restore();
    }
}
