//! Keyboard input device attached to the memory bus.
//!
//! The machine core only consumes the two capabilities of
//! [`KeyboardInputProvider`]: a non-blocking probe used by the memory mapped
//! status register and a blocking single-byte read used by the probe hit and
//! the input trap routines.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, poll, read};
use std::io;
use std::time::Duration;

pub trait KeyboardInputProvider {
    /// Non-blocking probe whether a key press is waiting.
    ///
    /// A probe that reports `true` must leave the key available for the next
    /// [`KeyboardInputProvider::get_input_byte`] call.
    ///
    /// # Errors
    /// - Reading terminal events failed
    fn check_input_available(&mut self) -> io::Result<bool>;
    /// Blocks until one key press is available and returns it as a byte.
    ///
    /// # Errors
    /// - Reading terminal events failed
    fn get_input_byte(&mut self) -> io::Result<u8>;
}

/// Keyboard input read from the controlling terminal via crossterm events.
pub struct TerminalInputProvider {
    available_byte: Option<u8>,
}
impl TerminalInputProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            available_byte: None,
        }
    }
}
impl Default for TerminalInputProvider {
    fn default() -> Self {
        Self::new()
    }
}
impl KeyboardInputProvider for TerminalInputProvider {
    fn check_input_available(&mut self) -> io::Result<bool> {
        if self.available_byte.is_some() {
            return Ok(true);
        }
        // zero timeout: a tight KBSR polling loop must not stall
        while poll(Duration::from_secs(0))? {
            if let Some(event) = read()?.as_key_event()
                && let Some(b) = key_event_byte(event)
            {
                self.available_byte = Some(b);
                return Ok(true);
            }
        }
        Ok(false)
    }
    fn get_input_byte(&mut self) -> io::Result<u8> {
        if let Some(b) = self.available_byte.take() {
            return Ok(b);
        }
        loop {
            if let Some(event) = read()?.as_key_event()
                && let Some(b) = key_event_byte(event)
            {
                return Ok(b);
            }
        }
    }
}

/// Maps a key press to the byte an LC-3 program expects to read.
///
/// Key releases and keys without a byte representation (modifiers, function
/// and cursor keys) are dropped.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the char is checked to be ASCII before the cast"
)]
fn key_event_byte(event: KeyEvent) -> Option<u8> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    match event.code {
        KeyCode::Enter => Some(b'\n'),
        KeyCode::Tab => Some(b'\t'),
        KeyCode::Backspace => Some(0x08),
        KeyCode::Esc => Some(0x1B),
        code => code.as_char().filter(char::is_ascii).map(|c| c as u8),
    }
}
