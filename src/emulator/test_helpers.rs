//! Shared fixtures for the unit tests: scripted keyboard input, captured
//! output and object-image builders.

use crate::hardware::keyboard::KeyboardInputProvider;
use crate::hardware::memory::Memory;
use std::collections::VecDeque;
use std::io;
use std::io::Write;

/// Keyboard device fed from a fixed byte script instead of the terminal.
pub struct ScriptedInputProvider {
    bytes: VecDeque<u8>,
}
impl ScriptedInputProvider {
    pub fn empty() -> Self {
        Self {
            bytes: VecDeque::new(),
        }
    }
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.iter().copied().collect(),
        }
    }
}
impl KeyboardInputProvider for ScriptedInputProvider {
    fn check_input_available(&mut self) -> io::Result<bool> {
        Ok(!self.bytes.is_empty())
    }
    fn get_input_byte(&mut self) -> io::Result<u8> {
        self.bytes.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "scripted input exhausted")
        })
    }
}

/// Output sink collecting everything the machine writes.
pub struct StringWriter {
    vec: Vec<u8>,
}
impl Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.vec.write(data)
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
impl StringWriter {
    pub fn new() -> Self {
        let vec = Vec::<u8>::with_capacity(120);
        Self { vec }
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.vec.clone()).unwrap()
    }
}

/// Builds an object image in the on-disk format: big-endian words, origin
/// first.
pub fn image(origin: u16, words: &[u16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 + words.len() * 2);
    bytes.extend_from_slice(&origin.to_be_bytes());
    for word in words {
        bytes.extend_from_slice(&word.to_be_bytes());
    }
    bytes
}

/// Memory preloaded with `words` at `origin` and no scripted input.
pub fn memory_with_words(origin: u16, words: &[u16]) -> Memory<ScriptedInputProvider> {
    let mut memory = Memory::new(ScriptedInputProvider::empty());
    memory
        .load_image(&image(origin, words))
        .expect("Error loading test image");
    memory
}
