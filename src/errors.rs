//! Errors that can occur using this crate.
//!
//! The crate's code is designed in a way that functions/methods _can_ trigger all the enum variants
//! specified in the returned [`Result`]

use displaydoc::Display;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::io;

/// Possible errors while loading an object image.
///
/// Issues are malformed image files or errors while reading them from disk.
/// `Display` and `Debug` provide all necessary details.
#[rustfmt::skip]
#[expect(clippy::doc_markdown, reason = "using backticks as suggested would break displaydoc")]
#[derive(Display, PartialEq, Eq)]
pub enum LoadProgramError {
    /// Image is missing the leading origin word
    ImageMissingOrigin,
    /// Image is truncated mid-word, byte count {0} is not a multiple of 2
    ImageTruncatedMidWord(u64),
    /// Cannot read image from file '{file}': {message}
    ImageNotLoadable {
        file: String,
        message: String
    },
}
impl Debug for LoadProgramError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
impl Error for LoadProgramError {}

/// Possible errors during program execution.
///
/// `Display` and `Debug` provide all necessary details.
#[rustfmt::skip]
#[derive(Display, PartialEq, Eq)]
pub enum ExecutionError {
    /// The reserved opcode {0:#06b} was found which is not specified. Most probably an invalid program.
    ReservedInstructionFound(u8),
    /// Error during reading Stdin or writing program output to Stdout: {0}
    IOInputOutputError(String),
    /// Unknown trap routine found: {0:#06X}
    UnknownTrapRoutine(u16),
}
impl Debug for ExecutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
impl Error for ExecutionError {}

impl From<io::Error> for ExecutionError {
    fn from(error: io::Error) -> Self {
        Self::IOInputOutputError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    pub fn test_load_error_messages() {
        expect_that!(
            LoadProgramError::ImageMissingOrigin.to_string(),
            eq("Image is missing the leading origin word")
        );
        expect_that!(
            LoadProgramError::ImageTruncatedMidWord(7).to_string(),
            eq("Image is truncated mid-word, byte count 7 is not a multiple of 2")
        );
        expect_that!(
            LoadProgramError::ImageNotLoadable {
                file: "missing.obj".into(),
                message: "No such file or directory".into()
            }
            .to_string(),
            eq("Cannot read image from file 'missing.obj': No such file or directory")
        );
    }
    #[gtest]
    pub fn test_execution_error_messages() {
        expect_that!(
            ExecutionError::ReservedInstructionFound(0b1101).to_string(),
            eq("The reserved opcode 0b1101 was found which is not specified. \
                Most probably an invalid program.")
        );
        expect_that!(
            ExecutionError::UnknownTrapRoutine(0x26).to_string(),
            eq("Unknown trap routine found: 0x0026")
        );
    }
}
