//! # LC-3 virtual machine.
//!
//! `lc3-vm` executes object images for the LC-3, a 16-bit educational
//! computer architecture. A program image is loaded into the 65,536-word
//! address space and run instruction by instruction, with memory mapped
//! keyboard input and character output on the controlling terminal, until
//! the program requests a halt.
//!
//! The machine is generic over its input and output devices, so programs
//! can be driven by the real terminal (see [`emulator::from_image_file`])
//! or by scripted devices in tests.
//!
//!  # Example
//! ```
//! use lc3_vm::Emulator;
//! use lc3_vm::hardware::TerminalInputProvider;
//!
//! let mut emu = Emulator::new(TerminalInputProvider::new(), std::io::sink());
//! // origin 0x3000 followed by a single TRAP x25 (HALT), big-endian
//! emu.load_image(&[0x30, 0x00, 0xF0, 0x25]).unwrap();
//! emu.execute().unwrap();
//! ```
//! # Errors
//! - Loading fails on empty or mid-word-truncated images and unreadable
//!   files, see [`errors::LoadProgramError`]
//! - Execution stops on reserved opcodes, unknown trap vectors and terminal
//!   I/O failures, see [`errors::ExecutionError`]

pub mod emulator;
pub mod errors;
pub mod hardware;
pub mod numbers;
pub mod terminal;

pub use emulator::Emulator;
