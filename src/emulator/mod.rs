//! The machine: architectural state plus the fetch/decode/execute loop.

pub mod instruction;
pub mod opcodes;
#[cfg(test)]
pub mod test_helpers;
pub mod trap_routines;

use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::keyboard::{KeyboardInputProvider, TerminalInputProvider};
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use instruction::{Instruction, Opcode};
use std::fs;
use std::io;
use std::io::{Stdout, Write};
use std::ops::ControlFlow;
use std::path::Path;

/// An LC-3 machine wired to a keyboard input device and an output device.
///
/// All architectural state is owned by this value; independent machines do
/// not share anything, which keeps tests isolated from each other and from
/// the host terminal.
pub struct Emulator<K: KeyboardInputProvider, W: Write> {
    pub(crate) memory: Memory<K>,
    pub(crate) registers: Registers,
    pub(crate) output: W,
}

impl<K: KeyboardInputProvider, W: Write> Emulator<K, W> {
    /// A machine in power-on state: zeroed memory and registers, PC at
    /// `0x3000`.
    pub fn new(keyboard: K, output: W) -> Self {
        Self {
            memory: Memory::new(keyboard),
            registers: Registers::new(),
            output,
        }
    }

    /// Loads one object image into memory, see
    /// [`Memory::load_image`](crate::hardware::memory::Memory::load_image).
    ///
    /// # Errors
    /// - Image is empty or truncated mid-word
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), LoadProgramError> {
        self.memory.load_image(image)
    }

    /// Reads an object image file and loads it into memory.
    ///
    /// # Errors
    /// - File cannot be read
    /// - Image is empty or truncated mid-word
    pub fn load_image_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadProgramError> {
        let path = path.as_ref();
        let image = fs::read(path).map_err(|e| LoadProgramError::ImageNotLoadable {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.load_image(&image)
    }

    /// Runs the fetch loop until the program halts or an error stops it.
    ///
    /// # Errors
    /// - A reserved opcode or unknown trap vector was executed
    /// - Terminal I/O failed
    pub fn execute(&mut self) -> Result<(), ExecutionError> {
        loop {
            if let ControlFlow::Break(result) = self.step() {
                return result;
            }
        }
    }

    /// Executes a single instruction.
    ///
    /// The PC is incremented before the instruction runs, so PC-relative
    /// displacements are measured from the following instruction.
    pub fn step(&mut self) -> ControlFlow<Result<(), ExecutionError>> {
        let address = self.registers.pc().as_binary();
        self.registers.inc_pc();
        let bits = match self.memory.read(address) {
            Ok(bits) => bits,
            Err(e) => return ControlFlow::Break(Err(e.into())),
        };
        let i = Instruction::from(bits);
        let result = match i.opcode() {
            Opcode::Br => {
                opcodes::br(i, &mut self.registers);
                Ok(())
            }
            Opcode::Add => {
                opcodes::add(i, &mut self.registers);
                Ok(())
            }
            Opcode::Ld => opcodes::ld(i, &mut self.registers, &mut self.memory),
            Opcode::St => {
                opcodes::st(i, &self.registers, &mut self.memory);
                Ok(())
            }
            Opcode::Jsr => {
                opcodes::jsr(i, &mut self.registers);
                Ok(())
            }
            Opcode::And => {
                opcodes::and(i, &mut self.registers);
                Ok(())
            }
            Opcode::Ldr => opcodes::ldr(i, &mut self.registers, &mut self.memory),
            Opcode::Str => {
                opcodes::str(i, &self.registers, &mut self.memory);
                Ok(())
            }
            Opcode::Not => {
                opcodes::not(i, &mut self.registers);
                Ok(())
            }
            Opcode::Ldi => opcodes::ldi(i, &mut self.registers, &mut self.memory),
            Opcode::Sti => opcodes::sti(i, &self.registers, &mut self.memory),
            Opcode::Jmp => {
                opcodes::jmp(i, &mut self.registers);
                Ok(())
            }
            Opcode::Lea => {
                opcodes::lea(i, &mut self.registers);
                Ok(())
            }
            Opcode::Rti | Opcode::Reserved => {
                Err(ExecutionError::ReservedInstructionFound(i.op_code_bits()))
            }
            Opcode::Trap => {
                return trap_routines::trap(
                    i,
                    &mut self.registers,
                    &mut self.memory,
                    &mut self.output,
                );
            }
        };
        match result {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => ControlFlow::Break(Err(e)),
        }
    }

    /// Restores the power-on register file without touching memory, so a
    /// loaded program can be run again.
    pub fn reset_registers(&mut self) {
        self.registers = Registers::new();
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }
    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }
    #[must_use]
    pub const fn memory(&self) -> &Memory<K> {
        &self.memory
    }
}

/// A machine wired to the controlling terminal with `path` already loaded.
///
/// # Errors
/// - File cannot be read
/// - Image is empty or truncated mid-word
pub fn from_image_file<P: AsRef<Path>>(
    path: P,
) -> Result<Emulator<TerminalInputProvider, Stdout>, LoadProgramError> {
    let mut emulator = Emulator::new(TerminalInputProvider::new(), io::stdout());
    emulator.load_image_file(path)?;
    Ok(emulator)
}
