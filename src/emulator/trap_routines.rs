//! The trap service routines, implemented directly by the emulator instead
//! of by LC-3 code at the trap vector table targets.
//!
//! Dispatch is on the low 8 bits of the TRAP instruction after the return
//! address was saved in R7. Every routine that produces output flushes it so
//! interactive programs do not stall on buffered output.
use crate::emulator::instruction::Instruction;
use crate::errors::ExecutionError;
use crate::hardware::keyboard::KeyboardInputProvider;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Registers, from_binary};
use std::io;
use std::io::Write;
use std::ops::ControlFlow;

const TRAP_GETC: u16 = 0x20;
const TRAP_OUT: u16 = 0x21;
const TRAP_PUTS: u16 = 0x22;
const TRAP_IN: u16 = 0x23;
const TRAP_PUTSP: u16 = 0x24;
const TRAP_HALT: u16 = 0x25;

/// Saves the return address in R7 and runs the service routine selected by
/// the trap vector.
///
/// Unknown vectors stop the machine with
/// [`ExecutionError::UnknownTrapRoutine`].
pub fn trap<K: KeyboardInputProvider>(
    i: Instruction,
    regs: &mut Registers,
    memory: &mut Memory<K>,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    regs.set(7, regs.pc());
    match i.trap_vector() {
        TRAP_GETC => get_c(regs, memory),
        TRAP_OUT => out(regs, stdout),
        TRAP_PUTS => put_s(regs, memory, stdout),
        TRAP_IN => in_trap(regs, memory, stdout),
        TRAP_PUTSP => put_sp(regs, memory, stdout),
        TRAP_HALT => halt(stdout),
        vector => ControlFlow::Break(Err(ExecutionError::UnknownTrapRoutine(vector))),
    }
}

/// GETC: Read a single character from the keyboard. The character is not
/// echoed onto the console.
///
/// Its ASCII code is copied into R0, the condition flag follows R0.
pub fn get_c<K: KeyboardInputProvider>(
    regs: &mut Registers,
    memory: &mut Memory<K>,
) -> ControlFlow<Result<(), ExecutionError>> {
    match memory.read_key() {
        Ok(key) => {
            regs.set(0, from_binary(u16::from(key)));
            regs.update_conditional_register(0);
            ControlFlow::Continue(())
        }
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

/// IN: Print a prompt on the screen and read a single character echoed back
/// from the keyboard.
///
/// Otherwise, like 0x20 GETC.
pub fn in_trap<K: KeyboardInputProvider>(
    regs: &mut Registers,
    memory: &mut Memory<K>,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    write_bytes_out(b"Enter a character: ", stdout)?;
    let key = match memory.read_key() {
        Ok(key) => key,
        Err(e) => return wrap_io_error_in_cf(&e),
    };
    write_bytes_out(&[key], stdout)?;
    regs.set(0, from_binary(u16::from(key)));
    regs.update_conditional_register(0);
    ControlFlow::Continue(())
}

/// OUT: Write a character in R0\[7:0\] to the console display.
#[expect(
    clippy::cast_possible_truncation,
    reason = "only the low byte of R0 is written, per the OUT contract"
)]
pub fn out(regs: &Registers, stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    let c = (regs.get(0).as_binary() & 0xFF) as u8;
    write_bytes_out(&[c], stdout)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "one character per word is the PUTS packing"
)]
fn put_one_char_per_u16(input: u16, append_to: &mut Vec<u8>) {
    append_to.push(input as u8);
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "two characters per word is the PUTSP packing"
)]
fn put_two_chars_per_u16(input: u16, append_to: &mut Vec<u8>) {
    append_to.push(input as u8);
    let high = (input >> 8) as u8;
    if high != 0 {
        append_to.push(high);
    }
}

fn put<K: KeyboardInputProvider>(
    regs: &Registers,
    mem: &Memory<K>,
    stdout: &mut impl Write,
    handle_word: fn(u16, &mut Vec<u8>),
) -> ControlFlow<Result<(), ExecutionError>> {
    let mut address = regs.get(0).as_binary();
    let mut bytes = Vec::with_capacity(120);
    while mem[address] != 0 {
        handle_word(mem[address], &mut bytes);
        address = address.wrapping_add(1);
    }
    write_bytes_out(&bytes, stdout)
}

/// PUTS: print the zero-word-terminated string starting at the address in
/// R0, one character per word. The terminator is not written.
pub fn put_s<K: KeyboardInputProvider>(
    regs: &Registers,
    mem: &Memory<K>,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, stdout, put_one_char_per_u16)
}

/// PUTSP: Packed version of PUTS, two characters per word, low byte first.
///
/// A word with a zero high byte emits only its low byte; the string
/// continues at the next word and terminates only at an all-zero word.
pub fn put_sp<K: KeyboardInputProvider>(
    regs: &Registers,
    mem: &Memory<K>,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, stdout, put_two_chars_per_u16)
}

/// HALT: print the halt line and stop the fetch loop.
pub fn halt(stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    write_bytes_out(b"HALT\n", stdout)?;
    ControlFlow::Break(Ok(()))
}

fn write_bytes_out(
    bytes: &[u8],
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    match stdout.write_all(bytes).and_then(|()| stdout.flush()) {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

fn wrap_io_error_in_cf(error: &io::Error) -> ControlFlow<Result<(), ExecutionError>, ()> {
    ControlFlow::Break(Err(ExecutionError::IOInputOutputError(error.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::test_helpers::{ScriptedInputProvider, StringWriter, memory_with_words};
    use crate::hardware::registers::ConditionFlag;
    use googletest::prelude::*;

    fn check_register_value(regs: &Registers, idx: u8, expected: u16) {
        expect_that!(
            regs.get(idx).as_binary(),
            eq(expected),
            "{:?}",
            regs.get(idx)
        );
    }

    #[gtest]
    pub fn test_get_c() {
        let mut regs = Registers::new();
        let mut mem = Memory::new(ScriptedInputProvider::from_bytes(b"a"));
        let res = get_c(&mut regs, &mut mem);
        check_register_value(&regs, 0, u16::from(b'a'));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Pos));
        assert_that!(res, eq(&ControlFlow::Continue(())));
    }
    #[gtest]
    pub fn test_out() {
        let mut regs = Registers::new();
        let mut writer = StringWriter::new();
        regs.set(0, from_binary(u16::from(b'k')));
        let res = out(&regs, &mut writer);
        assert!(res.is_continue());
        assert_that!(writer.get_string(), eq("k"));
    }
    #[gtest]
    pub fn test_out_writes_only_low_byte() {
        let mut regs = Registers::new();
        let mut writer = StringWriter::new();
        regs.set(0, from_binary(0x0141)); // high byte must be dropped
        let res = out(&regs, &mut writer);
        assert!(res.is_continue());
        assert_that!(writer.get_string(), eq("A"));
    }
    #[gtest]
    pub fn test_put_s() {
        let mut regs = Registers::new();
        let mut writer = StringWriter::new();
        let mem = memory_with_words(
            0x4000,
            &[u16::from(b'H'), u16::from(b'i'), u16::from(b'!'), 0],
        );
        regs.set(0, from_binary(0x4000));
        regs.set(3, from_binary(1));
        regs.update_conditional_register(3);
        let res = put_s(&regs, &mem, &mut writer);
        assert!(res.is_continue());
        assert_that!(writer.get_string(), eq("Hi!"));
        // string output leaves the condition flag alone
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Pos));
    }
    #[gtest]
    pub fn test_put_sp() {
        let mut regs = Registers::new();
        let mut writer = StringWriter::new();
        let data = [
            0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF, 0x6548u16, 0x6c6c, 0x206f, 0x6f57, 0x6c72,
            0x2164, 0x0000,
        ];
        let mem = memory_with_words(0x3000, &data);
        regs.set(0, from_binary(0x3005));
        let res = put_sp(&regs, &mem, &mut writer);
        assert!(res.is_continue());
        assert_that!(writer.get_string(), eq("Hello World!"));
    }
    #[gtest]
    pub fn test_put_sp_zero_high_byte_continues() {
        let mut regs = Registers::new();
        let mut writer = StringWriter::new();
        // "ab", then a word holding only 'c', then "de", then the terminator
        let mem = memory_with_words(0x3000, &[0x6261, 0x0063, 0x6564, 0x0000]);
        regs.set(0, from_binary(0x3000));
        let res = put_sp(&regs, &mem, &mut writer);
        assert!(res.is_continue());
        assert_that!(writer.get_string(), eq("abcde"));
    }
    #[gtest]
    pub fn test_in() {
        let mut regs = Registers::new();
        let mut writer = StringWriter::new();
        let mut mem = Memory::new(ScriptedInputProvider::from_bytes(b"ab"));

        let res = in_trap(&mut regs, &mut mem, &mut writer);
        assert!(res.is_continue());
        check_register_value(&regs, 0, u16::from(b'a'));

        let res = in_trap(&mut regs, &mut mem, &mut writer);
        assert!(res.is_continue());
        check_register_value(&regs, 0, u16::from(b'b'));

        expect_that!(
            writer.get_string(),
            eq("Enter a character: aEnter a character: b")
        );
    }
    #[gtest]
    pub fn test_halt() {
        let mut writer = StringWriter::new();
        let res = halt(&mut writer);
        assert_that!(res, eq(&ControlFlow::Break(Ok(()))));
        assert_that!(writer.get_string(), eq("HALT\n"));
    }
    #[gtest]
    pub fn test_trap_saves_return_address_and_rejects_unknown_vector() {
        let mut regs = Registers::new();
        let mut writer = StringWriter::new();
        let mut mem = Memory::new(ScriptedInputProvider::empty());
        regs.set_pc(0x3001);
        let res = trap(0xF026.into(), &mut regs, &mut mem, &mut writer);
        check_register_value(&regs, 7, 0x3001);
        assert_that!(
            res,
            eq(&ControlFlow::Break(Err(ExecutionError::UnknownTrapRoutine(
                0x26
            ))))
        );
    }
}
