//! Decoding of raw 16-bit instruction words.

use crate::numbers;
use std::fmt::{Debug, Formatter};

/// The sixteen behaviors selectable by the top four instruction bits.
///
/// `Rti` and `Reserved` are unused by this machine; encountering them stops
/// execution with a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Br,
    Add,
    Ld,
    St,
    Jsr,
    And,
    Ldr,
    Str,
    Rti,
    Not,
    Ldi,
    Sti,
    Jmp,
    Reserved,
    Lea,
    Trap,
}
impl Opcode {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0xF {
            0b0000 => Self::Br,
            0b0001 => Self::Add,
            0b0010 => Self::Ld,
            0b0011 => Self::St,
            0b0100 => Self::Jsr,
            0b0101 => Self::And,
            0b0110 => Self::Ldr,
            0b0111 => Self::Str,
            0b1000 => Self::Rti,
            0b1001 => Self::Not,
            0b1010 => Self::Ldi,
            0b1011 => Self::Sti,
            0b1100 => Self::Jmp,
            0b1101 => Self::Reserved,
            0b1110 => Self::Lea,
            _ => Self::Trap,
        }
    }
}

/// Wrapper for an LC-3 u16 instruction.
/// Operand fields are extracted lazily via the accessor methods.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

impl Instruction {
    /// Gives the value of only the specified bit range.
    ///
    /// # Parameters
    /// - `from`: starting index
    /// - `to`: end index (inclusive), must be greater or equal to `from`
    ///
    /// # Panics
    /// - asserts that to is greater or equal from and both are valid indexes
    #[must_use]
    pub fn get_bit_range(self, from: u8, to: u8) -> u16 {
        debug_assert!(
            to >= from,
            "wrong direction of from: {from:?} and to: {to:?}"
        );
        debug_assert!(
            (00..u16::BITS).contains(&u32::from(to)),
            "index: {to:?} to u16 is greater than maximum value {:?}",
            u16::BITS - 1
        );
        (self.0 >> from) & ((0b1 << (to - from + 1)) - 1)
    }
    /// Gives the value of only the specified bit range and converts that to u8.
    /// See [`Instruction::get_bit_range()`]
    /// # Panics
    /// - value does not fit into u8 with message from `expect`
    #[must_use]
    pub fn get_bit_range_u8(self, from: u8, to: u8, expect: &str) -> u8 {
        u8::try_from(self.get_bit_range(from, to)).expect(expect)
    }
    #[must_use]
    pub fn get_bit(self, index: u8) -> bool {
        self.get_bit_range(index, index) & 1 != 0
    }
    #[must_use]
    pub const fn opcode(self) -> Opcode {
        Opcode::from_bits((self.0 >> 12) as u8)
    }
    #[must_use]
    pub fn op_code_bits(self) -> u8 {
        self.get_bit_range_u8(12, 15, "Error parsing op_code")
    }
    #[must_use]
    pub fn dr_number(self) -> u8 {
        self.get_bit_range_u8(9, 11, "Error parsing dr")
    }
    #[must_use]
    pub fn sr1_number(self) -> u8 {
        self.get_bit_range_u8(6, 8, "Error parsing sr1")
    }
    #[must_use]
    pub fn sr2_number(self) -> u8 {
        self.get_bit_range_u8(0, 2, "Error parsing sr2")
    }
    /// Base register of JMP, JSRR, LDR and STR, sharing the SR1 field.
    #[must_use]
    pub fn base_r_number(self) -> u8 {
        self.get_bit_range_u8(6, 8, "Error parsing base register")
    }
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.get_bit(5)
    }
    #[must_use]
    pub fn get_immediate(self) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, 4), 5)
    }
    /// JSR uses PC-relative addressing when bit 11 is set, JSRR the base
    /// register otherwise.
    #[must_use]
    pub fn is_jsr_offset(self) -> bool {
        self.get_bit(11)
    }
    /// Offset to add to the program counter, as the 16-bit representation of
    /// the signed `len`-bit field. Addition wraps modulo 2^16.
    #[must_use]
    pub fn pc_offset(self, len: u8) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, len - 1), len)
    }
    /// Service routine selector of the TRAP instruction.
    #[must_use]
    pub fn trap_vector(self) -> u16 {
        self.get_bit_range(0, 7)
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Op: {:04b} ({:?}), DR: {:03b}, PC_Off: {:09b}",
            self.op_code_bits(),
            self.opcode(),
            self.dr_number(),
            self.get_bit_range(0, 8)
        )
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}
