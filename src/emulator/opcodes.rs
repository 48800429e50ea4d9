//! Implemented operations for the LC-3.
//!
//! All program counter relative displacements are measured from the already
//! incremented PC, i.e. from the instruction following the current one. All
//! address arithmetic wraps modulo 2^16.
use crate::emulator::instruction::Instruction;
use crate::errors::ExecutionError;
use crate::hardware::keyboard::KeyboardInputProvider;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Register, Registers, from_binary};

/// ADD: Mathematical addition in 2 variants
/// - DR is set with result of SR 1 + SR 2
/// ```text
///  15__12__11_9__8_6___5___4_3__2_0_
/// | 0001 |  DR | SR1 | 0 | 00 | SR2 |
///  ---------------------------------
/// ```
/// - DR is set with result of SR 1 + sign extended immediate
/// ```text
///  15__12__11_9__8_6___5___4___0_
/// | 0001 |  DR | SR1 | 1 |  IMM5 |
///  ------------------------------
/// ```
#[allow(
    clippy::cast_possible_truncation,
    reason = "truncation is what is specified for the LC-3 add opcode"
)]
pub fn add(i: Instruction, r: &mut Registers) {
    r.set(
        i.dr_number(),
        from_binary(
            (r.get(i.sr1_number()).as_binary_u32()
                + (if i.is_immediate() {
                    u32::from(i.get_immediate())
                } else {
                    r.get(i.sr2_number()).as_binary_u32()
                })) as u16,
        ),
    );
    r.update_conditional_register(i.dr_number());
}
/// AND: bit-wise AND in 2 variants
/// - DR is set with result of SR 1 AND SR 2
/// ```text
///  15__12__11_9__8_6___5___4_3__2_0_
/// | 0101 |  DR | SR1 | 0 | 00 | SR2 |
///  ---------------------------------
/// ```
/// - DR is set with result of SR 1 AND sign extended immediate
/// ```text
///  15__12__11_9__8_6___5___4___0_
/// | 0101 |  DR | SR1 | 1 |  IMM5 |
///  ------------------------------
/// ```
pub fn and(i: Instruction, r: &mut Registers) {
    r.set(
        i.dr_number(),
        from_binary(
            r.get(i.sr1_number()).as_binary()
                & (if i.is_immediate() {
                    i.get_immediate()
                } else {
                    r.get(i.sr2_number()).as_binary()
                }),
        ),
    );
    r.update_conditional_register(i.dr_number());
}

/// NOT: bit-wise complement of the value in SR 1
/// ```text
///  15__12__11_9__8_6___5___0_
/// | 1001 |  DR | SR1 | 11111 |
///  --------------------------
/// ```
pub fn not(i: Instruction, r: &mut Registers) {
    r.set(
        i.dr_number(),
        from_binary(!r.get(i.sr1_number()).as_binary()),
    );
    r.update_conditional_register(i.dr_number());
}
/// BR: Conditional Branch
/// Adds the sign extended offset to PC if the current condition flag matches
/// a set bit of `n`, `z` or `p`. An all-zero mask never branches.
/// ```text
///  15__12__11_9___8_______0_
/// | 0000 |  nzp | PCoffset9 |
///  -------------------------
/// ```
/// See [`crate::hardware::registers::ConditionFlag`]
pub fn br(i: Instruction, r: &mut Registers) {
    let mask = i.get_bit_range(9, 11);
    if mask & r.get_conditional_register().as_bits() != 0 {
        r.set_pc(address_by_offset(r.pc(), i.pc_offset(9)));
    }
}
/// JMP/RET: Unconditional jump to the address in the base register.
/// RET is the special case with base register 7.
/// ```text
///  15__12__11_9__8___6___5____0_
/// | 1100 | 000 | BaseR | 000000 |
///  -----------------------------
/// ```
pub fn jmp(i: Instruction, r: &mut Registers) {
    r.set_pc(r.get(i.base_r_number()).as_binary());
}
/// JSR/JSRR: Jump to subroutine, saving the return address in R7.
/// - PC relative target when bit 11 is set
/// ```text
///  15__12__11___10________0_
/// | 0100 |  1 | PCoffset11 |
///  -------------------------
/// ```
/// - target from base register otherwise
/// ```text
///  15__12__11_9__8___6___5____0_
/// | 0100 | 000 | BaseR | 000000 |
///  -----------------------------
/// ```
pub fn jsr(i: Instruction, r: &mut Registers) {
    r.set(7, r.pc());
    if i.is_jsr_offset() {
        r.set_pc(address_by_offset(r.pc(), i.pc_offset(11)));
    } else {
        r.set_pc(r.get(i.base_r_number()).as_binary());
    }
}
/// LD: Loads content of memory address of PC + sign extended offset into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 0010 |  DR  | PCoffset9 |
///  -------------------------
/// ```
pub fn ld<K: KeyboardInputProvider>(
    i: Instruction,
    r: &mut Registers,
    memory: &mut Memory<K>,
) -> Result<(), ExecutionError> {
    let value = memory.read(address_by_offset(r.pc(), i.pc_offset(9)))?;
    r.set(i.dr_number(), from_binary(value));
    r.update_conditional_register(i.dr_number());
    Ok(())
}

/// LDI: Load indirect.
/// Calculates memory address of PC + sign extended offset and reads another
/// address from there, the content of the memory at that indirectly loaded
/// address is put into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 1010 |  DR  | PCoffset9 |
///  -------------------------
/// ```
pub fn ldi<K: KeyboardInputProvider>(
    i: Instruction,
    r: &mut Registers,
    memory: &mut Memory<K>,
) -> Result<(), ExecutionError> {
    let value_address = memory.read(address_by_offset(r.pc(), i.pc_offset(9)))?;
    let value = memory.read(value_address)?;
    r.set(i.dr_number(), from_binary(value));
    r.update_conditional_register(i.dr_number());
    Ok(())
}
/// LDR: Load address from base register and adds sign extended offset to
/// load the memory content from there into DR.
/// ```text
///  15__12__11_9__8___6____5____0_
/// | 0110 |  DR | BaseR | offset6 |
///  ------------------------------
/// ```
pub fn ldr<K: KeyboardInputProvider>(
    i: Instruction,
    r: &mut Registers,
    memory: &mut Memory<K>,
) -> Result<(), ExecutionError> {
    let value_address = address_by_offset(r.get(i.base_r_number()), i.pc_offset(6));
    let value = memory.read(value_address)?;
    r.set(i.dr_number(), from_binary(value));
    r.update_conditional_register(i.dr_number());
    Ok(())
}

fn address_by_offset(r: Register, offset: u16) -> u16 {
    r.as_binary().wrapping_add(offset)
}

/// LEA: Load Effective Address loads PC + sign extended offset into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 1110 |  DR  | PCoffset9 |
///  -------------------------
/// ```
pub fn lea(i: Instruction, r: &mut Registers) {
    r.set(
        i.dr_number(),
        from_binary(address_by_offset(r.pc(), i.pc_offset(9))),
    );
    r.update_conditional_register(i.dr_number());
}
/// ST: Store. The contents of the SR are written to memory address PC + sign
/// extended offset.
/// ```text
///  15__12__11_9___8_______0_
/// | 0011 |  SR  | PCoffset9 |
///  -------------------------
/// ```
pub fn st<K: KeyboardInputProvider>(i: Instruction, r: &Registers, memory: &mut Memory<K>) {
    memory.write(
        address_by_offset(r.pc(), i.pc_offset(9)),
        r.get(i.dr_number()).as_binary(),
    );
}
/// STI: Store Indirect. The contents of the SR are written to the address
/// which is loaded from memory address PC + sign extended offset.
/// ```text
///  15__12__11_9___8_______0_
/// | 1011 |  SR  | PCoffset9 |
///  -------------------------
/// ```
pub fn sti<K: KeyboardInputProvider>(
    i: Instruction,
    r: &Registers,
    memory: &mut Memory<K>,
) -> Result<(), ExecutionError> {
    let target = memory.read(address_by_offset(r.pc(), i.pc_offset(9)))?;
    memory.write(target, r.get(i.dr_number()).as_binary());
    Ok(())
}
/// STR: Store contents of SR to memory address of base register plus sign
/// extended offset.
/// ```text
///  15__12__11_9__8___6____5____0_
/// | 0111 |  SR | BaseR | offset6 |
///  ------------------------------
/// ```
pub fn str<K: KeyboardInputProvider>(i: Instruction, r: &Registers, memory: &mut Memory<K>) {
    memory.write(
        address_by_offset(r.get(i.base_r_number()), i.pc_offset(6)),
        r.get(i.dr_number()).as_binary(),
    );
}
