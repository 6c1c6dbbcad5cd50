//! The 256-entry op code table.
//!
//! Every op code has an entry. The 151 documented op codes map to their
//! command, addressing mode and base cycle cost; the rest decode to
//! `Command::Unknown` / `AddressingMode::Unknown` with a cost of one cycle.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::cpu::addressing::AddressingMode;
use crate::cpu::addressing::AddressingMode::*;
use crate::cpu::command::Command;
use crate::cpu::command::Command::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    command: Command,
    addressing_mode: AddressingMode,
    op_code: u8,
    cycles: u8,
}

impl Instruction {
    /// Panics (at compile time, for the static table) on a zero cycle cost
    /// or on a branch without relative addressing.
    pub const fn new(op_code: u8, command: Command, addressing_mode: AddressingMode, cycles: u8) -> Self {
        assert!(cycles > 0, "an instruction takes at least one cycle");
        assert!(
            command.is_branch() == matches!(addressing_mode, AddressingMode::Relative),
            "branches and only branches use relative addressing"
        );
        Instruction {
            command,
            addressing_mode,
            op_code,
            cycles,
        }
    }

    const fn unknown(op_code: u8) -> Self {
        Instruction::new(op_code, Command::Unknown, AddressingMode::Unknown, 1)
    }

    /// Table lookup; total over all 256 op codes.
    pub fn decode(op_code: u8) -> &'static Instruction {
        &INSTRUCTIONS[op_code as usize]
    }

    pub const fn command(&self) -> Command {
        self.command
    }

    pub const fn addressing_mode(&self) -> AddressingMode {
        self.addressing_mode
    }

    pub const fn op_code(&self) -> u8 {
        self.op_code
    }

    /// Base cost before page-cross and branch penalties.
    pub const fn cycles(&self) -> u8 {
        self.cycles
    }

    /// Op code byte plus operand bytes.
    pub const fn bytes_to_read(&self) -> u8 {
        1 + self.addressing_mode.bytes_to_read()
    }

    pub const fn is_documented(&self) -> bool {
        !matches!(self.command, Command::Unknown)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${:02X} {} {:?} ({} cycles)",
            self.op_code, self.command, self.addressing_mode, self.cycles
        )
    }
}

const fn op(op_code: u8, command: Command, addressing_mode: AddressingMode, cycles: u8) -> Instruction {
    Instruction::new(op_code, command, addressing_mode, cycles)
}

const DOCUMENTED: [Instruction; 151] = [
    op(0x69, Adc, Immediate, 2),
    op(0x65, Adc, ZeroPage, 3),
    op(0x75, Adc, ZeroPageX, 4),
    op(0x6D, Adc, Absolute, 4),
    op(0x7D, Adc, AbsoluteX, 4),
    op(0x79, Adc, AbsoluteY, 4),
    op(0x61, Adc, IndexedIndirect, 6),
    op(0x71, Adc, IndirectIndexed, 5),

    op(0x29, And, Immediate, 2),
    op(0x25, And, ZeroPage, 3),
    op(0x35, And, ZeroPageX, 4),
    op(0x2D, And, Absolute, 4),
    op(0x3D, And, AbsoluteX, 4),
    op(0x39, And, AbsoluteY, 4),
    op(0x21, And, IndexedIndirect, 6),
    op(0x31, And, IndirectIndexed, 5),

    op(0x0A, Asl, Accumulator, 2),
    op(0x06, Asl, ZeroPage, 5),
    op(0x16, Asl, ZeroPageX, 6),
    op(0x0E, Asl, Absolute, 6),
    op(0x1E, Asl, AbsoluteX, 7),

    op(0x90, Bcc, Relative, 2),
    op(0xB0, Bcs, Relative, 2),
    op(0xF0, Beq, Relative, 2),
    op(0x30, Bmi, Relative, 2),
    op(0xD0, Bne, Relative, 2),
    op(0x10, Bpl, Relative, 2),
    op(0x50, Bvc, Relative, 2),
    op(0x70, Bvs, Relative, 2),

    op(0x24, Bit, ZeroPage, 3),
    op(0x2C, Bit, Absolute, 4),

    op(0x00, Brk, Implied, 7),

    op(0x18, Clc, Implied, 2),
    op(0xD8, Cld, Implied, 2),
    op(0x58, Cli, Implied, 2),
    op(0xB8, Clv, Implied, 2),

    op(0xC9, Cmp, Immediate, 2),
    op(0xC5, Cmp, ZeroPage, 3),
    op(0xD5, Cmp, ZeroPageX, 4),
    op(0xCD, Cmp, Absolute, 4),
    op(0xDD, Cmp, AbsoluteX, 4),
    op(0xD9, Cmp, AbsoluteY, 4),
    op(0xC1, Cmp, IndexedIndirect, 6),
    op(0xD1, Cmp, IndirectIndexed, 5),

    op(0xE0, Cpx, Immediate, 2),
    op(0xE4, Cpx, ZeroPage, 3),
    op(0xEC, Cpx, Absolute, 4),

    op(0xC0, Cpy, Immediate, 2),
    op(0xC4, Cpy, ZeroPage, 3),
    op(0xCC, Cpy, Absolute, 4),

    op(0xC6, Dec, ZeroPage, 5),
    op(0xD6, Dec, ZeroPageX, 6),
    op(0xCE, Dec, Absolute, 6),
    op(0xDE, Dec, AbsoluteX, 7),

    op(0xCA, Dex, Implied, 2),
    op(0x88, Dey, Implied, 2),

    op(0x49, Eor, Immediate, 2),
    op(0x45, Eor, ZeroPage, 3),
    op(0x55, Eor, ZeroPageX, 4),
    op(0x4D, Eor, Absolute, 4),
    op(0x5D, Eor, AbsoluteX, 4),
    op(0x59, Eor, AbsoluteY, 4),
    op(0x41, Eor, IndexedIndirect, 6),
    op(0x51, Eor, IndirectIndexed, 5),

    op(0xE6, Inc, ZeroPage, 5),
    op(0xF6, Inc, ZeroPageX, 6),
    op(0xEE, Inc, Absolute, 6),
    op(0xFE, Inc, AbsoluteX, 7),

    op(0xE8, Inx, Implied, 2),
    op(0xC8, Iny, Implied, 2),

    op(0x4C, Jmp, Absolute, 3),
    op(0x6C, Jmp, Indirect, 5),

    op(0x20, Jsr, Absolute, 6),

    op(0xA9, Lda, Immediate, 2),
    op(0xA5, Lda, ZeroPage, 3),
    op(0xB5, Lda, ZeroPageX, 4),
    op(0xAD, Lda, Absolute, 4),
    op(0xBD, Lda, AbsoluteX, 4),
    op(0xB9, Lda, AbsoluteY, 4),
    op(0xA1, Lda, IndexedIndirect, 6),
    op(0xB1, Lda, IndirectIndexed, 5),

    op(0xA2, Ldx, Immediate, 2),
    op(0xA6, Ldx, ZeroPage, 3),
    op(0xB6, Ldx, ZeroPageY, 4),
    op(0xAE, Ldx, Absolute, 4),
    op(0xBE, Ldx, AbsoluteY, 4),

    op(0xA0, Ldy, Immediate, 2),
    op(0xA4, Ldy, ZeroPage, 3),
    op(0xB4, Ldy, ZeroPageX, 4),
    op(0xAC, Ldy, Absolute, 4),
    op(0xBC, Ldy, AbsoluteX, 4),

    op(0x4A, Lsr, Accumulator, 2),
    op(0x46, Lsr, ZeroPage, 5),
    op(0x56, Lsr, ZeroPageX, 6),
    op(0x4E, Lsr, Absolute, 6),
    op(0x5E, Lsr, AbsoluteX, 7),

    op(0xEA, Nop, Implied, 2),

    op(0x09, Ora, Immediate, 2),
    op(0x05, Ora, ZeroPage, 3),
    op(0x15, Ora, ZeroPageX, 4),
    op(0x0D, Ora, Absolute, 4),
    op(0x1D, Ora, AbsoluteX, 4),
    op(0x19, Ora, AbsoluteY, 4),
    op(0x01, Ora, IndexedIndirect, 6),
    op(0x11, Ora, IndirectIndexed, 5),

    op(0x48, Pha, Implied, 3),
    op(0x08, Php, Implied, 3),
    op(0x68, Pla, Implied, 4),
    op(0x28, Plp, Implied, 4),

    op(0x2A, Rol, Accumulator, 2),
    op(0x26, Rol, ZeroPage, 5),
    op(0x36, Rol, ZeroPageX, 6),
    op(0x2E, Rol, Absolute, 6),
    op(0x3E, Rol, AbsoluteX, 7),

    op(0x6A, Ror, Accumulator, 2),
    op(0x66, Ror, ZeroPage, 5),
    op(0x76, Ror, ZeroPageX, 6),
    op(0x6E, Ror, Absolute, 6),
    op(0x7E, Ror, AbsoluteX, 7),

    op(0x40, Rti, Implied, 6),
    op(0x60, Rts, Implied, 6),

    op(0xE9, Sbc, Immediate, 2),
    op(0xE5, Sbc, ZeroPage, 3),
    op(0xF5, Sbc, ZeroPageX, 4),
    op(0xED, Sbc, Absolute, 4),
    op(0xFD, Sbc, AbsoluteX, 4),
    op(0xF9, Sbc, AbsoluteY, 4),
    op(0xE1, Sbc, IndexedIndirect, 6),
    op(0xF1, Sbc, IndirectIndexed, 5),

    op(0x38, Sec, Implied, 2),
    op(0xF8, Sed, Implied, 2),
    op(0x78, Sei, Implied, 2),

    op(0x85, Sta, ZeroPage, 3),
    op(0x95, Sta, ZeroPageX, 4),
    op(0x8D, Sta, Absolute, 4),
    op(0x9D, Sta, AbsoluteX, 5),
    op(0x99, Sta, AbsoluteY, 5),
    op(0x81, Sta, IndexedIndirect, 6),
    op(0x91, Sta, IndirectIndexed, 6),

    op(0x86, Stx, ZeroPage, 3),
    op(0x96, Stx, ZeroPageY, 4),
    op(0x8E, Stx, Absolute, 4),

    op(0x84, Sty, ZeroPage, 3),
    op(0x94, Sty, ZeroPageX, 4),
    op(0x8C, Sty, Absolute, 4),

    op(0xAA, Tax, Implied, 2),
    op(0xA8, Tay, Implied, 2),
    op(0xBA, Tsx, Implied, 2),
    op(0x8A, Txa, Implied, 2),
    op(0x9A, Txs, Implied, 2),
    op(0x98, Tya, Implied, 2),
];

const fn build_table() -> [Instruction; 256] {
    let mut table = [Instruction::unknown(0); 256];
    let mut i = 0;
    while i < 256 {
        table[i] = Instruction::unknown(i as u8);
        i += 1;
    }
    let mut j = 0;
    while j < DOCUMENTED.len() {
        let instruction = DOCUMENTED[j];
        let slot = instruction.op_code as usize;
        // Two entries for one op code is a table typo.
        assert!(
            matches!(table[slot].command, Command::Unknown),
            "duplicate op code in instruction table"
        );
        table[slot] = instruction;
        j += 1;
    }
    table
}

pub static INSTRUCTIONS: [Instruction; 256] = build_table();

/// The full table, indexed by op code.
pub fn instruction_set() -> &'static [Instruction; 256] {
    &INSTRUCTIONS
}

/// Every addressing-mode variant of one mnemonic, in op code order.
pub fn instructions_named(command: Command) -> &'static [Instruction] {
    static BY_MNEMONIC: OnceLock<HashMap<Command, Vec<Instruction>>> = OnceLock::new();
    let index = BY_MNEMONIC.get_or_init(|| {
        let mut index: HashMap<Command, Vec<Instruction>> = HashMap::new();
        for instruction in INSTRUCTIONS.iter() {
            index.entry(instruction.command).or_default().push(*instruction);
        }
        index
    });
    index.get(&command).map(Vec::as_slice).unwrap_or(&[])
}
