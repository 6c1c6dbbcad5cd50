//! Instruction semantics, one `Command` per 6502 mnemonic.
//!
//! A command receives the operand already resolved by its addressing mode and
//! applies its effect to the registers and the bus. The program counter has
//! already been moved past the operand bytes; only control-flow commands
//! touch it again.
//!
//! The returned cycle count is the total extra cost on top of the base cycles:
//! the addressing penalty (for read-type commands) plus whatever the command
//! itself adds (taken branches).

use std::fmt;

use crate::cpu::addressing::{page_crossed, AddressingResult, EffectiveAddress};
use crate::cpu::registers::{Registers, StatusFlags};
use crate::cpu::BRK_VECTOR;
use crate::cpu_bus::CpuBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Command {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    /// Illegal op code. Does nothing.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResult {
    /// Addressing penalty plus the command's own extra cycles.
    pub additional_cycles: u8,
}

impl Command {
    pub const ALL: [Command; 57] = [
        Command::Adc,
        Command::And,
        Command::Asl,
        Command::Bcc,
        Command::Bcs,
        Command::Beq,
        Command::Bit,
        Command::Bmi,
        Command::Bne,
        Command::Bpl,
        Command::Brk,
        Command::Bvc,
        Command::Bvs,
        Command::Clc,
        Command::Cld,
        Command::Cli,
        Command::Clv,
        Command::Cmp,
        Command::Cpx,
        Command::Cpy,
        Command::Dec,
        Command::Dex,
        Command::Dey,
        Command::Eor,
        Command::Inc,
        Command::Inx,
        Command::Iny,
        Command::Jmp,
        Command::Jsr,
        Command::Lda,
        Command::Ldx,
        Command::Ldy,
        Command::Lsr,
        Command::Nop,
        Command::Ora,
        Command::Pha,
        Command::Php,
        Command::Pla,
        Command::Plp,
        Command::Rol,
        Command::Ror,
        Command::Rti,
        Command::Rts,
        Command::Sbc,
        Command::Sec,
        Command::Sed,
        Command::Sei,
        Command::Sta,
        Command::Stx,
        Command::Sty,
        Command::Tax,
        Command::Tay,
        Command::Tsx,
        Command::Txa,
        Command::Txs,
        Command::Tya,
        Command::Unknown,
    ];

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Command::Adc => "ADC",
            Command::And => "AND",
            Command::Asl => "ASL",
            Command::Bcc => "BCC",
            Command::Bcs => "BCS",
            Command::Beq => "BEQ",
            Command::Bit => "BIT",
            Command::Bmi => "BMI",
            Command::Bne => "BNE",
            Command::Bpl => "BPL",
            Command::Brk => "BRK",
            Command::Bvc => "BVC",
            Command::Bvs => "BVS",
            Command::Clc => "CLC",
            Command::Cld => "CLD",
            Command::Cli => "CLI",
            Command::Clv => "CLV",
            Command::Cmp => "CMP",
            Command::Cpx => "CPX",
            Command::Cpy => "CPY",
            Command::Dec => "DEC",
            Command::Dex => "DEX",
            Command::Dey => "DEY",
            Command::Eor => "EOR",
            Command::Inc => "INC",
            Command::Inx => "INX",
            Command::Iny => "INY",
            Command::Jmp => "JMP",
            Command::Jsr => "JSR",
            Command::Lda => "LDA",
            Command::Ldx => "LDX",
            Command::Ldy => "LDY",
            Command::Lsr => "LSR",
            Command::Nop => "NOP",
            Command::Ora => "ORA",
            Command::Pha => "PHA",
            Command::Php => "PHP",
            Command::Pla => "PLA",
            Command::Plp => "PLP",
            Command::Rol => "ROL",
            Command::Ror => "ROR",
            Command::Rti => "RTI",
            Command::Rts => "RTS",
            Command::Sbc => "SBC",
            Command::Sec => "SEC",
            Command::Sed => "SED",
            Command::Sei => "SEI",
            Command::Sta => "STA",
            Command::Stx => "STX",
            Command::Sty => "STY",
            Command::Tax => "TAX",
            Command::Tay => "TAY",
            Command::Tsx => "TSX",
            Command::Txa => "TXA",
            Command::Txs => "TXS",
            Command::Tya => "TYA",
            Command::Unknown => "???",
        }
    }

    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Command::Bcc
                | Command::Bcs
                | Command::Beq
                | Command::Bmi
                | Command::Bne
                | Command::Bpl
                | Command::Bvc
                | Command::Bvs
        )
    }

    pub fn execute(
        self,
        regs: &mut Registers,
        bus: &mut dyn CpuBus,
        operand: &AddressingResult,
    ) -> CommandResult {
        // Read-type commands pay the page-cross penalty. Stores and
        // read-modify-write commands already include it in their base cost.
        let read_penalty = operand.additional_cycles;

        let additional_cycles = match self {
            // Accumulator arithmetic and logic
            Command::Adc => {
                adc(regs, operand.value);
                read_penalty
            }
            Command::Sbc => {
                sbc(regs, operand.value);
                read_penalty
            }
            Command::And => {
                let result = regs.a() & operand.value;
                regs.set_a(result).set_zero_and_negative_flags(result);
                read_penalty
            }
            Command::Ora => {
                let result = regs.a() | operand.value;
                regs.set_a(result).set_zero_and_negative_flags(result);
                read_penalty
            }
            Command::Eor => {
                let result = regs.a() ^ operand.value;
                regs.set_a(result).set_zero_and_negative_flags(result);
                read_penalty
            }
            Command::Bit => {
                let value = operand.value;
                let zero = regs.a() & value == 0;
                regs.set_zero_flag_to(zero)
                    .set_negative_flag_to(value & 0x80 != 0)
                    .set_overflow_flag_to(value & 0x40 != 0);
                read_penalty
            }
            Command::Cmp => {
                let register = regs.a();
                compare(regs, register, operand.value);
                read_penalty
            }
            Command::Cpx => {
                let register = regs.x();
                compare(regs, register, operand.value);
                read_penalty
            }
            Command::Cpy => {
                let register = regs.y();
                compare(regs, register, operand.value);
                read_penalty
            }

            // Loads and stores
            Command::Lda => {
                regs.set_a(operand.value)
                    .set_zero_and_negative_flags(operand.value);
                read_penalty
            }
            Command::Ldx => {
                regs.set_x(operand.value)
                    .set_zero_and_negative_flags(operand.value);
                read_penalty
            }
            Command::Ldy => {
                regs.set_y(operand.value)
                    .set_zero_and_negative_flags(operand.value);
                read_penalty
            }
            Command::Sta => {
                store(bus, operand, regs.a());
                0
            }
            Command::Stx => {
                store(bus, operand, regs.x());
                0
            }
            Command::Sty => {
                store(bus, operand, regs.y());
                0
            }

            // Shifts, rotates and memory increments
            Command::Asl => {
                read_modify_write(regs, bus, operand, asl);
                0
            }
            Command::Lsr => {
                read_modify_write(regs, bus, operand, lsr);
                0
            }
            Command::Rol => {
                read_modify_write(regs, bus, operand, rol);
                0
            }
            Command::Ror => {
                read_modify_write(regs, bus, operand, ror);
                0
            }
            Command::Inc => {
                read_modify_write(regs, bus, operand, |regs, value| {
                    let result = value.wrapping_add(1);
                    regs.set_zero_and_negative_flags(result);
                    result
                });
                0
            }
            Command::Dec => {
                read_modify_write(regs, bus, operand, |regs, value| {
                    let result = value.wrapping_sub(1);
                    regs.set_zero_and_negative_flags(result);
                    result
                });
                0
            }

            // Register increments
            Command::Inx => {
                let result = regs.x().wrapping_add(1);
                regs.set_x(result).set_zero_and_negative_flags(result);
                0
            }
            Command::Iny => {
                let result = regs.y().wrapping_add(1);
                regs.set_y(result).set_zero_and_negative_flags(result);
                0
            }
            Command::Dex => {
                let result = regs.x().wrapping_sub(1);
                regs.set_x(result).set_zero_and_negative_flags(result);
                0
            }
            Command::Dey => {
                let result = regs.y().wrapping_sub(1);
                regs.set_y(result).set_zero_and_negative_flags(result);
                0
            }

            // Transfers
            Command::Tax => {
                let value = regs.a();
                regs.set_x(value).set_zero_and_negative_flags(value);
                0
            }
            Command::Tay => {
                let value = regs.a();
                regs.set_y(value).set_zero_and_negative_flags(value);
                0
            }
            Command::Txa => {
                let value = regs.x();
                regs.set_a(value).set_zero_and_negative_flags(value);
                0
            }
            Command::Tya => {
                let value = regs.y();
                regs.set_a(value).set_zero_and_negative_flags(value);
                0
            }
            Command::Tsx => {
                let value = regs.stack_pointer();
                regs.set_x(value).set_zero_and_negative_flags(value);
                0
            }
            Command::Txs => {
                // No flags.
                let value = regs.x();
                regs.set_stack_pointer(value);
                0
            }

            // Flags
            Command::Clc => {
                regs.unset_carry_flag();
                0
            }
            Command::Cld => {
                regs.unset_decimal_flag();
                0
            }
            Command::Cli => {
                regs.unset_disable_irq_flag();
                0
            }
            Command::Clv => {
                regs.unset_overflow_flag();
                0
            }
            Command::Sec => {
                regs.set_carry_flag();
                0
            }
            Command::Sed => {
                regs.set_decimal_flag();
                0
            }
            Command::Sei => {
                regs.set_disable_irq_flag();
                0
            }

            // Branches
            Command::Bcc | Command::Bcs | Command::Bne | Command::Beq | Command::Bpl | Command::Bmi
            | Command::Bvc | Command::Bvs => {
                let taken = self.branch_taken(regs);
                branch(regs, operand, taken)
            }

            // Jumps, subroutines and interrupts
            Command::Jmp => {
                if let Some(target) = operand.memory_address() {
                    regs.set_program_counter(target);
                }
                0
            }
            Command::Jsr => {
                if let Some(target) = operand.memory_address() {
                    let return_addr = regs.program_counter().wrapping_sub(1);
                    bus.push_address(regs, return_addr);
                    regs.set_program_counter(target);
                }
                0
            }
            Command::Rts => {
                let return_addr = bus.pop_address(regs);
                regs.set_program_counter(return_addr.wrapping_add(1));
                0
            }
            Command::Brk => {
                regs.set_disable_irq_flag().set_break_flag();
                // Skip the signature byte after the op code.
                let return_addr = regs.increment_and_get_program_counter();
                bus.push_address(regs, return_addr);
                let status = regs.status();
                bus.push(regs, status);
                regs.unset_break_flag();
                let target = bus.read_address_from(BRK_VECTOR);
                regs.set_program_counter(target);
                0
            }
            Command::Rti => {
                let status = bus.pop(regs);
                regs.set_status(pulled_status(status));
                let return_addr = bus.pop_address(regs);
                regs.set_program_counter(return_addr);
                0
            }

            // Stack
            Command::Pha => {
                let value = regs.a();
                bus.push(regs, value);
                0
            }
            Command::Php => {
                let status = regs.flags() | StatusFlags::BREAK | StatusFlags::UNUSED;
                bus.push(regs, status.bits());
                0
            }
            Command::Pla => {
                let value = bus.pop(regs);
                regs.set_a(value).set_zero_and_negative_flags(value);
                0
            }
            Command::Plp => {
                let status = bus.pop(regs);
                regs.set_status(pulled_status(status));
                0
            }

            Command::Nop | Command::Unknown => 0,
        };

        CommandResult { additional_cycles }
    }
}

impl Command {
    fn branch_taken(self, regs: &Registers) -> bool {
        match self {
            Command::Bcc => !regs.is_carry_flag_set(),
            Command::Bcs => regs.is_carry_flag_set(),
            Command::Bne => !regs.is_zero_flag_set(),
            Command::Beq => regs.is_zero_flag_set(),
            Command::Bpl => !regs.is_negative_flag_set(),
            Command::Bmi => regs.is_negative_flag_set(),
            Command::Bvc => !regs.is_overflow_flag_set(),
            Command::Bvs => regs.is_overflow_flag_set(),
            _ => false,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

fn adc(regs: &mut Registers, value: u8) {
    let a = regs.a();
    let sum = a as u16 + value as u16 + regs.carry_bit() as u16;
    let result = sum as u8;

    regs.set_carry_flag_to(sum > 0xFF);
    // Both inputs share a sign and the result does not.
    regs.set_overflow_flag_to((a ^ result) & (value ^ result) & 0x80 != 0);
    regs.set_a(result).set_zero_and_negative_flags(result);
}

// Binary mode only. A - M - !C == A + !M + C.
fn sbc(regs: &mut Registers, value: u8) {
    adc(regs, !value);
}

fn compare(regs: &mut Registers, register: u8, value: u8) {
    let result = register.wrapping_sub(value);
    regs.set_carry_flag_to(register >= value)
        .set_zero_and_negative_flags(result);
}

fn store(bus: &mut dyn CpuBus, operand: &AddressingResult, value: u8) {
    if let Some(addr) = operand.memory_address() {
        bus.write(addr, value);
    }
}

/// Applies `op` to the accumulator or to the addressed byte, writing the
/// result back to wherever the input came from.
fn read_modify_write<F>(regs: &mut Registers, bus: &mut dyn CpuBus, operand: &AddressingResult, op: F)
where
    F: FnOnce(&mut Registers, u8) -> u8,
{
    match operand.address {
        EffectiveAddress::Implied => {
            let input = regs.a();
            let result = op(regs, input);
            regs.set_a(result);
        }
        EffectiveAddress::Memory(addr) => {
            let result = op(regs, operand.value);
            bus.write(addr, result);
        }
    }
}

fn asl(regs: &mut Registers, value: u8) -> u8 {
    let result = value << 1;
    regs.set_carry_flag_to(value & 0x80 != 0)
        .set_zero_and_negative_flags(result);
    result
}

fn lsr(regs: &mut Registers, value: u8) -> u8 {
    let result = value >> 1;
    regs.set_carry_flag_to(value & 0x01 != 0)
        .set_zero_and_negative_flags(result);
    result
}

fn rol(regs: &mut Registers, value: u8) -> u8 {
    let result = (value << 1) | regs.carry_bit();
    regs.set_carry_flag_to(value & 0x80 != 0)
        .set_zero_and_negative_flags(result);
    result
}

fn ror(regs: &mut Registers, value: u8) -> u8 {
    let result = (value >> 1) | (regs.carry_bit() << 7);
    regs.set_carry_flag_to(value & 0x01 != 0)
        .set_zero_and_negative_flags(result);
    result
}

/// +1 cycle when taken, +1 more when the target is on another page.
fn branch(regs: &mut Registers, operand: &AddressingResult, condition: bool) -> u8 {
    let target = match operand.memory_address() {
        Some(target) if condition => target,
        _ => return operand.additional_cycles,
    };
    let old_pc = regs.program_counter();
    regs.set_program_counter(target);
    operand.additional_cycles + 1 + page_crossed(old_pc, target) as u8
}

// Break only exists on the stack copy; Unused always reads back as set.
fn pulled_status(status: u8) -> u8 {
    (status & !StatusFlags::BREAK.bits()) | StatusFlags::UNUSED.bits()
}
