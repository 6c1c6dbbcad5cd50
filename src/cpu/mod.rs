//! 6502 execution core.
//!
//! `Cpu` owns the register file and the bus and is driven one clock pulse at a
//! time through [`Cpu::tick`]. An instruction's effects are applied in full on
//! the first pulse of that instruction; the remaining pulses only drain the
//! cycle budget so that timing stays correct from the outside.

use log::{debug, trace, warn};

use crate::cpu_bus::CpuBus;

pub mod addressing;
pub mod command;
pub mod instruction;
pub mod registers;


pub use addressing::{AddressingMode, AddressingResult, EffectiveAddress};
pub use command::{Command, CommandResult};
pub use instruction::{instruction_set, instructions_named, Instruction};
pub use registers::{Registers, StatusFlags};

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;
/// BRK jumps through the reset vector rather than `IRQ_VECTOR`.
pub const BRK_VECTOR: u16 = RESET_VECTOR;

/// Cycles billed for the reset sequence.
pub const RESET_CYCLES: u64 = 8;
/// Cycles billed for entering an NMI or IRQ handler.
pub const INTERRUPT_CYCLES: u8 = 7;

pub struct Cpu<B: CpuBus> {
    pub(crate) registers: Registers,
    pub(crate) bus: B,
    pub(crate) cycles: u64,          // Lifetime cycles since reset
    pub(crate) remaining_cycles: u8, // Cycles left in the current instruction
    pub(crate) nmi_pending: bool,
    irq_line: bool,
}

impl<B: CpuBus> Cpu<B> {
    /// Builds a CPU around `bus` and runs the reset sequence.
    pub fn new(bus: B) -> Self {
        let mut cpu = Cpu {
            registers: Registers::default(),
            bus,
            cycles: 0,
            remaining_cycles: 0,
            nmi_pending: false,
            irq_line: false,
        };
        cpu.reset();
        cpu
    }

    /// Drops a latched NMI. The IRQ line is driven by the bus side and
    /// keeps its level across reset.
    pub fn reset(&mut self) {
        let pc = self.bus.read_address_from(RESET_VECTOR);
        self.registers.reset(pc);
        self.cycles = RESET_CYCLES;
        self.remaining_cycles = 0;
        self.nmi_pending = false;
        debug!("CPU reset: PC=${:04X}", pc);
    }

    /// Advances one clock cycle. Returns `true` on the cycle that retires an
    /// instruction (or finishes entering an interrupt handler).
    pub fn tick(&mut self) -> bool {
        if self.remaining_cycles == 0 {
            self.remaining_cycles = self.begin_instruction();
        }
        self.remaining_cycles -= 1;
        self.cycles += 1;
        self.remaining_cycles == 0
    }

    /// Ticks until the in-flight (or next) instruction retires. Returns the
    /// number of cycles that took.
    pub fn step(&mut self) -> u8 {
        let mut cycles = 0;
        loop {
            cycles += 1;
            if self.tick() {
                return cycles;
            }
        }
    }

    /// Ticks exactly `cycles` times. Returns how many instructions retired.
    pub fn run(&mut self, cycles: u64) -> u64 {
        let mut retired = 0;
        for _ in 0..cycles {
            if self.tick() {
                retired += 1;
            }
        }
        retired
    }

    /// Latches a non-maskable interrupt, serviced at the next instruction boundary.
    pub fn nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Drives the level-sensitive IRQ line.
    pub fn set_irq(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }

    pub fn is_idle(&self) -> bool {
        self.remaining_cycles == 0
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn instruction_set(&self) -> &'static [Instruction; 256] {
        instruction_set()
    }

    fn begin_instruction(&mut self) -> u8 {
        if self.nmi_pending {
            self.nmi_pending = false;
            return self.enter_interrupt(NMI_VECTOR, "NMI");
        }
        if self.irq_line && !self.registers.is_disable_irq_flag_set() {
            return self.enter_interrupt(IRQ_VECTOR, "IRQ");
        }

        let pc = self.registers.get_and_increment_program_counter();
        let op_code = self.bus.read(pc);
        let instruction = Instruction::decode(op_code);
        if !instruction.is_documented() {
            warn!("Unknown op code ${:02X} at ${:04X}, treated as NOP", op_code, pc);
        }

        let operand = instruction
            .addressing_mode()
            .resolve(&mut self.registers, &mut self.bus);
        let result = instruction
            .command()
            .execute(&mut self.registers, &mut self.bus, &operand);
        let cycles = instruction.cycles() + result.additional_cycles;

        trace!(
            "${:04X}: {:02X} {} {:?} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} +{}",
            pc,
            op_code,
            instruction.command(),
            instruction.addressing_mode(),
            self.registers.a(),
            self.registers.x(),
            self.registers.y(),
            self.registers.status(),
            self.registers.stack_pointer(),
            cycles
        );
        cycles
    }

    fn enter_interrupt(&mut self, vector: u16, kind: &str) -> u8 {
        let return_addr = self.registers.program_counter();
        self.bus.push_address(&mut self.registers, return_addr);
        let status = self.registers.flags().difference(StatusFlags::BREAK) | StatusFlags::UNUSED;
        self.bus.push(&mut self.registers, status.bits());
        self.registers.set_disable_irq_flag();

        let target = self.bus.read_address_from(vector);
        self.registers.set_program_counter(target);
        debug!("{} from ${:04X} to ${:04X}", kind, return_addr, target);
        INTERRUPT_CYCLES
    }
}
