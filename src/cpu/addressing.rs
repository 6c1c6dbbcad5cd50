use crate::cpu::registers::Registers;
use crate::cpu_bus::CpuBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    Accumulator,
    Implied,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Relative,
    Indirect,
    /// `($nn,X)`
    IndexedIndirect,
    /// `($nn),Y`
    IndirectIndexed,
    /// Placeholder for illegal op codes. Consumes nothing.
    Unknown,
}

/// Where a command should read from or write back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveAddress {
    /// The operand is the accumulator or an immediate byte, not memory.
    Implied,
    Memory(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressingResult {
    pub address: EffectiveAddress,
    pub value: u8,
    pub additional_cycles: u8,
}

impl AddressingResult {
    fn implied(value: u8) -> Self {
        AddressingResult {
            address: EffectiveAddress::Implied,
            value,
            additional_cycles: 0,
        }
    }

    fn memory(addr: u16, value: u8, page_crossed: bool) -> Self {
        AddressingResult {
            address: EffectiveAddress::Memory(addr),
            value,
            additional_cycles: page_crossed as u8,
        }
    }

    /// The memory address, or `None` for accumulator/immediate operands.
    pub fn memory_address(&self) -> Option<u16> {
        match self.address {
            EffectiveAddress::Memory(addr) => Some(addr),
            EffectiveAddress::Implied => None,
        }
    }
}

impl AddressingMode {
    /// Operand bytes following the op code.
    pub const fn bytes_to_read(self) -> u8 {
        match self {
            AddressingMode::Accumulator | AddressingMode::Implied | AddressingMode::Unknown => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::Relative
            | AddressingMode::IndexedIndirect
            | AddressingMode::IndirectIndexed => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
        }
    }

    /// Consumes this mode's operand bytes (advancing the program counter) and
    /// computes the effective address, the operand value and any page-cross
    /// penalty.
    pub fn resolve(self, regs: &mut Registers, bus: &mut dyn CpuBus) -> AddressingResult {
        match self {
            AddressingMode::Accumulator | AddressingMode::Implied | AddressingMode::Unknown => {
                AddressingResult::implied(0)
            }
            AddressingMode::Immediate => {
                let value = read_byte(regs, bus);
                AddressingResult::implied(value)
            }
            AddressingMode::ZeroPage => {
                let addr = read_byte(regs, bus) as u16;
                AddressingResult::memory(addr, bus.read(addr), false)
            }
            AddressingMode::ZeroPageX => {
                let addr = read_byte(regs, bus).wrapping_add(regs.x()) as u16;
                AddressingResult::memory(addr, bus.read(addr), false)
            }
            AddressingMode::ZeroPageY => {
                let addr = read_byte(regs, bus).wrapping_add(regs.y()) as u16;
                AddressingResult::memory(addr, bus.read(addr), false)
            }
            AddressingMode::Absolute => {
                let addr = read_word(regs, bus);
                AddressingResult::memory(addr, bus.read(addr), false)
            }
            AddressingMode::AbsoluteX => {
                let base = read_word(regs, bus);
                let addr = base.wrapping_add(regs.x() as u16);
                AddressingResult::memory(addr, bus.read(addr), page_crossed(base, addr))
            }
            AddressingMode::AbsoluteY => {
                let base = read_word(regs, bus);
                let addr = base.wrapping_add(regs.y() as u16);
                AddressingResult::memory(addr, bus.read(addr), page_crossed(base, addr))
            }
            AddressingMode::Relative => {
                let offset = read_byte(regs, bus);
                let addr = regs
                    .program_counter()
                    .wrapping_add(offset as i8 as u16);
                AddressingResult::memory(addr, offset, false)
            }
            AddressingMode::Indirect => {
                let pointer = read_word(regs, bus);
                let lo = bus.read(pointer) as u16;
                // The high byte never carries into the next page.
                let hi_addr = (pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF);
                let hi = bus.read(hi_addr) as u16;
                AddressingResult::memory((hi << 8) | lo, 0, false)
            }
            AddressingMode::IndexedIndirect => {
                let pointer = read_byte(regs, bus).wrapping_add(regs.x());
                let addr = bus.read_address_from_zero_page(pointer);
                AddressingResult::memory(addr, bus.read(addr), false)
            }
            AddressingMode::IndirectIndexed => {
                let pointer = read_byte(regs, bus);
                let base = bus.read_address_from_zero_page(pointer);
                let addr = base.wrapping_add(regs.y() as u16);
                AddressingResult::memory(addr, bus.read(addr), page_crossed(base, addr))
            }
        }
    }
}

pub(crate) fn page_crossed(from: u16, to: u16) -> bool {
    (from & 0xFF00) != (to & 0xFF00)
}

fn read_byte(regs: &mut Registers, bus: &mut dyn CpuBus) -> u8 {
    let pc = regs.get_and_increment_program_counter();
    bus.read(pc)
}

fn read_word(regs: &mut Registers, bus: &mut dyn CpuBus) -> u16 {
    let lo = read_byte(regs, bus) as u16;
    let hi = read_byte(regs, bus) as u16;
    (hi << 8) | lo
}
