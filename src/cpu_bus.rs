//! Trait representing the minimal bus interface required by the 6502 core.
//!
//! Implementors only provide `read` and `write`; every other helper is derived
//! from those two. Addresses and values are `u16`/`u8`, so out-of-range input is
//! masked by construction and nothing here can fail.

use crate::cpu::registers::Registers;

/// High byte of every stack address. The stack pointer only supplies the low byte.
pub const STACK_PAGE: u16 = 0x0100;

pub trait CpuBus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    /// Little-endian 16-bit read. The high byte comes from `addr + 1` and is
    /// allowed to cross into the next page.
    fn read_address_from(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    fn write_address_to(&mut self, addr: u16, value: u16) {
        self.write(addr, (value & 0xFF) as u8);
        self.write(addr.wrapping_add(1), (value >> 8) as u8);
    }

    /// Little-endian 16-bit read from the zero page. The high byte wraps within
    /// page zero, so a pointer at `$FF` takes its high byte from `$00`.
    fn read_address_from_zero_page(&mut self, addr: u8) -> u16 {
        let lo = self.read(addr as u16) as u16;
        let hi = self.read(addr.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }

    fn write_address_to_zero_page(&mut self, addr: u8, value: u16) {
        self.write(addr as u16, (value & 0xFF) as u8);
        self.write(addr.wrapping_add(1) as u16, (value >> 8) as u8);
    }

    fn read_from_stack(&mut self, offset: u8) -> u8 {
        self.read(STACK_PAGE | offset as u16)
    }

    fn write_to_stack(&mut self, offset: u8, data: u8) {
        self.write(STACK_PAGE | offset as u16, data);
    }

    /// Store at the current stack pointer, then move it down.
    fn push(&mut self, regs: &mut Registers, data: u8) {
        let offset = regs.get_and_decrement_stack_pointer();
        self.write_to_stack(offset, data);
    }

    /// Move the stack pointer up, then load from it.
    fn pop(&mut self, regs: &mut Registers) -> u8 {
        let offset = regs.increment_and_get_stack_pointer();
        self.read_from_stack(offset)
    }

    /// Pushes the high byte first so the address sits little-endian in memory.
    fn push_address(&mut self, regs: &mut Registers, addr: u16) {
        self.push(regs, (addr >> 8) as u8);
        self.push(regs, (addr & 0xFF) as u8);
    }

    fn pop_address(&mut self, regs: &mut Registers) -> u16 {
        let lo = self.pop(regs) as u16;
        let hi = self.pop(regs) as u16;
        (hi << 8) | lo
    }
}
