use super::*;

#[cfg(test)]
mod addressing_mode_tests {
    use super::*;

    fn resolve_at(mode: AddressingMode, operand: &[u8], regs: &mut Registers, memory: &mut Memory) -> AddressingResult {
        memory.load(0x0600, operand);
        regs.set_program_counter(0x0600);
        mode.resolve(regs, memory)
    }

    #[test]
    fn test_implied_and_accumulator_consume_nothing() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);

        for mode in [AddressingMode::Implied, AddressingMode::Accumulator, AddressingMode::Unknown] {
            let result = resolve_at(mode, &[0xFF], &mut regs, &mut memory);
            assert_eq!(result.address, EffectiveAddress::Implied);
            assert_eq!(result.additional_cycles, 0);
            assert_eq!(regs.program_counter(), 0x0600);
        }
    }

    #[test]
    fn test_immediate_addressing() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);

        let result = resolve_at(AddressingMode::Immediate, &[0x42], &mut regs, &mut memory);
        assert_eq!(result.address, EffectiveAddress::Implied);
        assert_eq!(result.value, 0x42);
        assert_eq!(regs.program_counter(), 0x0601);
    }

    #[test]
    fn test_zero_page_addressing() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);
        memory.write(0x42, 0xAB);

        let result = resolve_at(AddressingMode::ZeroPage, &[0x42], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x0042));
        assert_eq!(result.value, 0xAB);
        assert_eq!(result.additional_cycles, 0);
    }

    #[test]
    fn test_zero_page_x_wraps() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);
        regs.set_x(0x20);
        memory.write(0x0010, 0xCD);

        // $F0 + $20 stays in page zero
        let result = resolve_at(AddressingMode::ZeroPageX, &[0xF0], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x0010));
        assert_eq!(result.value, 0xCD);
    }

    #[test]
    fn test_zero_page_y_wraps() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);
        regs.set_y(0x01);

        let result = resolve_at(AddressingMode::ZeroPageY, &[0xFF], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x0000));
    }

    #[test]
    fn test_absolute_addressing() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);
        memory.write(0x1234, 0x99);

        let result = resolve_at(AddressingMode::Absolute, &[0x34, 0x12], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x1234));
        assert_eq!(result.value, 0x99);
        assert_eq!(regs.program_counter(), 0x0602);
    }

    #[test]
    fn test_absolute_x_page_cross() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);
        regs.set_x(0x01);

        let result = resolve_at(AddressingMode::AbsoluteX, &[0x00, 0x12], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x1201));
        assert_eq!(result.additional_cycles, 0);

        let result = resolve_at(AddressingMode::AbsoluteX, &[0xFF, 0x12], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x1300));
        assert_eq!(result.additional_cycles, 1);
    }

    #[test]
    fn test_absolute_y_wraps_address_space() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);
        regs.set_y(0x02);
        memory.write(0x0001, 0x5A);

        let result = resolve_at(AddressingMode::AbsoluteY, &[0xFF, 0xFF], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x0001));
        assert_eq!(result.value, 0x5A);
        assert_eq!(result.additional_cycles, 1);
    }

    #[test]
    fn test_relative_offsets() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);

        let result = resolve_at(AddressingMode::Relative, &[0x10], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x0611));
        assert_eq!(result.value, 0x10);
        assert_eq!(result.additional_cycles, 0);

        let result = resolve_at(AddressingMode::Relative, &[0xFE], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x05FF));
        assert_eq!(result.value, 0xFE);
    }

    #[test]
    fn test_indirect_addressing() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);
        memory.write_address_to(0x0120, 0xBEEF);

        let result = resolve_at(AddressingMode::Indirect, &[0x20, 0x01], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0xBEEF));
        assert_eq!(result.value, 0);
    }

    #[test]
    fn test_indirect_high_byte_stays_in_page() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);
        memory.write(0x10FF, 0x34);
        memory.write(0x1000, 0x12);
        memory.write(0x1100, 0x56);

        let result = resolve_at(AddressingMode::Indirect, &[0xFF, 0x10], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x1234));
    }

    #[test]
    fn test_indexed_indirect_addressing() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);
        regs.set_x(0x04);
        memory.write_address_to(0x0024, 0x3010);
        memory.write(0x3010, 0x77);

        let result = resolve_at(AddressingMode::IndexedIndirect, &[0x20], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x3010));
        assert_eq!(result.value, 0x77);
        assert_eq!(result.additional_cycles, 0);
    }

    #[test]
    fn test_indexed_indirect_pointer_wraps() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);
        regs.set_x(0x0F);
        // Pointer at $FF reads its high byte from $00.
        memory.write(0x00FF, 0x00);
        memory.write(0x0000, 0x40);
        memory.write(0x0100, 0x99);

        let result = resolve_at(AddressingMode::IndexedIndirect, &[0xF0], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x4000));
    }

    #[test]
    fn test_indirect_indexed_pointer_wraps() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);
        regs.set_y(0x05);
        // ($FF),Y takes its high byte from $00, not $0100.
        memory.write(0x00FF, 0x10);
        memory.write(0x0000, 0x40);
        memory.write(0x0100, 0x99);
        memory.write(0x4015, 0x5A);

        let result = resolve_at(AddressingMode::IndirectIndexed, &[0xFF], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x4015));
        assert_eq!(result.value, 0x5A);
        assert_eq!(result.additional_cycles, 0);
    }

    #[test]
    fn test_indirect_indexed_page_cross() {
        let mut memory = Memory::new();
        let mut regs = Registers::new(0);
        memory.write_address_to(0x0086, 0x4028);
        memory.write(0x4038, 0x11);
        memory.write(0x4110, 0x22);

        regs.set_y(0x10);
        let result = resolve_at(AddressingMode::IndirectIndexed, &[0x86], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x4038));
        assert_eq!(result.value, 0x11);
        assert_eq!(result.additional_cycles, 0);

        regs.set_y(0xE8);
        let result = resolve_at(AddressingMode::IndirectIndexed, &[0x86], &mut regs, &mut memory);
        assert_eq!(result.memory_address(), Some(0x4110));
        assert_eq!(result.value, 0x22);
        assert_eq!(result.additional_cycles, 1);
    }

    #[test]
    fn test_bytes_to_read() {
        assert_eq!(AddressingMode::Implied.bytes_to_read(), 0);
        assert_eq!(AddressingMode::Immediate.bytes_to_read(), 1);
        assert_eq!(AddressingMode::Relative.bytes_to_read(), 1);
        assert_eq!(AddressingMode::IndirectIndexed.bytes_to_read(), 1);
        assert_eq!(AddressingMode::Indirect.bytes_to_read(), 2);
        assert_eq!(AddressingMode::AbsoluteY.bytes_to_read(), 2);
    }

    #[test]
    fn test_zero_page_x_through_cpu() {
        let mut cpu = setup_cpu();
        cpu.registers_mut().set_x(0x10);
        cpu.bus_mut().write(0x52, 0xCD); // 0x42 + 0x10

        // LDA $42,X
        cpu.bus_mut().load(0x8000, &[0xB5, 0x42]);

        let cycles = cpu.step();

        assert_eq!(cpu.registers().a(), 0xCD);
        assert_eq!(cycles, 4);
    }

    #[test]
    fn test_indirect_indexed_through_cpu() {
        let mut cpu = setup_cpu();
        cpu.registers_mut().set_y(0xFF);
        cpu.bus_mut().write_address_to_zero_page(0x10, 0x2001);
        cpu.bus_mut().write(0x2100, 0x5E);

        // LDA ($10),Y
        cpu.bus_mut().load(0x8000, &[0xB1, 0x10]);

        let cycles = cpu.step();

        assert_eq!(cpu.registers().a(), 0x5E);
        assert_eq!(cycles, 6);
    }
}
