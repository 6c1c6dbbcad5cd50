use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        const CARRY = 0b00000001;
        const ZERO = 0b00000010;
        const DISABLE_IRQ = 0b00000100;
        const DECIMAL = 0b00001000;
        const BREAK = 0b00010000;
        const UNUSED = 0b00100000;
        const OVERFLOW = 0b01000000;
        const NEGATIVE = 0b10000000;
    }
}

pub const POWER_ON_STACK_POINTER: u8 = 0xFD;
pub const POWER_ON_STATUS: u8 = 0x34; // UNUSED | BREAK | DISABLE_IRQ

// set / unset / query / assign-from-bool, one group per flag.
macro_rules! flag_accessors {
    ($($flag:ident => $set:ident, $unset:ident, $is_set:ident, $set_to:ident;)*) => {
        $(
            pub fn $set(&mut self) -> &mut Self {
                self.status.insert(StatusFlags::$flag);
                self
            }

            pub fn $unset(&mut self) -> &mut Self {
                self.status.remove(StatusFlags::$flag);
                self
            }

            pub fn $is_set(&self) -> bool {
                self.status.contains(StatusFlags::$flag)
            }

            pub fn $set_to(&mut self, on: bool) -> &mut Self {
                self.status.set(StatusFlags::$flag, on);
                self
            }
        )*
    };
}

/// The 6502 programmer-visible registers.
///
/// Every setter returns `&mut Self` so updates can be chained. Widths are
/// enforced by the field types: 8-bit registers wrap modulo 256 and the
/// program counter wraps modulo 65536.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    a: u8,
    x: u8,
    y: u8,
    stack_pointer: u8,
    program_counter: u16,
    status: StatusFlags,
}

impl Registers {
    pub fn new(program_counter: u16) -> Self {
        let mut regs = Registers {
            a: 0,
            x: 0,
            y: 0,
            stack_pointer: 0,
            program_counter: 0,
            status: StatusFlags::empty(),
        };
        regs.reset(program_counter);
        regs
    }

    /// Power-on values, with the program counter taken from the reset vector.
    pub fn reset(&mut self, reset_vector_address: u16) -> &mut Self {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.stack_pointer = POWER_ON_STACK_POINTER;
        self.status = StatusFlags::from_bits_truncate(POWER_ON_STATUS);
        self.program_counter = reset_vector_address;
        self
    }

    pub fn a(&self) -> u8 {
        self.a
    }

    pub fn set_a(&mut self, value: u8) -> &mut Self {
        self.a = value;
        self
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn set_x(&mut self, value: u8) -> &mut Self {
        self.x = value;
        self
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    pub fn set_y(&mut self, value: u8) -> &mut Self {
        self.y = value;
        self
    }

    pub fn stack_pointer(&self) -> u8 {
        self.stack_pointer
    }

    pub fn set_stack_pointer(&mut self, value: u8) -> &mut Self {
        self.stack_pointer = value;
        self
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn set_program_counter(&mut self, value: u16) -> &mut Self {
        self.program_counter = value;
        self
    }

    pub fn status(&self) -> u8 {
        self.status.bits()
    }

    pub fn set_status(&mut self, value: u8) -> &mut Self {
        self.status = StatusFlags::from_bits_truncate(value);
        self
    }

    pub fn flags(&self) -> StatusFlags {
        self.status
    }

    pub fn get_and_increment_program_counter(&mut self) -> u16 {
        let pc = self.program_counter;
        self.program_counter = pc.wrapping_add(1);
        pc
    }

    pub fn increment_and_get_program_counter(&mut self) -> u16 {
        self.program_counter = self.program_counter.wrapping_add(1);
        self.program_counter
    }

    pub fn get_and_decrement_stack_pointer(&mut self) -> u8 {
        let sp = self.stack_pointer;
        self.stack_pointer = sp.wrapping_sub(1);
        sp
    }

    pub fn increment_and_get_stack_pointer(&mut self) -> u8 {
        self.stack_pointer = self.stack_pointer.wrapping_add(1);
        self.stack_pointer
    }

    flag_accessors! {
        CARRY => set_carry_flag, unset_carry_flag, is_carry_flag_set, set_carry_flag_to;
        ZERO => set_zero_flag, unset_zero_flag, is_zero_flag_set, set_zero_flag_to;
        DISABLE_IRQ => set_disable_irq_flag, unset_disable_irq_flag, is_disable_irq_flag_set, set_disable_irq_flag_to;
        DECIMAL => set_decimal_flag, unset_decimal_flag, is_decimal_flag_set, set_decimal_flag_to;
        BREAK => set_break_flag, unset_break_flag, is_break_flag_set, set_break_flag_to;
        OVERFLOW => set_overflow_flag, unset_overflow_flag, is_overflow_flag_set, set_overflow_flag_to;
        NEGATIVE => set_negative_flag, unset_negative_flag, is_negative_flag_set, set_negative_flag_to;
    }

    pub fn set_zero_and_negative_flags(&mut self, value: u8) -> &mut Self {
        self.status.set(StatusFlags::ZERO, value == 0);
        self.status.set(StatusFlags::NEGATIVE, value & 0x80 != 0);
        self
    }

    pub(crate) fn carry_bit(&self) -> u8 {
        self.status.contains(StatusFlags::CARRY) as u8
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new(0)
    }
}
