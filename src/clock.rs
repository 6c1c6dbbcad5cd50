//! Master clock driving a cycle-stepped component.
//!
//! The clock counts master ticks and forwards one tick to its target every
//! `divider` master ticks. With a divider of 1 every pulse reaches the CPU.

use crate::cpu::Cpu;
use crate::cpu_bus::CpuBus;

/// A component advanced one of its own cycles at a time.
pub trait Tickable {
    /// Advances one cycle. Returns `true` when a unit of work (an
    /// instruction, for a CPU) completed on this cycle.
    fn tick(&mut self) -> bool;
}

impl<B: CpuBus> Tickable for Cpu<B> {
    fn tick(&mut self) -> bool {
        Cpu::tick(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    master_cycles: u64,
    divider: u32,
}

impl Clock {
    pub fn new(divider: u32) -> Self {
        assert!(divider >= 1, "clock divider must be at least 1");
        Clock {
            master_cycles: 0,
            divider,
        }
    }

    /// Advances one master tick. Returns whether `target` was ticked and
    /// completed a unit of work on this pulse.
    pub fn pulse(&mut self, target: &mut dyn Tickable) -> bool {
        self.master_cycles += 1;
        if self.master_cycles % self.divider as u64 != 0 {
            return false;
        }
        target.tick()
    }

    /// Pulses `ticks` times. Returns how many units of work completed.
    pub fn run(&mut self, target: &mut dyn Tickable, ticks: u64) -> u64 {
        let mut completed = 0;
        for _ in 0..ticks {
            if self.pulse(target) {
                completed += 1;
            }
        }
        completed
    }

    pub fn master_cycles(&self) -> u64 {
        self.master_cycles
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Memory;

    struct Counter {
        ticks: u32,
        every: u32,
    }

    impl Tickable for Counter {
        fn tick(&mut self) -> bool {
            self.ticks += 1;
            self.ticks % self.every == 0
        }
    }

    #[test]
    fn test_divider_one_forwards_every_pulse() {
        let mut clock = Clock::default();
        let mut counter = Counter { ticks: 0, every: 2 };

        assert!(!clock.pulse(&mut counter));
        assert!(clock.pulse(&mut counter));
        assert_eq!(counter.ticks, 2);
        assert_eq!(clock.master_cycles(), 2);
    }

    #[test]
    fn test_divider_skips_master_ticks() {
        let mut clock = Clock::new(3);
        let mut counter = Counter { ticks: 0, every: 1 };

        let completed = clock.run(&mut counter, 10);

        assert_eq!(counter.ticks, 3);
        assert_eq!(completed, 3);
        assert_eq!(clock.master_cycles(), 10);
    }

    #[test]
    #[should_panic]
    fn test_zero_divider_rejected() {
        Clock::new(0);
    }

    #[test]
    fn test_drives_cpu() {
        let mut memory = Memory::new();
        memory.set_reset_vector(0x0400);
        // LDX #$03 ; DEX ; DEX ; DEX
        memory.load(0x0400, &[0xA2, 0x03, 0xCA, 0xCA, 0xCA]);
        let mut cpu = Cpu::new(memory);
        let mut clock = Clock::new(2);

        // 4 instructions x 2 cycles x divider 2
        let retired = clock.run(&mut cpu, 16);

        assert_eq!(retired, 4);
        assert_eq!(cpu.registers().x(), 0);
        assert!(cpu.registers().is_zero_flag_set());
        assert_eq!(cpu.cycles(), 8 + 8);
    }
}
