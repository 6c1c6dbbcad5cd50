use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cpu::RESET_VECTOR;
use crate::cpu_bus::CpuBus;

pub const MEMORY_SIZE: usize = 0x10000;

/// Flat 64 KiB address space with no mirroring or device mapping.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    pub(crate) ram: Vec<u8>,
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            ram: vec![0; MEMORY_SIZE],
        }
    }

    /// Copies `data` in starting at `start`. Writes past `$FFFF` wrap to `$0000`.
    pub fn load(&mut self, start: u16, data: &[u8]) {
        let mut addr = start;
        for &byte in data {
            self.ram[addr as usize] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    pub fn set_reset_vector(&mut self, target: u16) {
        self.write_address_to(RESET_VECTOR, target);
    }

    // Save state methods
    pub fn get_ram(&self) -> &[u8] {
        &self.ram
    }

    pub fn set_ram(&mut self, ram: &[u8]) -> Result<(), String> {
        if ram.len() != MEMORY_SIZE {
            return Err(format!(
                "Memory image is {} bytes, expected {}",
                ram.len(),
                MEMORY_SIZE
            ));
        }
        self.ram.copy_from_slice(ram);
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self.ram.iter().filter(|&&b| b != 0).count();
        f.debug_struct("Memory")
            .field("size", &self.ram.len())
            .field("non_zero_bytes", &used)
            .finish()
    }
}

impl CpuBus for Memory {
    fn read(&mut self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.ram[addr as usize] = data;
    }
}
