use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};

use crate::cpu::{Cpu, Registers};
use crate::memory::{Memory, MEMORY_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveState {
    pub version: u32,
    pub registers: RegisterSaveState,
    pub cycles: u64,
    pub memory: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSaveState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub p: u8,
}

impl From<&Registers> for RegisterSaveState {
    fn from(regs: &Registers) -> Self {
        RegisterSaveState {
            a: regs.a(),
            x: regs.x(),
            y: regs.y(),
            sp: regs.stack_pointer(),
            pc: regs.program_counter(),
            p: regs.status(),
        }
    }
}

impl RegisterSaveState {
    fn apply_to(&self, regs: &mut Registers) {
        regs.set_a(self.a)
            .set_x(self.x)
            .set_y(self.y)
            .set_stack_pointer(self.sp)
            .set_program_counter(self.pc)
            .set_status(self.p);
    }
}

impl SaveState {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn save_to_file(&self, filename: &str) -> Result<(), String> {
        let data = self.to_bytes()?;
        let mut file =
            File::create(filename).map_err(|e| format!("Failed to create save file: {}", e))?;

        file.write_all(&data)
            .map_err(|e| format!("Failed to write save file: {}", e))?;

        Ok(())
    }

    pub fn load_from_file(filename: &str) -> Result<Self, String> {
        let mut file =
            File::open(filename).map_err(|e| format!("Failed to open save file: {}", e))?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| format!("Failed to read save file: {}", e))?;

        Self::from_bytes(&data)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, String> {
        bincode::serialize(self).map_err(|e| format!("Failed to serialize save state: {}", e))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, String> {
        let save_state: SaveState = bincode::deserialize(data)
            .map_err(|e| format!("Failed to deserialize save state: {}", e))?;
        save_state.validate()?;
        Ok(save_state)
    }

    fn validate(&self) -> Result<(), String> {
        if self.version > Self::CURRENT_VERSION {
            return Err(format!(
                "Save state version {} is not supported (current: {})",
                self.version,
                Self::CURRENT_VERSION
            ));
        }
        if self.memory.len() != MEMORY_SIZE {
            return Err(format!(
                "Save state memory is {} bytes, expected {}",
                self.memory.len(),
                MEMORY_SIZE
            ));
        }
        Ok(())
    }
}

impl Cpu<Memory> {
    pub fn save_state(&self) -> SaveState {
        SaveState {
            version: SaveState::CURRENT_VERSION,
            registers: RegisterSaveState::from(&self.registers),
            cycles: self.cycles,
            memory: self.bus.get_ram().to_vec(),
        }
    }

    /// Restores a snapshot. The CPU resumes at an instruction boundary.
    pub fn load_state(&mut self, state: &SaveState) -> Result<(), String> {
        state.validate()?;
        self.bus.set_ram(&state.memory)?;
        state.registers.apply_to(&mut self.registers);
        self.cycles = state.cycles;
        self.remaining_cycles = 0;
        self.nmi_pending = false;
        log::debug!(
            "Loaded save state: PC=${:04X} cycles={}",
            state.registers.pc,
            state.cycles
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu_bus::CpuBus;

    fn setup_cpu() -> Cpu<Memory> {
        let mut memory = Memory::new();
        memory.set_reset_vector(0x8000);
        // LDA #$42 ; STA $10 ; INX
        memory.load(0x8000, &[0xA9, 0x42, 0x85, 0x10, 0xE8]);
        Cpu::new(memory)
    }

    #[test]
    fn test_snapshot_captures_cpu_and_memory() {
        let mut cpu = setup_cpu();
        cpu.step();
        cpu.step();

        let state = cpu.save_state();

        assert_eq!(state.version, SaveState::CURRENT_VERSION);
        assert_eq!(state.registers.a, 0x42);
        assert_eq!(state.registers.pc, 0x8004);
        assert_eq!(state.cycles, 8 + 2 + 3);
        assert_eq!(state.memory.len(), MEMORY_SIZE);
        assert_eq!(state.memory[0x10], 0x42);
    }

    #[test]
    fn test_restore_resumes_identically() {
        let mut cpu = setup_cpu();
        cpu.step();
        let state = cpu.save_state();

        cpu.step();
        cpu.step();
        let expected_registers = *cpu.registers();
        let expected_cycles = cpu.cycles();

        let mut restored = setup_cpu();
        restored.load_state(&state).unwrap();
        assert!(restored.is_idle());
        assert_eq!(restored.registers().a(), 0x42);
        assert_eq!(restored.bus_mut().read(0x10), 0x00);

        restored.step();
        restored.step();
        assert_eq!(*restored.registers(), expected_registers);
        assert_eq!(restored.cycles(), expected_cycles);
        assert_eq!(restored.bus(), cpu.bus());
    }

    #[test]
    fn test_load_state_drops_pending_nmi() {
        let mut cpu = setup_cpu();
        let state = cpu.save_state();

        cpu.nmi();
        cpu.load_state(&state).unwrap();

        // The LDA runs instead of the NMI entry sequence.
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.registers().program_counter(), 0x8002);
        assert_eq!(cpu.registers().a(), 0x42);
    }

    #[test]
    fn test_file_round_trip() {
        let mut cpu = setup_cpu();
        cpu.step();
        let state = cpu.save_state();

        let path = std::env::temp_dir().join(format!("mos6502_core_state_{}.bin", std::process::id()));
        let filename = path.to_string_lossy().to_string();
        state.save_to_file(&filename).unwrap();
        let loaded = SaveState::load_from_file(&filename).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, state);
    }

    #[test]
    fn test_rejects_newer_version() {
        let mut state = setup_cpu().save_state();
        state.version = SaveState::CURRENT_VERSION + 1;
        let bytes = bincode::serialize(&state).unwrap();

        let err = SaveState::from_bytes(&bytes).unwrap_err();
        assert!(err.contains("not supported"));

        let mut cpu = setup_cpu();
        assert!(cpu.load_state(&state).is_err());
    }

    #[test]
    fn test_rejects_truncated_memory() {
        let mut state = setup_cpu().save_state();
        state.memory.truncate(0x100);

        let mut cpu = setup_cpu();
        let before = *cpu.registers();
        assert!(cpu.load_state(&state).is_err());
        assert_eq!(*cpu.registers(), before);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = SaveState::load_from_file("/nonexistent/mos6502_core/state.bin").unwrap_err();
        assert!(err.starts_with("Failed to open save file"));
    }
}
