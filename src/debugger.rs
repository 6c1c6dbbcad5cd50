use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::Serialize;

use crate::cpu::{instructions_named, AddressingMode, Command, Cpu, Instruction, Registers};
use crate::cpu_bus::CpuBus;

#[derive(Debug, Clone)]
pub struct Breakpoint {
    pub address: u16,
    pub enabled: bool,
    pub hit_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub pc: u16,
    pub op_code: u8,
    pub operands: Vec<u8>,
    pub mnemonic: String,
    pub disassembly: String,
    pub registers: RegisterSnapshot,
    pub cycle_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegisterSnapshot {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub p: u8,
}

impl From<&Registers> for RegisterSnapshot {
    fn from(regs: &Registers) -> Self {
        RegisterSnapshot {
            a: regs.a(),
            x: regs.x(),
            y: regs.y(),
            sp: regs.stack_pointer(),
            p: regs.status(),
        }
    }
}

/// Decodes the instruction at `pc` and renders it in assembler syntax.
/// Returns the text and the instruction length in bytes.
pub fn disassemble(bus: &mut dyn CpuBus, pc: u16) -> (String, u16) {
    let instruction = Instruction::decode(bus.read(pc));
    let length = instruction.bytes_to_read() as u16;
    let lo = bus.read(pc.wrapping_add(1));
    let word = bus.read_address_from(pc.wrapping_add(1));
    let mnemonic = instruction.command().mnemonic();

    let operand = match instruction.addressing_mode() {
        AddressingMode::Implied | AddressingMode::Unknown => String::new(),
        AddressingMode::Accumulator => "A".to_string(),
        AddressingMode::Immediate => format!("#${:02X}", lo),
        AddressingMode::ZeroPage => format!("${:02X}", lo),
        AddressingMode::ZeroPageX => format!("${:02X},X", lo),
        AddressingMode::ZeroPageY => format!("${:02X},Y", lo),
        AddressingMode::Absolute => format!("${:04X}", word),
        AddressingMode::AbsoluteX => format!("${:04X},X", word),
        AddressingMode::AbsoluteY => format!("${:04X},Y", word),
        AddressingMode::Indirect => format!("(${:04X})", word),
        AddressingMode::IndexedIndirect => format!("(${:02X},X)", lo),
        AddressingMode::IndirectIndexed => format!("(${:02X}),Y", lo),
        AddressingMode::Relative => {
            let target = pc.wrapping_add(2).wrapping_add(lo as i8 as u16);
            format!("${:04X}", target)
        }
    };

    if operand.is_empty() {
        (mnemonic.to_string(), length)
    } else {
        (format!("{} {}", mnemonic, operand), length)
    }
}

pub struct Debugger {
    breakpoints: HashMap<u16, Breakpoint>,
    trace_buffer: VecDeque<TraceEntry>,
    history_size: usize,
    instruction_count: u64,
    paused: bool,
}

impl Debugger {
    pub fn new(history_size: usize) -> Self {
        Self {
            breakpoints: HashMap::new(),
            trace_buffer: VecDeque::with_capacity(history_size.min(4096)),
            history_size: history_size.max(1),
            instruction_count: 0,
            paused: false,
        }
    }

    pub fn add_breakpoint(&mut self, address: u16) {
        self.breakpoints.insert(
            address,
            Breakpoint {
                address,
                enabled: true,
                hit_count: 0,
            },
        );
        log::debug!("Breakpoint added at ${:04X}", address);
    }

    pub fn remove_breakpoint(&mut self, address: u16) -> bool {
        let removed = self.breakpoints.remove(&address).is_some();
        if removed {
            log::debug!("Breakpoint removed from ${:04X}", address);
        }
        removed
    }

    pub fn toggle_breakpoint(&mut self, address: u16) {
        if let Some(bp) = self.breakpoints.get_mut(&address) {
            bp.enabled = !bp.enabled;
        }
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.values()
    }

    /// Checks `pc` against the enabled breakpoints, pausing on a hit.
    pub fn hit_breakpoint(&mut self, pc: u16) -> bool {
        match self.breakpoints.get_mut(&pc) {
            Some(bp) if bp.enabled => {
                bp.hit_count += 1;
                log::info!("Breakpoint hit at ${:04X} (hit count: {})", pc, bp.hit_count);
                self.paused = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Records the instruction about to run at the CPU's program counter,
    /// along with the registers as they are before it executes.
    pub fn record_trace<B: CpuBus>(&mut self, cpu: &mut Cpu<B>) {
        let registers = *cpu.registers();
        let cycle_count = cpu.cycles();
        let pc = registers.program_counter();
        let bus = cpu.bus_mut();

        let op_code = bus.read(pc);
        let (disassembly, length) = disassemble(&mut *bus, pc);
        let operands = (1..length).map(|i| bus.read(pc.wrapping_add(i))).collect();

        let entry = TraceEntry {
            pc,
            op_code,
            operands,
            mnemonic: Instruction::decode(op_code).command().mnemonic().to_string(),
            disassembly,
            registers: RegisterSnapshot::from(&registers),
            cycle_count,
        };

        if self.trace_buffer.len() == self.history_size {
            self.trace_buffer.pop_front();
        }
        self.trace_buffer.push_back(entry);
        self.instruction_count += 1;
    }

    pub fn trace(&self) -> impl Iterator<Item = &TraceEntry> {
        self.trace_buffer.iter()
    }

    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    /// How often each mnemonic appears in the trace ring.
    pub fn command_histogram(&self) -> Vec<(Command, usize)> {
        let mut counts: HashMap<Command, usize> = HashMap::new();
        for entry in &self.trace_buffer {
            *counts
                .entry(Instruction::decode(entry.op_code).command())
                .or_default() += 1;
        }
        let mut histogram: Vec<_> = counts.into_iter().collect();
        histogram.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        histogram
    }

    /// Distinct op codes of `command` seen in the trace, against how many
    /// the instruction table defines for it.
    pub fn op_code_coverage(&self, command: Command) -> (usize, usize) {
        let variants = instructions_named(command);
        let seen = variants
            .iter()
            .filter(|variant| {
                self.trace_buffer
                    .iter()
                    .any(|entry| entry.op_code == variant.op_code())
            })
            .count();
        (seen, variants.len())
    }

    pub fn export_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(&self.trace_buffer)
            .map_err(|e| format!("Failed to serialize trace: {}", e))
    }

    pub fn write_trace_json(&self, filename: &str) -> Result<(), String> {
        let json = self.export_json()?;
        std::fs::write(filename, json).map_err(|e| format!("Failed to write trace file: {}", e))
    }

    pub fn format_trace(&self, count: usize) -> String {
        let start = self.trace_buffer.len().saturating_sub(count);
        let mut out = String::new();
        for entry in self.trace_buffer.iter().skip(start) {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }
}

impl Default for Debugger {
    fn default() -> Self {
        Self::new(crate::debug_flags::DEFAULT_TRACE_HISTORY as usize)
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04X}  {:<14} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            self.pc,
            self.disassembly,
            self.registers.a,
            self.registers.x,
            self.registers.y,
            self.registers.p,
            self.registers.sp,
            self.cycle_count
        )
    }
}

/// One-line register dump with the flags spelled out as `NV-BDIZC`.
pub fn format_cpu_state(regs: &Registers, cycles: u64) -> String {
    let p = regs.status();
    let flags: String = "NV-BDIZC"
        .chars()
        .enumerate()
        .map(|(i, name)| if p & (0x80 >> i) != 0 { name } else { '.' })
        .collect();
    format!(
        "PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} SP:{:02X} P:{:02X} [{}] Cycles:{}",
        regs.program_counter(),
        regs.a(),
        regs.x(),
        regs.y(),
        regs.stack_pointer(),
        p,
        flags,
        cycles
    )
}
