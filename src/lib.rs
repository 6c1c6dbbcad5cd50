pub mod clock;
pub mod cpu;
pub mod cpu_bus;
pub mod debug_flags;
pub mod debugger;
pub mod memory;
pub mod savestate;

pub use clock::{Clock, Tickable};
pub use cpu::{Cpu, Registers, StatusFlags};
pub use cpu_bus::CpuBus;
pub use memory::Memory;
pub use savestate::SaveState;
