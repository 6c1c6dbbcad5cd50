use std::sync::OnceLock;

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().replace('_', "").parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "on" | "ON")
}

pub const DEFAULT_HEADLESS_CYCLES: u64 = 1_000_000;
pub const DEFAULT_TRACE_HISTORY: u64 = 1000;

// Suppress the runner's summary output
pub fn quiet() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| env_flag("QUIET", false))
}

// Record every retired instruction into the debugger trace ring (noisy)
pub fn cpu_trace() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| env_flag("DEBUG_CPU_TRACE", false))
}

pub fn headless_cycles() -> u64 {
    static VALUE: OnceLock<u64> = OnceLock::new();
    *VALUE.get_or_init(|| env_u64("HEADLESS_CYCLES", DEFAULT_HEADLESS_CYCLES))
}

pub fn trace_history() -> usize {
    static VALUE: OnceLock<u64> = OnceLock::new();
    *VALUE.get_or_init(|| env_u64("TRACE_HISTORY", DEFAULT_TRACE_HISTORY).max(1)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("on"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("yes"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_unset_variables_fall_back_to_defaults() {
        assert!(!env_flag("MOS6502_CORE_TEST_UNSET_FLAG", false));
        assert!(env_flag("MOS6502_CORE_TEST_UNSET_FLAG", true));
        assert_eq!(env_u64("MOS6502_CORE_TEST_UNSET_NUMBER", 42), 42);
    }
}
