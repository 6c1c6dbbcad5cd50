use std::env;
use std::path::PathBuf;
use std::process;

use mos6502_core::debug_flags;
use mos6502_core::debugger::{format_cpu_state, Debugger};
use mos6502_core::{Clock, Cpu, Memory, SaveState};

#[derive(Debug, Default)]
struct Options {
    image: Option<PathBuf>,
    load_address: u16,
    reset_vector: Option<u16>,
    cycles: Option<u64>,
    breakpoints: Vec<u16>,
    save_state: Option<String>,
    load_state: Option<String>,
    trace_json: Option<String>,
}

fn usage(program: &str) {
    eprintln!(
        "Usage: {} [--load HEX] [--reset-vector HEX] [--cycles N] [--break HEX]... \
         [--save-state FILE] [--load-state FILE] [--trace-json FILE] <image>",
        program
    );
    eprintln!("The image is a raw binary copied into memory at --load (default $0000).");
    eprintln!("<image> may be omitted when --load-state is given.");
}

fn parse_hex(value: &str) -> Result<u16, String> {
    let digits = value
        .trim_start_matches('$')
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid address '{}': {}", value, e))
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut i = 1;

    let value_of = |i: usize, flag: &str| -> Result<String, String> {
        args.get(i + 1)
            .cloned()
            .ok_or_else(|| format!("{} requires a value", flag))
    };

    while i < args.len() {
        match args[i].as_str() {
            "--load" => {
                options.load_address = parse_hex(&value_of(i, "--load")?)?;
                i += 2;
            }
            "--reset-vector" => {
                options.reset_vector = Some(parse_hex(&value_of(i, "--reset-vector")?)?);
                i += 2;
            }
            "--cycles" => {
                let value = value_of(i, "--cycles")?;
                let cycles = value
                    .replace('_', "")
                    .parse::<u64>()
                    .map_err(|e| format!("--cycles: {}", e))?;
                options.cycles = Some(cycles);
                i += 2;
            }
            "--break" => {
                options.breakpoints.push(parse_hex(&value_of(i, "--break")?)?);
                i += 2;
            }
            "--save-state" => {
                options.save_state = Some(value_of(i, "--save-state")?);
                i += 2;
            }
            "--load-state" => {
                options.load_state = Some(value_of(i, "--load-state")?);
                i += 2;
            }
            "--trace-json" => {
                options.trace_json = Some(value_of(i, "--trace-json")?);
                i += 2;
            }
            s if s.starts_with('-') => {
                return Err(format!("Unknown option: {}", s));
            }
            s => {
                if options.image.is_some() {
                    return Err(format!("Unexpected argument: {}", s));
                }
                options.image = Some(PathBuf::from(s));
                i += 1;
            }
        }
    }

    if options.image.is_none() && options.load_state.is_none() {
        return Err("program image argument missing".to_string());
    }
    Ok(options)
}

fn build_cpu(options: &Options) -> Result<Cpu<Memory>, String> {
    let mut memory = Memory::new();

    if let Some(path) = &options.image {
        let image = std::fs::read(path)
            .map_err(|e| format!("Failed to read image {}: {}", path.display(), e))?;
        if image.len() > mos6502_core::memory::MEMORY_SIZE {
            return Err(format!(
                "Image {} is {} bytes, larger than the address space",
                path.display(),
                image.len()
            ));
        }
        memory.load(options.load_address, &image);
    }
    if let Some(vector) = options.reset_vector {
        memory.set_reset_vector(vector);
    }

    let mut cpu = Cpu::new(memory);

    if let Some(filename) = &options.load_state {
        let state = SaveState::load_from_file(filename)?;
        cpu.load_state(&state)?;
    }
    Ok(cpu)
}

fn run(options: Options) -> Result<(), String> {
    let quiet = debug_flags::quiet();
    let tracing = debug_flags::cpu_trace() || options.trace_json.is_some();
    let budget = options.cycles.unwrap_or_else(debug_flags::headless_cycles);

    let mut cpu = build_cpu(&options)?;
    let mut debugger = Debugger::new(debug_flags::trace_history());
    for &address in &options.breakpoints {
        debugger.add_breakpoint(address);
    }

    if !quiet {
        if let Some(path) = &options.image {
            println!(
                "Loaded {} at ${:04X}",
                path.display(),
                options.load_address
            );
        }
        println!("Start: {}", format_cpu_state(cpu.registers(), cpu.cycles()));
    }

    let mut clock = Clock::default();
    let mut retired = 0u64;
    while clock.master_cycles() < budget {
        if cpu.is_idle() {
            if debugger.hit_breakpoint(cpu.registers().program_counter()) {
                break;
            }
            if tracing {
                debugger.record_trace(&mut cpu);
            }
        }
        if clock.pulse(&mut cpu) {
            retired += 1;
        }
    }

    if !quiet {
        if debugger.is_paused() {
            println!(
                "Stopped at breakpoint ${:04X}",
                cpu.registers().program_counter()
            );
        }
        println!("End:   {}", format_cpu_state(cpu.registers(), cpu.cycles()));
        println!(
            "Ran {} cycles, retired {} instructions",
            clock.master_cycles(),
            retired
        );
        if debug_flags::cpu_trace() {
            print!("{}", debugger.format_trace(debug_flags::trace_history()));
            for (command, count) in debugger.command_histogram() {
                let (seen, defined) = debugger.op_code_coverage(command);
                println!(
                    "{:<4}{:>8}  ({}/{} op codes)",
                    command.mnemonic(),
                    count,
                    seen,
                    defined
                );
            }
        }
    }

    if let Some(filename) = &options.trace_json {
        debugger.write_trace_json(filename)?;
        if !quiet {
            println!("Trace written to: {}", filename);
        }
    }

    if let Some(filename) = &options.save_state {
        cpu.save_state().save_to_file(filename)?;
        if !quiet {
            println!("Save state written to: {}", filename);
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let program = args
        .first()
        .map(String::as_str)
        .unwrap_or("headless_runner")
        .to_string();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        usage(&program);
        return;
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("{}", msg);
            usage(&program);
            process::exit(2);
        }
    };

    if let Err(msg) = run(options) {
        eprintln!("{}", msg);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("headless_runner")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_hex_prefixes() {
        assert_eq!(parse_hex("8000"), Ok(0x8000));
        assert_eq!(parse_hex("$C000"), Ok(0xC000));
        assert_eq!(parse_hex("0x00ff"), Ok(0x00FF));
        assert!(parse_hex("10000").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(&args(&[
            "--load", "8000", "--reset-vector", "$8000", "--cycles", "1_000", "--break", "8010",
            "--break", "8020", "prog.bin",
        ]))
        .unwrap();

        assert_eq!(options.load_address, 0x8000);
        assert_eq!(options.reset_vector, Some(0x8000));
        assert_eq!(options.cycles, Some(1000));
        assert_eq!(options.breakpoints, vec![0x8010, 0x8020]);
        assert_eq!(options.image, Some(PathBuf::from("prog.bin")));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["--cycles"])).is_err());
        assert!(parse_args(&args(&["--bogus", "prog.bin"])).is_err());
        assert!(parse_args(&args(&["a.bin", "b.bin"])).is_err());
        assert!(parse_args(&args(&["--load-state", "s.bin"])).is_ok());
    }
}
