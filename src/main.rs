//! bf-engine - CLI Entry Point
//!
//! Commands:
//! - `bf-engine run <program>` - Run a source or `.bfi` image file
//! - `bf-engine debug <program>` - Interactive debugger
//! - `bf-engine asm <source>` - Assemble to a `.bfi` image
//! - `bf-engine disasm <image>` - Disassemble an image
//! - `bf-engine config` - Print a sample config file

use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bf-engine")]
#[command(version = "0.1.0")]
#[command(about = "A tick-accurate execution engine for the eight-symbol Brainfuck instruction set")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Memory sizing shared by the commands that build an engine.
#[derive(Args)]
struct EngineArgs {
    /// Program store address width in bits
    #[arg(long)]
    code_bits: Option<u8>,
    /// Data tape address width in bits
    #[arg(long)]
    tape_bits: Option<u8>,
    /// Config file (default: ./bf-engine.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program for a fixed number of ticks
    Run {
        /// Path to the source or .bfi file to execute
        program: PathBuf,
        #[command(flatten)]
        engine: EngineArgs,
        /// Maximum number of ticks to run
        #[arg(short, long, default_value = "100000")]
        max_ticks: u64,
        /// Stop after this many output bytes
        #[arg(short, long)]
        outputs: Option<usize>,
        /// Show trace output
        #[arg(short, long)]
        trace: bool,
        /// Print output bytes as ASCII instead of numbers
        #[arg(short, long)]
        ascii: bool,
        /// Print the final engine state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive debugger
    Debug {
        /// Path to the source or .bfi file to debug
        program: PathBuf,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Assemble source to a .bfi image
    Asm {
        /// Path to the source file
        source: PathBuf,
        /// Output image file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Disassemble a .bfi image or source file
    Disasm {
        /// Path to the image
        image: PathBuf,
    },
    /// Print a sample config file
    Config,
    /// Run the built-in self-test
    Test,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { program, engine, max_ticks, outputs, trace, ascii, json }) => {
            let options = RunOptions { max_ticks, outputs, trace, ascii, json };
            run_program(&program, &engine, &options);
        }
        Some(Commands::Debug { program, engine }) => {
            debug_program(&program, &engine);
        }
        Some(Commands::Asm { source, output }) => {
            assemble_file(&source, output);
        }
        Some(Commands::Disasm { image }) => {
            disassemble_file(&image);
        }
        Some(Commands::Config) => {
            print!("{}", bf::Config::sample_config());
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("bf-engine v0.1.0");
            println!("A tick-accurate Brainfuck execution engine");
            println!();
            println!("Use --help for available commands");
            println!();
            demo_engine();
        }
    }
}

struct RunOptions {
    max_ticks: u64,
    outputs: Option<usize>,
    trace: bool,
    ascii: bool,
    json: bool,
}

fn resolve_geometry(args: &EngineArgs) -> bf::Geometry {
    use bf::Config;

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Config error: {}", e);
            std::process::exit(1);
        }
    };
    config.merge(Config {
        code_addr_bits: args.code_bits,
        tape_addr_bits: args.tape_bits,
    });

    match config.geometry() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("❌ Config error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_checked(path: &std::path::Path) -> bf::ProgramImage {
    use bf::asm::check_brackets;

    let image = match bf::load_program(path) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("❌ Failed to load {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = check_brackets(&image) {
        log::warn!("{}; the engine will scan through the address space", e);
    }

    image
}

fn run_program(path: &std::path::Path, args: &EngineArgs, options: &RunOptions) {
    use bf::Engine;

    let geometry = resolve_geometry(args);
    let image = load_checked(path);

    if !options.json {
        println!("🔧 Running: {} ({} bytes)", path.display(), image.len());
        println!();
        println!("━━━ Execution ━━━");
    }

    let mut engine = Engine::new(geometry, &image);
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();

    let emitted = match drive(&mut engine, options, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(emitted) => emitted,
        Err(e) => {
            eprintln!("❌ Failed to write output: {}", e);
            std::process::exit(1);
        }
    };

    if options.json {
        match serde_json::to_string_pretty(&engine.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("❌ Failed to serialize state: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let regs = engine.state();
    if options.ascii {
        println!();
    }
    println!();
    println!("━━━ Result ━━━");
    println!("Ticks:   {}", engine.ticks());
    println!("Outputs: {}", emitted.len());
    println!("PC:      {}", regs.pc);
    println!("PTR:     {} (cell = {})", regs.ptr, engine.tape().read(regs.ptr));
    println!("Mode:    {:?} (level {})", regs.mode, regs.skip_level);

    if engine.ticks() >= options.max_ticks {
        println!();
        println!("⚠️  Reached max ticks limit ({}). Use --max-ticks to increase.", options.max_ticks);
    }
}

/// Tick the engine until a limit is hit.
///
/// Output bytes go to `out` unless `--json` owns stdout. Trace lines
/// always go to `trace`, so they never mix with program output.
fn drive(
    engine: &mut bf::Engine,
    options: &RunOptions,
    out: &mut impl Write,
    trace: &mut impl Write,
) -> std::io::Result<Vec<u8>> {
    use bf::asm::disasm::disassemble_byte;

    let mut emitted = Vec::new();

    while engine.ticks() < options.max_ticks {
        let report = engine.tick();

        if options.trace {
            let regs = engine.state();
            writeln!(
                trace,
                "{:06} {:04}: {:<14}{} ptr={} level={}",
                report.tick,
                report.pc,
                disassemble_byte(report.byte).trim_start(),
                if report.skipped { " skip" } else { "     " },
                regs.ptr,
                regs.skip_level
            )?;
        }

        if let Some(byte) = report.output {
            emitted.push(byte);
            if !options.json {
                if options.ascii {
                    write!(out, "{}", byte as char)?;
                    out.flush()?;
                } else {
                    writeln!(out, "out: {:3} ({:#04x}) at tick {}", byte, byte, report.tick)?;
                }
            }
            if options.outputs.is_some_and(|limit| emitted.len() >= limit) {
                break;
            }
        }
    }

    Ok(emitted)
}

#[cfg(feature = "tui")]
fn debug_program(path: &std::path::Path, args: &EngineArgs) {
    use bf::tui::run_debugger;

    let geometry = resolve_geometry(args);
    let image = load_checked(path);

    println!("🚀 Launching debugger...");

    if let Err(e) = run_debugger(geometry, &image) {
        eprintln!("❌ Debugger error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn debug_program(_path: &std::path::Path, _args: &EngineArgs) {
    eprintln!("❌ Built without the `tui` feature");
    std::process::exit(1);
}

fn assemble_file(source_path: &std::path::Path, output: Option<PathBuf>) {
    use bf::asm::{assemble, save_image, IMAGE_EXTENSION};

    let out_path = output.unwrap_or_else(|| source_path.with_extension(IMAGE_EXTENSION));

    println!("📝 Assembling: {} → {}", source_path.display(), out_path.display());

    let source = match std::fs::read_to_string(source_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    };

    let image = assemble(&source);
    println!("✓ Assembled {} bytes", image.len());

    if let Err(e) = save_image(&out_path, &image) {
        eprintln!("❌ Failed to save image: {}", e);
        std::process::exit(1);
    }

    println!("✓ Saved to {}", out_path.display());
}

fn disassemble_file(path: &std::path::Path) {
    use bf::asm::disassemble;

    println!("📖 Disassembling: {}", path.display());
    println!();

    let image = match bf::load_program(path) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("❌ Failed to load {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };

    println!("{}", disassemble(&image));
}

fn demo_engine() {
    use bf::{Engine, Geometry};

    println!("━━━ Engine Demo ━━━");
    println!();

    let source = "++++[>+++<-]>.";
    let mut engine = Engine::from_source(Geometry::default(), source);
    let out = engine.run_until_output(1000);

    println!("  Program:  {}", source);
    println!("  Output:   {:?}", out);
    println!("  Ticks:    {}", engine.ticks());
    println!("  Tape[0]:  {}", engine.tape().read(0));
    println!("  Tape[1]:  {}", engine.tape().read(1));
    println!();
}

fn run_self_test() {
    use bf::{assemble, Engine, Geometry, Opcode};
    use bf::cpu::decode;

    println!("━━━ bf-engine Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    let mut check = |name: &str, ok: bool, detail: String| {
        print!("{}... ", name);
        if ok {
            println!("✓");
            passed += 1;
        } else {
            println!("✗ {}", detail);
            failed += 1;
        }
    };

    // Test 1: Decode totality
    let non_nop = (0..=255u8).filter(|&b| decode(b).op != Opcode::Nop).count();
    check("Decode table", non_nop == 7, format!("(got {} non-NOP bytes, expected 7)", non_nop));

    // Test 2: Assembler filtering
    let image = assemble("a+b-c.");
    check(
        "Assembler filtering",
        image.as_bytes() == [0, 0, b'+', b'-', b'.'],
        format!("(got {:?})", image.as_bytes()),
    );

    // Test 3: Output pulse
    let mut engine = Engine::from_source(Geometry::default(), "+.");
    let out = engine.run_until_output(10);
    check("Output pulse", out == Some(1), format!("(got {:?}, expected Some(1))", out));

    // Test 4: Countdown loop
    let mut engine = Engine::from_source(Geometry::default(), "+++[-].");
    let out = engine.run_until_output(100);
    check("Countdown loop", out == Some(0), format!("(got {:?}, expected Some(0))", out));

    // Test 5: Transfer loop
    let mut engine = Engine::from_source(Geometry::default(), "++[->+<].");
    let out = engine.run_until_output(100);
    let cell1 = engine.tape().read(1);
    check(
        "Transfer loop",
        out == Some(0) && cell1 == 2,
        format!("(got {:?}, cell1 = {})", out, cell1),
    );

    // Test 6: Pointer wraparound
    let mut engine = Engine::from_source(Geometry::new(8, 2).unwrap_or_default(), "<<<<");
    engine.run_ticks(6);
    let ptr = engine.state().ptr;
    check("Pointer wraparound", ptr == 0, format!("(got ptr = {})", ptr));

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bf::{Engine, Geometry};

    fn options(trace: bool, json: bool) -> RunOptions {
        RunOptions { max_ticks: 50, outputs: None, trace, ascii: false, json }
    }

    #[test]
    fn test_json_run_keeps_stdout_clean() {
        let mut engine = Engine::from_source(Geometry::default(), "+.");
        let mut out = Vec::new();
        let mut trace = Vec::new();

        let emitted = drive(&mut engine, &options(true, true), &mut out, &mut trace).unwrap();

        assert_eq!(emitted[0], 1);
        assert!(out.is_empty());
        assert_eq!(String::from_utf8(trace).unwrap().lines().count(), 50);
    }

    #[test]
    fn test_trace_goes_to_its_own_stream() {
        let mut engine = Engine::from_source(Geometry::default(), "+.");
        let mut out = Vec::new();
        let mut trace = Vec::new();
        let opts = RunOptions { outputs: Some(1), ..options(true, false) };

        drive(&mut engine, &opts, &mut out, &mut trace).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, "out:   1 (0x01) at tick 3\n");
        assert_eq!(String::from_utf8(trace).unwrap().lines().count(), 4);
    }
}
