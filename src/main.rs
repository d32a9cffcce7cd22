use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};

use ls8::disasm;
use ls8::loader::load_file;
use ls8::output::{Condition, Output};
use ls8::{dprintln, Machine};

/// ls8 is a simulator for the LS-8, an 8-bit educational computer.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a `.ls8` file to run
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a text `.ls8` or raw binary program and output to terminal
    Run {
        /// `.ls8` text file, or any other file as a raw image
        name: PathBuf,
        /// Produce minimal output, suited for blackbox tests
        #[arg(short, long)]
        minimal: bool,
        /// Print every instruction as it executes, and the registers on exit
        #[arg(short, long)]
        trace: bool,
        /// Step once every `CLOCK` milliseconds instead of as fast as possible
        #[arg(short, long)]
        clock: Option<u64>,
        /// Give up after this many instructions
        #[arg(long)]
        max_steps: Option<u64>,
    },
    /// Load a program without running it
    Check {
        /// File to check
        name: PathBuf,
    },
    /// Print a disassembly listing of a program
    Dump {
        /// File to disassemble
        name: PathBuf,
    },
}

fn main() -> miette::Result<()> {
    use MsgColor::*;
    let args = Args::parse();
    ls8::env::init();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(ls8::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    if let Some(command) = args.command {
        match command {
            Command::Run {
                name,
                minimal,
                trace,
                clock,
                max_steps,
            } => {
                let opts = RunOptions {
                    minimal,
                    trace: trace || ls8::env::is_trace_enabled(),
                    clock: clock.map(Duration::from_millis).or(ls8::env::clock_period()),
                    max_steps,
                };
                run(&name, opts)
            }
            Command::Check { name } => {
                file_message(Green, "Checking", &name);
                let program = load_file(&name)?;
                message(Green, "Success", &format!("{} bytes, no errors found!", program.len()));
                Ok(())
            }
            Command::Dump { name } => {
                file_message(Green, "Loading", &name);
                let program = load_file(&name)?;
                for line in disasm::listing(&program) {
                    let bytes = program[line.address..]
                        .iter()
                        .take(line.size())
                        .map(|byte| format!("{byte:08b}"))
                        .collect::<Vec<_>>()
                        .join(" ");
                    Output::Normal.print_str(&format!(
                        "{:02x}: {:<26} {}\n",
                        line.address, bytes, line
                    ));
                }
                Ok(())
            }
        }
    } else if let Some(path) = args.path {
        run(&path, RunOptions::default())
    } else {
        println!("\n~ ls8 v{VERSION} ~");
        println!("{}", LOGO.truecolor(255, 183, 197).bold());
        println!("{SHORT_INFO}");
        Ok(())
    }
}

#[derive(Default)]
struct RunOptions {
    minimal: bool,
    trace: bool,
    clock: Option<Duration>,
    max_steps: Option<u64>,
}

enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &PathBuf) {
    let right = format!("target {}", right.display());
    message(color, left, &right);
}

fn message(color: MsgColor, left: &str, right: &str) {
    if Output::is_minimal() {
        return;
    }
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    println!("{left:>12} {right}");
}

fn run(name: &PathBuf, opts: RunOptions) -> Result<()> {
    Output::set_minimal(opts.minimal);

    file_message(MsgColor::Green, "Loading", name);
    let program = load_file(name)?;

    let mut machine = Machine::new();
    machine.load_program(&program).into_diagnostic()?;
    machine.set_trace(opts.trace);
    machine.set_max_steps(opts.max_steps);

    message(MsgColor::Green, "Running", "loaded program");
    let result = match opts.clock {
        Some(period) => machine.run_clocked(period),
        None => machine.run(),
    };

    if opts.trace {
        dprintln!(Sometimes);
        Output::Diagnostic(Condition::Always).print_registers(machine.cpu());
    }
    if let Err(fault) = result {
        message(MsgColor::Red, "Faulted", &fault.to_string());
        return Err(fault).into_diagnostic();
    }

    message(MsgColor::Cyan, "Halted", &format!("after {} instructions", machine.cpu().steps()));
    file_message(MsgColor::Green, "Completed", name);
    Ok(())
}

const LOGO: &str = r#"
 _      _____       ___
| |    / ____|     / _ \
| |   | (___ ____ | (_) |
| |    \___ \____| > _ <
| |____ ____) |   | (_) |
|______|_____/     \___/"#;

const SHORT_INFO: &str = r"
Welcome to ls8, a simulator for the LS-8 8-bit computer.
Please use `-h` or `--help` to access the usage instructions and documentation.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
