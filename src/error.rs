use std::fmt;

use miette::{miette, LabeledSpan, Report, Severity};

use crate::memory::MEMORY_SIZE;

/// Fault raised while the machine is running.
///
/// Everything here ends the simulated program. Most faults are reported back to the driver;
/// division by zero never gets that far, see [`fatal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Address outside of `0..MEMORY_SIZE`.
    OutOfRange { address: usize },
    /// Program image does not fit in memory.
    ProgramTooLarge { len: usize },
    /// Stack pointer decremented below address 0.
    StackOverflow,
    /// Stack pointer incremented past the top of memory.
    StackUnderflow,
    DivideByZero { pc: usize },
    /// Driver step limit exhausted before `HLT`.
    StepLimit { steps: u64 },
    /// Program output could not be written.
    Output,
}

impl std::error::Error for Fault {}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { address } => write!(
                f,
                "memory access at address {address} is out of range (0..{MEMORY_SIZE})"
            ),
            Self::ProgramTooLarge { len } => write!(
                f,
                "program of {len} bytes does not fit in {MEMORY_SIZE} bytes of memory"
            ),
            Self::StackOverflow => write!(f, "stack pointer moved below address 0"),
            Self::StackUnderflow => write!(f, "stack pointer moved past the top of memory"),
            Self::DivideByZero { pc } => write!(f, "division by zero at address {pc}"),
            Self::StepLimit { steps } => write!(f, "no halt after {steps} instructions"),
            Self::Output => write!(f, "failed to write program output"),
        }
    }
}

/// Report an unrecoverable fault and terminate the process.
///
/// No further instruction executes after this is called.
pub fn fatal(fault: Fault) -> ! {
    eprintln!("ls8: {}, exiting", fault);
    std::process::exit(0xDD);
}

// Loader errors

pub fn load_bad_byte(span: (usize, usize), src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "load::bad_byte",
        help = "each line must hold one byte written as up to 8 binary digits",
        labels = vec![LabeledSpan::at(span, "invalid byte")],
        "Encountered an invalid program byte.",
    )
    .with_source_code(src.to_owned())
}

pub fn load_too_large(span: (usize, usize), src: &str, len: usize) -> Report {
    miette!(
        severity = Severity::Error,
        code = "load::too_large",
        help = format!("the LS-8 can only address {MEMORY_SIZE} bytes"),
        labels = vec![LabeledSpan::at(span, "first byte past the end of memory")],
        "Program is {len} bytes long and cannot fit in memory.",
    )
    .with_source_code(src.to_owned())
}

pub fn load_binary_too_large(len: usize) -> Report {
    miette!(
        severity = Severity::Error,
        code = "load::too_large",
        help = format!("the LS-8 can only address {MEMORY_SIZE} bytes"),
        "Binary image is {len} bytes long and cannot fit in memory.",
    )
}
