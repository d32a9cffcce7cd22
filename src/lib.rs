// Machine
mod alu;
pub use alu::{AluOp, AluOutput, Flag};
mod cpu;
pub use cpu::{Cpu, SP, SP_INIT};
mod memory;
pub use memory::{Memory, MEMORY_SIZE};
pub mod opcode;
pub use opcode::Opcode;

// Running
mod driver;
pub use driver::{Machine, DEFAULT_CLOCK_PERIOD};
#[macro_use]
pub mod output;

// Loading
pub mod disasm;
pub mod loader;

mod error;
pub use error::Fault;

pub mod env;

/// Amount of lines to show as context, each side of focus line (line containing span).
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 4;
