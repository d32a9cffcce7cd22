use std::io::{self, Stdout, Write};

use crate::alu::{self, AluOp, AluOutput, Flag};
use crate::disasm::Line;
use crate::dprintln;
use crate::error::{fatal, Fault};
use crate::memory::Memory;
use crate::opcode::{instruction_len, operand_count, Opcode};
use crate::output::Output;

/// Register slot holding the stack pointer.
pub const SP: usize = 7;
/// Stack pointer value at power-on. The stack grows downwards from here.
pub const SP_INIT: u8 = 0xF4;

/// Complete LS-8 processor state.
///
/// Register slot 7 is the stack pointer and is only touched by stack instructions. The
/// remaining general purpose registers are NOT read from `reg`: every other instruction
/// addresses `memory[r]` for register `r`, so low memory doubles as the register bank. Keep the
/// two locations apart, programs can observe the difference (`PUSH R7` pushes `memory[7]`).
pub struct Cpu<W = Stdout> {
    memory: Memory,
    /// 8x 8-bit register slots
    reg: [u8; 8],
    /// Program counter. Wider than a byte so running off the end is a fault, not a wrap.
    pc: usize,
    /// Flags register, `00000LGE`
    fl: u8,
    /// Set by `HLT` or a driver stop request.
    halted: bool,
    trace: bool,
    steps: u64,
    /// Sink for `PRN`.
    out: W,
}

/// What to do with the program counter after an instruction executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Next {
    /// Move past the instruction, by the length encoded in its opcode.
    Advance,
    /// The instruction set PC itself.
    Jumped,
}

impl Cpu<Stdout> {
    pub fn new(memory: Memory) -> Self {
        Cpu::with_output(memory, io::stdout())
    }
}

impl<W> Cpu<W>
where
    W: Write,
{
    pub fn with_output(memory: Memory, out: W) -> Self {
        let mut reg = [0; 8];
        reg[SP] = SP_INIT;
        Cpu {
            memory,
            reg,
            pc: 0,
            fl: 0,
            halted: false,
            trace: false,
            steps: 0,
            out,
        }
    }

    pub fn pc(&self) -> usize {
        self.pc
    }
    pub fn flags(&self) -> u8 {
        self.fl
    }
    pub fn sp(&self) -> u8 {
        self.reg[SP]
    }
    pub fn registers(&self) -> &[u8; 8] {
        &self.reg
    }
    /// Values a program sees in R0 to R7: memory-backed general registers, then the SP.
    pub fn register_values(&self) -> [u8; 8] {
        let mut values = [0; 8];
        values[..SP].copy_from_slice(&self.memory.as_slice()[..SP]);
        values[SP] = self.reg[SP];
        values
    }
    pub fn memory(&self) -> &Memory {
        &self.memory
    }
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }
    pub fn is_halted(&self) -> bool {
        self.halted
    }
    /// Amount of instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Ask the driver to stop stepping, as `HLT` does.
    pub fn request_halt(&mut self) {
        self.halted = true;
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    /// Perform exactly one fetch-decode-execute cycle.
    ///
    /// Halting is reported through [`Cpu::is_halted`]; errors are faults of the memory or stack
    /// which end the simulated program. A zero divisor terminates the process outright.
    pub fn step(&mut self) -> Result<(), Fault> {
        let pc = self.pc;
        let ir = self.memory.read(pc)?;
        let operand_a = self.fetch_operand(1, ir)?;
        let operand_b = self.fetch_operand(2, ir)?;

        if self.trace {
            if let Some(line) = Line::decode(self.memory.as_slice(), pc) {
                dprintln!(Always, "{:02x}: {}", pc, line);
            }
        }
        self.steps += 1;

        let next = match Opcode::try_from(ir) {
            Ok(op) => self.execute(op, operand_a, operand_b)?,
            Err(byte) => {
                Output::warn(&format!("unknown opcode 0x{byte:02x} at address {pc}"));
                Next::Advance
            }
        };

        if next == Next::Advance {
            self.pc = pc + instruction_len(ir);
        }
        Ok(())
    }

    /// Operands are always fetched, whether the instruction uses them or not.
    fn fetch_operand(&self, offset: usize, ir: u8) -> Result<u8, Fault> {
        match self.memory.read(self.pc + offset) {
            Ok(byte) => Ok(byte),
            // Lookahead past the end of memory is harmless if the operand is unused
            Err(_) if offset > operand_count(ir) => Ok(0),
            Err(fault) => Err(fault),
        }
    }

    fn execute(&mut self, op: Opcode, a: u8, b: u8) -> Result<Next, Fault> {
        use Opcode::*;

        match op {
            ADD | SUB | MUL | DIV | MOD | INC | DEC | NOT | AND | OR | XOR | CMP => {
                if let Some(alu_op) = AluOp::from_opcode(op) {
                    self.alu(alu_op, operand_count(op as u8), a, b)?;
                }
            }
            NOP => (),
            HLT => self.halted = true,
            LDI => self.set_reg(a, b)?,
            LD => {
                let addr = self.get_reg(b)?;
                let val = self.memory.read(addr as usize)?;
                self.set_reg(a, val)?;
            }
            ST => {
                let addr = self.get_reg(a)?;
                let val = self.get_reg(b)?;
                self.memory.write(addr as usize, val)?;
            }
            PRN => {
                let val = self.get_reg(a)?;
                writeln!(self.out, "{}", val).map_err(|_| Fault::Output)?;
            }
            PUSH => {
                let val = self.get_reg(a)?;
                self.push_val(val)?;
            }
            POP => {
                let val = self.pop_val()?;
                self.set_reg(a, val)?;
            }
            CALL => {
                let return_addr = self.pc + 2;
                let return_addr = u8::try_from(return_addr)
                    .map_err(|_| Fault::OutOfRange {
                        address: return_addr,
                    })?;
                self.push_val(return_addr)?;
                self.pc = self.get_reg(a)? as usize;
                return Ok(Next::Jumped);
            }
            RET => {
                self.pc = self.pop_val()? as usize;
                return Ok(Next::Jumped);
            }
            JMP => return self.jump_if(true, a),
            JEQ => return self.jump_if(self.flag_set(Flag::Equal), a),
            JNE => return self.jump_if(!self.flag_set(Flag::Equal), a),
            JGT => return self.jump_if(self.flag_set(Flag::Greater), a),
            JLT => return self.jump_if(self.flag_set(Flag::Less), a),
            // Interrupt family: only the stack adjustment is carried out. Registers are not
            // saved or restored and nothing is printed.
            INT => {
                let val = self.get_reg(a)?;
                self.push_val(val)?;
            }
            IRET => {
                let _ = self.pop_val()?;
            }
            PRA => {
                let val = self.pop_val()?;
                self.set_reg(a, val)?;
            }
        }
        Ok(Next::Advance)
    }

    fn alu(&mut self, op: AluOp, operands: usize, a: u8, b: u8) -> Result<(), Fault> {
        let val_a = self.get_reg(a)?;
        let val_b = if operands == 2 {
            self.get_reg(b)?
        } else {
            0
        };
        match alu::eval(op, val_a, val_b, self.pc) {
            Ok(AluOutput::Flags(flag)) => self.fl = flag as u8,
            Ok(output @ AluOutput::Value(_)) => {
                if let Some(val) = output.truncated() {
                    self.set_reg(a, val)?;
                }
            }
            Err(fault @ Fault::DivideByZero { .. }) => fatal(fault),
            Err(fault) => return Err(fault),
        }
        Ok(())
    }

    #[inline]
    fn flag_set(&self, flag: Flag) -> bool {
        (self.fl & flag as u8) != 0
    }

    fn jump_if(&mut self, condition: bool, reg: u8) -> Result<Next, Fault> {
        if !condition {
            return Ok(Next::Advance);
        }
        self.pc = self.get_reg(reg)? as usize;
        Ok(Next::Jumped)
    }

    /// General purpose register `r`, which lives at `memory[r]`.
    #[inline]
    fn get_reg(&self, reg: u8) -> Result<u8, Fault> {
        self.memory.read(reg as usize)
    }

    #[inline]
    fn set_reg(&mut self, reg: u8, val: u8) -> Result<(), Fault> {
        self.memory.write(reg as usize, val)
    }

    fn push_val(&mut self, val: u8) -> Result<(), Fault> {
        // Decrement stack
        let sp = self.reg[SP].checked_sub(1).ok_or(Fault::StackOverflow)?;
        self.reg[SP] = sp;
        // Save onto stack
        self.memory.write(sp as usize, val)
    }

    fn pop_val(&mut self) -> Result<u8, Fault> {
        let sp = self.reg[SP];
        let val = self.memory.read(sp as usize)?;
        self.reg[SP] = sp.checked_add(1).ok_or(Fault::StackUnderflow)?;
        Ok(val)
    }
}

impl Cpu<Vec<u8>> {
    /// Program output captured so far, for in-memory sinks.
    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }
}
