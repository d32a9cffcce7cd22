use std::cmp::Ordering;

use crate::error::Fault;
use crate::opcode::Opcode;

/// Outcome of the most recent `CMP`, stored in the `FL` register as `00000LGE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Flag {
    Equal = 0b001,
    Greater = 0b010,
    Less = 0b100,
}

impl Flag {
    pub fn from_ordering(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Flag::Less,
            Ordering::Equal => Flag::Equal,
            Ordering::Greater => Flag::Greater,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Inc,
    Dec,
    Not,
    And,
    Or,
    Xor,
    Cmp,
}

impl AluOp {
    pub fn from_opcode(op: Opcode) -> Option<Self> {
        Some(match op {
            Opcode::ADD => AluOp::Add,
            Opcode::SUB => AluOp::Sub,
            Opcode::MUL => AluOp::Mul,
            Opcode::DIV => AluOp::Div,
            Opcode::MOD => AluOp::Mod,
            Opcode::INC => AluOp::Inc,
            Opcode::DEC => AluOp::Dec,
            Opcode::NOT => AluOp::Not,
            Opcode::AND => AluOp::And,
            Opcode::OR => AluOp::Or,
            Opcode::XOR => AluOp::Xor,
            Opcode::CMP => AluOp::Cmp,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOutput {
    /// Untruncated result. Narrowed to 8 bits by the register write-back.
    Value(i32),
    /// New value for the flags register.
    Flags(Flag),
}

impl AluOutput {
    /// Result as stored into an 8-bit register slot.
    pub fn truncated(self) -> Option<u8> {
        match self {
            AluOutput::Value(value) => Some(value as u8),
            AluOutput::Flags(_) => None,
        }
    }
}

/// Evaluate `op` over already-dereferenced operand values.
///
/// Single operand operations ignore `b`. The only error is a zero divisor, which carries the
/// address of the offending instruction.
pub fn eval(op: AluOp, a: u8, b: u8, pc: usize) -> Result<AluOutput, Fault> {
    let (a, b) = (a as i32, b as i32);
    let value = match op {
        AluOp::Add => a + b,
        AluOp::Sub => a - b,
        AluOp::Mul => a * b,
        AluOp::Div | AluOp::Mod if b == 0 => return Err(Fault::DivideByZero { pc }),
        AluOp::Div => a / b,
        AluOp::Mod => a % b,
        AluOp::Inc => a + 1,
        AluOp::Dec => a - 1,
        AluOp::Not => !a,
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Cmp => return Ok(AluOutput::Flags(Flag::from_ordering(a.cmp(&b)))),
    };
    Ok(AluOutput::Value(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(op: AluOp, a: u8, b: u8) -> u8 {
        eval(op, a, b, 0).unwrap().truncated().unwrap()
    }

    #[test]
    fn arithmetic_truncates_on_write_back() {
        assert_eq!(eval(AluOp::Add, 250, 10, 0), Ok(AluOutput::Value(260)));
        assert_eq!(value(AluOp::Add, 250, 10), 4);
        assert_eq!(value(AluOp::Sub, 3, 5), 254);
        assert_eq!(value(AluOp::Mul, 16, 17), 16);
        assert_eq!(value(AluOp::Inc, 255, 0), 0);
        assert_eq!(value(AluOp::Dec, 0, 0), 255);
    }

    #[test]
    fn operators() {
        assert_eq!(value(AluOp::Add, 8, 9), 17);
        assert_eq!(value(AluOp::Mul, 8, 9), 72);
        assert_eq!(value(AluOp::Div, 9, 2), 4);
        assert_eq!(value(AluOp::Mod, 9, 2), 1);
        assert_eq!(value(AluOp::Not, 0b1010_0101, 0), 0b0101_1010);
        assert_eq!(value(AluOp::And, 0b1100, 0b1010), 0b1000);
        assert_eq!(value(AluOp::Or, 0b1100, 0b1010), 0b1110);
        assert_eq!(value(AluOp::Xor, 0b1100, 0b1010), 0b0110);
    }

    #[test]
    fn compare_sets_one_flag() {
        assert_eq!(eval(AluOp::Cmp, 7, 7, 0), Ok(AluOutput::Flags(Flag::Equal)));
        assert_eq!(eval(AluOp::Cmp, 3, 5, 0), Ok(AluOutput::Flags(Flag::Less)));
        assert_eq!(eval(AluOp::Cmp, 5, 3, 0), Ok(AluOutput::Flags(Flag::Greater)));
        for flag in [Flag::Equal, Flag::Greater, Flag::Less] {
            assert_eq!((flag as u8).count_ones(), 1);
        }
        assert_eq!(eval(AluOp::Cmp, 1, 2, 0).unwrap().truncated(), None);
    }

    #[test]
    fn zero_divisor() {
        assert_eq!(
            eval(AluOp::Div, 1, 0, 12),
            Err(Fault::DivideByZero { pc: 12 })
        );
        assert_eq!(
            eval(AluOp::Mod, 1, 0, 3),
            Err(Fault::DivideByZero { pc: 3 })
        );
    }

    #[test]
    fn opcode_mapping() {
        assert_eq!(AluOp::from_opcode(Opcode::ADD), Some(AluOp::Add));
        assert_eq!(AluOp::from_opcode(Opcode::CMP), Some(AluOp::Cmp));
        assert_eq!(AluOp::from_opcode(Opcode::JMP), None);
    }
}
