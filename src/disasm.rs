use std::fmt;

use crate::opcode::{instruction_len, operand_count, Opcode};

/// One decoded instruction of a memory image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub address: usize,
    pub opcode: Result<Opcode, u8>,
    /// Operand bytes present in the image; may be short at the end of memory.
    pub operands: Vec<u8>,
}

impl Line {
    /// Decode the instruction at `address`.
    pub fn decode(image: &[u8], address: usize) -> Option<Self> {
        let byte = *image.get(address)?;
        let operands = (1..=operand_count(byte))
            .filter_map(|offset| image.get(address + offset).copied())
            .collect();
        Some(Line {
            address,
            opcode: Opcode::try_from(byte),
            operands,
        })
    }

    pub fn size(&self) -> usize {
        let byte = match self.opcode {
            Ok(op) => op as u8,
            Err(byte) => byte,
        };
        instruction_len(byte)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.opcode {
            Ok(op) => op,
            Err(byte) => return write!(f, "??? 0x{byte:02x}"),
        };
        write!(f, "{}", op.mnemonic())?;
        for (i, operand) in self.operands.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            // `LDI` second operand is an immediate, every other operand names a register slot
            if op == Opcode::LDI && i == 1 {
                write!(f, "{sep}{operand}")?;
            } else {
                write!(f, "{sep}R{operand}")?;
            }
        }
        Ok(())
    }
}

/// Decode `image` from address 0 until the first run of trailing zero bytes.
pub fn listing(image: &[u8]) -> Vec<Line> {
    let end = image
        .iter()
        .rposition(|&byte| byte != 0)
        .map_or(0, |last| last + 1);
    let mut lines = Vec::new();
    let mut address = 0;
    while address < end {
        let Some(line) = Line::decode(image, address) else {
            break;
        };
        address += line.size();
        lines.push(line);
    }
    lines
}
