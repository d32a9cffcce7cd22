//! LS-8 opcode table.
//!
//! The opcode byte is laid out as `AABCDDDD`, where `AA` is the number of operand bytes which
//! follow. Instruction length is always taken from those two bits, never from the table, so
//! unknown opcodes still advance the program counter by the right amount.

macro_rules! opcodes {
    ( $( $(#[$doc:meta])* $name:ident = $value:literal, )* ) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[allow(clippy::upper_case_acronyms)]
        pub enum Opcode {
            $(
                $(#[$doc])*
                $name = $value,
            )*
        }

        impl TryFrom<u8> for Opcode {
            type Error = u8;
            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(Opcode::$name), )*
                    _ => Err(value),
                }
            }
        }

        impl Opcode {
            pub const ALL: &'static [Opcode] = &[ $( Opcode::$name, )* ];

            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $( Opcode::$name => stringify!($name), )*
                }
            }
        }
    };
}

opcodes! {
    /// No operation.
    NOP = 0x00,
    /// Halt the machine.
    HLT = 0x01,
    /// Return from subroutine.
    RET = 0x09,
    /// Return from interrupt handler. Partially implemented.
    IRET = 0x0B,
    /// Print alpha character. Partially implemented.
    PRA = 0x42,
    /// Print register as decimal.
    PRN = 0x43,
    CALL = 0x48,
    /// Issue interrupt. Partially implemented.
    INT = 0x4A,
    POP = 0x4C,
    PUSH = 0x4D,
    JMP = 0x50,
    JEQ = 0x51,
    JNE = 0x52,
    JLT = 0x53,
    JGT = 0x54,
    NOT = 0x70,
    INC = 0x78,
    DEC = 0x79,
    /// Load register A with the value at the address in register B.
    LD = 0x98,
    /// Load immediate.
    LDI = 0x99,
    /// Store register B at the address in register A.
    ST = 0x9A,
    CMP = 0xA0,
    ADD = 0xA8,
    SUB = 0xA9,
    MUL = 0xAA,
    DIV = 0xAB,
    MOD = 0xAC,
    OR = 0xB1,
    XOR = 0xB2,
    AND = 0xB3,
}

/// Amount of operand bytes following an opcode byte (0, 1 or 2; 3 is reserved).
#[inline]
pub const fn operand_count(byte: u8) -> usize {
    (byte >> 6) as usize
}

/// Total instruction length in bytes, opcode included.
#[inline]
pub const fn instruction_len(byte: u8) -> usize {
    1 + operand_count(byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_table() {
        for &op in Opcode::ALL {
            assert_eq!(Opcode::try_from(op as u8), Ok(op));
        }
        assert_eq!(Opcode::try_from(0x02), Err(0x02));
        assert_eq!(Opcode::try_from(0xFF), Err(0xFF));
        assert_eq!(Opcode::ADD.mnemonic(), "ADD");
        assert_eq!(Opcode::ALL.len(), 30);
    }

    #[test]
    fn lengths_follow_high_bits() {
        #[rustfmt::skip]
        let cases = [
            (Opcode::NOP, 1), (Opcode::HLT, 1), (Opcode::RET, 1), (Opcode::IRET, 1),
            (Opcode::PRA, 2), (Opcode::PRN, 2), (Opcode::CALL, 2), (Opcode::INT, 2),
            (Opcode::POP, 2), (Opcode::PUSH, 2), (Opcode::JMP, 2), (Opcode::JEQ, 2),
            (Opcode::JNE, 2), (Opcode::JLT, 2), (Opcode::JGT, 2), (Opcode::NOT, 2),
            (Opcode::INC, 2), (Opcode::DEC, 2), (Opcode::LD, 3), (Opcode::LDI, 3),
            (Opcode::ST, 3), (Opcode::CMP, 3), (Opcode::ADD, 3), (Opcode::SUB, 3),
            (Opcode::MUL, 3), (Opcode::DIV, 3), (Opcode::MOD, 3), (Opcode::OR, 3),
            (Opcode::XOR, 3), (Opcode::AND, 3),
        ];
        for (op, len) in cases {
            assert_eq!(instruction_len(op as u8), len, "{}", op.mnemonic());
        }
        // Unknown opcodes are sized the same way
        assert_eq!(instruction_len(0b1100_0000), 4);
        assert_eq!(instruction_len(0b0111_1111), 2);
    }
}
