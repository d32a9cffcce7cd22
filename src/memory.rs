use crate::error::Fault;

/// The LS-8 can address 256 bytes of memory.
pub const MEMORY_SIZE: usize = 0x100;

/// Flat byte-addressable memory image.
///
/// The low addresses double as the general purpose register bank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memory {
    mem: Box<[u8; MEMORY_SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            mem: Box::new([0; MEMORY_SIZE]),
        }
    }

    /// Create memory with `program` loaded at address 0.
    pub fn from_program(program: &[u8]) -> Result<Self, Fault> {
        let mut memory = Self::new();
        memory.load_program(program)?;
        Ok(memory)
    }

    pub fn read(&self, address: usize) -> Result<u8, Fault> {
        self.mem
            .get(address)
            .copied()
            .ok_or(Fault::OutOfRange { address })
    }

    pub fn write(&mut self, address: usize, value: u8) -> Result<(), Fault> {
        let slot = self
            .mem
            .get_mut(address)
            .ok_or(Fault::OutOfRange { address })?;
        *slot = value;
        Ok(())
    }

    /// Write `program` starting at address 0. Bytes past the program are left untouched.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Fault> {
        if program.len() > MEMORY_SIZE {
            return Err(Fault::ProgramTooLarge { len: program.len() });
        }
        self.mem[..program.len()].copy_from_slice(program);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        self.mem.as_slice()
    }
}
