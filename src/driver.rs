use std::io::{Stdout, Write};
use std::thread::sleep;
use std::time::{Duration, Instant};

use crate::cpu::Cpu;
use crate::error::Fault;
use crate::memory::Memory;

/// Default tick period of the clocked driver: 1ms, a 1kHz clock.
pub const DEFAULT_CLOCK_PERIOD: Duration = Duration::from_millis(1);

/// Drives a [`Cpu`], one `step` per tick, until it halts, faults or is stopped.
pub struct Machine<W = Stdout> {
    cpu: Cpu<W>,
    /// Fail with [`Fault::StepLimit`] after this many instructions.
    max_steps: Option<u64>,
    running: bool,
}

impl Machine<Stdout> {
    pub fn new() -> Self {
        Machine::from_cpu(Cpu::new(Memory::new()))
    }
}

impl Default for Machine<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Machine<W>
where
    W: Write,
{
    pub fn from_cpu(cpu: Cpu<W>) -> Self {
        Machine {
            cpu,
            max_steps: None,
            running: false,
        }
    }

    pub fn cpu(&self) -> &Cpu<W> {
        &self.cpu
    }
    pub fn cpu_mut(&mut self) -> &mut Cpu<W> {
        &mut self.cpu
    }
    pub fn into_cpu(self) -> Cpu<W> {
        self.cpu
    }

    pub fn set_max_steps(&mut self, max_steps: Option<u64>) {
        self.max_steps = max_steps;
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.cpu.set_trace(trace);
    }

    /// Write `program` into memory, starting at address 0.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Fault> {
        self.cpu.memory_mut().load_program(program)
    }

    /// Begin accepting ticks.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop accepting ticks. The CPU state is kept as is.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Execute at most one instruction.
    ///
    /// Does nothing unless started. A halted CPU or a fault stops the machine, so no tick after
    /// that executes anything.
    pub fn tick(&mut self) -> Result<(), Fault> {
        if !self.running {
            return Ok(());
        }
        if self.cpu.is_halted() {
            self.stop();
            return Ok(());
        }
        if let Some(max_steps) = self.max_steps {
            if self.cpu.steps() >= max_steps {
                self.stop();
                return Err(Fault::StepLimit { steps: max_steps });
            }
        }
        if let Err(fault) = self.cpu.step() {
            self.stop();
            return Err(fault);
        }
        if self.cpu.is_halted() {
            self.stop();
        }
        Ok(())
    }

    /// Tick as fast as possible until the machine stops.
    pub fn run(&mut self) -> Result<(), Fault> {
        self.start();
        while self.running {
            self.tick()?;
        }
        Ok(())
    }

    /// Tick once per `period` until the machine stops.
    ///
    /// Ticks never overlap: a tick that overruns its period delays the next one.
    pub fn run_clocked(&mut self, period: Duration) -> Result<(), Fault> {
        self.start();
        let mut next_tick = Instant::now();
        while self.running {
            self.tick()?;
            next_tick += period;
            let now = Instant::now();
            if next_tick > now {
                sleep(next_tick - now);
            } else {
                next_tick = now;
            }
        }
        Ok(())
    }
}
