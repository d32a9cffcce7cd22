use std::cell::RefCell;
use std::io::Write;
use std::str::Chars;

use colored::{ColoredString, Colorize};

use crate::cpu::Cpu;

#[macro_export]
macro_rules! dprintln {
    ( $cond:expr ) => {{
        #[allow(unused_imports)]
        use $crate::output::Condition::*;
        $crate::output::Output::Diagnostic($cond).print_str("\n");
    }};
    ( $cond:expr, $fmt:literal $($tt:tt)* ) => {{
        #[allow(unused_imports)]
        use $crate::output::Condition::*;
        let s = format!(
            concat!($fmt, "\n")
            $($tt)*
        );
        $crate::output::Output::Diagnostic($cond).print_str(&s);
    }};
    // Trigger type error if missing condition
    ( $fmt:literal $($tt:tt)* ) => {{
        $crate::output::Output::Diagnostic($fmt);
    }};
}

/// Destination of console text.
///
/// Program output (`PRN`) is written by the CPU to its own sink; this covers everything the
/// simulator itself has to say.
#[derive(Clone, Copy, Debug)]
pub enum Output {
    /// Standard output.
    Normal,
    /// Standard error: warnings, traces and register dumps.
    Diagnostic(Condition),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Printed even with `--minimal`, with color removed.
    Always,
    /// Decoration, dropped with `--minimal`.
    Sometimes,
}

struct Decolored<'a> {
    chars: Chars<'a>,
}

impl Output {
    thread_local! {
        static IS_MINIMAL: RefCell<bool> = const { RefCell::new(false) };
    }

    pub fn set_minimal(new_value: bool) -> bool {
        Self::IS_MINIMAL.with(|value| value.replace(new_value))
    }
    pub fn is_minimal() -> bool {
        Self::IS_MINIMAL.with(|value| *value.borrow())
    }

    pub fn print_str(&self, string: &str) {
        match self {
            Self::Normal => {
                if Self::is_minimal() {
                    print!("{}", Decolored::new(string).collect::<String>());
                } else {
                    print!("{}", string);
                }
            }

            Self::Diagnostic(condition) => match (Self::is_minimal(), *condition) {
                (false, _) => {
                    eprint!("{}", ColoredString::from(string).blue());
                }
                // Always remove color if `--minimal`
                (true, Condition::Always) => {
                    eprint!("{}", Decolored::new(string).collect::<String>());
                }
                (true, Condition::Sometimes) => (),
            },
        }
    }

    /// Warning line, printed regardless of `--minimal`.
    pub fn warn(message: &str) {
        if Self::is_minimal() {
            eprintln!("warning: {}", message);
        } else {
            eprintln!("{:>12} {}", "Warning".yellow(), message);
        }
    }

    pub fn print_registers<W: Write>(&self, cpu: &Cpu<W>) {
        let regs = cpu.register_values();
        if Self::is_minimal() {
            for (i, reg) in regs.iter().enumerate() {
                self.print_str(&format!("R{} {}\n", i, reg));
            }
            self.print_str(&format!("PC {}\n", cpu.pc()));
            self.print_str(&format!("FL {:03b}\n", cpu.flags()));
            return;
        }

        self.print_str("\x1b[2m┌───────────────────────────┐\x1b[0m\n");
        self.print_str("\x1b[2m│        \x1b[3mhex    uint  mem\x1b[0m\x1b[2m    │\x1b[0m\n");
        for (i, reg) in regs.iter().enumerate() {
            let backing = cpu.memory().as_slice()[i];
            self.print_str("\x1b[2m│\x1b[0m");
            self.print_str(&format!(" \x1b[1mR{}\x1b[0m  ", i));
            self.print_str(&format!("0x{:02x}  {:-4}  {:-4}", reg, reg, backing));
            self.print_str("    \x1b[2m│\x1b[0m\n");
        }
        self.print_str("\x1b[2m│\x1b[0m");
        self.print_str(&format!(" \x1b[1mPC\x1b[0m  0x{:02x}", cpu.pc()));
        self.print_str("       ");
        self.print_str(&format!(" \x1b[1mFL\x1b[0m  {:03b}", cpu.flags()));
        self.print_str("  \x1b[2m│\x1b[0m\n");
        self.print_str("\x1b[2m└───────────────────────────┘\x1b[0m\n");
    }
}

impl<'a> Decolored<'a> {
    pub fn new(string: &'a str) -> Self {
        Self {
            chars: string.chars(),
        }
    }
}

impl<'a> Iterator for Decolored<'a> {
    type Item = char;
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(ch) = self.chars.next() {
            // Skip everything between '\x1b' and 'm' (inclusive)
            if ch == '\x1b' {
                while self.chars.next().is_some_and(|ch| ch != 'm') {}
                continue;
            }
            return Some(ch);
        }
        None
    }
}
