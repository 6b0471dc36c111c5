//! Operator-facing status lines: one coloured marker, then the message.
//! Everything diagnostic goes through `tracing` on stderr instead.

use std::fmt;

#[derive(Debug, Clone, Copy)]
enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    /// ANSI colour and marker for the level.
    fn style(self) -> (&'static str, &'static str) {
        match self {
            Level::Info => ("\x1b[1;34m", "ℹ️"),
            Level::Success => ("\x1b[1;32m", "✅"),
            Level::Warning => ("\x1b[1;33m", "⚠️"),
            Level::Error => ("\x1b[1;31m", "❌"),
        }
    }

    fn render(self, msg: impl fmt::Display) -> String {
        let (color, marker) = self.style();
        format!("{color}{marker} \x1b[0m{msg}")
    }
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}", Level::Info.render(msg));
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}", Level::Success.render(msg));
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{}", Level::Warning.render(msg));
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}", Level::Error.render(msg));
}
