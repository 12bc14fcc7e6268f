//! Named styles for terminal output.
//!
//! Rendering code asks for a style by meaning (a key, a muted note, a failure)
//! and never picks colors itself. `console` drops the escapes when stdout is not
//! a terminal.

use console::Style;

pub fn key() -> Style {
    Style::new().bold()
}

pub fn value() -> Style {
    Style::new().cyan()
}

pub fn muted() -> Style {
    Style::new().color256(246).italic()
}

pub fn ok() -> Style {
    Style::new().green()
}

pub fn warn() -> Style {
    Style::new().yellow()
}

pub fn error() -> Style {
    Style::new().red()
}
