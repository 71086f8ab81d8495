//! Input: logical keys resolved into viewer commands.
//!
//! # Invariants
//! - At most one command is produced per frame.
//! - Bindings are checked in a fixed priority order; the first match wins.
//! - Nothing here depends on the windowing crate.

pub mod command;
pub mod keymap;

pub use command::InputCommand;
pub use keymap::{Binding, Key, KeySnapshot, Keymap, Trigger};

pub fn crate_info() -> &'static str {
    "skyline-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("input"));
    }
}
