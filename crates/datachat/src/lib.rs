//! A terminal front-end for a data-analysis chat service.
//!
//! The crate includes a CLI tool for using in the terminal. The pieces it
//! is built from (settings, input commands and rendering) are exposed so
//! other front-ends can reuse them.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod command;
mod render;
mod settings;

pub use command::{Command, CommandError, parse_command};
pub use render::{BAR_CHAR, Typewriter, render_view};
pub use settings::{Settings, SettingsError};

/// Re-exports of [`datachat_core`] crate.
pub mod core {
    pub use datachat_core::*;
}
