//! Line-oriented command shell over a [`rusty_events::EventBus`].
//!
//! [`cli::Shell`] parses and runs commands, [`logger::ChannelLogger`] routes
//! `log` records to whoever drives the shell.

pub mod cli;
pub mod command;
pub mod logger;

pub use cli::Shell;
pub use command::{Command, CommandError};
pub use logger::{ChannelLogger, LogMessage};
