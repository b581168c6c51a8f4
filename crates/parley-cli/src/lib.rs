//! parley command-line client
//!
//! Interactive terminal chat, one-shot `ask`, the relay proxy (`serve`) and
//! config management, sharing one layered configuration.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod settings;
pub mod tui;
