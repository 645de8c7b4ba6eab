//! Interactive console front end for the lilurl registry.
//!
//! This crate wires the registry to a terminal: command-line and
//! environment configuration, logging setup, a menu-driven console and a
//! launcher that opens resolved URLs in the browser.

pub mod cli;
pub mod console;
pub mod launcher;
pub mod telemetry;

pub use cli::{Cli, LogFormat};
pub use console::Console;
pub use launcher::{Launcher, NoBrowser, SystemBrowser};
