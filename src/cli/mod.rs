//! Command-line interface module.
//!
//! This module provides the CLI functionality for:
//! - Converting a saved metrics response into a frame (table, JSON or Arrow IPC)
//! - Inspecting the shape of a response before choosing dimensions

pub mod commands;
pub mod handlers;

pub use handlers::{handle_convert, handle_inspect};
