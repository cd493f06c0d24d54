//! # CountNow Application Library
//!
//! HTTP API, CLI and configuration around `countnow-core`. The binary in
//! `main.rs` only sets up logging and dispatches to [`cli::execute`].

pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
