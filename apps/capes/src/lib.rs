//! # capes
//!
//! The Capes application: HTTP API, CLI and configuration around
//! [`capes_core`].

pub mod api;
pub mod cli;
pub mod config;
