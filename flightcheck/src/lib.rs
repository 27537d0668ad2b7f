// flightcheck/src/lib.rs
//! # Flightcheck CLI Application
//!
//! This crate provides the command-line interface over `flightcheck-core`: parameter
//! diffs, checklist validation, log retention and settings inspection.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod settings;
pub mod ui;
