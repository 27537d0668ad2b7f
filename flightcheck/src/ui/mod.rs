// flightcheck/src/ui/mod.rs
//! Terminal output: themes, status messages and the diff table.

pub mod diff_table;
pub mod output_format;
pub mod theme;
