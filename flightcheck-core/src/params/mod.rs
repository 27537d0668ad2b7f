//! Parameter snapshot handling: parsing, ignore-pattern filtering and diffing.
//!
//! The diff entry point, [`compare_params`], composes the other two: both texts are
//! parsed with [`parse_params`], filtered with [`filter_params`] using the same
//! pattern list, and then compared key by key.

pub mod diff;
pub mod filter;
pub mod parser;

pub use diff::{compare_params, diff_maps, DiffResult, ValueChange};
pub use filter::{filter_params, get_or_compile_patterns, glob_match, CompiledPatterns};
pub use parser::{parse_params, ParameterMap};
