//! Data processing modules.

pub mod comparison;

pub use comparison::{compare_files, compare_tables, ComparisonReport};
