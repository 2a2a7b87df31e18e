//! Utility functions for string formatting.

pub mod format;

pub use format::{format_date, learning_plan_file_name, report_file_name, truncate_string};
