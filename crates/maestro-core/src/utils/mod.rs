//! Utility functions for terminal display formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{bar, format_date, percent, truncate};
