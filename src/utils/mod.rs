//! Utility functions and helpers.

pub mod content;
pub mod date;
