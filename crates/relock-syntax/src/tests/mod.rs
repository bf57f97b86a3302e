//! Crate-level tests exercising parsing, outlining, and rendering together.
