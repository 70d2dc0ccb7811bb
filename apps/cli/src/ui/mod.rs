//! UI components for the CLI

pub mod progress;

pub use progress::*;
