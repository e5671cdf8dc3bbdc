//! CLI command implementations for the `wdh` binary.

pub mod commands;
