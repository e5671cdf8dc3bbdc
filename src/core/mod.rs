//! Core types: configuration and WDH-prefixed errors.

pub mod config;
pub mod errors;
