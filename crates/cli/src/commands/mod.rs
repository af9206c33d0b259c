//! CLI subcommand implementations.

pub mod products;
