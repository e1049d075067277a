//! Command-line interface module.

mod args;
pub mod build;
pub mod generate;
pub mod react_dev;
pub mod webext;

pub use args::{Cli, Commands};
