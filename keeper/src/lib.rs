//! Keeper - command-line front end for ant-keeping records and advice
//!
//! Opens the six record collections over a file store and exposes their
//! operations, the material calculators, and the advisor as subcommands.

pub mod cli;
pub mod config;
pub mod session;

pub use cli::{execute, Cli, Commands};
pub use config::{ConfigError, KeeperConfig};
pub use session::Session;
