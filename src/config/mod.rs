//! Deployment configuration
//!
//! Sections are declared with [`config_struct!`](crate::config_struct) and
//! loaded from TOML. Every component receives the [`Config`] (or its section)
//! at construction.

#[macro_use]
mod macros;
mod schemas;
mod utils;

pub use schemas::*;
pub use utils::{load_config_from_path, parse_config, MAX_ORACLE_DECIMALS};
