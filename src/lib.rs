//! perpkeeper - price-gated close/execute keeper for a perpetuals backend

pub mod apis;
pub mod arguments;
pub mod config;
pub mod errors;
pub mod keeper;
pub mod logger;
pub mod oracle;
