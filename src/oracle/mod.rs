//! Reference price retrieval

pub mod client;
pub mod types;

pub use client::{build_eth_call_request, decode_price, parse_rpc_response, ChainlinkOracle, PriceOracle};
pub use types::Price;
